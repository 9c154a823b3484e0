//! Dependencies of a class or interface declaration.

use crate::error::{AnalyzerError, MemberError};
use crate::source::{Declaration, Member, SourceFile, TypeExpr};
use crate::typedeps::{ResolvedTypeDeps, resolve_type_dependencies};

/// Resolve every supertype and data member type of `decl`.
///
/// Supertypes come first, then members in declaration order. Methods are not
/// looked at. Every failing member is reported in one aggregated error.
pub fn analyze_class_deps(
    decl: &Declaration,
    file: &SourceFile,
) -> Result<Vec<ResolvedTypeDeps>, AnalyzerError> {
    let unknown = TypeExpr::unknown();

    let supertypes = decl
        .supertypes
        .iter()
        .map(|ty| ("extends".to_string(), decl.line, ty));

    let members = decl.members.iter().filter_map(|member| match member {
        Member::Property(prop) if !prop.is_static => {
            Some((prop.name.clone(), prop.line, prop.ty.as_ref().unwrap_or(&unknown)))
        }
        Member::Index(index) => Some((format!("[{}]", index.key_name), index.line, &index.value)),
        _ => None,
    });

    let mut resolved = Vec::new();
    let mut errors = Vec::new();

    for (member, line, ty) in supertypes.chain(members) {
        match resolve_type_dependencies(ty, file) {
            Ok(deps) => resolved.push(deps),
            Err(error) => errors.push(MemberError {
                member,
                line,
                error,
            }),
        }
    }

    if errors.is_empty() {
        Ok(resolved)
    } else {
        Err(AnalyzerError::InMembers {
            declaration: decl.name.clone(),
            file: file.relative_path().to_string(),
            errors,
        })
    }
}
