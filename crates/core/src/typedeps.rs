//! Level-one dependencies of a type expression.
//!
//! The resolver renders a [`TypeExpr`] twice: once with every cross-file
//! reference spelled `import("<file>").Name` and once with the bare name. It
//! records which names come from which file, without looking at the
//! dependencies' own dependencies.

use indexmap::IndexMap;
use nsdk_common::naming::quote_if_needed;
use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;
use crate::source::{ImportedName, SourceFile, TypeExpr, is_absolute_path};

/// Type names provided by the TypeScript standard library and the DOM/Node
/// globals commonly used in DTOs.
const GLOBAL_TYPES: &[&str] = &[
    "Array",
    "ArrayBuffer",
    "AsyncIterable",
    "AsyncIterableIterator",
    "Awaited",
    "BigInt",
    "Blob",
    "Boolean",
    "Buffer",
    "Capitalize",
    "DataView",
    "Date",
    "Error",
    "Exclude",
    "Extract",
    "File",
    "Float32Array",
    "Float64Array",
    "Function",
    "InstanceType",
    "Int16Array",
    "Int32Array",
    "Int8Array",
    "Iterable",
    "IterableIterator",
    "Lowercase",
    "Map",
    "NonNullable",
    "Number",
    "Object",
    "Omit",
    "Parameters",
    "Partial",
    "Pick",
    "Promise",
    "PromiseLike",
    "Readonly",
    "ReadonlyArray",
    "ReadonlyMap",
    "ReadonlySet",
    "Record",
    "RegExp",
    "Required",
    "ReturnType",
    "Set",
    "String",
    "Symbol",
    "Uint16Array",
    "Uint32Array",
    "Uint8Array",
    "Uncapitalize",
    "Uppercase",
    "URL",
    "WeakMap",
    "WeakSet",
];

/// Whether `name` is a global library type.
pub fn is_global_type(name: &str) -> bool {
    GLOBAL_TYPES.contains(&name)
}

/// A type with its resolved level-one dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTypeDeps {
    /// Type text with `import("<file>").Name` for cross-file references.
    pub raw_type: String,
    /// Type text with bare names.
    pub resolved_type: String,
    /// Root-relative file the type was written in.
    pub relative_file_path: String,
    /// Root-relative file (without extension) -> names imported from it.
    pub dependencies: IndexMap<String, Vec<String>>,
    /// Names that are neither imported nor global: same-file declarations or
    /// ambient types.
    pub local_types: Vec<String>,
}

/// Resolve the dependencies of `ty`, written in `file`.
pub fn resolve_type_dependencies(
    ty: &TypeExpr,
    file: &SourceFile,
) -> Result<ResolvedTypeDeps, AnalyzerError> {
    if is_absolute_path(file.relative_path()) {
        return Err(AnalyzerError::Internal(format!(
            "got absolute file path in type dependencies resolver, when expecting a relative one (got {})",
            file.relative_path()
        )));
    }

    let mut resolver = Resolver {
        file,
        dependencies: IndexMap::new(),
        local_types: Vec::new(),
    };
    let rendered = resolver.render(ty)?;

    if rendered.resolved.contains("import(") {
        return Err(AnalyzerError::Internal(format!(
            "resolved type still contains an import(...) statement: {}",
            rendered.resolved
        )));
    }

    if let Some(absolute) = resolver.dependencies.keys().find(|f| is_absolute_path(f)) {
        return Err(AnalyzerError::Internal(format!(
            "resolved absolute file path {absolute} in type dependencies of {}",
            rendered.raw
        )));
    }

    Ok(ResolvedTypeDeps {
        raw_type: rendered.raw,
        resolved_type: rendered.resolved,
        relative_file_path: file.relative_path().to_string(),
        dependencies: resolver.dependencies,
        local_types: resolver.local_types,
    })
}

/// Both renderings of one (sub)type.
struct Rendered {
    raw: String,
    resolved: String,
}

impl Rendered {
    fn same(text: String) -> Self {
        Self {
            raw: text.clone(),
            resolved: text,
        }
    }

    fn map(self, f: impl Fn(&str) -> String) -> Self {
        Self {
            raw: f(&self.raw),
            resolved: f(&self.resolved),
        }
    }
}

struct Resolver<'a> {
    file: &'a SourceFile,
    dependencies: IndexMap<String, Vec<String>>,
    local_types: Vec<String>,
}

impl Resolver<'_> {
    fn render(&mut self, ty: &TypeExpr) -> Result<Rendered, AnalyzerError> {
        match ty {
            TypeExpr::Keyword(text) | TypeExpr::Literal(text) => Ok(Rendered::same(text.clone())),
            TypeExpr::Reference { name, args } => self.render_reference(name, args),
            TypeExpr::Import {
                specifier,
                qualifier,
                args,
            } => match qualifier.as_slice() {
                [name] => {
                    let file = self.file.resolve_specifier(specifier);
                    self.reference_import(&file, name, args)
                }
                _ => Err(self.unsupported("import type without a single qualifier", ty)),
            },
            TypeExpr::Array(elem) => Ok(self.render(elem)?.map(|e| format!("Array<{e}>"))),
            TypeExpr::Readonly(inner) => match inner.as_ref() {
                TypeExpr::Array(elem) => {
                    Ok(self.render(elem)?.map(|e| format!("ReadonlyArray<{e}>")))
                }
                _ => Ok(self.render(inner)?.map(|e| format!("readonly {e}"))),
            },
            TypeExpr::Parenthesized(inner) => Ok(self.render(inner)?.map(|e| format!("({e})"))),
            TypeExpr::Tuple(items) => Ok(self.render_list(items, ", ")?.map(|e| format!("[{e}]"))),
            TypeExpr::Union(items) => self.render_list(items, " | "),
            TypeExpr::Intersection(items) => self.render_list(items, " & "),
            TypeExpr::Object(fields) => {
                let mut raw = Vec::with_capacity(fields.len());
                let mut resolved = Vec::with_capacity(fields.len());
                for field in fields {
                    let rendered = self.render(&field.ty)?;
                    let prefix = format!(
                        "{}{}{}: ",
                        if field.readonly { "readonly " } else { "" },
                        quote_if_needed(&field.name),
                        if field.optional { "?" } else { "" }
                    );
                    raw.push(format!("{prefix}{}", rendered.raw));
                    resolved.push(format!("{prefix}{}", rendered.resolved));
                }
                if fields.is_empty() {
                    return Ok(Rendered::same("{}".to_string()));
                }
                Ok(Rendered {
                    raw: format!("{{ {} }}", raw.join("; ")),
                    resolved: format!("{{ {} }}", resolved.join("; ")),
                })
            }
            TypeExpr::Unsupported { construct, text } => Err(AnalyzerError::UnsupportedType {
                construct: construct.clone(),
                text: text.clone(),
                file: self.file.relative_path().to_string(),
            }),
        }
    }

    fn render_list(&mut self, items: &[TypeExpr], sep: &str) -> Result<Rendered, AnalyzerError> {
        let mut raw = Vec::with_capacity(items.len());
        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            let rendered = self.render(item)?;
            raw.push(rendered.raw);
            resolved.push(rendered.resolved);
        }
        Ok(Rendered {
            raw: raw.join(sep),
            resolved: resolved.join(sep),
        })
    }

    fn render_args(&mut self, args: &[TypeExpr]) -> Result<Rendered, AnalyzerError> {
        if args.is_empty() {
            return Ok(Rendered::same(String::new()));
        }
        Ok(self.render_list(args, ", ")?.map(|a| format!("<{a}>")))
    }

    fn render_reference(
        &mut self,
        name: &[String],
        args: &[TypeExpr],
    ) -> Result<Rendered, AnalyzerError> {
        match name {
            [single] => {
                if let Some(binding) = self.file.import(single) {
                    let file = self.file.resolve_specifier(&binding.specifier);
                    return match &binding.imported {
                        ImportedName::Named(original) => {
                            self.reference_import(&file, original, args)
                        }
                        ImportedName::Default => self.reference_import(&file, single, args),
                        ImportedName::Namespace => Err(AnalyzerError::UnsupportedType {
                            construct: "namespace import used as a type".to_string(),
                            text: single.clone(),
                            file: self.file.relative_path().to_string(),
                        }),
                    };
                }

                if !self.file.declares(single) && is_global_type(single) {
                    let rendered_args = self.render_args(args)?;
                    return Ok(rendered_args.map(|a| format!("{single}{a}")));
                }

                if !self.local_types.contains(single) {
                    self.local_types.push(single.clone());
                }
                let rendered_args = self.render_args(args)?;
                Ok(rendered_args.map(|a| format!("{single}{a}")))
            }
            [namespace, member] => match self.file.import(namespace) {
                Some(binding) if binding.imported == ImportedName::Namespace => {
                    let file = self.file.resolve_specifier(&binding.specifier);
                    self.reference_import(&file, member, args)
                }
                _ => Err(AnalyzerError::UnsupportedType {
                    construct: "qualified type name".to_string(),
                    text: name.join("."),
                    file: self.file.relative_path().to_string(),
                }),
            },
            _ => Err(AnalyzerError::UnsupportedType {
                construct: "qualified type name".to_string(),
                text: name.join("."),
                file: self.file.relative_path().to_string(),
            }),
        }
    }

    fn reference_import(
        &mut self,
        file: &str,
        name: &str,
        args: &[TypeExpr],
    ) -> Result<Rendered, AnalyzerError> {
        let names = self.dependencies.entry(file.to_string()).or_default();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }

        let rendered_args = self.render_args(args)?;
        Ok(Rendered {
            raw: format!("import(\"{file}\").{name}{}", rendered_args.raw),
            resolved: format!("{name}{}", rendered_args.resolved),
        })
    }

    fn unsupported(&self, construct: &str, ty: &TypeExpr) -> AnalyzerError {
        AnalyzerError::UnsupportedType {
            construct: construct.to_string(),
            text: format!("{ty:?}"),
            file: self.file.relative_path().to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn alias_of(src: &str, name: &str) -> (SourceFile, TypeExpr) {
        let file = SourceFile::parse("modules/article/article.controller.ts", src.to_string())
            .unwrap();
        let ty = file
            .find_declaration(name)
            .and_then(|d| d.aliased.clone())
            .unwrap();
        (file, ty)
    }

    #[test]
    fn primitive_has_no_dependencies() {
        let (file, ty) = alias_of("type X = string;", "X");
        let deps = resolve_type_dependencies(&ty, &file).unwrap();
        assert_eq!(deps.raw_type, "string");
        assert_eq!(deps.resolved_type, deps.raw_type);
        assert!(deps.dependencies.is_empty());
        assert!(deps.local_types.is_empty());
    }

    #[test]
    fn array_of_imported_type() {
        let (file, ty) = alias_of(
            "import { Article } from './article.entity';\ntype X = Article[];",
            "X",
        );
        let deps = resolve_type_dependencies(&ty, &file).unwrap();
        assert_eq!(deps.resolved_type, "Array<Article>");
        assert_eq!(
            deps.raw_type,
            "Array<import(\"modules/article/article.entity\").Article>"
        );

        let (elem_file, elem_ty) = alias_of(
            "import { Article } from './article.entity';\ntype X = Article;",
            "X",
        );
        let elem = resolve_type_dependencies(&elem_ty, &elem_file).unwrap();
        assert_eq!(deps.dependencies, elem.dependencies);
        assert_eq!(
            deps.dependencies.get("modules/article/article.entity"),
            Some(&vec!["Article".to_string()])
        );
    }

    #[test]
    fn renamed_namespace_default_and_inline_imports() {
        let (file, ty) = alias_of(
            r#"
import { Category as Cat } from '../category/category.entity';
import * as tags from '../tag/tag.entity';
import Author from '../author/author.entity';
type X = Promise<Cat | tags.Tag | Author | import('../misc/misc').Misc>;
"#,
            "X",
        );
        let deps = resolve_type_dependencies(&ty, &file).unwrap();
        assert_eq!(deps.resolved_type, "Promise<Category | Tag | Author | Misc>");
        let files: Vec<&String> = deps.dependencies.keys().collect();
        assert_eq!(
            files,
            vec![
                "modules/category/category.entity",
                "modules/tag/tag.entity",
                "modules/author/author.entity",
                "modules/misc/misc",
            ]
        );
    }

    #[test]
    fn local_and_unknown_names_are_local_types() {
        let (file, ty) = alias_of(
            "interface Local { a: string }\ntype X = { one: Local; two?: Ambient; readonly 'three-x': Local[] };",
            "X",
        );
        let deps = resolve_type_dependencies(&ty, &file).unwrap();
        assert_eq!(
            deps.resolved_type,
            "{ one: Local; two?: Ambient; readonly \"three-x\": Array<Local> }"
        );
        assert_eq!(deps.local_types, vec!["Local", "Ambient"]);
        assert!(deps.dependencies.is_empty());
    }

    #[test]
    fn composite_forms_are_rendered() {
        let (file, ty) = alias_of(
            "type X = readonly (string | null)[] & [number, 'a'] & Record<string, boolean>;",
            "X",
        );
        let deps = resolve_type_dependencies(&ty, &file).unwrap();
        assert_eq!(
            deps.resolved_type,
            "ReadonlyArray<(string | null)> & [number, 'a'] & Record<string, boolean>"
        );
    }

    #[test]
    fn readonly_arrays_and_tuples_stay_valid() {
        let (file, ty) = alias_of("type X = [readonly string[], readonly [number, string]];", "X");
        let deps = resolve_type_dependencies(&ty, &file).unwrap();
        assert_eq!(
            deps.resolved_type,
            "[ReadonlyArray<string>, readonly [number, string]]"
        );
    }

    #[test]
    fn unsupported_constructs_are_rejected_with_their_text() {
        for (src, text) in [
            ("type X = keyof Foo;", "keyof Foo"),
            ("type X = { [K in 'a']: string };", "{ [K in 'a']: string }"),
            ("type X = Foo['bar'];", "Foo['bar']"),
            ("type X = () => void;", "() => void"),
            ("type X = { f(): void };", "{ f(): void }"),
        ] {
            let (file, ty) = alias_of(src, "X");
            let err = resolve_type_dependencies(&ty, &file).unwrap_err();
            assert!(
                matches!(&err, AnalyzerError::UnsupportedType { text: got, .. } if got == text),
                "{src}: {err}"
            );
        }
    }

    #[test]
    fn namespace_used_as_type_is_rejected() {
        let (file, ty) = alias_of("import * as ns from './ns';\ntype X = ns;", "X");
        assert!(resolve_type_dependencies(&ty, &file).is_err());
    }
}
