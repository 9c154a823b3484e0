//! Extraction of the types an SDK depends on.
//!
//! Every referenced type is turned into a standalone declaration, together
//! with the location of each type it depends on. Extracted types are cached
//! per (file, name) for the whole run, which is also what stops recursion on
//! shared and cyclic types.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use indexmap::IndexMap;
use nsdk_common::MagicType;
use nsdk_common::naming::quote_if_needed;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classdeps::analyze_class_deps;
use crate::diagnostics::Warnings;
use crate::error::AnalyzerError;
use crate::modules::SdkModules;
use crate::methods::SdkMethod;
use crate::params::{SdkMethodBody, SdkMethodParams};
use crate::source::{
    Declaration, DeclarationKind, IndexSignature, MODULE_EXTENSIONS, Member, SourceFile,
    SourceProject, TypeExpr, is_absolute_path, strip_module_extension,
};
use crate::typedeps::{ResolvedTypeDeps, resolve_type_dependencies};

/// Header prepended to every magic placeholder.
pub const MAGIC_PLACEHOLDER_HEADER: &str = "/** @file Magic placeholder from configuration file */";

/// Magic types applied after the configured ones.
pub fn builtin_magic_types() -> Vec<MagicType> {
    vec![MagicType {
        source_file_suffix: "@mikro-orm/core".to_string(),
        type_name: "Collection".to_string(),
        placeholder_content: "export type Collection<T, _ = unknown> = Array<T>;".to_string(),
    }]
}

/// Where a type is declared, before its file extension is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeLocation {
    /// Type name.
    pub typename: String,
    /// Root-relative file path without extension.
    pub relative_path_no_ext: String,
}

/// A type location resolved to a physical file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeLocationWithExt {
    /// Type name.
    pub typename: String,
    /// Root-relative file path without extension.
    pub relative_path_no_ext: String,
    /// Root-relative file path.
    pub relative_path: String,
}

/// A standalone type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedType {
    /// Type name.
    pub typename: String,
    /// Root-relative file path without extension.
    pub relative_path_no_ext: String,
    /// Root-relative file path.
    pub relative_path: String,
    /// Declaration text.
    pub content: String,
    /// Declared type parameters, as written.
    pub type_params: Vec<String>,
    /// Types the declaration refers to.
    pub dependencies: Vec<TypeLocationWithExt>,
}

/// File -> type name -> extracted type.
pub type TypesExtractorContent = IndexMap<String, IndexMap<String, ExtractedType>>;

/// Names of the types currently being extracted, outermost first.
#[derive(Debug, Default)]
struct TypesPath {
    names: Vec<String>,
}

impl TypesPath {
    fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    fn depth(&self) -> usize {
        self.names.len()
    }

    /// Push `name` for the lifetime of the returned guard.
    fn enter(&mut self, name: &str) -> Result<PathGuard<'_>, AnalyzerError> {
        if self.contains(name) {
            return Err(AnalyzerError::Internal(format!(
                "types path contains at least one duplicate type during extraction ({name} in {})",
                self.names.join(" -> ")
            )));
        }
        self.names.push(name.to_string());
        Ok(PathGuard { path: self })
    }
}

/// Pops its entry from the types path when dropped.
#[derive(Debug)]
struct PathGuard<'a> {
    path: &'a mut TypesPath,
}

impl Deref for PathGuard<'_> {
    type Target = TypesPath;

    fn deref(&self) -> &TypesPath {
        self.path
    }
}

impl DerefMut for PathGuard<'_> {
    fn deref_mut(&mut self) -> &mut TypesPath {
        self.path
    }
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.path.names.pop();
    }
}

/// Recursive, cached type extractor.
#[derive(Debug)]
pub struct TypesExtractor<'a> {
    project: &'a SourceProject,
    magic_types: Vec<MagicType>,
    extracted: IndexMap<String, IndexMap<String, Rc<ExtractedType>>>,
    /// Locations reached through a directory import or a re-export, mapped
    /// to the location of the declaration.
    aliases: HashMap<TypeLocation, TypeLocation>,
    warnings: Warnings,
}

impl<'a> TypesExtractor<'a> {
    /// Extractor over `project`; `magic_types` take precedence over the
    /// builtin ones.
    pub fn new(project: &'a SourceProject, magic_types: &[MagicType]) -> Self {
        let mut all = magic_types.to_vec();
        all.extend(builtin_magic_types());

        Self {
            project,
            magic_types: all,
            extracted: IndexMap::new(),
            aliases: HashMap::new(),
            warnings: Warnings::new(),
        }
    }

    /// Extract a type and, recursively, everything it depends on.
    pub fn extract(&mut self, loc: &TypeLocation) -> Result<Rc<ExtractedType>, AnalyzerError> {
        self.extract_type(loc, &mut TypesPath::default())
    }

    /// Cached type at `loc`, whatever its file extension.
    pub fn find_extracted_without_ext(&self, loc: &TypeLocation) -> Option<&Rc<ExtractedType>> {
        let loc = self.aliases.get(loc).unwrap_or(loc);
        MODULE_EXTENSIONS.iter().find_map(|ext| {
            self.extracted
                .get(&format!("{}{ext}", loc.relative_path_no_ext))
                .and_then(|types| types.get(&loc.typename))
        })
    }

    /// Point the dependencies of `deps` at the files that declare them, for
    /// types reached through a directory import or a re-export.
    pub fn relocate(&self, deps: &mut ResolvedTypeDeps) {
        let mut relocated: IndexMap<String, Vec<String>> = IndexMap::new();
        for (file, types) in &deps.dependencies {
            for typename in types {
                let loc = TypeLocation {
                    typename: typename.clone(),
                    relative_path_no_ext: file.clone(),
                };
                let target = self
                    .aliases
                    .get(&loc)
                    .map_or(file, |canonical| &canonical.relative_path_no_ext);
                let names = relocated.entry(target.clone()).or_default();
                if !names.contains(typename) {
                    names.push(typename.clone());
                }
            }
        }
        deps.dependencies = relocated;
    }

    /// Warnings raised so far.
    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    /// Consume the extractor, returning every extracted type.
    pub fn into_content(self) -> (TypesExtractorContent, Warnings) {
        let content = self
            .extracted
            .into_iter()
            .map(|(file, types)| {
                let types = types
                    .into_iter()
                    .map(|(name, ty)| (name, Rc::try_unwrap(ty).unwrap_or_else(|ty| (*ty).clone())))
                    .collect();
                (file, types)
            })
            .collect();
        (content, self.warnings)
    }

    fn magic_type(&self, loc: &TypeLocation) -> Option<&MagicType> {
        self.magic_types.iter().find(|rule| {
            let suffix = strip_module_extension(rule.source_file_suffix.trim_start_matches('/'));
            let path = loc.relative_path_no_ext.as_str();

            rule.type_name == loc.typename
                && (path == suffix
                    || path
                        .strip_suffix(suffix)
                        .is_some_and(|rest| rest.ends_with('/')))
        })
    }

    /// First existing file for a module path, trying extensions then
    /// directory index files.
    fn locate_file(&mut self, loc: &TypeLocation) -> Result<String, AnalyzerError> {
        let mut candidates = self
            .project
            .find_module_files(&loc.relative_path_no_ext)
            .into_iter();

        let found = candidates.next().ok_or_else(|| AnalyzerError::FileNotFound {
            path: loc.relative_path_no_ext.clone(),
            typename: loc.typename.clone(),
        })?;

        let shadowed: Vec<String> = candidates.collect();
        if !shadowed.is_empty() {
            self.warnings.push(format!(
                "Found multiple files for module {}: using {found}, ignoring {}",
                loc.relative_path_no_ext,
                shadowed.join(", ")
            ));
        }

        Ok(found)
    }

    /// Location of a type, without extracting it.
    fn find_type_location(
        &mut self,
        loc: &TypeLocation,
    ) -> Result<TypeLocationWithExt, AnalyzerError> {
        if let Some(cached) = self.find_extracted_without_ext(loc) {
            return Ok(location_of(cached));
        }

        if self.magic_type(loc).is_some() {
            return Ok(self.magic_location(loc));
        }

        self.locate_declaration(loc)
    }

    /// File declaring a type, following `export ... from` declarations when
    /// the file at `loc` does not declare it itself.
    fn locate_declaration(
        &mut self,
        loc: &TypeLocation,
    ) -> Result<TypeLocationWithExt, AnalyzerError> {
        let relative_path = self.locate_file(loc)?;
        let mut visited = vec![relative_path.clone()];

        let found = self
            .follow_exports(&relative_path, &loc.typename, &mut visited)?
            .ok_or_else(|| AnalyzerError::TypeNotFound {
                typename: loc.typename.clone(),
                path: relative_path,
            })?;

        if found.relative_path_no_ext != loc.relative_path_no_ext {
            debug!(
                "Type {} of module {} is declared in {}",
                loc.typename, loc.relative_path_no_ext, found.relative_path
            );
            self.aliases.insert(
                loc.clone(),
                TypeLocation {
                    typename: found.typename.clone(),
                    relative_path_no_ext: found.relative_path_no_ext.clone(),
                },
            );
        }
        Ok(found)
    }

    fn follow_exports(
        &mut self,
        relative_path: &str,
        typename: &str,
        visited: &mut Vec<String>,
    ) -> Result<Option<TypeLocationWithExt>, AnalyzerError> {
        let file = self.project.file(relative_path)?;
        if file.declares(typename) {
            return Ok(Some(TypeLocationWithExt {
                typename: typename.to_string(),
                relative_path_no_ext: strip_module_extension(relative_path).to_string(),
                relative_path: relative_path.to_string(),
            }));
        }

        for re_export in file.re_exports() {
            let Some(original) = re_export.original_name(typename) else {
                continue;
            };
            if original != typename {
                return Err(AnalyzerError::RenamedReExport {
                    typename: typename.to_string(),
                    original: original.to_string(),
                    path: relative_path.to_string(),
                });
            }

            let target = TypeLocation {
                typename: typename.to_string(),
                relative_path_no_ext: file.resolve_specifier(&re_export.specifier),
            };
            if self.magic_type(&target).is_some() {
                return Ok(Some(self.magic_location(&target)));
            }

            let Some(next) = self
                .project
                .find_module_files(&target.relative_path_no_ext)
                .into_iter()
                .next()
            else {
                continue;
            };
            if visited.contains(&next) {
                continue;
            }
            visited.push(next.clone());

            if let Some(found) = self.follow_exports(&next, typename, visited)? {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    fn magic_location(&self, loc: &TypeLocation) -> TypeLocationWithExt {
        TypeLocationWithExt {
            typename: loc.typename.clone(),
            relative_path_no_ext: loc.relative_path_no_ext.clone(),
            relative_path: self.magic_relative_path(loc),
        }
    }

    fn magic_relative_path(&self, loc: &TypeLocation) -> String {
        self.project
            .find_module_files(&loc.relative_path_no_ext)
            .into_iter()
            .next()
            .unwrap_or_else(|| format!("{}.ts", loc.relative_path_no_ext))
    }

    fn magic_placeholder(&self, loc: &TypeLocation) -> Option<String> {
        self.magic_type(loc)
            .map(|magic| magic.placeholder_content.clone())
    }

    fn store_magic(&mut self, loc: &TypeLocation, placeholder: &str, arrow: &str) -> Rc<ExtractedType> {
        debug!(
            "{arrow}Found magic type {} from module {}, using provided placeholder",
            loc.typename, loc.relative_path_no_ext
        );
        let location = self.magic_location(loc);

        self.store(ExtractedType {
            typename: location.typename,
            relative_path_no_ext: location.relative_path_no_ext,
            relative_path: location.relative_path,
            content: format!("{MAGIC_PLACEHOLDER_HEADER}\n\n{placeholder}"),
            type_params: Vec::new(),
            dependencies: Vec::new(),
        })
    }

    fn store(&mut self, extracted: ExtractedType) -> Rc<ExtractedType> {
        let extracted = Rc::new(extracted);
        self.extracted
            .entry(extracted.relative_path.clone())
            .or_default()
            .insert(extracted.typename.clone(), Rc::clone(&extracted));
        extracted
    }

    fn extract_type(
        &mut self,
        loc: &TypeLocation,
        path: &mut TypesPath,
    ) -> Result<Rc<ExtractedType>, AnalyzerError> {
        if is_absolute_path(&loc.relative_path_no_ext) {
            return Err(AnalyzerError::Internal(format!(
                "got absolute file path in types extractor, when expecting a relative one (got {})",
                loc.relative_path_no_ext
            )));
        }

        if let Some(cached) = self.find_extracted_without_ext(loc) {
            return Ok(Rc::clone(cached));
        }

        let arrow = "-> ".repeat(path.depth() + 1);

        if let Some(placeholder) = self.magic_placeholder(loc) {
            return Ok(self.store_magic(loc, &placeholder, &arrow));
        }

        let declared = self.locate_declaration(loc)?;
        let canonical = TypeLocation {
            typename: declared.typename.clone(),
            relative_path_no_ext: declared.relative_path_no_ext.clone(),
        };
        if canonical != *loc {
            if let Some(cached) = self.find_extracted_without_ext(&canonical) {
                return Ok(Rc::clone(cached));
            }
            if let Some(placeholder) = self.magic_placeholder(&canonical) {
                return Ok(self.store_magic(&canonical, &placeholder, &arrow));
            }
        }

        let TypeLocationWithExt {
            relative_path_no_ext,
            relative_path,
            ..
        } = declared;
        debug!("{arrow}Extracting type {} from file {relative_path}...", loc.typename);

        let file = self.project.file(&relative_path)?;
        let decl = file
            .find_declaration(&loc.typename)
            .ok_or_else(|| AnalyzerError::TypeNotFound {
                typename: loc.typename.clone(),
                path: relative_path.clone(),
            })?;

        if let Some(other) = MODULE_EXTENSIONS
            .iter()
            .map(|ext| format!("{relative_path_no_ext}{ext}"))
            .filter(|candidate| *candidate != relative_path)
            .find(|candidate| {
                self.extracted
                    .get(candidate)
                    .is_some_and(|types| types.contains_key(&loc.typename))
            })
        {
            return Err(AnalyzerError::ExtensionCollision {
                first: other,
                second: relative_path,
            });
        }

        let (content, resolved_deps, type_params) = match decl.kind {
            DeclarationKind::Enum | DeclarationKind::Function => {
                (exported_text(decl), Vec::new(), Vec::new())
            }
            DeclarationKind::TypeAlias => {
                let aliased = decl.aliased.as_ref().ok_or_else(|| {
                    AnalyzerError::Internal(format!("type alias {} has no aliased type", decl.name))
                })?;
                let deps = resolve_type_dependencies(aliased, &file)?;
                let content = format!(
                    "export type {}{} = {};",
                    decl.name,
                    type_params_text(decl),
                    deps.resolved_type
                );
                (content, vec![deps], decl.type_params.clone())
            }
            DeclarationKind::Interface => {
                let deps = analyze_class_deps(decl, &file)?;
                let content = self.interface_content(decl, &file)?;
                (content, deps, decl.type_params.clone())
            }
            DeclarationKind::Class => {
                let deps = analyze_class_deps(decl, &file)?;
                let content = self.class_content(decl, &file)?;
                (content, deps, decl.type_params.clone())
            }
        };

        let mut guard = path.enter(&loc.typename)?;
        let mut dependencies = Vec::new();

        for dependency in locate_types_file(&resolved_deps) {
            if type_params.iter().any(|tp| tp.name == dependency.typename) {
                continue;
            }

            let resolved = if let Some(cached) = self.find_extracted_without_ext(&dependency) {
                Ok(location_of(cached))
            } else if guard.contains(&dependency.typename) {
                debug!("{arrow}Breaking cycle on type {}", dependency.typename);
                self.find_type_location(&dependency)
            } else {
                self.extract_type(&dependency, &mut guard)
                    .map(|extracted| location_of(&extracted))
            };

            let located = resolved.map_err(|err| AnalyzerError::InDependency {
                typename: loc.typename.clone(),
                dependency: dependency.typename.clone(),
                file: relative_path.clone(),
                source: Box::new(err),
            })?;

            if !dependencies.contains(&located) {
                dependencies.push(located);
            }
        }

        drop(guard);

        Ok(self.store(ExtractedType {
            typename: loc.typename.clone(),
            relative_path_no_ext,
            relative_path,
            content,
            type_params: type_params.into_iter().map(|tp| tp.text).collect(),
            dependencies,
        }))
    }

    /// Declaration-only view of a class: its head, index signatures and data
    /// properties.
    fn class_content(&mut self, decl: &Declaration, file: &SourceFile) -> Result<String, AnalyzerError> {
        let head = decl.head.as_deref().ok_or_else(|| {
            AnalyzerError::Internal(format!("class {} has no reconstructed head", decl.name))
        })?;

        let mut content = format!("{head}{} {{", heritage(decl, file)?);
        let unknown = TypeExpr::unknown();

        for member in &decl.members {
            match member {
                Member::Index(index) => content.push_str(&index_line(index, file)?),
                Member::Property(prop) if !prop.is_static => {
                    let ty = match &prop.ty {
                        Some(ty) => ty,
                        None => {
                            self.warnings.push(format!(
                                "Could not infer the type of property {} in class {}, typing it as unknown",
                                prop.name, decl.name
                            ));
                            &unknown
                        }
                    };
                    let resolved = resolve_type_dependencies(ty, file)?;
                    let marker = if prop.optional {
                        "?"
                    } else if prop.definite {
                        "!"
                    } else {
                        ""
                    };
                    content.push_str(&format!(
                        "\n  public {}{}{marker}: {};",
                        if prop.readonly { "readonly " } else { "" },
                        quote_if_needed(&prop.name),
                        resolved.resolved_type
                    ));
                }
                Member::Property(prop) => {
                    self.warnings.push(format!(
                        "Found static member in class {}: {}",
                        decl.name, prop.name
                    ));
                }
                Member::Method(method) => {
                    self.warnings.push(format!(
                        "Found non-property member in class {}: {}()",
                        decl.name, method.name
                    ));
                }
                Member::Other { text, .. } => {
                    self.warnings.push(format!(
                        "Found non-property member in class {}: {text}",
                        decl.name
                    ));
                }
            }
        }

        content.push_str("\n}");
        Ok(content)
    }

    /// Interface rebuilt from its resolved supertypes and property
    /// signatures, so that every name matches an extracted declaration.
    fn interface_content(
        &mut self,
        decl: &Declaration,
        file: &SourceFile,
    ) -> Result<String, AnalyzerError> {
        let mut content = format!(
            "export interface {}{}{} {{",
            decl.name,
            type_params_text(decl),
            heritage(decl, file)?
        );

        for member in &decl.members {
            match member {
                Member::Index(index) => content.push_str(&index_line(index, file)?),
                Member::Property(prop) => {
                    let resolved = match &prop.ty {
                        Some(ty) => resolve_type_dependencies(ty, file)?.resolved_type,
                        None => "any".to_string(),
                    };
                    content.push_str(&format!(
                        "\n  {}{}{}: {resolved};",
                        if prop.readonly { "readonly " } else { "" },
                        quote_if_needed(&prop.name),
                        if prop.optional { "?" } else { "" },
                    ));
                }
                Member::Method(method) => {
                    self.warnings.push(format!(
                        "Found non-property member in interface {}: {}()",
                        decl.name, method.name
                    ));
                }
                Member::Other { text, .. } => {
                    self.warnings.push(format!(
                        "Found non-property member in interface {}: {text}",
                        decl.name
                    ));
                }
            }
        }

        content.push_str("\n}");
        Ok(content)
    }
}

fn exported_text(decl: &Declaration) -> String {
    if decl.exported {
        decl.text.clone()
    } else {
        format!("export {}", decl.text)
    }
}

fn location_of(extracted: &ExtractedType) -> TypeLocationWithExt {
    TypeLocationWithExt {
        typename: extracted.typename.clone(),
        relative_path_no_ext: extracted.relative_path_no_ext.clone(),
        relative_path: extracted.relative_path.clone(),
    }
}

/// `<T, U extends X>`, or nothing without type parameters.
fn type_params_text(decl: &Declaration) -> String {
    if decl.type_params.is_empty() {
        return String::new();
    }
    let params: Vec<&str> = decl.type_params.iter().map(|tp| tp.text.as_str()).collect();
    format!("<{}>", params.join(", "))
}

/// ` extends A, B<C>` with resolved names, or nothing.
fn heritage(decl: &Declaration, file: &SourceFile) -> Result<String, AnalyzerError> {
    if decl.supertypes.is_empty() {
        return Ok(String::new());
    }
    let supertypes = decl
        .supertypes
        .iter()
        .map(|ty| resolve_type_dependencies(ty, file).map(|deps| deps.resolved_type))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!(" extends {}", supertypes.join(", ")))
}

fn index_line(index: &IndexSignature, file: &SourceFile) -> Result<String, AnalyzerError> {
    let value = resolve_type_dependencies(&index.value, file)?;
    Ok(format!(
        "\n  {}[{}: {}]: {};",
        if index.readonly { "readonly " } else { "" },
        index.key_name,
        index.key_type,
        value.resolved_type
    ))
}

/// Deduplicated locations of every type a list of resolved types depends on.
///
/// Local types are located in the file the resolved type was written in.
pub fn locate_types_file<'r>(
    resolved_types: impl IntoIterator<Item = &'r ResolvedTypeDeps>,
) -> Vec<TypeLocation> {
    let mut out: Vec<TypeLocation> = Vec::new();

    let mut push = |typename: &str, relative_path_no_ext: &str| {
        if !out
            .iter()
            .any(|loc| loc.typename == typename && loc.relative_path_no_ext == relative_path_no_ext)
        {
            out.push(TypeLocation {
                typename: typename.to_string(),
                relative_path_no_ext: relative_path_no_ext.to_string(),
            });
        }
    };

    for resolved in resolved_types {
        for (file, types) in &resolved.dependencies {
            for typename in types {
                push(typename, file);
            }
        }

        let own_file = strip_module_extension(&resolved.relative_file_path);
        for typename in &resolved.local_types {
            push(typename, own_file);
        }
    }

    out
}

/// Every resolved type referenced by the SDK methods: return types, then
/// route parameters, query parameters and body.
pub fn flatten_sdk_resolved_types(modules: &SdkModules) -> Vec<&ResolvedTypeDeps> {
    let mut flattened = Vec::new();

    for method in modules
        .values()
        .flat_map(|controllers| controllers.values())
        .flat_map(|controller| controller.methods.values())
    {
        flattened.push(&method.return_type);

        if let Some(parameters) = &method.params.parameters {
            flattened.extend(parameters.values());
        }

        if let Some(query) = &method.params.query {
            flattened.extend(query.values());
        }

        match &method.params.body {
            Some(SdkMethodBody::Full { ty }) => flattened.push(ty),
            Some(SdkMethodBody::Fields { fields }) => flattened.extend(fields.values()),
            None => {}
        }
    }

    flattened
}

/// Mutable counterpart of [`flatten_sdk_resolved_types`], in the same order.
pub fn flatten_sdk_resolved_types_mut(modules: &mut SdkModules) -> Vec<&mut ResolvedTypeDeps> {
    let mut flattened = Vec::new();

    for method in modules
        .values_mut()
        .flat_map(IndexMap::values_mut)
        .flat_map(|controller| controller.methods.values_mut())
    {
        let SdkMethod {
            return_type,
            params,
            ..
        } = method;
        let SdkMethodParams {
            parameters,
            query,
            body,
        } = params;

        flattened.push(return_type);
        if let Some(parameters) = parameters {
            flattened.extend(parameters.values_mut());
        }
        if let Some(query) = query {
            flattened.extend(query.values_mut());
        }
        match body {
            Some(SdkMethodBody::Full { ty }) => flattened.push(ty),
            Some(SdkMethodBody::Fields { fields }) => flattened.extend(fields.values_mut()),
            None => {}
        }
    }

    flattened
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::testing::write_project;

    fn loc(typename: &str, path: &str) -> TypeLocation {
        TypeLocation {
            typename: typename.to_string(),
            relative_path_no_ext: path.to_string(),
        }
    }

    #[test]
    fn same_type_is_extracted_once() {
        let dir = write_project(&[("dto/tag.ts", "export interface Tag { label: string }\n")]);
        let project = SourceProject::open(dir.path()).unwrap();
        let mut extractor = TypesExtractor::new(&project, &[]);

        let first = extractor.extract(&loc("Tag", "dto/tag")).unwrap();
        let second = extractor.extract(&loc("Tag", "dto/tag")).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.relative_path, "dto/tag.ts");
        assert_eq!(first.content, "export interface Tag {\n  label: string;\n}");
    }

    #[test]
    fn directory_imports_resolve_to_index_files() {
        let dir = write_project(&[
            ("a.ts", "import { B } from './dto';\nexport interface A { b: B }\n"),
            ("dto/index.ts", "export interface B { id: number }\n"),
        ]);
        let project = SourceProject::open(dir.path()).unwrap();
        let mut extractor = TypesExtractor::new(&project, &[]);

        let a = extractor.extract(&loc("A", "a")).unwrap();
        assert_eq!(
            a.dependencies,
            vec![TypeLocationWithExt {
                typename: "B".to_string(),
                relative_path_no_ext: "dto/index".to_string(),
                relative_path: "dto/index.ts".to_string(),
            }]
        );

        let through_directory = extractor.find_extracted_without_ext(&loc("B", "dto")).unwrap();
        let direct = extractor.find_extracted_without_ext(&loc("B", "dto/index")).unwrap();
        assert!(Rc::ptr_eq(through_directory, direct));
    }

    #[test]
    fn re_exports_are_followed_to_the_declaring_file() {
        let dir = write_project(&[
            ("barrel.ts", "export * from './nested';\nexport { B } from './b';\n"),
            ("nested.ts", "export * from './barrel';\nexport * from './c';\n"),
            ("b.ts", "import { C } from './barrel';\nexport interface B { c: C }\n"),
            ("c.ts", "export type C = 'c';\n"),
        ]);
        let project = SourceProject::open(dir.path()).unwrap();
        let mut extractor = TypesExtractor::new(&project, &[]);

        let b = extractor.extract(&loc("B", "barrel")).unwrap();
        assert_eq!(b.relative_path, "b.ts");
        assert_eq!(b.dependencies[0].relative_path, "c.ts");
        assert_eq!(b.dependencies[0].relative_path_no_ext, "c");

        let err = extractor.extract(&loc("Missing", "barrel")).unwrap_err();
        assert!(
            matches!(&err, AnalyzerError::TypeNotFound { typename, path } if typename == "Missing" && path == "barrel.ts")
        );

        let mut deps = ResolvedTypeDeps {
            raw_type: String::new(),
            resolved_type: "B & C".to_string(),
            relative_file_path: "x.controller.ts".to_string(),
            dependencies: IndexMap::from([(
                "barrel".to_string(),
                vec!["B".to_string(), "C".to_string()],
            )]),
            local_types: Vec::new(),
        };
        extractor.relocate(&mut deps);
        assert_eq!(
            deps.dependencies,
            IndexMap::from([
                ("b".to_string(), vec!["B".to_string()]),
                ("c".to_string(), vec!["C".to_string()]),
            ])
        );

        let (content, _) = extractor.into_content();
        assert!(!content.contains_key("barrel.ts"));
        assert_eq!(content["c.ts"]["C"].content, "export type C = 'c';");
    }

    #[test]
    fn renamed_re_exports_are_rejected() {
        let dir = write_project(&[
            ("index.ts", "export { Inner as Outer } from './inner';\n"),
            ("inner.ts", "export interface Inner {}\n"),
        ]);
        let project = SourceProject::open(dir.path()).unwrap();
        let mut extractor = TypesExtractor::new(&project, &[]);

        let err = extractor.extract(&loc("Outer", "index")).unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::RenamedReExport { ref original, .. } if original == "Inner"
        ));
    }

    #[test]
    fn declarations_are_rebuilt_with_resolved_names() {
        let dir = write_project(&[
            (
                "a.ts",
                r#"import { Category as Cat } from './c';
import * as ns from './tags';
interface Named { name: string }
export interface A<T = string> extends Named {
  readonly c: Cat;
  d?: import('./c').Category;
  'tag-list': ns.Tag[];
  value: T;
  describe(): string;
}
export type Pair = [Cat, ns.Tag];
export class Holder {
  readonly tag: ns.Tag;
}
"#,
            ),
            ("c.ts", "export enum Category { A, B }\n"),
            ("tags.ts", "export interface Tag { label: string }\n"),
        ]);
        let project = SourceProject::open(dir.path()).unwrap();
        let mut extractor = TypesExtractor::new(&project, &[]);

        let a = extractor.extract(&loc("A", "a")).unwrap();
        assert_eq!(
            a.content,
            "export interface A<T = string> extends Named {\n  readonly c: Category;\n  d?: Category;\n  \"tag-list\": Array<Tag>;\n  value: T;\n}"
        );
        let deps: Vec<&str> = a.dependencies.iter().map(|d| d.typename.as_str()).collect();
        assert_eq!(deps, vec!["Named", "Category", "Tag"]);
        assert_eq!(
            extractor
                .warnings()
                .count_matching("non-property member in interface A"),
            1
        );

        let pair = extractor.extract(&loc("Pair", "a")).unwrap();
        assert_eq!(pair.content, "export type Pair = [Category, Tag];");

        let holder = extractor.extract(&loc("Holder", "a")).unwrap();
        assert_eq!(
            holder.content,
            "export class Holder {\n  public readonly tag: Tag;\n}"
        );
    }

    #[test]
    fn cycles_are_broken_by_path_only_resolution() {
        let dir = write_project(&[
            ("a.ts", "import { B } from './b';\nexport interface A { b?: B }\n"),
            ("b.ts", "import { A } from './a';\nexport interface B { a: A[] }\n"),
        ]);
        let project = SourceProject::open(dir.path()).unwrap();
        let mut extractor = TypesExtractor::new(&project, &[]);

        let a = extractor.extract(&loc("A", "a")).unwrap();
        let b = extractor.extract(&loc("B", "b")).unwrap();

        assert_eq!(a.dependencies.len(), 1);
        assert_eq!(a.dependencies[0].typename, "B");
        assert_eq!(a.dependencies[0].relative_path, "b.ts");
        assert_eq!(b.dependencies[0].typename, "A");
        assert_eq!(b.dependencies[0].relative_path, "a.ts");

        let (content, _) = extractor.into_content();
        assert_eq!(content.len(), 2);
        assert_eq!(content["a.ts"].len(), 1);
        assert_eq!(content["b.ts"].len(), 1);
    }

    #[test]
    fn classes_keep_only_data_members() {
        let dir = write_project(&[(
            "user.entity.ts",
            r#"import { Role } from './role';
@Entity()
export class User<T> extends Base {
  [key: string]: unknown;
  @PrimaryKey() id!: number;
  nickname?: string;
  role: Role;
  payload: T;
  static table = 'users';
  constructor() { super(); }
  greet(): string { return `hi ${this.nickname}`; }
}
class Base { createdAt: Date; }
"#,
        ), ("role.ts", "export enum Role { Admin, User }\n")]);
        let project = SourceProject::open(dir.path()).unwrap();
        let mut extractor = TypesExtractor::new(&project, &[]);

        let user = extractor.extract(&loc("User", "user.entity")).unwrap();
        assert_eq!(
            user.content,
            "export class User<T> extends Base {\n  [key: string]: unknown;\n  public id!: number;\n  public nickname?: string;\n  public role: Role;\n  public payload: T;\n}"
        );
        assert!(!user.content.contains("greet"));
        assert_eq!(user.type_params, vec!["T"]);

        let deps: Vec<&str> = user.dependencies.iter().map(|d| d.typename.as_str()).collect();
        assert_eq!(deps, vec!["Base", "Role"]);

        let base = extractor
            .find_extracted_without_ext(&loc("Base", "user.entity"))
            .unwrap();
        assert_eq!(base.content, "export class Base {\n  public createdAt: Date;\n}");

        let warnings = extractor.warnings();
        assert_eq!(warnings.count_matching("non-property member in class User"), 2);
        assert_eq!(warnings.count_matching("static member in class User"), 1);
    }

    #[test]
    fn magic_types_replace_library_types() {
        let dir = write_project(&[(
            "post.ts",
            "import { Collection } from '@mikro-orm/core';\nimport { Tag } from 'tags';\nexport interface Post { tags: Collection<Tag> }\n",
        )]);
        let project = SourceProject::open(dir.path()).unwrap();
        let custom = MagicType {
            source_file_suffix: "tags.d.ts".to_string(),
            type_name: "Tag".to_string(),
            placeholder_content: "export type Tag = string;".to_string(),
        };
        let mut extractor = TypesExtractor::new(&project, &[custom]);

        let post = extractor.extract(&loc("Post", "post")).unwrap();
        let deps: Vec<&str> = post.dependencies.iter().map(|d| d.relative_path.as_str()).collect();
        assert_eq!(deps, vec!["node_modules/@mikro-orm/core.ts", "node_modules/tags.ts"]);

        let collection = extractor
            .find_extracted_without_ext(&loc("Collection", "node_modules/@mikro-orm/core"))
            .unwrap();
        assert!(collection.content.starts_with(MAGIC_PLACEHOLDER_HEADER));
        assert!(collection.content.ends_with("= Array<T>;"));
    }

    #[test]
    fn dependency_failures_carry_the_chain() {
        let dir = write_project(&[
            ("a.ts", "import { B } from './b';\nexport type A = { b: B };\n"),
            ("b.ts", "import { C } from './c';\nexport interface B { c: C }\n"),
            ("c.ts", "export interface NotC {}\n"),
        ]);
        let project = SourceProject::open(dir.path()).unwrap();
        let mut extractor = TypesExtractor::new(&project, &[]);

        let err = extractor.extract(&loc("A", "a")).unwrap_err();
        let text = err.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "> Failed to extract type A due to an error in dependency type B"
        );
        assert!(lines[2].starts_with("  > Failed to extract type B"));
        assert_eq!(lines.last().copied(), Some("    Type C was not found in file c.ts"));
        assert!(extractor.find_extracted_without_ext(&loc("A", "a")).is_none());
    }

    #[test]
    fn missing_files_and_shadowed_extensions() {
        let dir = write_project(&[
            ("shared.ts", "export interface Shared { id: number }\n"),
            ("shared.d.ts", "export interface Shared { id: number }\n"),
        ]);
        let project = SourceProject::open(dir.path()).unwrap();
        let mut extractor = TypesExtractor::new(&project, &[]);

        let err = extractor.extract(&loc("Gone", "gone")).unwrap_err();
        assert!(matches!(err, AnalyzerError::FileNotFound { .. }));

        let shared = extractor.extract(&loc("Shared", "shared")).unwrap();
        assert_eq!(shared.relative_path, "shared.ts");
        assert_eq!(extractor.warnings().count_matching("ignoring shared.d.ts"), 1);
    }

    #[test]
    fn type_path_guard_pops_on_drop() {
        let mut path = TypesPath::default();
        {
            let mut guard = path.enter("A").unwrap();
            assert!(guard.enter("A").is_err());
            let inner = guard.enter("B").unwrap();
            assert_eq!(inner.depth(), 2);
        }
        assert_eq!(path.depth(), 0);
    }

    #[test]
    fn locations_are_deduplicated() {
        let dep = ResolvedTypeDeps {
            raw_type: String::new(),
            resolved_type: String::new(),
            relative_file_path: "a/b.controller.ts".to_string(),
            dependencies: IndexMap::from([("a/dto".to_string(), vec!["X".to_string(), "Y".to_string()])]),
            local_types: vec!["Local".to_string()],
        };
        let locations = locate_types_file([&dep, &dep]);
        assert_eq!(
            locations,
            vec![loc("X", "a/dto"), loc("Y", "a/dto"), loc("Local", "a/b.controller")]
        );
    }
}
