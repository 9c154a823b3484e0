//! TypeScript IR for the generated SDK files.
//!
//! Only the handful of shapes the SDK needs are modelled: imports,
//! re-exports and the default-exported object of a controller file.

/// Import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsImport {
    /// Items to import.
    pub items: Vec<ImportItem>,
    /// Module specifier.
    pub from: String,
    /// Whether this is an `import type`.
    pub type_only: bool,
}

/// Import item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportItem {
    /// Exported name.
    pub name: String,
    /// Local alias.
    pub alias: Option<String>,
}

impl ImportItem {
    /// Item without alias.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }
}

/// `export { default as name } from "./name";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReExport {
    /// Exported name.
    pub name: String,
    /// Module specifier.
    pub from: String,
}

/// Method parameter with an inline type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsParam {
    /// Name.
    pub name: String,
    /// Type text.
    pub ty: String,
    /// Default value, which makes the parameter omissible.
    pub default: Option<String>,
}

/// One method of an object literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMethod {
    /// Line comment above the method.
    pub comment: Option<String>,
    /// Name.
    pub name: String,
    /// Parameters.
    pub params: Vec<TsParam>,
    /// Return type text.
    pub return_type: String,
    /// Body lines, unindented.
    pub body: Vec<String>,
}

/// A controller file: header comments, imports and a default-exported object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerModule {
    /// `///` header lines.
    pub header: Vec<String>,
    /// Imports.
    pub imports: Vec<TsImport>,
    /// Methods of the exported object.
    pub methods: Vec<ObjectMethod>,
}

/// A module index file re-exporting its controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexModule {
    /// `///` header lines.
    pub header: Vec<String>,
    /// Re-exports.
    pub exports: Vec<ReExport>,
}
