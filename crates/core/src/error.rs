//! Error type shared by every analysis stage.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of an analysis run.
///
/// Context variants (`In*`) wrap the error of a nested stage so the final
/// message carries the full chain, one indentation level per stage.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// A type expression uses a construct the resolver does not model.
    #[error("Unsupported type construct ({construct}) in file {file}: {text}")]
    UnsupportedType {
        /// Kind of construct, e.g. "conditional type".
        construct: String,
        /// Exact source text of the type.
        text: String,
        /// Root-relative file holding the type.
        file: String,
    },

    /// No file exists for a dependency, whatever the extension.
    #[error("File {path} was not found (was expected to contain dependency type {typename})")]
    FileNotFound {
        /// Root-relative path without extension.
        path: String,
        /// Type that was being looked for.
        typename: String,
    },

    /// The file exists but does not declare the type.
    #[error("Type {typename} was not found in file {path}")]
    TypeNotFound {
        /// Type that was being looked for.
        typename: String,
        /// Root-relative file path.
        path: String,
    },

    /// A type is only reachable through a renaming re-export.
    #[error(
        "Type {typename} is re-exported from {original} in file {path}, renamed re-exports are not supported"
    )]
    RenamedReExport {
        /// Name the type was imported under.
        typename: String,
        /// Name of the type in the re-exported module.
        original: String,
        /// Root-relative file holding the re-export.
        path: String,
    },

    /// No `*.module.ts` file above a controller.
    #[error("No module file was found for controller at path: {controller}")]
    ModuleFileNotFound {
        /// Root-relative controller path.
        controller: String,
    },

    /// The module file has no usable `@Module` class.
    #[error("Invalid module file {path}: {reason}")]
    InvalidModule {
        /// Root-relative module file path.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two module files declare the same module name.
    #[error(
        "Two modules were declared with the same name {name}:\n- One in {first}\n- One in {second}"
    )]
    ModuleNameCollision {
        /// Colliding module name.
        name: String,
        /// Module file registered first.
        first: String,
        /// Module file registered second.
        second: String,
    },

    /// Two controllers of one module share the same camel-cased class name.
    #[error(
        "Two controllers named {name} were found in module {module}:\n- One in {first}\n- One in {second}"
    )]
    ControllerNameCollision {
        /// Colliding controller name.
        name: String,
        /// Module holding both controllers.
        module: String,
        /// Controller file registered first.
        first: String,
        /// Controller file registered second.
        second: String,
    },

    /// Two files at the same logical path differ only by extension.
    #[error(
        "Found two conflicting files at same path but with different extensions:\n> {first}\n> {second}"
    )]
    ExtensionCollision {
        /// File already extracted.
        first: String,
        /// File being extracted.
        second: String,
    },

    /// A generated object key would shadow a native object property.
    #[error("Detected {kind} whose name {name} collides with a JavaScript's native object property")]
    ReservedName {
        /// What carries the name ("module", "controller", "parameter", ...).
        kind: &'static str,
        /// The offending name.
        name: String,
    },

    /// Two `@Body()` receivers with different types on one method.
    #[error(
        "Detected two @Body() decorators: found type {previous} previously, while argument {argument} has type {current}"
    )]
    BodyConflict {
        /// Type of the first full body.
        previous: String,
        /// Name of the second argument.
        argument: String,
        /// Type of the second full body.
        current: String,
    },

    /// A `@Body` parameter on a GET method.
    #[error("GET requests cannot have a BODY!")]
    BodyOnGet,

    /// The same name declared twice for one method.
    #[error("Duplicate {kind} name {name}")]
    DuplicateName {
        /// "route parameter", "query parameter" or "body field".
        kind: &'static str,
        /// The offending name.
        name: String,
    },

    /// `@Param(name)` that is not part of the route.
    #[error("Cannot map unknown parameter {name}: route {route} does not declare it")]
    UnknownRouteParam {
        /// Parameter name from the decorator.
        name: String,
        /// Route of the method.
        route: String,
    },

    /// A URI template that cannot be parsed.
    #[error("Detected unsupported URI format:\n{message}")]
    InvalidRoute {
        /// Diagnostic with a caret under the offending segment.
        message: String,
    },

    /// A route was resolved without a value for one of its parameters.
    #[error("Missing route parameter {name}")]
    MissingRouteParam {
        /// Parameter without a value.
        name: String,
    },

    /// A decorator with unusable arguments.
    #[error("Malformed decorator @{decorator}: {reason}")]
    MalformedDecorator {
        /// Decorator name.
        decorator: String,
        /// What is wrong with it.
        reason: String,
    },

    /// More than one HTTP verb decorator on a method.
    #[error("Detected multiple HTTP decorators on a single method: {}", .decorators.join(", "))]
    MultipleHttpDecorators {
        /// The verb decorators found.
        decorators: Vec<String>,
    },

    /// More than one decorator on a method argument.
    #[error("Argument {parameter} has multiple decorators: {}", .decorators.join(", "))]
    MultipleParameterDecorators {
        /// Argument name.
        parameter: String,
        /// The decorators found.
        decorators: Vec<String>,
    },

    /// Context: failure while analyzing a method argument.
    #[error("Failed to analyze argument {parameter}:\n{}", indent(&.source.to_string()))]
    InParameter {
        /// Argument name.
        parameter: String,
        /// Underlying failure.
        source: Box<AnalyzerError>,
    },

    /// Context: failure while analyzing a controller method.
    #[error("Failed to analyze method {method}:\n{}", indent(&.source.to_string()))]
    InMethod {
        /// Method name.
        method: String,
        /// Underlying failure.
        source: Box<AnalyzerError>,
    },

    /// Context: failure while analyzing a controller file.
    #[error("Failed to analyze controller at path {path}:\n{}", indent(&.source.to_string()))]
    InController {
        /// Root-relative controller path.
        path: String,
        /// Underlying failure.
        source: Box<AnalyzerError>,
    },

    /// Context: failure while extracting a dependency of a type.
    #[error(
        "> Failed to extract type {typename} due to an error in dependency type {dependency}\nfrom file {file} :\n{}",
        indent(&.source.to_string())
    )]
    InDependency {
        /// Type being extracted.
        typename: String,
        /// Dependency that failed.
        dependency: String,
        /// File of the type being extracted.
        file: String,
        /// Underlying failure.
        source: Box<AnalyzerError>,
    },

    /// Aggregated member failures of one class or interface.
    #[error(
        "Failed to resolve the member types of {declaration} in {file}:\n{}",
        render_member_errors(.errors)
    )]
    InMembers {
        /// Class or interface name.
        declaration: String,
        /// Root-relative file path.
        file: String,
        /// One entry per failed member.
        errors: Vec<MemberError>,
    },

    /// The project root is not usable.
    #[error("Source path {} is not a directory", .0.display())]
    InvalidSourceRoot(PathBuf),

    /// Reading a source file or walking the tree failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path being read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A source file is not valid TypeScript.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// Root-relative file path.
        path: String,
        /// Parser diagnostic.
        message: String,
    },

    /// The SDK content could not be (de)serialized.
    #[error("Failed to (de)serialize SDK content: {0}")]
    Json(#[from] serde_json::Error),

    /// A broken invariant of the analyzer itself.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalyzerError {
    /// Wrap `self` with the argument it was raised for.
    pub fn in_parameter(self, parameter: &str) -> Self {
        Self::InParameter {
            parameter: parameter.to_string(),
            source: Box::new(self),
        }
    }

    /// Wrap `self` with the method it was raised for.
    pub fn in_method(self, method: &str) -> Self {
        Self::InMethod {
            method: method.to_string(),
            source: Box::new(self),
        }
    }

    /// Wrap `self` with the controller file it was raised for.
    pub fn in_controller(self, path: &str) -> Self {
        Self::InController {
            path: path.to_string(),
            source: Box::new(self),
        }
    }

    /// Whether this error (or a wrapped one) reports a broken invariant.
    pub fn is_internal(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::InParameter { source, .. }
            | Self::InMethod { source, .. }
            | Self::InController { source, .. }
            | Self::InDependency { source, .. } => source.is_internal(),
            Self::InMembers { errors, .. } => errors.iter().any(|e| e.error.is_internal()),
            _ => false,
        }
    }
}

/// Failure to resolve the type of one class or interface member.
#[derive(Debug)]
pub struct MemberError {
    /// Member name (`extends` for supertypes).
    pub member: String,
    /// 1-based line of the member.
    pub line: usize,
    /// Underlying failure.
    pub error: AnalyzerError,
}

fn render_member_errors(errors: &[MemberError]) -> String {
    errors
        .iter()
        .map(|e| {
            indent(&format!(
                "> member {} (line {}):\n{}",
                e.member,
                e.line,
                indent(&e.error.to_string())
            ))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
