//! Controller methods exposed over HTTP.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decorator::expect_single_str_lit;
use crate::diagnostics::Warnings;
use crate::error::AnalyzerError;
use crate::params::{SdkMethodParams, analyze_params};
use crate::route::{Route, analyze_uri};
use crate::source::{Method, SourceFile, TypeExpr};
use crate::typedeps::{ResolvedTypeDeps, resolve_type_dependencies};

/// HTTP verb of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// `@Get`
    Get,
    /// `@Post`
    Post,
    /// `@Put`
    Put,
    /// `@Patch`
    Patch,
    /// `@Delete`
    Delete,
}

impl HttpMethod {
    /// Every verb with its decorator name.
    pub const ALL: [(&'static str, Self); 5] = [
        ("Get", Self::Get),
        ("Post", Self::Post),
        ("Put", Self::Put),
        ("Patch", Self::Patch),
        ("Delete", Self::Delete),
    ];

    /// Verb for a decorator name.
    pub fn from_decorator(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(decorator, _)| *decorator == name)
            .map(|(_, method)| *method)
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// One SDK entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkMethod {
    /// Method name.
    pub name: String,
    /// HTTP verb.
    pub http_method: HttpMethod,
    /// Return type.
    pub return_type: ResolvedTypeDeps,
    /// Parsed route.
    pub route: Route,
    /// Full URI template.
    pub uri_path: String,
    /// Parameters.
    pub params: SdkMethodParams,
}

/// Analyze a controller method.
///
/// Returns `None` for methods without an HTTP verb decorator.
pub fn analyze_method(
    method: &Method,
    controller_prefix: Option<&str>,
    file: &SourceFile,
    warnings: &mut Warnings,
) -> Result<Option<SdkMethod>, AnalyzerError> {
    analyze_method_inner(method, controller_prefix, file, warnings)
        .map_err(|err| err.in_method(&method.name))
}

fn analyze_method_inner(
    method: &Method,
    controller_prefix: Option<&str>,
    file: &SourceFile,
    warnings: &mut Warnings,
) -> Result<Option<SdkMethod>, AnalyzerError> {
    let verbs: Vec<_> = method
        .decorators
        .iter()
        .filter_map(|dec| HttpMethod::from_decorator(&dec.name).map(|verb| (dec, verb)))
        .collect();

    let (dec, http_method) = match verbs.as_slice() {
        [] => {
            debug!("├── Skipping method {} (no HTTP decorator)", method.name);
            return Ok(None);
        }
        [single] => *single,
        many => {
            return Err(AnalyzerError::MultipleHttpDecorators {
                decorators: many.iter().map(|(dec, _)| dec.name.clone()).collect(),
            });
        }
    };

    debug!("├── Found method {} ({http_method})", method.name);

    let suffix = expect_single_str_lit(dec)?.unwrap_or_default();
    let uri_path = match controller_prefix {
        Some(prefix) if suffix.is_empty() => format!("/{prefix}"),
        Some(prefix) => format!("/{prefix}/{suffix}"),
        None => suffix.to_string(),
    };

    let route = analyze_uri(&uri_path)?;

    let params = analyze_params(http_method, &route, &method.params, file, warnings)?;

    let unknown;
    let return_type = match &method.return_type {
        Some(ty) => ty,
        None => {
            warnings.push(format!(
                "Method {} has no return type annotation, typing it as unknown",
                method.name
            ));
            unknown = TypeExpr::unknown();
            &unknown
        }
    };
    let return_type = resolve_type_dependencies(return_type, file)?;
    debug!("├───── Return type: {}", return_type.resolved_type);

    Ok(Some(SdkMethod {
        name: method.name.clone(),
        http_method,
        return_type,
        route,
        uri_path,
        params,
    }))
}
