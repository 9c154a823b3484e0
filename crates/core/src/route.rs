//! URI templates of controller methods.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;

/// One part of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoutePart {
    /// Literal segment.
    Segment(String),
    /// Named parameter (`:name`).
    Param(String),
}

/// A parsed URI template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Whether the template started with `/`.
    pub is_root: bool,
    /// Parts in order.
    pub parts: Vec<RoutePart>,
}

/// Parse a URI template such as `/article/:id`.
///
/// Empty segments are dropped. Wildcard characters (`*`, `+`, `?`) are
/// rejected, as are parameter names outside `[a-zA-Z0-9_]+` and parameter
/// names used twice.
pub fn analyze_uri(uri_path: &str) -> Result<Route, AnalyzerError> {
    let mut parts = Vec::new();
    let mut offset = 0;

    let caret = |offset: usize| format!("{uri_path}\n{}^", " ".repeat(offset));

    for part in uri_path.split('/') {
        let start = offset;
        offset += part.len() + 1;

        if part.is_empty() {
            continue;
        }

        if part.contains(['*', '+', '?']) {
            return Err(AnalyzerError::InvalidRoute {
                message: format!(
                    "Generic symbols (* + ?) are not supported as they prevent from determining the right route to use. Found in URI:\n{}",
                    caret(start)
                ),
            });
        }

        if let Some(name) = part.strip_prefix(':') {
            if !is_param_name(name) {
                return Err(AnalyzerError::InvalidRoute {
                    message: format!(
                        "Invalid character detected in named parameter in URI:\n{}",
                        caret(start)
                    ),
                });
            }

            if parts
                .iter()
                .any(|p| matches!(p, RoutePart::Param(existing) if existing == name))
            {
                return Err(AnalyzerError::InvalidRoute {
                    message: format!(
                        "Named parameter {name} is declared twice in URI:\n{}",
                        caret(start)
                    ),
                });
            }

            parts.push(RoutePart::Param(name.to_string()));
        } else {
            parts.push(RoutePart::Segment(part.to_string()));
        }
    }

    Ok(Route {
        is_root: uri_path.starts_with('/'),
        parts,
    })
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Named parameters of a route, in declaration order.
pub fn params_of_route(route: &Route) -> Vec<&str> {
    route
        .parts
        .iter()
        .filter_map(|part| match part {
            RoutePart::Param(name) => Some(name.as_str()),
            RoutePart::Segment(_) => None,
        })
        .collect()
}

/// Convert a route back to its template form.
pub fn unparse_route(route: &Route) -> String {
    debug_route(route, |name| format!(":{name}"))
}

/// Render a route, formatting parameters with `highlight`.
pub fn debug_route(route: &Route, highlight: impl Fn(&str) -> String) -> String {
    let body = route
        .parts
        .iter()
        .map(|part| match part {
            RoutePart::Segment(segment) => segment.clone(),
            RoutePart::Param(name) => highlight(name),
        })
        .collect::<Vec<_>>()
        .join("/");

    if route.is_root {
        format!("/{body}")
    } else {
        body
    }
}

/// Resolve a route with a value for each of its parameters.
pub fn resolve_route(
    route: &Route,
    params: &HashMap<String, String>,
) -> Result<String, AnalyzerError> {
    resolve_route_with(route, |name| params.get(name).cloned())
}

/// Resolve a route, asking `provider` for the value of each parameter.
pub fn resolve_route_with(
    route: &Route,
    mut provider: impl FnMut(&str) -> Option<String>,
) -> Result<String, AnalyzerError> {
    let mut uri = Vec::with_capacity(route.parts.len());

    for part in &route.parts {
        match part {
            RoutePart::Segment(segment) => uri.push(segment.clone()),
            RoutePart::Param(name) => {
                let value = provider(name)
                    .ok_or_else(|| AnalyzerError::MissingRouteParam { name: name.clone() })?;
                uri.push(value);
            }
        }
    }

    let body = uri.join("/");
    Ok(if route.is_root { format!("/{body}") } else { body })
}
