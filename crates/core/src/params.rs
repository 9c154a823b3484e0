//! Route, query and body parameters of a controller method.

use indexmap::IndexMap;
use indexmap::map::Entry;
use nsdk_common::naming::is_reserved_object_key;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decorator::expect_single_str_lit;
use crate::diagnostics::Warnings;
use crate::error::AnalyzerError;
use crate::methods::HttpMethod;
use crate::route::{Route, params_of_route, unparse_route};
use crate::source::{Parameter, SourceFile, TypeExpr};
use crate::typedeps::{ResolvedTypeDeps, resolve_type_dependencies};

/// Body of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SdkMethodBody {
    /// `@Body() body: T`: the whole body has type `T`.
    Full {
        /// Type of the body.
        #[serde(rename = "type")]
        ty: ResolvedTypeDeps,
    },
    /// `@Body('name') name: T` for each field.
    Fields {
        /// Field name -> type.
        fields: IndexMap<String, ResolvedTypeDeps>,
    },
}

/// Parameters of a method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkMethodParams {
    /// Route parameters.
    pub parameters: Option<IndexMap<String, ResolvedTypeDeps>>,
    /// Query parameters.
    pub query: Option<IndexMap<String, ResolvedTypeDeps>>,
    /// Body.
    pub body: Option<SdkMethodBody>,
}

/// Analyze the decorated arguments of a method.
pub fn analyze_params(
    http_method: HttpMethod,
    route: &Route,
    args: &[Parameter],
    file: &SourceFile,
    warnings: &mut Warnings,
) -> Result<SdkMethodParams, AnalyzerError> {
    let mut collected = SdkMethodParams::default();
    let route_params = params_of_route(route);

    for arg in args {
        debug!("├───── Detected argument: {}", arg.name);
        analyze_param(
            http_method,
            route,
            &route_params,
            arg,
            file,
            warnings,
            &mut collected,
        )
        .map_err(|err| err.in_parameter(&arg.name))?;
    }

    Ok(collected)
}

fn analyze_param(
    http_method: HttpMethod,
    route: &Route,
    route_params: &[&str],
    arg: &Parameter,
    file: &SourceFile,
    warnings: &mut Warnings,
    collected: &mut SdkMethodParams,
) -> Result<(), AnalyzerError> {
    let dec = match arg.decorators.as_slice() {
        [] => {
            debug!("├───── Skipping this argument as it does not have a decorator");
            return Ok(());
        }
        [dec] => dec,
        decs => {
            return Err(AnalyzerError::MultipleParameterDecorators {
                parameter: arg.name.clone(),
                decorators: decs.iter().map(|d| d.name.clone()).collect(),
            });
        }
    };

    match dec.name.as_str() {
        "Param" => {
            let Some(name) = expect_single_str_lit(dec)? else {
                warnings.push(format!(
                    "Skipping argument {} as it is a generic parameters receiver, which is currently not supported",
                    arg.name
                ));
                return Ok(());
            };

            if !route_params.contains(&name) {
                return Err(AnalyzerError::UnknownRouteParam {
                    name: name.to_string(),
                    route: unparse_route(route),
                });
            }

            let ty = resolve_arg_type(arg, file, warnings)?;
            debug!("├───── Mapping argument to parameter {name}: {}", ty.resolved_type);
            insert_unique(
                collected.parameters.get_or_insert_with(IndexMap::new),
                "route parameter",
                name,
                ty,
            )
        }

        "Query" => {
            let Some(name) = expect_single_str_lit(dec)? else {
                warnings.push(format!(
                    "Skipping argument {} as it is a generic query receiver",
                    arg.name
                ));
                return Ok(());
            };

            let ty = resolve_arg_type(arg, file, warnings)?;
            debug!("├───── Mapping argument to query {name}: {}", ty.resolved_type);
            insert_unique(
                collected.query.get_or_insert_with(IndexMap::new),
                "query parameter",
                name,
                ty,
            )
        }

        "Body" => {
            if http_method == HttpMethod::Get {
                return Err(AnalyzerError::BodyOnGet);
            }

            let field = expect_single_str_lit(dec)?;
            let ty = resolve_arg_type(arg, file, warnings)?;
            debug!(
                "├───── Detected BODY type: {} ({} dependencies)",
                ty.resolved_type,
                ty.dependencies.len()
            );

            match (field, &mut collected.body) {
                (None, Some(SdkMethodBody::Full { ty: previous })) => {
                    if previous.resolved_type != ty.resolved_type {
                        return Err(AnalyzerError::BodyConflict {
                            previous: previous.resolved_type.clone(),
                            argument: arg.name.clone(),
                            current: ty.resolved_type,
                        });
                    }
                    warnings.push(format!(
                        "Detected a second full @Body() decorator on argument {} with the same type {}; keeping the first one",
                        arg.name, ty.resolved_type
                    ));
                    Ok(())
                }
                (None, body) => {
                    if matches!(body, Some(SdkMethodBody::Fields { .. })) {
                        warnings.push(
                            "Detected full @Body() decorator after a single parameter. This is considered a bad practice, avoid it if you can!",
                        );
                    }
                    debug!("├───── Mapping argument to full request's body");
                    *body = Some(SdkMethodBody::Full { ty });
                    Ok(())
                }
                (Some(_), Some(SdkMethodBody::Full { .. })) => {
                    warnings.push(
                        "Detected single @Body() decorator after a full parameter. This is considered a bad practice, avoid it if you can!",
                    );
                    Ok(())
                }
                (Some(name), body) => {
                    debug!("├───── Mapping argument to BODY field: {name}");
                    let fields = match body.get_or_insert_with(|| SdkMethodBody::Fields {
                        fields: IndexMap::new(),
                    }) {
                        SdkMethodBody::Fields { fields } => fields,
                        SdkMethodBody::Full { .. } => {
                            return Err(AnalyzerError::Internal(
                                "full body found while mapping a body field".to_string(),
                            ));
                        }
                    };
                    insert_unique(fields, "body field", name, ty)
                }
            }
        }

        other => {
            debug!("├───── Skipping argument with unhandled decorator @{other}");
            Ok(())
        }
    }
}

fn resolve_arg_type(
    arg: &Parameter,
    file: &SourceFile,
    warnings: &mut Warnings,
) -> Result<ResolvedTypeDeps, AnalyzerError> {
    let unknown;
    let ty = match &arg.ty {
        Some(ty) => ty,
        None => {
            warnings.push(format!(
                "Argument {} has no type annotation, typing it as unknown",
                arg.name
            ));
            unknown = TypeExpr::unknown();
            &unknown
        }
    };
    resolve_type_dependencies(ty, file)
}

fn insert_unique(
    map: &mut IndexMap<String, ResolvedTypeDeps>,
    kind: &'static str,
    name: &str,
    ty: ResolvedTypeDeps,
) -> Result<(), AnalyzerError> {
    if is_reserved_object_key(name) {
        return Err(AnalyzerError::ReservedName {
            kind,
            name: name.to_string(),
        });
    }

    match map.entry(name.to_string()) {
        Entry::Occupied(_) => Err(AnalyzerError::DuplicateName {
            kind,
            name: name.to_string(),
        }),
        Entry::Vacant(slot) => {
            slot.insert(ty);
            Ok(())
        }
    }
}
