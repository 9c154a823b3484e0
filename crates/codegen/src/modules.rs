//! Module directories: one file per controller plus an index.

use indexmap::IndexMap;
use nsdk_common::naming::{format_property_access, quote_if_needed};
use nsdk_core::extractor::locate_types_file;
use nsdk_core::route::{resolve_route_with, unparse_route};
use nsdk_core::{ResolvedTypeDeps, SdkController, SdkMethod, SdkMethodBody, SdkMethodParams, SdkModules};

use crate::emit::Emit;
use crate::error::CodegenError;
use crate::ir::{
    ControllerModule, ImportItem, IndexModule, ObjectMethod, ReExport, TsImport, TsParam,
};
use crate::types::TYPES_DIR;

/// Generate every module file, keyed by path relative to the output root.
pub fn generate_sdk_modules(modules: &SdkModules) -> Result<IndexMap<String, String>, CodegenError> {
    let mut files = IndexMap::new();

    for (module_name, controllers) in modules {
        for (controller_name, controller) in controllers {
            let module = controller_module(module_name, controller_name, controller)?;
            files.insert(
                format!("{module_name}/{}.ts", controller.camel_class_name),
                module.emit(),
            );
        }

        let index = IndexModule {
            header: vec![format!("Module name: {module_name}")],
            exports: controllers
                .keys()
                .map(|name| ReExport {
                    name: name.clone(),
                    from: format!("./{name}"),
                })
                .collect(),
        };
        files.insert(format!("{module_name}/index.ts"), index.emit());
    }

    Ok(files)
}

fn controller_module(
    module_name: &str,
    controller_name: &str,
    controller: &SdkController,
) -> Result<ControllerModule, CodegenError> {
    let mut imports = vec![TsImport {
        items: vec![ImportItem::named("request")],
        from: "../central".to_string(),
        type_only: false,
    }];

    let used = controller.methods.values().flat_map(method_types);
    let mut by_file: IndexMap<String, Vec<ImportItem>> = IndexMap::new();
    for location in locate_types_file(used) {
        by_file
            .entry(location.relative_path_no_ext)
            .or_default()
            .push(ImportItem::named(location.typename));
    }
    imports.extend(by_file.into_iter().map(|(file, items)| TsImport {
        items,
        from: format!("../{TYPES_DIR}/{file}"),
        type_only: true,
    }));

    let methods = controller
        .methods
        .values()
        .map(object_method)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ControllerModule {
        header: vec![
            format!("Parent module: {module_name}"),
            format!(
                "Controller: \"{controller_name}\" registered as \"{}\" ({} routes)",
                controller.registration_name,
                controller.methods.len()
            ),
        ],
        imports,
        methods,
    })
}

fn method_types(method: &SdkMethod) -> Vec<&ResolvedTypeDeps> {
    let params = &method.params;
    let mut types = vec![&method.return_type];
    types.extend(params.parameters.iter().flat_map(|map| map.values()));
    types.extend(params.query.iter().flat_map(|map| map.values()));
    match &params.body {
        Some(SdkMethodBody::Full { ty }) => types.push(ty),
        Some(SdkMethodBody::Fields { fields }) => types.extend(fields.values()),
        None => {}
    }
    types
}

fn object_type<'a>(fields: impl Iterator<Item = (&'a String, &'a ResolvedTypeDeps)>) -> String {
    let fields: Vec<String> = fields
        .map(|(name, ty)| format!("{}: {}", quote_if_needed(name), ty.resolved_type))
        .collect();
    if fields.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", fields.join("; "))
    }
}

/// `(params, body, query)` parameters; trailing parameters without content get
/// a `{}` default so callers can omit them.
fn method_params(params: &SdkMethodParams) -> Vec<TsParam> {
    let route_params = params.parameters.iter().flatten();
    let query = params.query.iter().flatten();
    let has_route_params = params.parameters.as_ref().is_some_and(|p| !p.is_empty());
    let has_query = params.query.as_ref().is_some_and(|q| !q.is_empty());

    let body = match &params.body {
        Some(SdkMethodBody::Full { ty }) => Some(ty.resolved_type.clone()),
        Some(SdkMethodBody::Fields { fields }) => Some(object_type(fields.iter())),
        None => None,
    };
    let empty_default = |omissible: bool| omissible.then(|| "{}".to_string());

    vec![
        TsParam {
            name: "params".to_string(),
            ty: object_type(route_params),
            default: empty_default(!has_route_params && body.is_none() && !has_query),
        },
        TsParam {
            name: "body".to_string(),
            default: empty_default(body.is_none() && !has_query),
            ty: body.unwrap_or_else(|| "{}".to_string()),
        },
        TsParam {
            name: "query".to_string(),
            ty: object_type(query),
            default: empty_default(!has_query),
        },
    ]
}

fn object_method(method: &SdkMethod) -> Result<ObjectMethod, CodegenError> {
    let uri = resolve_route_with(&method.route, |param| {
        Some(format!("${{{}}}", format_property_access("params", param)))
    })
    .map_err(|err| CodegenError::Internal(format!("failed to resolve route: {err}")))?;

    let ret = &method.return_type.resolved_type;
    let return_type = if ret.starts_with("Promise<") {
        ret.clone()
    } else {
        format!("Promise<{ret}>")
    };

    Ok(ObjectMethod {
        comment: Some(format!(
            "{} @ {}",
            method.http_method,
            unparse_route(&method.route)
        )),
        name: method.name.clone(),
        params: method_params(&method.params),
        return_type,
        body: vec![format!(
            "return request('{}', `{uri}`, body, query);",
            method.http_method.as_str()
        )],
    })
}
