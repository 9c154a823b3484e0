//! A single controller file.

use indexmap::IndexMap;
use nsdk_common::naming::camelcase;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decorator::expect_single_str_lit;
use crate::diagnostics::Warnings;
use crate::error::AnalyzerError;
use crate::methods::{SdkMethod, analyze_method};
use crate::source::SourceProject;

/// SDK view of a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkController {
    /// Root-relative path of the controller file.
    pub path: String,
    /// Class name, camel cased.
    pub camel_class_name: String,
    /// Name the controller is registered under.
    pub registration_name: String,
    /// Methods keyed by name, in declaration order.
    pub methods: IndexMap<String, SdkMethod>,
}

/// Analyze the controller declared in `relative_path`.
///
/// Returns `None` when the file has no class or the class is not decorated
/// with `@Controller`.
pub fn analyze_controller(
    project: &SourceProject,
    relative_path: &str,
    warnings: &mut Warnings,
) -> Result<Option<SdkController>, AnalyzerError> {
    debug!("Analyzing: {relative_path}");

    let file = project.file(relative_path)?;

    let Some(class) = file.first_class() else {
        warnings.push(format!("No controller found in file {relative_path}"));
        return Ok(None);
    };

    debug!("Found class declaration: {}", class.name);

    let decorator = match class.decorators_named("Controller").collect::<Vec<_>>().as_slice() {
        [] => {
            warnings.push(format!(
                "Skipping controller {} as it does not have a @Controller() decorator",
                class.name
            ));
            return Ok(None);
        }
        [single] => *single,
        many => {
            return Err(AnalyzerError::MalformedDecorator {
                decorator: "Controller".to_string(),
                reason: format!("found {} @Controller() decorators on class {}", many.len(), class.name),
            });
        }
    };

    let camel_class_name = camelcase(&class.name);

    let (registration_name, prefix) = match expect_single_str_lit(decorator)? {
        Some(name) => {
            let name = camelcase(name);
            debug!(
                "Registering controller {} as {name} (as specified in @Controller())",
                class.name
            );
            (name.clone(), Some(name))
        }
        None => {
            debug!(
                "@Controller() was called without argument, registering controller under name {camel_class_name}"
            );
            (camel_class_name.clone(), None)
        }
    };

    let mut methods = IndexMap::new();
    for method in class.methods() {
        if let Some(sdk_method) = analyze_method(method, prefix.as_deref(), &file, warnings)? {
            methods.insert(sdk_method.name.clone(), sdk_method);
        }
    }

    Ok(Some(SdkController {
        path: relative_path.to_string(),
        camel_class_name,
        registration_name,
        methods,
    }))
}
