//! Discovery of controllers and the modules they belong to.

use std::collections::HashMap;
use std::fs;

use indexmap::IndexMap;
use nsdk_common::naming::{is_reserved_object_key, lowercase_first};
use nsdk_common::paths::{join_slash, parent_dir};
use tracing::debug;

use crate::controller::{SdkController, analyze_controller};
use crate::diagnostics::Warnings;
use crate::error::AnalyzerError;
use crate::source::{DeclarationKind, SourceProject};

/// Module name -> controller camel class name -> controller.
pub type SdkModules = IndexMap<String, IndexMap<String, SdkController>>;

const CONTROLLER_SUFFIX: &str = ".controller.ts";
const MODULE_SUFFIX: &str = ".module.ts";

/// Whether a root-relative path names a controller file.
pub fn is_controller_file(relative_path: &str) -> bool {
    relative_path.ends_with(CONTROLLER_SUFFIX)
}

/// Analyze every controller file and group the controllers per module.
pub fn analyze_controllers(
    project: &SourceProject,
    controllers: &[String],
    warnings: &mut Warnings,
) -> Result<SdkModules, AnalyzerError> {
    let mut collected = SdkModules::new();
    let mut discovery = ModuleDiscovery::new(project);

    debug!("Analyzing {} controllers...", controllers.len());

    for (i, controller_path) in controllers.iter().enumerate() {
        debug!(
            "===== Analyzing controller {}/{}: {controller_path} =====",
            i + 1,
            controllers.len()
        );

        let module_name = discovery.module_of(controller_path)?;

        let Some(controller) = analyze_controller(project, controller_path, warnings)
            .map_err(|err| err.in_controller(controller_path))?
        else {
            continue;
        };

        if is_reserved_object_key(&controller.registration_name) {
            return Err(AnalyzerError::ReservedName {
                kind: "controller",
                name: controller.registration_name,
            });
        }

        let module = collected.entry(module_name.clone()).or_default();
        if let Some(existing) = module.get(&controller.camel_class_name) {
            return Err(AnalyzerError::ControllerNameCollision {
                name: controller.camel_class_name,
                module: module_name,
                first: existing.path.clone(),
                second: controller.path,
            });
        }
        module.insert(controller.camel_class_name.clone(), controller);
    }

    Ok(collected)
}

/// Nearest-module lookup with a per-directory cache.
#[derive(Debug)]
struct ModuleDiscovery<'a> {
    project: &'a SourceProject,
    /// Directory -> module name.
    by_dir: HashMap<String, String>,
    /// Module name -> module file.
    declared: HashMap<String, String>,
}

impl<'a> ModuleDiscovery<'a> {
    fn new(project: &'a SourceProject) -> Self {
        Self {
            project,
            by_dir: HashMap::new(),
            declared: HashMap::new(),
        }
    }

    fn module_of(&mut self, controller_path: &str) -> Result<String, AnalyzerError> {
        let dir = parent_dir(controller_path);

        if let Some(name) = self.by_dir.get(dir) {
            return Ok(name.clone());
        }

        let module_path =
            self.find_module_file(dir)?
                .ok_or_else(|| AnalyzerError::ModuleFileNotFound {
                    controller: controller_path.to_string(),
                })?;

        let name = self.module_name(&module_path)?;
        debug!("Discovered module: {name}");

        if let Some(existing) = self.declared.get(&name)
            && *existing != module_path
        {
            return Err(AnalyzerError::ModuleNameCollision {
                name,
                first: existing.clone(),
                second: module_path,
            });
        }

        if is_reserved_object_key(&name) {
            return Err(AnalyzerError::ReservedName { kind: "module", name });
        }

        self.declared.insert(name.clone(), module_path);
        self.by_dir.insert(dir.to_string(), name.clone());
        Ok(name)
    }

    /// First `*.module.ts` file (by name) in `dir` or its ancestors, up to the
    /// project root.
    fn find_module_file(&self, dir: &str) -> Result<Option<String>, AnalyzerError> {
        let mut current = dir;

        loop {
            let absolute = self.project.root().join(current);
            let entries = fs::read_dir(&absolute).map_err(|source| AnalyzerError::Io {
                path: absolute.display().to_string(),
                source,
            })?;

            let mut candidates: Vec<String> = entries
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
                .filter_map(|entry| entry.file_name().into_string().ok())
                .filter(|name| name.ends_with(MODULE_SUFFIX))
                .collect();
            candidates.sort();

            if let Some(name) = candidates.into_iter().next() {
                return Ok(Some(join_slash(current, &name)));
            }

            if current.is_empty() {
                return Ok(None);
            }
            current = parent_dir(current);
        }
    }

    fn module_name(&self, module_path: &str) -> Result<String, AnalyzerError> {
        let invalid = |reason: String| AnalyzerError::InvalidModule {
            path: module_path.to_string(),
            reason,
        };

        let file = self.project.file(module_path)?;
        let class = file
            .declarations()
            .iter()
            .find(|decl| decl.kind == DeclarationKind::Class && !decl.decorators.is_empty())
            .ok_or_else(|| invalid("no decorated class declaration found".to_string()))?;

        match class.decorators.as_slice() {
            [dec] if dec.name == "Module" => Ok(lowercase_first(&class.name)),
            [dec] => Err(invalid(format!(
                "the decorator on module class {} was expected to be a @Module, found a @{} instead",
                class.name, dec.name
            ))),
            _ => Err(invalid(format!(
                "found multiple decorators on module class {}",
                class.name
            ))),
        }
    }
}
