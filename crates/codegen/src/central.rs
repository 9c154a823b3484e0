//! `central.ts`: the request dispatcher every generated method goes through.

use std::path::Path;

use nsdk_common::paths::{module_specifier, relative_fs_path, to_slash};
use nsdk_core::source::strip_module_extension;

use crate::emit::Emit;
use crate::error::CodegenError;
use crate::ir::{ImportItem, TsImport};

const CENTRAL_BODY: &str = r#"export type CentralMethodType = 'get' | 'post' | 'put' | 'patch' | 'delete';

export interface CentralHandlerRequest {
  readonly method: CentralMethodType;
  readonly uri: string;
  readonly query: Record<string, unknown>;
  readonly body: unknown;
}

export type CentralHandler = (request: CentralHandlerRequest) => Promise<unknown>;

export interface CentralConfig {
  readonly handler: CentralHandler;
  readonly init?: () => void;
  readonly errorsLogger?: (error: unknown, request: CentralHandlerRequest) => void;
}

export const config: CentralConfig = { ...importedCentralConfig };

config.init?.();

export async function request(
  method: CentralMethodType,
  uri: string,
  query: Record<string, unknown>,
  body: unknown,
): Promise<any> {
  const req: CentralHandlerRequest = { method, uri, query, body };

  return config.handler(req).catch((err) => {
    config.errorsLogger?.(err, req);
    return Promise.reject(err);
  });
}
"#;

/// Module specifier of the config script, as imported from `output_dir`.
pub fn config_script_specifier(output_dir: &Path, config_script: &Path) -> Result<String, CodegenError> {
    let relative = relative_fs_path(output_dir, config_script).ok_or_else(|| {
        CodegenError::UnreachableConfigScript {
            script: config_script.to_path_buf(),
            output: output_dir.to_path_buf(),
        }
    })?;
    let relative = to_slash(&relative);
    Ok(module_specifier(strip_module_extension(&relative)))
}

/// Content of `central.ts`, importing `name_to_import` (the default export
/// when unset) from `config_specifier`.
pub fn central_file(config_specifier: &str, name_to_import: Option<&str>) -> String {
    let import = TsImport {
        items: vec![ImportItem {
            name: name_to_import.unwrap_or("default").to_string(),
            alias: Some("importedCentralConfig".to_string()),
        }],
        from: config_specifier.to_string(),
        type_only: false,
    };
    format!("{}\n{CENTRAL_BODY}", import.emit())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn imports_the_default_export_by_default() {
        let content = central_file("../api/central", None);
        assert!(content.starts_with(
            "import { default as importedCentralConfig } from \"../api/central\";\n\n"
        ));
        assert!(content.contains("export async function request("));
    }

    #[test]
    fn imports_a_named_export() {
        let content = central_file("./central", Some("centralConfig"));
        assert!(content.starts_with("import { centralConfig as importedCentralConfig }"));
    }

    #[test]
    fn specifier_is_relative_to_the_output_directory() {
        let specifier =
            config_script_specifier(Path::new("/work/front/sdk"), Path::new("/work/front/src/central.ts"))
                .unwrap();
        assert_eq!(specifier, "../src/central");

        let specifier =
            config_script_specifier(Path::new("/work/sdk"), Path::new("/work/sdk/config.js")).unwrap();
        assert_eq!(specifier, "./config");
    }
}
