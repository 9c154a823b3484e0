//! TypeScript code emission via the Emit trait.

use crate::ir::{
    ControllerModule, ImportItem, IndexModule, ObjectMethod, ReExport, TsImport, TsParam,
};

/// Trait for emitting TypeScript code from IR nodes.
pub trait Emit {
    /// Convert the node to its TypeScript representation.
    fn emit(&self) -> String;
}

impl Emit for ImportItem {
    fn emit(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {alias}", self.name),
            None => self.name.clone(),
        }
    }
}

impl Emit for TsImport {
    fn emit(&self) -> String {
        let items = self.items.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
        let type_keyword = if self.type_only { "type " } else { "" };
        format!("import {type_keyword}{{ {items} }} from \"{}\";\n", self.from)
    }
}

impl Emit for ReExport {
    fn emit(&self) -> String {
        format!("export {{ default as {} }} from \"{}\";\n", self.name, self.from)
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        match &self.default {
            Some(default) => format!("{}: {} = {default}", self.name, self.ty),
            None => format!("{}: {}", self.name, self.ty),
        }
    }
}

impl ObjectMethod {
    /// Emit with the given indentation level (2 spaces per level).
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        let mut output = String::new();

        if let Some(comment) = &self.comment {
            output.push_str(&format!("{prefix}// {comment}\n"));
        }

        let params = self.params.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
        output.push_str(&format!(
            "{prefix}{}({params}): {} {{\n",
            self.name, self.return_type
        ));
        for line in &self.body {
            output.push_str(&format!("{prefix}  {line}\n"));
        }
        output.push_str(&format!("{prefix}}},\n"));
        output
    }
}

impl Emit for ObjectMethod {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

fn emit_header(header: &[String]) -> String {
    let mut output: String = header.iter().map(|line| format!("/// {line}\n")).collect();
    if !header.is_empty() {
        output.push('\n');
    }
    output
}

impl Emit for ControllerModule {
    fn emit(&self) -> String {
        let mut output = emit_header(&self.header);

        for import in &self.imports {
            output.push_str(&import.emit());
        }
        if !self.imports.is_empty() {
            output.push('\n');
        }

        output.push_str("export default {\n");
        for method in &self.methods {
            output.push('\n');
            output.push_str(&method.emit());
        }
        output.push_str("};\n");
        output
    }
}

impl Emit for IndexModule {
    fn emit(&self) -> String {
        let mut output = emit_header(&self.header);
        for export in &self.exports {
            output.push_str(&export.emit());
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_type_import() {
        let import = TsImport {
            items: vec![ImportItem::named("Article"), ImportItem::named("Category")],
            from: "../_types/article/article.dto".into(),
            type_only: true,
        };
        assert_eq!(
            import.emit(),
            "import type { Article, Category } from \"../_types/article/article.dto\";\n"
        );
    }

    #[test]
    fn test_emit_aliased_import() {
        let import = TsImport {
            items: vec![ImportItem {
                name: "default".into(),
                alias: Some("importedCentralConfig".into()),
            }],
            from: "../src/central".into(),
            type_only: false,
        };
        assert_eq!(
            import.emit(),
            "import { default as importedCentralConfig } from \"../src/central\";\n"
        );
    }

    #[test]
    fn test_emit_param_with_default() {
        let param = TsParam {
            name: "query".into(),
            ty: "{}".into(),
            default: Some("{}".into()),
        };
        assert_eq!(param.emit(), "query: {} = {}");
    }

    #[test]
    fn test_emit_controller_module() {
        let module = ControllerModule {
            header: vec!["Parent module: userModule".into()],
            imports: vec![TsImport {
                items: vec![ImportItem::named("request")],
                from: "../central".into(),
                type_only: false,
            }],
            methods: vec![ObjectMethod {
                comment: Some("GET @ /user".into()),
                name: "list".into(),
                params: vec![TsParam {
                    name: "params".into(),
                    ty: "{}".into(),
                    default: Some("{}".into()),
                }],
                return_type: "Promise<string[]>".into(),
                body: vec!["return request('get', `/user`, body, query);".into()],
            }],
        };

        let expected = "/// Parent module: userModule\n\nimport { request } from \"../central\";\n\nexport default {\n\n  // GET @ /user\n  list(params: {} = {}): Promise<string[]> {\n    return request('get', `/user`, body, query);\n  },\n};\n";
        assert_eq!(module.emit(), expected);
    }

    #[test]
    fn test_emit_index_module() {
        let index = IndexModule {
            header: vec!["Module name: userModule".into()],
            exports: vec![ReExport {
                name: "userController".into(),
                from: "./userController".into(),
            }],
        };
        assert_eq!(
            index.emit(),
            "/// Module name: userModule\n\nexport { default as userController } from \"./userController\";\n"
        );
    }
}
