//! `_types/` files: one per source file holding extracted types.

use indexmap::IndexMap;
use nsdk_common::paths::{module_specifier, parent_dir, relative_slash_path};
use nsdk_core::extractor::TypesExtractorContent;
use nsdk_core::source::strip_module_extension;

use crate::emit::Emit;
use crate::ir::{ImportItem, TsImport};

/// Directory, relative to the output root, holding the type files.
pub const TYPES_DIR: &str = "_types";

/// Output path, relative to [`TYPES_DIR`], of the file holding the types of
/// `relative_path_no_ext`.
pub fn type_file_path(relative_path_no_ext: &str) -> String {
    format!("{relative_path_no_ext}.ts")
}

/// Generate every type file, keyed by path relative to [`TYPES_DIR`].
pub fn generate_type_files(types: &TypesExtractorContent) -> IndexMap<String, String> {
    let mut files = IndexMap::new();

    for (file, extracted) in types {
        let own = strip_module_extension(file);

        let mut imports: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for dep in extracted.values().flat_map(|ty| &ty.dependencies) {
            if dep.relative_path_no_ext == own {
                continue;
            }
            let names = imports.entry(dep.relative_path_no_ext.as_str()).or_default();
            if !names.contains(&dep.typename.as_str()) {
                names.push(&dep.typename);
            }
        }

        let mut out = String::new();
        for (dep_file, names) in &imports {
            let import = TsImport {
                items: names.iter().map(|name| ImportItem::named(*name)).collect(),
                from: module_specifier(&relative_slash_path(parent_dir(own), dep_file)),
                type_only: true,
            };
            out.push_str(&import.emit());
        }
        if !imports.is_empty() {
            out.push('\n');
        }

        let declarations: Vec<&str> = extracted.values().map(|ty| ty.content.as_str()).collect();
        out.push_str(&declarations.join("\n\n"));
        out.push('\n');

        files.insert(type_file_path(own), out);
    }

    files
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use nsdk_core::{ExtractedType, TypeLocationWithExt};

    use super::*;

    fn extracted(file: &str, name: &str, content: &str, deps: &[(&str, &str)]) -> ExtractedType {
        ExtractedType {
            typename: name.to_string(),
            relative_path_no_ext: strip_module_extension(file).to_string(),
            relative_path: file.to_string(),
            content: content.to_string(),
            type_params: Vec::new(),
            dependencies: deps
                .iter()
                .map(|(dep_file, dep_name)| TypeLocationWithExt {
                    typename: dep_name.to_string(),
                    relative_path_no_ext: strip_module_extension(dep_file).to_string(),
                    relative_path: dep_file.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn imports_other_files_relatively() {
        let mut types = TypesExtractorContent::new();
        types.insert(
            "article/article.controller.ts".to_string(),
            IndexMap::from([
                (
                    "Article".to_string(),
                    extracted(
                        "article/article.controller.ts",
                        "Article",
                        "export interface Article { category: Category; author: Author }",
                        &[("article/category.ts", "Category"), ("users/author.d.ts", "Author")],
                    ),
                ),
                (
                    "Draft".to_string(),
                    extracted(
                        "article/article.controller.ts",
                        "Draft",
                        "export interface Draft { article: Article; category: Category }",
                        &[("article/article.controller.ts", "Article"), ("article/category.ts", "Category")],
                    ),
                ),
            ]),
        );

        let files = generate_type_files(&types);
        let file = &files["article/article.controller.ts"];

        assert_eq!(
            file,
            "import type { Category } from \"./category\";\nimport type { Author } from \"../users/author\";\n\nexport interface Article { category: Category; author: Author }\n\nexport interface Draft { article: Article; category: Category }\n"
        );
    }

    #[test]
    fn declaration_files_are_emitted_as_plain_modules() {
        let mut types = TypesExtractorContent::new();
        types.insert(
            "users/author.d.ts".to_string(),
            IndexMap::from([(
                "Author".to_string(),
                extracted("users/author.d.ts", "Author", "export interface Author {}", &[]),
            )]),
        );

        let files = generate_type_files(&types);
        assert_eq!(files.keys().collect::<Vec<_>>(), vec!["users/author.ts"]);
        assert_eq!(files["users/author.ts"], "export interface Author {}\n");
    }
}
