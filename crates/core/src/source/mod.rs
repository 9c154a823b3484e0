//! Read-only view over the TypeScript sources of a project.
//!
//! Files are parsed with swc on first access and stay resident for the whole
//! run. Paths are always root-relative and `/`-separated.

mod convert;
pub mod model;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use nsdk_common::paths::{join_slash, normalize_slash_path, parent_dir, to_slash};
use swc_common::sync::Lrc;
use swc_common::{FileName, SourceMap};
use swc_ecma_parser::lexer::Lexer;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::AnalyzerError;
pub use model::{
    Annotation, AnnotationArg, Declaration, DeclarationKind, ImportBinding, ImportedName,
    IndexSignature, Member, Method, ObjectField, Parameter, Property, ReExport, ReExportedNames,
    TypeExpr, TypeParam,
};

/// Extensions tried, in order, when looking for the file behind a module path.
pub const MODULE_EXTENSIONS: [&str; 6] = [".ts", ".d.ts", ".tsx", ".d.tsx", ".js", ".jsx"];

/// Strip a known module extension from a path (`a/b.d.ts` -> `a/b`).
pub fn strip_module_extension(path: &str) -> &str {
    // Longest first so `.d.ts` wins over `.ts`.
    for ext in [".d.tsx", ".d.ts", ".tsx", ".ts", ".jsx", ".js", ".mjs", ".cjs"] {
        if let Some(stripped) = path.strip_suffix(ext)
            && !stripped.is_empty()
        {
            return stripped;
        }
    }
    path
}

/// Whether a root-relative path has escaped into an absolute one.
pub fn is_absolute_path(path: &str) -> bool {
    path.starts_with('/') || path.starts_with('\\') || path.as_bytes().get(1) == Some(&b':')
}

/// Root-relative path (without extension) of the module an import specifier
/// designates, as seen from `importer` (a root-relative file path).
///
/// Relative specifiers are joined with the importer's directory; package
/// specifiers live under `node_modules/`.
pub fn resolve_import_specifier(importer: &str, specifier: &str) -> String {
    let joined = if specifier.starts_with("./") || specifier.starts_with("../") || specifier == "."
    {
        join_slash(parent_dir(importer), specifier)
    } else if let Some(rooted) = specifier.strip_prefix('/') {
        normalize_slash_path(rooted)
    } else {
        join_slash("node_modules", specifier)
    };
    strip_module_extension(&joined).to_string()
}

/// A parsed source file.
#[derive(Debug)]
pub struct SourceFile {
    relative_path: String,
    text: String,
    imports: HashMap<String, ImportBinding>,
    declarations: Vec<Declaration>,
    re_exports: Vec<ReExport>,
}

impl SourceFile {
    /// Parse `text` as the file at root-relative `relative_path`.
    pub fn parse(relative_path: &str, text: String) -> Result<Self, AnalyzerError> {
        let cm: Lrc<SourceMap> = Lrc::default();
        let file_name: Lrc<FileName> = FileName::Real(PathBuf::from(relative_path)).into();
        let fm = cm.new_source_file(file_name, text.clone());

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: relative_path.ends_with(".tsx") || relative_path.ends_with(".jsx"),
            decorators: true,
            dts: relative_path.ends_with(".d.ts") || relative_path.ends_with(".d.tsx"),
            ..Default::default()
        });

        let lexer = Lexer::new(syntax, Default::default(), StringInput::from(&*fm), None);
        let mut parser = Parser::new_from(lexer);
        let module = parser
            .parse_module()
            .map_err(|err| AnalyzerError::Parse {
                path: relative_path.to_string(),
                message: format!("{:?}", err.kind()),
            })?;

        let items = convert::Converter::new(&text, fm.start_pos).module(&module);
        debug!(
            "Parsed {relative_path}: {} declaration(s), {} import binding(s)",
            items.declarations.len(),
            items.imports.len()
        );

        Ok(Self {
            relative_path: relative_path.to_string(),
            text,
            imports: items.imports,
            declarations: items.declarations,
            re_exports: items.re_exports,
        })
    }

    /// Root-relative path including the extension.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Root-relative path without the extension.
    pub fn relative_path_no_ext(&self) -> &str {
        strip_module_extension(&self.relative_path)
    }

    /// Source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Binding of an imported local name.
    pub fn import(&self, local: &str) -> Option<&ImportBinding> {
        self.imports.get(local)
    }

    /// Top-level declarations in source order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// First top-level declaration named `name`.
    pub fn find_declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Whether the file declares `name` at top level.
    pub fn declares(&self, name: &str) -> bool {
        self.find_declaration(name).is_some()
    }

    /// `export ... from` declarations in source order.
    pub fn re_exports(&self) -> &[ReExport] {
        &self.re_exports
    }

    /// First class declared in the file.
    pub fn first_class(&self) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.kind == DeclarationKind::Class)
    }

    /// Root-relative path (without extension) designated by `specifier`.
    pub fn resolve_specifier(&self, specifier: &str) -> String {
        resolve_import_specifier(&self.relative_path, specifier)
    }
}

/// Lazily parsed view over every source file below a root directory.
#[derive(Debug)]
pub struct SourceProject {
    root: PathBuf,
    files: RefCell<HashMap<String, Rc<SourceFile>>>,
}

impl SourceProject {
    /// Open the project rooted at `root`.
    pub fn open(root: &Path) -> Result<Self, AnalyzerError> {
        if !root.is_dir() {
            return Err(AnalyzerError::InvalidSourceRoot(root.to_path_buf()));
        }

        Ok(Self {
            root: root.to_path_buf(),
            files: RefCell::new(HashMap::new()),
        })
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every TypeScript source below the root, sorted, skipping
    /// `node_modules` and hidden directories.
    pub fn list_source_files(&self) -> Result<Vec<String>, AnalyzerError> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || {
                    let name = entry.file_name().to_string_lossy();
                    !(entry.file_type().is_dir()
                        && (name == "node_modules" || name.starts_with('.')))
                }
            });

        for entry in walker {
            let entry = entry.map_err(|err| AnalyzerError::Io {
                path: self.root.display().to_string(),
                source: err.into(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let relative = to_slash(relative);
            if relative.ends_with(".ts") || relative.ends_with(".tsx") {
                files.push(relative);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Whether a root-relative file exists.
    pub fn exists(&self, relative_path: &str) -> bool {
        self.files.borrow().contains_key(relative_path) || self.root.join(relative_path).is_file()
    }

    /// Existing files for a path without extension, in preference order.
    pub fn find_with_extensions(&self, relative_path_no_ext: &str) -> Vec<String> {
        MODULE_EXTENSIONS
            .iter()
            .map(|ext| format!("{relative_path_no_ext}{ext}"))
            .filter(|candidate| self.exists(candidate))
            .collect()
    }

    /// Existing files for a module path: `<path><ext>` first, then
    /// `<path>/index<ext>` for directory imports.
    pub fn find_module_files(&self, relative_path_no_ext: &str) -> Vec<String> {
        let direct = self.find_with_extensions(relative_path_no_ext);
        if !direct.is_empty() {
            return direct;
        }
        self.find_with_extensions(&join_slash(relative_path_no_ext, "index"))
    }

    /// Parsed file at a root-relative path, parsing it on first access.
    pub fn file(&self, relative_path: &str) -> Result<Rc<SourceFile>, AnalyzerError> {
        if let Some(file) = self.files.borrow().get(relative_path) {
            return Ok(Rc::clone(file));
        }

        let path = self.root.join(relative_path);
        let text = fs::read_to_string(&path).map_err(|source| AnalyzerError::Io {
            path: relative_path.to_string(),
            source,
        })?;

        let file = Rc::new(SourceFile::parse(relative_path, text)?);
        self.files
            .borrow_mut()
            .insert(relative_path.to_string(), Rc::clone(&file));
        Ok(file)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::testing::write_project;

    #[test]
    fn test_strip_module_extension() {
        assert_eq!(strip_module_extension("a/b.ts"), "a/b");
        assert_eq!(strip_module_extension("a/b.d.ts"), "a/b");
        assert_eq!(strip_module_extension("a/b.entity"), "a/b.entity");
        assert_eq!(strip_module_extension("x.js"), "x");
    }

    #[test]
    fn test_resolve_import_specifier() {
        let importer = "modules/article/article.controller.ts";
        assert_eq!(
            resolve_import_specifier(importer, "./article.entity"),
            "modules/article/article.entity"
        );
        assert_eq!(
            resolve_import_specifier(importer, "../category/category.entity.js"),
            "modules/category/category.entity"
        );
        assert_eq!(
            resolve_import_specifier(importer, "@mikro-orm/core"),
            "node_modules/@mikro-orm/core"
        );
    }

    #[test]
    fn parses_declarations_and_imports() {
        let file = SourceFile::parse(
            "a.ts",
            r#"
import { B as Renamed, C } from './b';
import * as ns from '../ns';
import Def from './def';

@Entity()
export class A<T> extends Base<T> {
  id!: number;
  readonly name?: string;
  count = 0;
  created = new Date();
  child: Renamed;
  static instances: number;
  get label(): string { return this.name ?? ''; }
  constructor() { super(); }
  [key: string]: unknown;
}

interface Local { x: ns.Thing; }
export enum Color { Red, Green }
type Alias<U> = U[];
export function helper(): void {}
"#
            .to_string(),
        )
        .unwrap();

        assert_eq!(
            file.import("Renamed").unwrap().imported,
            ImportedName::Named("B".to_string())
        );
        assert_eq!(file.import("ns").unwrap().imported, ImportedName::Namespace);
        assert_eq!(file.import("Def").unwrap().imported, ImportedName::Default);
        assert_eq!(file.import("C").unwrap().specifier, "./b");

        let a = file.find_declaration("A").unwrap();
        assert_eq!(a.kind, DeclarationKind::Class);
        assert!(a.exported);
        assert_eq!(a.head.as_deref(), Some("export class A<T>"));
        assert_eq!(
            a.supertypes,
            vec![TypeExpr::Reference {
                name: vec!["Base".to_string()],
                args: vec![TypeExpr::named("T")],
            }]
        );
        assert_eq!(a.decorators[0].name, "Entity");
        assert_eq!(a.type_params[0].name, "T");

        let props: Vec<&Property> = a
            .members
            .iter()
            .filter_map(|m| match m {
                Member::Property(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(props.len(), 6);
        assert!(props[0].definite);
        assert!(props[1].optional);
        assert!(props[1].readonly);
        assert!(!props[0].readonly);
        assert_eq!(props[2].ty, Some(TypeExpr::Keyword("number".to_string())));
        assert_eq!(props[3].ty, Some(TypeExpr::named("Date")));
        assert!(props[5].is_static);
        assert!(a.members.iter().any(|m| matches!(m, Member::Index(_))));
        assert!(
            a.members
                .iter()
                .any(|m| matches!(m, Member::Other { kind, .. } if kind == "constructor"))
        );

        let local = file.find_declaration("Local").unwrap();
        assert!(!local.exported);
        assert_eq!(local.kind, DeclarationKind::Interface);

        assert_eq!(
            file.find_declaration("Color").unwrap().text,
            "export enum Color { Red, Green }"
        );
        let alias = file.find_declaration("Alias").unwrap();
        assert_eq!(alias.type_params[0].name, "U");
        assert_eq!(
            alias.aliased,
            Some(TypeExpr::Array(Box::new(TypeExpr::named("U"))))
        );
        assert_eq!(
            file.find_declaration("helper").unwrap().kind,
            DeclarationKind::Function
        );
    }

    #[test]
    fn parses_decorator_arguments() {
        let file = SourceFile::parse(
            "x.controller.ts",
            r#"
@Controller('article')
export class ArticleController {
  @Get(':id')
  find(@Param('id') id: string, @Query(KEY) q: number, plain: boolean): Promise<string> {
    return Promise.resolve(id);
  }
}
"#
            .to_string(),
        )
        .unwrap();

        let class = file.first_class().unwrap();
        assert_eq!(
            class.decorators[0].args,
            vec![AnnotationArg::Literal("article".to_string())]
        );

        let method = class.methods().next().unwrap();
        assert_eq!(method.name, "find");
        assert_eq!(method.decorators[0].name, "Get");
        assert_eq!(method.params.len(), 3);
        assert_eq!(
            method.params[1].decorators[0].args,
            vec![AnnotationArg::Other("KEY".to_string())]
        );
        assert!(method.params[2].decorators.is_empty());
        assert_eq!(
            method.return_type,
            Some(TypeExpr::Reference {
                name: vec!["Promise".to_string()],
                args: vec![TypeExpr::Keyword("string".to_string())],
            })
        );
    }

    #[test]
    fn unsupported_types_keep_their_text() {
        let file = SourceFile::parse(
            "t.ts",
            "type X<T> = T extends string ? number : boolean;".to_string(),
        )
        .unwrap();
        assert_eq!(
            file.find_declaration("X").unwrap().aliased,
            Some(TypeExpr::Unsupported {
                construct: "conditional type".to_string(),
                text: "T extends string ? number : boolean".to_string(),
            })
        );
    }

    #[test]
    fn parse_errors_are_reported() {
        let err = SourceFile::parse("bad.ts", "export class {".to_string()).unwrap_err();
        assert!(matches!(err, AnalyzerError::Parse { path, .. } if path == "bad.ts"));
    }

    #[test]
    fn project_lists_and_caches_files() {
        let dir = write_project(&[
            ("src/a.controller.ts", "export class A {}"),
            ("src/b.ts", "export interface B {}"),
            ("node_modules/pkg/index.ts", "export type P = string;"),
            (".cache/x.ts", "export type X = string;"),
            ("README.md", "# readme"),
        ]);

        let project = SourceProject::open(dir.path()).unwrap();
        assert_eq!(
            project.list_source_files().unwrap(),
            vec!["src/a.controller.ts".to_string(), "src/b.ts".to_string()]
        );

        let first = project.file("src/b.ts").unwrap();
        let second = project.file("src/b.ts").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(project.find_with_extensions("src/b"), vec!["src/b.ts"]);
        assert!(project.find_with_extensions("src/missing").is_empty());
    }

    #[test]
    fn parses_re_exports() {
        let file = SourceFile::parse(
            "dto/index.ts",
            r#"
export * from './a';
export { B, C as Renamed } from './b';
export { Local };
export * as grouped from './c';
"#
            .to_string(),
        )
        .unwrap();

        let re_exports = file.re_exports();
        assert_eq!(re_exports.len(), 2);
        assert_eq!(re_exports[0].specifier, "./a");
        assert_eq!(re_exports[0].names, ReExportedNames::All);
        assert_eq!(re_exports[0].original_name("Anything"), Some("Anything"));
        assert_eq!(re_exports[1].original_name("B"), Some("B"));
        assert_eq!(re_exports[1].original_name("Renamed"), Some("C"));
        assert_eq!(re_exports[1].original_name("C"), None);
    }

    #[test]
    fn directory_imports_fall_back_to_index_files() {
        let dir = write_project(&[
            ("dto/index.ts", "export interface B {}"),
            ("shared.ts", "export type S = string;"),
            ("shared/index.ts", "export type T = string;"),
        ]);

        let project = SourceProject::open(dir.path()).unwrap();
        assert_eq!(project.find_module_files("dto"), vec!["dto/index.ts"]);
        assert_eq!(project.find_module_files("shared"), vec!["shared.ts"]);
        assert!(project.find_module_files("missing").is_empty());
    }
}
