//! SDK generation from analyzed projects written to disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use nsdk_codegen::{CodegenError, GeneratorOptions, generate_files, write_sdk};
use nsdk_core::{AnalyzerOptions, SdkContent, analyze_project};
use tempfile::TempDir;

fn project(root: &TempDir, files: &[(&str, &str)]) {
    for (path, contents) in files {
        let path = root.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

const MODULE: &str = "@Module({})\nexport class ArticleModule {}\n";

const CONTROLLER: &str = r#"import { Controller, Get, Post, Body, Param, Query } from '@nestjs/common';
import { Article, CreateArticleDto } from './article.dto';

@Controller('article')
export class ArticleController {
  @Get(':id')
  get(@Param('id') id: string, @Query('lang') lang: string): Promise<Article> {
    return null!;
  }

  @Post()
  create(@Body() dto: CreateArticleDto): Article {
    return null!;
  }
}
"#;

const DTO: &str = r#"import { Category } from '../shared/category';

export interface Article {
  title: string;
  category: Category;
}

export class CreateArticleDto {
  title: string;
  category?: Category;
}
"#;

const CATEGORY: &str = "export enum Category {\n  News = 'news',\n}\n";

fn analyzed(root: &TempDir) -> SdkContent {
    project(
        root,
        &[
            ("api/article/article.module.ts", MODULE),
            ("api/article/article.controller.ts", CONTROLLER),
            ("api/article/article.dto.ts", DTO),
            ("api/shared/category.ts", CATEGORY),
            ("front/central.ts", "export default {};\n"),
        ],
    );
    analyze_project(&AnalyzerOptions::new(root.path().join("api")))
        .unwrap()
        .content
}

fn options(root: &TempDir) -> GeneratorOptions {
    GeneratorOptions {
        output: root.path().join("front/sdk"),
        config_script_path: root.path().join("front/central.ts"),
        config_name_to_import: None,
        remove_old_output_dir: false,
        pretty_json: true,
    }
}

#[test]
fn generated_files_cover_types_modules_and_central() {
    let root = TempDir::new().unwrap();
    let content = analyzed(&root);
    let files = generate_files(&content, &options(&root)).unwrap();

    let mut names: Vec<&str> = files.keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "_types/article/article.dto.ts",
            "_types/shared/category.ts",
            "articleModule/articleController.ts",
            "articleModule/index.ts",
            "central.ts",
            "nsdk.json",
        ]
    );

    let dto = &files["_types/article/article.dto.ts"];
    assert!(dto.starts_with("import type { Category } from \"../shared/category\";\n"));
    assert!(dto.contains("export interface Article {"));
    assert!(dto.contains("export class CreateArticleDto {"));

    let controller = &files["articleModule/articleController.ts"];
    assert!(controller.contains("import { request } from \"../central\";"));
    assert!(controller.contains("from \"../_types/article/article.dto\";"));
    assert!(controller.contains("query: { lang: string }"));
    assert!(controller.contains("return request('get', `/article/${params.id}`, body, query);"));
    assert!(controller.contains("create(params: {}, body: CreateArticleDto, query: {} = {}): Promise<Article>"));

    assert!(files["central.ts"].contains("\"../central\""));
    assert_eq!(&SdkContent::from_json(&files["nsdk.json"]).unwrap(), &content);
}

#[test]
fn write_sdk_refuses_to_overwrite_unknown_directories() {
    let root = TempDir::new().unwrap();
    let content = analyzed(&root);
    let mut options = options(&root);

    let written = write_sdk(&content, &options).unwrap();
    assert_eq!(written, 6);
    assert!(root.path().join("front/sdk/nsdk.json").is_file());

    let err = write_sdk(&content, &options).unwrap_err();
    assert!(matches!(err, CodegenError::OutputExists(_)));

    options.remove_old_output_dir = true;
    fs::write(root.path().join("front/sdk/stale.ts"), "").unwrap();
    write_sdk(&content, &options).unwrap();
    assert!(!root.path().join("front/sdk/stale.ts").exists());

    let foreign = root.path().join("front/foreign");
    fs::create_dir(&foreign).unwrap();
    options.output = foreign;
    let err = write_sdk(&content, &options).unwrap_err();
    assert!(matches!(err, CodegenError::NotAnSdkOutput(_)));
}

#[test]
fn barrel_imports_target_the_declaring_type_file() {
    let root = TempDir::new().unwrap();
    project(
        &root,
        &[
            ("api/article/article.module.ts", MODULE),
            (
                "api/article/article.controller.ts",
                "import * as dto from './dto';\n@Controller('article')\nexport class ArticleController {\n  @Get() list(): dto.Article[] { return []; }\n}\n",
            ),
            ("api/article/dto/index.ts", "export { Article } from './article.dto';\n"),
            ("api/article/dto/article.dto.ts", DTO),
            ("api/shared/category.ts", CATEGORY),
            ("front/central.ts", "export default {};\n"),
        ],
    );
    let content = analyze_project(&AnalyzerOptions::new(root.path().join("api")))
        .unwrap()
        .content;
    let files = generate_files(&content, &options(&root)).unwrap();

    assert!(!files.contains_key("_types/article/dto/index.ts"));
    let dto = &files["_types/article/dto/article.dto.ts"];
    assert!(dto.starts_with("import type { Category } from \"../../shared/category\";\n"));

    let controller = &files["articleModule/articleController.ts"];
    assert!(controller.contains("import type { Article } from \"../_types/article/dto/article.dto\";"));
    assert!(controller.contains("Promise<Array<Article>>"));
}
