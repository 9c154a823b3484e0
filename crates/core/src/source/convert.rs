//! Conversion from the swc AST into the declaration model.

use std::collections::HashMap;

use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast::{
    Callee, Class, ClassMember, Decl, Decorator, DefaultDecl, ExportSpecifier, Expr,
    ExprOrSpread, ImportDecl, ImportSpecifier, Lit, MemberProp, Module, ModuleDecl,
    ModuleExportName, ModuleItem, Param, Pat, PropName, Stmt, TsEntityName, TsFnParam,
    TsIndexSignature, TsInterfaceDecl, TsLit, TsType, TsTypeAnn, TsTypeElement,
    TsTypeOperatorOp, TsTypeParamDecl, TsTypeParamInstantiation, TsUnionOrIntersectionType,
};

use super::model::{
    Annotation, AnnotationArg, Declaration, DeclarationKind, ImportBinding, ImportedName,
    IndexSignature, Member, Method, ObjectField, Parameter, Property, ReExport, ReExportedNames,
    TypeExpr, TypeParam,
};

/// Top-level content of one file.
pub(super) struct FileItems {
    pub(super) imports: HashMap<String, ImportBinding>,
    pub(super) declarations: Vec<Declaration>,
    pub(super) re_exports: Vec<ReExport>,
}

/// Converts AST nodes of one file, slicing source text through spans.
pub(super) struct Converter<'a> {
    text: &'a str,
    start: BytePos,
}

impl<'a> Converter<'a> {
    pub(super) fn new(text: &'a str, start: BytePos) -> Self {
        Self { text, start }
    }

    fn offset(&self, pos: BytePos) -> Option<usize> {
        pos.0.checked_sub(self.start.0).map(|o| o as usize)
    }

    fn snippet(&self, span: Span) -> String {
        match (self.offset(span.lo), self.offset(span.hi)) {
            (Some(lo), Some(hi)) => self.text.get(lo..hi).unwrap_or_default().to_string(),
            _ => String::new(),
        }
    }

    fn first_line(&self, span: Span) -> String {
        let text = self.snippet(span);
        text.lines().next().unwrap_or_default().trim().to_string()
    }

    fn line(&self, span: Span) -> usize {
        self.offset(span.lo)
            .and_then(|lo| self.text.get(..lo))
            .map_or(0, |before| before.matches('\n').count())
            + 1
    }

    pub(super) fn module(&self, module: &Module) -> FileItems {
        let mut imports = HashMap::new();
        let mut declarations = Vec::new();
        let mut re_exports = Vec::new();

        for item in &module.body {
            match item {
                ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                    self.import(import, &mut imports);
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                    declarations.extend(self.decl(&export.decl, true, export.span));
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                    if let DefaultDecl::Class(class) = &export.decl
                        && let Some(ident) = &class.ident
                    {
                        declarations.push(self.class(
                            ident.sym.to_string(),
                            &class.class,
                            true,
                            export.span,
                        ));
                    } else if let DefaultDecl::TsInterfaceDecl(iface) = &export.decl {
                        declarations.push(self.interface(iface, true, export.span));
                    }
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportAll(export)) => {
                    re_exports.push(ReExport {
                        specifier: unquote(&self.snippet(export.src.span)),
                        names: ReExportedNames::All,
                    });
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(export)) => {
                    if let Some(src) = &export.src {
                        let names: Vec<(String, String)> = export
                            .specifiers
                            .iter()
                            .filter_map(|spec| match spec {
                                ExportSpecifier::Named(named) => {
                                    let original = self.export_name(&named.orig);
                                    let exported = named
                                        .exported
                                        .as_ref()
                                        .map_or_else(|| original.clone(), |e| self.export_name(e));
                                    Some((exported, original))
                                }
                                _ => None,
                            })
                            .collect();
                        if !names.is_empty() {
                            re_exports.push(ReExport {
                                specifier: unquote(&self.snippet(src.span)),
                                names: ReExportedNames::Named(names),
                            });
                        }
                    }
                }
                ModuleItem::Stmt(Stmt::Decl(decl)) => {
                    declarations.extend(self.decl(decl, false, decl.span()));
                }
                _ => {}
            }
        }

        FileItems {
            imports,
            declarations,
            re_exports,
        }
    }

    fn export_name(&self, name: &ModuleExportName) -> String {
        match name {
            ModuleExportName::Ident(id) => id.sym.to_string(),
            other => unquote(&self.snippet(other.span())),
        }
    }

    fn import(&self, import: &ImportDecl, out: &mut HashMap<String, ImportBinding>) {
        let specifier = unquote(&self.snippet(import.src.span));

        for spec in &import.specifiers {
            let (local, imported) = match spec {
                ImportSpecifier::Named(named) => {
                    let local = named.local.sym.to_string();
                    let imported = named
                        .imported
                        .as_ref()
                        .map_or_else(|| local.clone(), |name| self.export_name(name));
                    (local, ImportedName::Named(imported))
                }
                ImportSpecifier::Default(default) => {
                    (default.local.sym.to_string(), ImportedName::Default)
                }
                ImportSpecifier::Namespace(ns) => {
                    (ns.local.sym.to_string(), ImportedName::Namespace)
                }
            };

            out.insert(
                local,
                ImportBinding {
                    specifier: specifier.clone(),
                    imported,
                },
            );
        }
    }

    fn decl(&self, decl: &Decl, exported: bool, span: Span) -> Option<Declaration> {
        match decl {
            Decl::Class(class) => Some(self.class(
                class.ident.sym.to_string(),
                &class.class,
                exported,
                span,
            )),
            Decl::TsInterface(iface) => Some(self.interface(iface, exported, span)),
            Decl::TsEnum(decl) => Some(self.plain(
                decl.id.sym.to_string(),
                DeclarationKind::Enum,
                exported,
                span,
            )),
            Decl::TsTypeAlias(alias) => {
                let mut declaration = self.plain(
                    alias.id.sym.to_string(),
                    DeclarationKind::TypeAlias,
                    exported,
                    span,
                );
                declaration.type_params = self.type_params(alias.type_params.as_deref());
                declaration.aliased = Some(self.ty(&alias.type_ann));
                Some(declaration)
            }
            Decl::Fn(function) => Some(self.plain(
                function.ident.sym.to_string(),
                DeclarationKind::Function,
                exported,
                span,
            )),
            _ => None,
        }
    }

    fn plain(
        &self,
        name: String,
        kind: DeclarationKind,
        exported: bool,
        span: Span,
    ) -> Declaration {
        Declaration {
            name,
            kind,
            exported,
            text: self.snippet(span),
            head: None,
            line: self.line(span),
            type_params: Vec::new(),
            decorators: Vec::new(),
            supertypes: Vec::new(),
            members: Vec::new(),
            aliased: None,
        }
    }

    fn class(&self, name: String, class: &Class, exported: bool, span: Span) -> Declaration {
        let mut head = String::from("export ");
        if class.is_abstract {
            head.push_str("abstract ");
        }
        head.push_str("class ");
        head.push_str(&name);
        if let Some(params) = &class.type_params {
            head.push_str(&self.snippet(params.span));
        }

        let mut supertypes = Vec::new();
        if let Some(super_class) = &class.super_class {
            let args = self.type_args(class.super_type_params.as_deref());
            supertypes.push(self.heritage(super_class, args));
        }

        let members = class
            .body
            .iter()
            .filter_map(|member| self.class_member(member))
            .collect();

        let mut declaration = self.plain(name, DeclarationKind::Class, exported, span);
        declaration.head = Some(head);
        declaration.type_params = self.type_params(class.type_params.as_deref());
        declaration.decorators = self.decorators(&class.decorators);
        declaration.supertypes = supertypes;
        declaration.members = members;
        declaration
    }

    fn class_member(&self, member: &ClassMember) -> Option<Member> {
        let member = match member {
            ClassMember::ClassProp(prop) => {
                let ty = prop
                    .type_ann
                    .as_ref()
                    .map(|ann| self.ty(&ann.type_ann))
                    .or_else(|| prop.value.as_deref().and_then(|v| self.infer(v)));
                Member::Property(Property {
                    name: self.prop_name(&prop.key),
                    optional: prop.is_optional,
                    definite: prop.definite,
                    readonly: prop.readonly,
                    is_static: prop.is_static,
                    ty,
                    decorators: self.decorators(&prop.decorators),
                    line: self.line(prop.span),
                })
            }
            ClassMember::Method(method) => Member::Method(Method {
                name: self.prop_name(&method.key),
                is_static: method.is_static,
                decorators: self.decorators(&method.function.decorators),
                params: method
                    .function
                    .params
                    .iter()
                    .map(|p| self.param(p))
                    .collect(),
                return_type: method
                    .function
                    .return_type
                    .as_ref()
                    .map(|ann| self.ty(&ann.type_ann)),
                line: self.line(method.span),
            }),
            ClassMember::TsIndexSignature(sig) => self.index_signature(sig),
            ClassMember::Constructor(ctor) => Member::Other {
                kind: "constructor".to_string(),
                text: self.first_line(ctor.span),
            },
            ClassMember::Empty(_) => return None,
            other => Member::Other {
                kind: "class member".to_string(),
                text: self.first_line(other.span()),
            },
        };
        Some(member)
    }

    fn param(&self, param: &Param) -> Parameter {
        let (name, ty) = self.binding(&param.pat);
        Parameter {
            name,
            decorators: self.decorators(&param.decorators),
            ty,
        }
    }

    fn binding(&self, pat: &Pat) -> (String, Option<TypeExpr>) {
        match pat {
            Pat::Ident(binding) => (
                binding.id.sym.to_string(),
                binding.type_ann.as_ref().map(|ann| self.ty(&ann.type_ann)),
            ),
            Pat::Assign(assign) => self.binding(&assign.left),
            other => (self.snippet(other.span()), None),
        }
    }

    fn interface(&self, iface: &TsInterfaceDecl, exported: bool, span: Span) -> Declaration {
        let mut declaration = self.plain(
            iface.id.sym.to_string(),
            DeclarationKind::Interface,
            exported,
            span,
        );
        declaration.type_params = self.type_params(iface.type_params.as_deref());
        declaration.supertypes = iface
            .extends
            .iter()
            .map(|h| self.heritage(&h.expr, self.type_args(h.type_args.as_deref())))
            .collect();
        declaration.members = iface
            .body
            .body
            .iter()
            .map(|element| self.type_element(element))
            .collect();
        declaration
    }

    fn type_element(&self, element: &TsTypeElement) -> Member {
        match element {
            TsTypeElement::TsPropertySignature(prop) => {
                match self.expr_key(&prop.key, prop.computed) {
                    Some(name) => Member::Property(Property {
                        name,
                        optional: prop.optional,
                        definite: false,
                        readonly: prop.readonly,
                        is_static: false,
                        ty: Some(self.annotation_or_any(prop.type_ann.as_deref())),
                        decorators: Vec::new(),
                        line: self.line(prop.span),
                    }),
                    None => Member::Other {
                        kind: "computed property signature".to_string(),
                        text: self.first_line(prop.span),
                    },
                }
            }
            TsTypeElement::TsIndexSignature(sig) => self.index_signature(sig),
            other => Member::Other {
                kind: "method signature".to_string(),
                text: self.first_line(other.span()),
            },
        }
    }

    fn index_signature(&self, sig: &TsIndexSignature) -> Member {
        let (key_name, key_type) = match sig.params.first() {
            Some(TsFnParam::Ident(binding)) => (
                binding.id.sym.to_string(),
                binding
                    .type_ann
                    .as_ref()
                    .map_or_else(|| "string".to_string(), |ann| self.snippet(ann.type_ann.span())),
            ),
            _ => ("key".to_string(), "string".to_string()),
        };

        Member::Index(IndexSignature {
            key_name,
            key_type,
            value: self.annotation_or_any(sig.type_ann.as_deref()),
            readonly: sig.readonly,
            line: self.line(sig.span),
        })
    }

    fn annotation_or_any(&self, ann: Option<&TsTypeAnn>) -> TypeExpr {
        ann.map_or_else(
            || TypeExpr::Keyword("any".to_string()),
            |ann| self.ty(&ann.type_ann),
        )
    }

    fn heritage(&self, expr: &Expr, args: Vec<TypeExpr>) -> TypeExpr {
        match expr_segments(expr) {
            Some(name) => TypeExpr::Reference { name, args },
            None => TypeExpr::Unsupported {
                construct: "computed supertype".to_string(),
                text: self.snippet(expr.span()),
            },
        }
    }

    fn type_params(&self, params: Option<&TsTypeParamDecl>) -> Vec<TypeParam> {
        params
            .map(|decl| {
                decl.params
                    .iter()
                    .map(|param| TypeParam {
                        name: param.name.sym.to_string(),
                        text: self.snippet(param.span),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn type_args(&self, args: Option<&TsTypeParamInstantiation>) -> Vec<TypeExpr> {
        args.map(|inst| inst.params.iter().map(|t| self.ty(t)).collect())
            .unwrap_or_default()
    }

    fn decorators(&self, decorators: &[Decorator]) -> Vec<Annotation> {
        decorators.iter().map(|d| self.decorator(d)).collect()
    }

    fn decorator(&self, decorator: &Decorator) -> Annotation {
        match &*decorator.expr {
            Expr::Call(call) => Annotation {
                name: match &call.callee {
                    Callee::Expr(callee) => self.callee_name(callee),
                    other => self.snippet(other.span()),
                },
                args: call.args.iter().map(|arg| self.annotation_arg(arg)).collect(),
            },
            other => Annotation {
                name: self.callee_name(other),
                args: Vec::new(),
            },
        }
    }

    fn callee_name(&self, expr: &Expr) -> String {
        match expr {
            Expr::Ident(id) => id.sym.to_string(),
            Expr::Member(member) => match &member.prop {
                MemberProp::Ident(id) => id.sym.to_string(),
                _ => self.snippet(member.span),
            },
            other => self.snippet(other.span()),
        }
    }

    fn annotation_arg(&self, arg: &ExprOrSpread) -> AnnotationArg {
        if arg.spread.is_none()
            && let Expr::Lit(Lit::Str(s)) = &*arg.expr
        {
            return AnnotationArg::Literal(unquote(&self.snippet(s.span)));
        }
        AnnotationArg::Other(self.snippet(arg.expr.span()))
    }

    fn prop_name(&self, key: &PropName) -> String {
        match key {
            PropName::Ident(id) => id.sym.to_string(),
            PropName::Str(s) => unquote(&self.snippet(s.span)),
            other => self.snippet(other.span()),
        }
    }

    fn expr_key(&self, key: &Expr, computed: bool) -> Option<String> {
        if computed {
            return None;
        }
        match key {
            Expr::Ident(id) => Some(id.sym.to_string()),
            Expr::Lit(Lit::Str(s)) => Some(unquote(&self.snippet(s.span))),
            Expr::Lit(Lit::Num(n)) => Some(self.snippet(n.span)),
            _ => None,
        }
    }

    /// Type of a property initializer, for the shapes TypeScript infers trivially.
    fn infer(&self, value: &Expr) -> Option<TypeExpr> {
        let keyword = |k: &str| Some(TypeExpr::Keyword(k.to_string()));
        match value {
            Expr::Lit(Lit::Str(_)) | Expr::Tpl(_) => keyword("string"),
            Expr::Lit(Lit::Num(_)) => keyword("number"),
            Expr::Lit(Lit::Bool(_)) => keyword("boolean"),
            Expr::Lit(Lit::BigInt(_)) => keyword("bigint"),
            Expr::New(new) => expr_segments(&new.callee).map(|name| TypeExpr::Reference {
                name,
                args: self.type_args(new.type_args.as_deref()),
            }),
            _ => None,
        }
    }

    pub(super) fn ty(&self, ty: &TsType) -> TypeExpr {
        let unsupported = |construct: &str| TypeExpr::Unsupported {
            construct: construct.to_string(),
            text: self.snippet(ty.span()),
        };

        match ty {
            TsType::TsKeywordType(kw) => TypeExpr::Keyword(self.snippet(kw.span)),
            TsType::TsLitType(lit) => match &lit.lit {
                TsLit::Tpl(_) => unsupported("template literal type"),
                _ => TypeExpr::Literal(self.snippet(lit.span)),
            },
            TsType::TsTypeRef(reference) => TypeExpr::Reference {
                name: entity_segments(&reference.type_name),
                args: self.type_args(reference.type_params.as_deref()),
            },
            TsType::TsArrayType(array) => TypeExpr::Array(Box::new(self.ty(&array.elem_type))),
            TsType::TsTupleType(tuple) => {
                TypeExpr::Tuple(tuple.elem_types.iter().map(|e| self.ty(&e.ty)).collect())
            }
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(union)) => {
                TypeExpr::Union(union.types.iter().map(|t| self.ty(t)).collect())
            }
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(
                intersection,
            )) => TypeExpr::Intersection(intersection.types.iter().map(|t| self.ty(t)).collect()),
            TsType::TsParenthesizedType(paren) => {
                TypeExpr::Parenthesized(Box::new(self.ty(&paren.type_ann)))
            }
            TsType::TsTypeOperator(op) => match op.op {
                TsTypeOperatorOp::ReadOnly => TypeExpr::Readonly(Box::new(self.ty(&op.type_ann))),
                TsTypeOperatorOp::KeyOf => unsupported("keyof type operator"),
                TsTypeOperatorOp::Unique => unsupported("unique type operator"),
            },
            TsType::TsTypeLit(lit) => {
                let mut fields = Vec::with_capacity(lit.members.len());
                for member in &lit.members {
                    let TsTypeElement::TsPropertySignature(prop) = member else {
                        return unsupported("object type with non-property members");
                    };
                    let Some(name) = self.expr_key(&prop.key, prop.computed) else {
                        return unsupported("object type with computed keys");
                    };
                    fields.push(ObjectField {
                        name,
                        optional: prop.optional,
                        readonly: prop.readonly,
                        ty: self.annotation_or_any(prop.type_ann.as_deref()),
                    });
                }
                TypeExpr::Object(fields)
            }
            TsType::TsImportType(import) => TypeExpr::Import {
                specifier: unquote(&self.snippet(import.arg.span)),
                qualifier: import
                    .qualifier
                    .as_ref()
                    .map(entity_segments)
                    .unwrap_or_default(),
                args: self.type_args(import.type_args.as_deref()),
            },
            TsType::TsConditionalType(_) => unsupported("conditional type"),
            TsType::TsMappedType(_) => unsupported("mapped type"),
            TsType::TsIndexedAccessType(_) => unsupported("indexed access type"),
            TsType::TsTypeQuery(_) => unsupported("typeof type query"),
            TsType::TsFnOrConstructorType(_) => unsupported("function type"),
            _ => unsupported("type construct"),
        }
    }
}

fn entity_segments(name: &TsEntityName) -> Vec<String> {
    match name {
        TsEntityName::Ident(id) => vec![id.sym.to_string()],
        TsEntityName::TsQualifiedName(qualified) => {
            let mut segments = entity_segments(&qualified.left);
            segments.push(qualified.right.sym.to_string());
            segments
        }
    }
}

fn expr_segments(expr: &Expr) -> Option<Vec<String>> {
    match expr {
        Expr::Ident(id) => Some(vec![id.sym.to_string()]),
        Expr::Member(member) => {
            let mut segments = expr_segments(&member.obj)?;
            match &member.prop {
                MemberProp::Ident(id) => segments.push(id.sym.to_string()),
                _ => return None,
            }
            Some(segments)
        }
        _ => None,
    }
}

/// Strip the quotes of a string literal's source text.
fn unquote(raw: &str) -> String {
    let inner = raw
        .strip_prefix(['\'', '"', '`'])
        .and_then(|s| s.strip_suffix(['\'', '"', '`']))
        .unwrap_or(raw);
    inner
        .replace("\\'", "'")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\")
}

#[cfg(test)]
mod tests {
    use super::unquote;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'abc'"), "abc");
        assert_eq!(unquote("\"a\\\"b\""), "a\"b");
        assert_eq!(unquote("plain"), "plain");
    }
}
