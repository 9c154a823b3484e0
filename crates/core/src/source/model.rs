//! Declaration model produced from a parsed source file.
//!
//! The analyzers never see the swc AST; they pattern-match on these closed
//! types instead.

/// A type expression as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Keyword type (`string`, `number`, `unknown`, ...).
    Keyword(String),
    /// Literal type (`'a'`, `42`, `true`), kept as source text.
    Literal(String),
    /// Named type, possibly qualified (`ns.Type`), with type arguments.
    Reference {
        /// Name segments, e.g. `["ns", "Type"]`.
        name: Vec<String>,
        /// Type arguments.
        args: Vec<TypeExpr>,
    },
    /// Inline import type: `import("./x").Type<Args>`.
    Import {
        /// Module specifier as written.
        specifier: String,
        /// Qualifier segments after the import.
        qualifier: Vec<String>,
        /// Type arguments.
        args: Vec<TypeExpr>,
    },
    /// `T[]`.
    Array(Box<TypeExpr>),
    /// `readonly T`.
    Readonly(Box<TypeExpr>),
    /// `[A, B]`.
    Tuple(Vec<TypeExpr>),
    /// `A | B`.
    Union(Vec<TypeExpr>),
    /// `A & B`.
    Intersection(Vec<TypeExpr>),
    /// `(T)`.
    Parenthesized(Box<TypeExpr>),
    /// Object literal type with property members only.
    Object(Vec<ObjectField>),
    /// Any construct outside the supported subset.
    Unsupported {
        /// Kind of construct.
        construct: String,
        /// Exact source text.
        text: String,
    },
}

impl TypeExpr {
    /// The `unknown` keyword type.
    pub fn unknown() -> Self {
        Self::Keyword("unknown".to_string())
    }

    /// A reference to a single unqualified name without arguments.
    pub fn named(name: &str) -> Self {
        Self::Reference {
            name: vec![name.to_string()],
            args: Vec::new(),
        }
    }
}

/// Property of an object literal type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectField {
    /// Property name, unquoted.
    pub name: String,
    /// `name?: T`.
    pub optional: bool,
    /// `readonly name: T`.
    pub readonly: bool,
    /// Property type; `any` when the source omits it.
    pub ty: TypeExpr,
}

/// Kinds of top-level declarations the analyzers look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    /// `class`.
    Class,
    /// `interface`.
    Interface,
    /// `enum`.
    Enum,
    /// `type X = ...`.
    TypeAlias,
    /// `function`.
    Function,
}

/// Argument of a decorator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationArg {
    /// String literal, unquoted.
    Literal(String),
    /// Any other expression, as source text.
    Other(String),
}

/// A decorator such as `@Get(':id')`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Decorator name (last segment for member expressions).
    pub name: String,
    /// Call arguments; empty when not called.
    pub args: Vec<AnnotationArg>,
}

/// Declared type parameter of a class, interface or alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    /// Parameter name.
    pub name: String,
    /// Full source text, including constraint and default.
    pub text: String,
}

/// A class property or interface property signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name, unquoted.
    pub name: String,
    /// `name?: T`.
    pub optional: bool,
    /// `name!: T`.
    pub definite: bool,
    /// `readonly name: T`.
    pub readonly: bool,
    /// `static name`.
    pub is_static: bool,
    /// Declared or inferred type; `None` when neither is available.
    pub ty: Option<TypeExpr>,
    /// Decorators of the property.
    pub decorators: Vec<Annotation>,
    /// 1-based line.
    pub line: usize,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Binding name.
    pub name: String,
    /// Decorators of the parameter.
    pub decorators: Vec<Annotation>,
    /// Declared type.
    pub ty: Option<TypeExpr>,
}

/// A class method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Method name.
    pub name: String,
    /// `static name()`.
    pub is_static: bool,
    /// Decorators of the method.
    pub decorators: Vec<Annotation>,
    /// Parameters in order.
    pub params: Vec<Parameter>,
    /// Declared return type.
    pub return_type: Option<TypeExpr>,
    /// 1-based line.
    pub line: usize,
}

/// An index signature (`[key: string]: T`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSignature {
    /// Key binding name.
    pub key_name: String,
    /// Key type text.
    pub key_type: String,
    /// Value type.
    pub value: TypeExpr,
    /// `readonly [key: string]: T`.
    pub readonly: bool,
    /// 1-based line.
    pub line: usize,
}

/// A member of a class or interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    /// Data member.
    Property(Property),
    /// Class method.
    Method(Method),
    /// Index signature.
    Index(IndexSignature),
    /// Constructor, accessor, method signature, private member, ...
    Other {
        /// Kind of member, e.g. "constructor".
        kind: String,
        /// First line of the member's source text.
        text: String,
    },
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Declared name.
    pub name: String,
    /// Kind of declaration.
    pub kind: DeclarationKind,
    /// Whether the declaration is exported.
    pub exported: bool,
    /// Full source text of the declaration.
    pub text: String,
    /// Class head without decorators or heritage: `export class A<T>`.
    pub head: Option<String>,
    /// 1-based line.
    pub line: usize,
    /// Declared type parameters.
    pub type_params: Vec<TypeParam>,
    /// Decorators (classes only).
    pub decorators: Vec<Annotation>,
    /// `extends` clauses.
    pub supertypes: Vec<TypeExpr>,
    /// Class or interface members.
    pub members: Vec<Member>,
    /// Aliased type of a type alias.
    pub aliased: Option<TypeExpr>,
}

impl Declaration {
    /// Decorators named `name`.
    pub fn decorators_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Annotation> {
        self.decorators.iter().filter(move |d| d.name == name)
    }

    /// Class methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }
}

/// What an import binding refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
    /// `import { A } from` or `import { A as B } from`; holds `A`.
    Named(String),
    /// `import A from`.
    Default,
    /// `import * as ns from`.
    Namespace,
}

/// One local name introduced by an import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// Module specifier as written.
    pub specifier: String,
    /// What the local name refers to.
    pub imported: ImportedName,
}

/// Names a file re-exports from another module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReExportedNames {
    /// `export * from './b'`.
    All,
    /// `export { A, B as C } from './b'`, as `(exported, original)` pairs.
    Named(Vec<(String, String)>),
}

/// One `export ... from` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReExport {
    /// Module specifier as written.
    pub specifier: String,
    /// Re-exported names.
    pub names: ReExportedNames,
}

impl ReExport {
    /// Name in the source module of what this declaration exports as
    /// `exported`, if it exports it at all.
    pub fn original_name<'a>(&'a self, exported: &'a str) -> Option<&'a str> {
        match &self.names {
            ReExportedNames::All => Some(exported),
            ReExportedNames::Named(names) => names
                .iter()
                .find(|(name, _)| name == exported)
                .map(|(_, original)| original.as_str()),
        }
    }
}
