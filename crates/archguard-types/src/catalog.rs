//! Type catalog interchange model.
//!
//! These are read-only views of type definitions produced by an external metadata extractor.
//! Nothing in archguard mutates a descriptor after it has been loaded.

use crate::RepoPath;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One catalog file: the types declared by a single compiled module.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModuleCatalog {
    /// Module (assembly, library) the types were extracted from.
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
}

/// A reference to a type by full name, with generic arguments when the reference is constructed.
///
/// In JSON a reference is either a plain string (`"App.Data.Repo"`) or an object
/// (`{ "name": "System.Collections.Generic.List`1", "arguments": ["App.Data.Repo"] }`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(from = "TypeRefRepr")]
pub struct TypeRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<TypeRef>,
}

#[derive(Deserialize, JsonSchema)]
#[serde(untagged)]
enum TypeRefRepr {
    Name(String),
    Constructed {
        name: String,
        #[serde(default)]
        arguments: Vec<TypeRef>,
    },
}

impl From<TypeRefRepr> for TypeRef {
    fn from(value: TypeRefRepr) -> Self {
        match value {
            TypeRefRepr::Name(name) => TypeRef {
                name,
                arguments: Vec::new(),
            },
            TypeRefRepr::Constructed { name, arguments } => TypeRef { name, arguments },
        }
    }
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

impl From<&str> for TypeRef {
    fn from(value: &str) -> Self {
        TypeRef::new(value)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GenericParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<TypeRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: TypeRef,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_readonly: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: TypeRef,
    #[serde(default)]
    pub has_public_setter: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub parameter_type: TypeRef,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<GenericParameter>,
    /// Types of local variables declared in the method body.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locals: Vec<TypeRef>,
    /// Types referenced by instructions in the method body (calls, field access, casts, `new`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body_references: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_static: bool,
}

/// Read-only structural view of a single type definition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TypeDescriptor {
    /// Namespace-qualified name. Nested types use `/` or `+` after the declaring type.
    pub full_name: String,
    /// Derived from `full_name` by catalog loaders when omitted.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub kind: TypeKind,

    #[serde(default)]
    pub is_sealed: bool,
    #[serde(default)]
    pub is_abstract: bool,
    /// Visibility is opt-in: omitted in JSON or built with [`TypeDescriptor::new`], a type is
    /// not public.
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_static: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<GenericParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    /// Full name of the enclosing type for nested types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDescriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RepoPath>,
}

impl TypeDescriptor {
    /// Build a minimal descriptor, deriving `name` and `namespace` from `full_name`. Every other
    /// field takes the same default as an omitted JSON key.
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let namespace = namespace_of(&full_name).to_string();
        let name = simple_name_of(&full_name).to_string();
        Self {
            full_name,
            name,
            namespace,
            ..Self::default()
        }
    }

    pub fn is_nested(&self) -> bool {
        self.declaring_type.is_some()
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_parameters.is_empty()
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }
}

/// Namespace portion of a full type name.
///
/// For nested types (`Ns.Outer/Inner`, `Ns.Outer+Inner`) this is the namespace of the outermost
/// declaring type. Names without a dot live in the global namespace (`""`).
pub fn namespace_of(full_name: &str) -> &str {
    let outer = full_name
        .split(['/', '+'])
        .next()
        .unwrap_or(full_name);
    match outer.rfind('.') {
        Some(idx) => &outer[..idx],
        None => "",
    }
}

/// Simple (unqualified) name of a full type name, including the nested segment if any.
pub fn simple_name_of(full_name: &str) -> &str {
    let last_nested = full_name.rfind(['/', '+']);
    match last_nested {
        Some(idx) => &full_name[idx + 1..],
        None => match full_name.rfind('.') {
            Some(idx) => &full_name[idx + 1..],
            None => full_name,
        },
    }
}
