//! The closed set of boolean tests a predicate or condition can apply to a type.

use crate::dependency::{DependencyCheck, in_namespace, normalize_type_name};
use crate::pattern::Pattern;
use crate::snapshot::TypeCatalog;
use archguard_types::{TypeDescriptor, TypeKind};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::sync::Arc;

/// User-supplied test with a description for reports.
#[derive(Clone)]
pub struct CustomRule {
    description: String,
    test: Arc<dyn Fn(&TypeDescriptor) -> bool + Send + Sync>,
}

impl CustomRule {
    pub fn new<F>(description: impl Into<String>, test: F) -> Self
    where
        F: Fn(&TypeDescriptor) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            test: Arc::new(test),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn test(&self, ty: &TypeDescriptor) -> bool {
        (self.test)(ty)
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub enum TypeCheck {
    HaveName(String),
    HaveNameStartingWith(String),
    HaveNameEndingWith(String),
    HaveNameMatching(Pattern),
    HaveFullName(String),
    ResideInNamespace(String),
    ResideInNamespaceMatching(Pattern),
    ResideInNamespaceStartingWith(String),
    ResideInNamespaceEndingWith(String),
    HaveCustomAttribute(String),
    /// Base-type chain contains the named type, following bases through the catalog.
    Inherit(String),
    /// The named interface is implemented directly, by a catalog base type, or by an
    /// interface the type implements.
    ImplementInterface(String),
    HaveKind(TypeKind),
    AreAbstract,
    AreSealed,
    ArePublic,
    AreStatic,
    AreNested,
    AreGeneric,
    /// Every field is readonly and no property has a public setter.
    AreImmutable,
    HaveDependency(DependencyCheck),
    MeetCustomRule(CustomRule),
}

impl TypeCheck {
    pub fn matches(&self, ty: &TypeDescriptor, catalog: &TypeCatalog) -> bool {
        match self {
            TypeCheck::HaveName(name) => ty.name == *name,
            TypeCheck::HaveNameStartingWith(prefix) => ty.name.starts_with(prefix.as_str()),
            TypeCheck::HaveNameEndingWith(suffix) => ty.name.ends_with(suffix.as_str()),
            TypeCheck::HaveNameMatching(p) => p.is_match(&ty.name),
            TypeCheck::HaveFullName(full) => ty.full_name == *full,
            TypeCheck::ResideInNamespace(ns) => in_namespace(&ty.namespace, ns),
            TypeCheck::ResideInNamespaceMatching(p) => p.is_match(&ty.namespace),
            TypeCheck::ResideInNamespaceStartingWith(prefix) => {
                ty.namespace.starts_with(prefix.as_str())
            }
            TypeCheck::ResideInNamespaceEndingWith(suffix) => {
                ty.namespace.ends_with(suffix.as_str())
            }
            TypeCheck::HaveCustomAttribute(attr) => {
                let wanted = normalize_type_name(attr);
                ty.attributes
                    .iter()
                    .any(|a| normalize_type_name(a) == wanted)
            }
            TypeCheck::Inherit(base) => inherits(ty, base, catalog),
            TypeCheck::ImplementInterface(iface) => implements(ty, iface, catalog),
            TypeCheck::HaveKind(kind) => ty.kind == *kind,
            TypeCheck::AreAbstract => ty.is_abstract,
            TypeCheck::AreSealed => ty.is_sealed,
            TypeCheck::ArePublic => ty.is_public,
            TypeCheck::AreStatic => ty.is_static,
            TypeCheck::AreNested => ty.is_nested(),
            TypeCheck::AreGeneric => ty.is_generic(),
            TypeCheck::AreImmutable => {
                ty.fields.iter().all(|f| f.is_readonly)
                    && ty.properties.iter().all(|p| !p.has_public_setter)
            }
            TypeCheck::HaveDependency(check) => check.matches(ty),
            TypeCheck::MeetCustomRule(rule) => rule.test(ty),
        }
    }

    /// Human-readable description, phrased to follow "types that ..." or "should ...".
    pub fn describe(&self) -> String {
        match self {
            TypeCheck::HaveName(v) => format!("have name '{v}'"),
            TypeCheck::HaveNameStartingWith(v) => format!("have name starting with '{v}'"),
            TypeCheck::HaveNameEndingWith(v) => format!("have name ending with '{v}'"),
            TypeCheck::HaveNameMatching(p) => format!("have name matching /{}/", p.as_str()),
            TypeCheck::HaveFullName(v) => format!("have full name '{v}'"),
            TypeCheck::ResideInNamespace(v) => format!("reside in namespace '{v}'"),
            TypeCheck::ResideInNamespaceMatching(p) => {
                format!("reside in namespace matching /{}/", p.as_str())
            }
            TypeCheck::ResideInNamespaceStartingWith(v) => {
                format!("reside in namespace starting with '{v}'")
            }
            TypeCheck::ResideInNamespaceEndingWith(v) => {
                format!("reside in namespace ending with '{v}'")
            }
            TypeCheck::HaveCustomAttribute(v) => format!("have attribute '{v}'"),
            TypeCheck::Inherit(v) => format!("inherit '{v}'"),
            TypeCheck::ImplementInterface(v) => format!("implement interface '{v}'"),
            TypeCheck::HaveKind(kind) => match kind {
                TypeKind::Class => "be classes".to_string(),
                TypeKind::Interface => "be interfaces".to_string(),
                TypeKind::Struct => "be structs".to_string(),
                TypeKind::Enum => "be enums".to_string(),
                TypeKind::Delegate => "be delegates".to_string(),
            },
            TypeCheck::AreAbstract => "be abstract".to_string(),
            TypeCheck::AreSealed => "be sealed".to_string(),
            TypeCheck::ArePublic => "be public".to_string(),
            TypeCheck::AreStatic => "be static".to_string(),
            TypeCheck::AreNested => "be nested".to_string(),
            TypeCheck::AreGeneric => "be generic".to_string(),
            TypeCheck::AreImmutable => "be immutable".to_string(),
            TypeCheck::HaveDependency(check) => check.describe(),
            TypeCheck::MeetCustomRule(rule) => rule.description().to_string(),
        }
    }
}

fn inherits(ty: &TypeDescriptor, base: &str, catalog: &TypeCatalog) -> bool {
    let wanted = normalize_type_name(base);
    let mut seen = BTreeSet::new();
    let mut current = ty.base_type.as_ref().map(|b| b.name.clone());

    while let Some(name) = current {
        if normalize_type_name(&name) == wanted {
            return true;
        }
        if !seen.insert(name.clone()) {
            break;
        }
        current = catalog
            .get(&name)
            .and_then(|parent| parent.base_type.as_ref())
            .map(|b| b.name.clone());
    }
    false
}

fn implements(ty: &TypeDescriptor, iface: &str, catalog: &TypeCatalog) -> bool {
    let wanted = normalize_type_name(iface);
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();

    let enqueue_parents = |t: &TypeDescriptor, queue: &mut VecDeque<String>| {
        queue.extend(t.interfaces.iter().map(|i| i.name.clone()));
        if let Some(b) = &t.base_type {
            queue.push_back(b.name.clone());
        }
    };

    enqueue_parents(ty, &mut queue);
    while let Some(name) = queue.pop_front() {
        if !seen.insert(name.clone()) {
            continue;
        }
        let resolved = catalog.get(&name);
        let is_interface = resolved.is_none_or(TypeDescriptor::is_interface);
        if is_interface && normalize_type_name(&name) == wanted {
            return true;
        }
        if let Some(parent) = resolved {
            enqueue_parents(parent, &mut queue);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use archguard_types::{FieldDescriptor, PropertyDescriptor, TypeRef};

    fn class(full: &str, base: Option<&str>, interfaces: &[&str]) -> TypeDescriptor {
        let mut ty = TypeDescriptor::new(full);
        ty.base_type = base.map(TypeRef::new);
        ty.interfaces = interfaces.iter().map(|i| TypeRef::new(*i)).collect();
        ty
    }

    fn interface(full: &str, bases: &[&str]) -> TypeDescriptor {
        let mut ty = class(full, None, bases);
        ty.kind = TypeKind::Interface;
        ty
    }

    fn catalog() -> TypeCatalog {
        TypeCatalog::new(vec![
            interface("App.Core.IEntity", &[]),
            interface("App.Core.IAggregate", &["App.Core.IEntity"]),
            class("App.Core.EntityBase", Some("System.Object"), &["App.Core.IAggregate"]),
            class("App.Orders.Order", Some("App.Core.EntityBase"), &[]),
            class("App.Loop.A", Some("App.Loop.B"), &[]),
            class("App.Loop.B", Some("App.Loop.A"), &[]),
        ])
    }

    #[test]
    fn inherit_follows_catalog_chain() {
        let cat = catalog();
        let order = cat.get("App.Orders.Order").expect("order");
        assert!(TypeCheck::Inherit("App.Core.EntityBase".into()).matches(order, &cat));
        assert!(TypeCheck::Inherit("System.Object".into()).matches(order, &cat));
        assert!(!TypeCheck::Inherit("App.Core.IEntity".into()).matches(order, &cat));
    }

    #[test]
    fn inherit_terminates_on_cycles() {
        let cat = catalog();
        let a = cat.get("App.Loop.A").expect("a");
        assert!(!TypeCheck::Inherit("App.Nowhere".into()).matches(a, &cat));
    }

    #[test]
    fn implement_interface_sees_inherited_and_extended_interfaces() {
        let cat = catalog();
        let order = cat.get("App.Orders.Order").expect("order");
        assert!(TypeCheck::ImplementInterface("App.Core.IAggregate".into()).matches(order, &cat));
        assert!(TypeCheck::ImplementInterface("App.Core.IEntity".into()).matches(order, &cat));
        assert!(
            !TypeCheck::ImplementInterface("App.Core.EntityBase".into()).matches(order, &cat),
            "base classes are not interfaces"
        );
    }

    #[test]
    fn implement_interface_accepts_external_names() {
        let cat = TypeCatalog::empty();
        let ty = class("App.Web.Handler", None, &["System.IDisposable"]);
        assert!(TypeCheck::ImplementInterface("System.IDisposable".into()).matches(&ty, &cat));
    }

    #[test]
    fn immutability_requires_readonly_fields_and_no_public_setters() {
        let cat = TypeCatalog::empty();
        let mut ty = TypeDescriptor::new("App.Core.Money");
        ty.fields = vec![FieldDescriptor {
            name: "amount".into(),
            field_type: TypeRef::new("System.Decimal"),
            is_readonly: true,
            ..FieldDescriptor::default()
        }];
        ty.properties = vec![PropertyDescriptor {
            name: "Amount".into(),
            property_type: TypeRef::new("System.Decimal"),
            has_public_setter: false,
            ..PropertyDescriptor::default()
        }];
        assert!(TypeCheck::AreImmutable.matches(&ty, &cat));

        ty.properties[0].has_public_setter = true;
        assert!(!TypeCheck::AreImmutable.matches(&ty, &cat));
    }

    #[test]
    fn namespace_and_name_checks() {
        let cat = TypeCatalog::empty();
        let ty = TypeDescriptor::new("App.Data.Sql.OrderRepository");
        assert!(TypeCheck::ResideInNamespace("App.Data".into()).matches(&ty, &cat));
        assert!(!TypeCheck::ResideInNamespace("App.Dat".into()).matches(&ty, &cat));
        assert!(TypeCheck::ResideInNamespaceStartingWith("App.Dat".into()).matches(&ty, &cat));
        assert!(TypeCheck::ResideInNamespaceEndingWith(".Sql".into()).matches(&ty, &cat));
        assert!(TypeCheck::HaveNameEndingWith("Repository".into()).matches(&ty, &cat));
        let p = Pattern::new("^Order").expect("regex");
        assert!(TypeCheck::HaveNameMatching(p).matches(&ty, &cat));
    }

    #[test]
    fn custom_rules_carry_descriptions() {
        let rule = CustomRule::new("have short names", |t| t.name.len() < 8);
        let check = TypeCheck::MeetCustomRule(rule);
        assert_eq!(check.describe(), "have short names");
        assert!(check.matches(&TypeDescriptor::new("App.Tiny"), &TypeCatalog::empty()));
    }
}
