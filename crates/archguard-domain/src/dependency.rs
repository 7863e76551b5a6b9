//! Structural dependency resolution.
//!
//! A type depends on a target when the target appears in the type's own reference set: its
//! base type, interfaces, generic constraints, attributes, member signatures, method locals and
//! body references. Resolution is single hop. A type that depends on something that depends on
//! the target does not itself depend on the target.
//!
//! References do not need to resolve to a type in the catalog. An external name still matches
//! a target if the name or its namespace fits.

use archguard_types::{TypeDescriptor, TypeRef, namespace_of};
use std::collections::BTreeSet;
use std::fmt;

/// What a dependency check looks for.
///
/// Targets are typed so that a string naming both a namespace and a type resolves the same way
/// every time.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependencyTarget {
    /// References whose namespace equals this one or is nested under it.
    Namespace(String),
    /// References to exactly this type.
    Type(String),
    /// Untyped string: an exact type match is checked first, then a namespace match.
    Name(String),
}

impl DependencyTarget {
    pub fn namespace(ns: impl Into<String>) -> Self {
        DependencyTarget::Namespace(ns.into())
    }

    pub fn type_name(full_name: impl Into<String>) -> Self {
        DependencyTarget::Type(full_name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            DependencyTarget::Namespace(s)
            | DependencyTarget::Type(s)
            | DependencyTarget::Name(s) => s,
        }
    }

    /// `reference` must already be normalized (see [`normalize_type_name`]).
    pub fn matches(&self, reference: &str) -> bool {
        match self {
            DependencyTarget::Namespace(ns) => in_namespace(namespace_of(reference), ns),
            DependencyTarget::Type(full) => reference == normalize_type_name(full),
            DependencyTarget::Name(s) => {
                reference == normalize_type_name(s) || in_namespace(namespace_of(reference), s)
            }
        }
    }
}

impl From<&str> for DependencyTarget {
    fn from(value: &str) -> Self {
        DependencyTarget::Name(value.to_string())
    }
}

impl From<String> for DependencyTarget {
    fn from(value: String) -> Self {
        DependencyTarget::Name(value)
    }
}

impl fmt::Display for DependencyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyTarget::Namespace(s) => write!(f, "namespace '{s}'"),
            DependencyTarget::Type(s) => write!(f, "type '{s}'"),
            DependencyTarget::Name(s) => write!(f, "'{s}'"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
    /// At least one reference matches at least one target.
    Any,
    /// Every target is matched by at least one reference.
    All,
    /// Every reference other than the type itself matches some target.
    Only,
}

/// A dependency test over a single type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyCheck {
    pub targets: Vec<DependencyTarget>,
    pub mode: MatchMode,
    /// Ignore the type's reference to itself. Always on for [`MatchMode::Only`].
    pub exclude_self: bool,
}

impl DependencyCheck {
    pub fn new<I, T>(targets: I, mode: MatchMode) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DependencyTarget>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            mode,
            exclude_self: false,
        }
    }

    pub fn any<I, T>(targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DependencyTarget>,
    {
        Self::new(targets, MatchMode::Any)
    }

    pub fn all<I, T>(targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DependencyTarget>,
    {
        Self::new(targets, MatchMode::All)
    }

    pub fn only<I, T>(targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DependencyTarget>,
    {
        Self::new(targets, MatchMode::Only)
    }

    pub fn excluding_self(mut self) -> Self {
        self.exclude_self = true;
        self
    }

    pub fn matches(&self, ty: &TypeDescriptor) -> bool {
        let refs = considered_references(ty, self.exclude_self || self.mode == MatchMode::Only);
        match self.mode {
            MatchMode::Any => refs
                .iter()
                .any(|r| self.targets.iter().any(|t| t.matches(r))),
            MatchMode::All => {
                !self.targets.is_empty()
                    && self
                        .targets
                        .iter()
                        .all(|t| refs.iter().any(|r| t.matches(r)))
            }
            MatchMode::Only => refs
                .iter()
                .all(|r| self.targets.iter().any(|t| t.matches(r))),
        }
    }

    pub fn describe(&self) -> String {
        let targets = self
            .targets
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let head = match (self.mode, self.targets.len()) {
            (MatchMode::Any, 1) => format!("have a dependency on {targets}"),
            (MatchMode::Any, _) => format!("have a dependency on any of [{targets}]"),
            (MatchMode::All, _) => format!("have a dependency on all of [{targets}]"),
            (MatchMode::Only, _) => format!("only have dependencies on [{targets}]"),
        };
        if self.exclude_self && self.mode != MatchMode::Only {
            format!("{head} (excluding itself)")
        } else {
            head
        }
    }
}

/// Does `ty` mention any of `targets` in its own signature or body? The type's reference to
/// itself counts.
pub fn depends_on(ty: &TypeDescriptor, targets: &[DependencyTarget]) -> bool {
    DependencyCheck::any(targets.iter().cloned()).matches(ty)
}

/// References of `ty` that match at least one target, in sorted order.
pub fn matching_references(
    ty: &TypeDescriptor,
    targets: &[DependencyTarget],
    exclude_self: bool,
) -> Vec<String> {
    considered_references(ty, exclude_self)
        .into_iter()
        .filter(|r| targets.iter().any(|t| t.matches(r)))
        .collect()
}

fn considered_references(ty: &TypeDescriptor, exclude_self: bool) -> BTreeSet<String> {
    let mut refs = references(ty);
    if exclude_self {
        refs.remove(normalize_type_name(&ty.full_name).as_str());
    }
    refs
}

/// The reference set of a type: every normalized type name its definition mentions, including
/// its own name.
///
/// Generic parameter names declared by the type (or by the method in scope) are not references.
pub fn references(ty: &TypeDescriptor) -> BTreeSet<String> {
    let type_params: BTreeSet<&str> = ty
        .generic_parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    let mut c = Collector {
        out: BTreeSet::new(),
    };

    c.out.insert(normalize_type_name(&ty.full_name));

    if let Some(base) = &ty.base_type {
        c.add_ref(base, &type_params);
    }
    for iface in &ty.interfaces {
        c.add_ref(iface, &type_params);
    }
    for param in &ty.generic_parameters {
        for constraint in &param.constraints {
            c.add_ref(constraint, &type_params);
        }
    }
    for attr in &ty.attributes {
        c.add_name(attr, &type_params);
    }

    for field in &ty.fields {
        c.add_ref(&field.field_type, &type_params);
        for attr in &field.attributes {
            c.add_name(attr, &type_params);
        }
    }
    for prop in &ty.properties {
        c.add_ref(&prop.property_type, &type_params);
        for attr in &prop.attributes {
            c.add_name(attr, &type_params);
        }
    }

    for method in &ty.methods {
        let mut scope = type_params.clone();
        scope.extend(method.generic_parameters.iter().map(|p| p.name.as_str()));

        for param in &method.generic_parameters {
            for constraint in &param.constraints {
                c.add_ref(constraint, &scope);
            }
        }
        if let Some(ret) = &method.return_type {
            c.add_ref(ret, &scope);
        }
        for p in &method.parameters {
            c.add_ref(&p.parameter_type, &scope);
        }
        for local in &method.locals {
            c.add_ref(local, &scope);
        }
        for body_ref in &method.body_references {
            c.add_ref(body_ref, &scope);
        }
        for attr in &method.attributes {
            c.add_name(attr, &scope);
        }
    }

    c.out
}

struct Collector {
    out: BTreeSet<String>,
}

impl Collector {
    fn add_ref(&mut self, r: &TypeRef, generic_scope: &BTreeSet<&str>) {
        self.add_name(&r.name, generic_scope);
        for arg in &r.arguments {
            self.add_ref(arg, generic_scope);
        }
    }

    fn add_name(&mut self, name: &str, generic_scope: &BTreeSet<&str>) {
        let normalized = normalize_type_name(name);
        if normalized.is_empty() || generic_scope.contains(normalized.as_str()) {
            return;
        }
        self.out.insert(normalized);
    }
}

/// Strip decorations that do not change which type is referenced: array (`[]`, `[,]`), by-ref
/// (`&`) and pointer (`*`) suffixes, and generic arity markers (`` `1 ``).
pub fn normalize_type_name(name: &str) -> String {
    let mut s = name.trim();
    loop {
        let before = s.len();
        s = s.trim_end_matches(['&', '*']);
        if s.ends_with(']')
            && let Some(open) = s.rfind('[')
            && s[open + 1..s.len() - 1].chars().all(|c| c == ',')
        {
            s = &s[..open];
        }
        if s.len() == before {
            break;
        }
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '`' {
            while chars.peek().is_some_and(|c| c.is_ascii_digit() || *c == '`') {
                chars.next();
            }
            continue;
        }
        out.push(ch);
    }
    out
}

/// Is `candidate` equal to `target` or nested under it? Segment aware: `App.Data` does not
/// contain `App.DataAccess`. The empty namespace contains everything.
pub fn in_namespace(candidate: &str, target: &str) -> bool {
    if target.is_empty() {
        return true;
    }
    match candidate.strip_prefix(target) {
        Some("") => true,
        Some(rest) => rest.starts_with('.'),
        None => false,
    }
}
