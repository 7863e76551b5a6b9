//! Stable DTOs and IDs used across the archguard workspace.
//!
//! This crate is intentionally boring:
//! - the type catalog model consumed by the rule engine
//! - data types for the emitted report
//! - stable string IDs and codes
//! - canonical repo-relative path handling

#![forbid(unsafe_code)]

pub mod catalog;
pub mod ids;
pub mod path;
pub mod receipt;

pub use catalog::{
    FieldDescriptor, GenericParameter, MethodDescriptor, ModuleCatalog, ParameterDescriptor,
    PropertyDescriptor, TypeDescriptor, TypeKind, TypeRef, namespace_of, simple_name_of,
};
pub use path::RepoPath;
pub use receipt::{
    ArchguardData, ArchguardReport, Finding, Location, PolicyOutcome, RuleOutcome,
    SCHEMA_REPORT_V1, Severity, ToolMeta, Verdict, VerdictCounts,
};
