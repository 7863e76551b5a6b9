//! Use case orchestration for archguard.
//!
//! This crate provides the application layer: use cases that coordinate the settings, catalog,
//! domain, and render layers. It is intentionally thin and delegates heavy lifting to them.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod check;
mod render;
mod report;

pub use check::{CheckInput, CheckOutput, build_policies, run_check, verdict_exit_code};
pub use render::{render_annotations, render_markdown};
pub use report::{parse_report_json, runtime_error_report, serialize_report, to_renderable};
