//! gemsort-lib: Gemfile capture and canonical regeneration
//!
//! This crate provides the pipeline behind the `gemsort` command:
//! - `dsl`: restricted Gemfile lexer and parser (no code is evaluated)
//! - `capture`: records `source`, `ruby`, `gem` and `group` statements
//! - `Manifest`: sources, ruby pins and gems bucketed by group
//! - `regroup`: sorts gems by name and puts the default group first
//! - `render`: writes the canonical Gemfile text
//! - `reorganize`: the end-to-end pipeline plus atomic file writes

pub mod capture;
pub mod dsl;
pub mod manifest;
pub mod regroup;
pub mod render;
pub mod reorganize;

pub use dsl::ParseError;
pub use manifest::Manifest;
pub use reorganize::{Reorganized, ReorganizeError, reorganize, reorganize_file, write_manifest};
