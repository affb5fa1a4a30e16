//! treepath-core library.
//!
//! Finds the first node of a forest that satisfies a predicate, in pre-order,
//! and returns it together with its root-to-node ancestor path.
//!
//! - [`search`]: the traversal, for typed nodes and accessor closures.
//! - [`value`]: the same traversal over `serde_json::Value` trees keyed by a
//!   configurable children field.
//! - [`matcher`]: `FIELD OP VALUE` predicates for JSON-shaped nodes.
//! - [`decode`]: JSON/YAML/TOML input decoding.
//! - [`config`]: project and user configuration.
//! - [`error`]: error types and codes.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums in library modules, `anyhow::Result` for
//!   config loading and binaries.
//! - **Logging**: Use `tracing` macros (`debug!`, `trace!`); never print.

pub mod config;
pub mod decode;
pub mod error;
pub mod matcher;
pub mod search;
pub mod value;

pub use search::{FoundPath, TreeNode, find_path, find_path_by, try_find_path, try_find_path_by};
pub use value::{DEFAULT_CHILDREN_KEY, SearchOptions, find_in_value, find_in_value_default};
