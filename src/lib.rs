//! Links the transitive dependency closure of a JavaScript entry file into a
//! minimal, deduplicated `node_modules` tree.
//!
//! Starting from an entry module, the graph service scans sources for
//! `require`/`import` specifiers, resolves each one within the scope of the
//! requiring package, and builds an arena-backed dependency tree. The link
//! service walks that tree and links every root-level package beneath the
//! output directory exactly once, preferring symlinks and falling back to
//! copies where the platform demands it.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
