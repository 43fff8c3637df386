//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent resolution failures in the dependency graph.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("cannot find module '{identifier}' required from {}", requester.display())]
    ModuleNotFound {
        identifier: String,
        requester: PathBuf,
    },
}
