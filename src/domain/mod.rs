//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod classify;
pub mod entities;
pub mod error;

pub use arena::{ModuleArena, ModuleNode};
pub use classify::{is_root_package, plan_link, registry_occurrences, LinkPlan};
pub use entities::*;
pub use error::DomainError;
