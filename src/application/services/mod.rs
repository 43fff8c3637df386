//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod graph;
mod linker;
mod resolver;

pub use graph::GraphService;
pub use linker::{LinkReport, LinkService};
pub use resolver::NodeResolver;
