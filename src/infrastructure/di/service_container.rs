//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{GraphService, LinkService, NodeResolver};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Scoped identifier resolution
    pub resolver: Arc<NodeResolver>,

    /// Dependency tree extraction
    pub graph: Arc<GraphService>,

    /// Tree walking and package linking
    pub linker: Arc<LinkService>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let resolver = Arc::new(NodeResolver::new(fs.clone(), &settings));
        let graph = Arc::new(GraphService::new(fs.clone(), resolver.clone(), &settings));
        let linker = Arc::new(LinkService::new(fs.clone(), &settings));

        Self {
            settings,
            fs,
            resolver,
            graph,
            linker,
        }
    }
}
