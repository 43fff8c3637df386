//! Domain entities: module identifiers and dependency-node payloads

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Node.js built-in module names. Kept sorted for binary search.
/// Slash-qualified submodules ("fs/promises") match on their first segment.
pub const CORE_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Whether an identifier names a runtime-provided module.
/// Any non-empty `node:` prefixed identifier is core by definition.
pub fn is_core_module(identifier: &str) -> bool {
    if let Some(rest) = identifier.strip_prefix("node:") {
        return !rest.is_empty();
    }
    let head = identifier.split('/').next().unwrap_or(identifier);
    CORE_MODULES.binary_search(&head).is_ok()
}

/// What a dependency node points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleKind {
    /// Runtime-provided module; traversal stops here
    Core,
    /// Module resolved to a file on disk
    External {
        /// Canonical path of the resolved module file
        path: PathBuf,
        /// True when the file was already extracted elsewhere in the tree.
        /// Repeats carry no children, which keeps the tree finite across
        /// shared and circular dependencies.
        repeat: bool,
    },
}

/// Payload of one node in the dependency tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleData {
    /// Import specifier as written in the requiring source
    pub identifier: String,
    pub kind: ModuleKind,
}

impl ModuleData {
    pub fn core(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind: ModuleKind::Core,
        }
    }

    pub fn external(identifier: impl Into<String>, path: PathBuf) -> Self {
        Self {
            identifier: identifier.into(),
            kind: ModuleKind::External {
                path,
                repeat: false,
            },
        }
    }

    pub fn repeat(identifier: impl Into<String>, path: PathBuf) -> Self {
        Self {
            identifier: identifier.into(),
            kind: ModuleKind::External { path, repeat: true },
        }
    }

    pub fn is_core(&self) -> bool {
        matches!(self.kind, ModuleKind::Core)
    }

    /// Resolved path for external modules, None for core ones.
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            ModuleKind::External { path, .. } => Some(path),
            ModuleKind::Core => None,
        }
    }
}

impl fmt::Display for ModuleData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)
    }
}

/// Subset of a package manifest consulted during directory resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    /// Relative entry point, resolved against the package directory
    pub main: Option<String>,
}

impl PackageManifest {
    /// Parse manifest JSON. Unknown fields are ignored; callers treat a
    /// malformed manifest as having no `main`.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}
