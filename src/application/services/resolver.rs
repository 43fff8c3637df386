//! Node-style module resolution, scoped to the requesting package
//!
//! Bare identifiers are looked up through the registry-directory chain of
//! the requesting file's ancestors, narrowed so the search starts inside
//! the requester's own folder. Relative identifiers resolve against the
//! requester's folder directly.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{DomainError, PackageManifest};
use crate::infrastructure::traits::FileSystem;
use crate::util::path::PathExt;

/// Service resolving import identifiers to absolute module files.
pub struct NodeResolver {
    fs: Arc<dyn FileSystem>,
    registry_dir: String,
    extensions: Vec<String>,
}

impl NodeResolver {
    /// Create a new resolver.
    pub fn new(fs: Arc<dyn FileSystem>, settings: &Settings) -> Self {
        Self {
            fs,
            registry_dir: settings.registry_dir.clone(),
            extensions: settings.extensions.clone(),
        }
    }

    /// Resolve `identifier` as required from the module file `requester`.
    ///
    /// Returns the canonical path of the resolved file. A miss across all
    /// candidates is a hard error; the caller decides whether to abort.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&self, identifier: &str, requester: &Path) -> ApplicationResult<PathBuf> {
        let scope = self.fs.owning_folder(requester);

        let found = if is_relative(identifier) {
            self.find_in(&scope, identifier)
        } else if Path::new(identifier).is_absolute() {
            let target = Path::new(identifier);
            self.probe_file(target).or_else(|| self.probe_dir(target))
        } else {
            // lookup_paths already starts inside the requester's scope, so
            // narrowing only cuts candidates when the list comes from a
            // source that prepends ancestor or global paths
            let candidates = Self::narrow_to_scope(self.lookup_paths(&scope), &scope);
            candidates
                .iter()
                .find_map(|candidate| self.find_in(candidate, identifier))
        };

        match found {
            Some(path) => {
                let resolved = self
                    .fs
                    .canonicalize(&path)
                    .with_path_context("canonicalize resolved module", &path)?;
                debug!("resolve: {} -> {}", identifier, resolved.display());
                Ok(resolved)
            }
            None => Err(DomainError::ModuleNotFound {
                identifier: identifier.to_string(),
                requester: requester.to_path_buf(),
            }
            .into()),
        }
    }

    /// Registry candidates for a bare identifier, nearest ancestor first.
    /// Ancestors that are themselves a registry directory contribute no
    /// candidate of their own.
    fn lookup_paths(&self, scope: &Path) -> Vec<PathBuf> {
        let registry = OsStr::new(&self.registry_dir);
        scope
            .ancestors()
            .filter(|ancestor| ancestor.file_name() != Some(registry))
            .map(|ancestor| ancestor.join(&self.registry_dir))
            .collect()
    }

    /// Drop leading candidates that lie outside the requester's own
    /// folder. The remainder keeps its order, so a lookup still climbs
    /// past the scope once the nearer candidates miss.
    fn narrow_to_scope(candidates: Vec<PathBuf>, scope: &Path) -> Vec<PathBuf> {
        match candidates.iter().position(|c| c.starts_with(scope)) {
            Some(first) => candidates[first..].to_vec(),
            None => Vec::new(),
        }
    }

    fn find_in(&self, base: &Path, identifier: &str) -> Option<PathBuf> {
        let target = base.join(identifier);
        self.probe_file(&target).or_else(|| self.probe_dir(&target))
    }

    /// Try `path` as a file: exact name first, then with each configured
    /// extension appended.
    fn probe_file(&self, path: &Path) -> Option<PathBuf> {
        if self.fs.is_file(path) {
            return Some(path.to_path_buf());
        }
        self.extensions
            .iter()
            .map(|ext| path.with_appended(ext))
            .find(|candidate| self.fs.is_file(candidate))
    }

    /// Try `path` as a package directory: the manifest's `main` entry
    /// when present and resolvable, then index files.
    fn probe_dir(&self, dir: &Path) -> Option<PathBuf> {
        if !self.fs.is_dir(dir) {
            return None;
        }
        if let Some(main) = self.manifest_main(dir) {
            let entry = dir.join(&main);
            if let Some(hit) = self.probe_file(&entry).or_else(|| self.probe_index(&entry)) {
                return Some(hit);
            }
        }
        self.probe_index(dir)
    }

    /// `main` field of the package manifest, when the directory carries a
    /// readable one. Unreadable or malformed manifests fall through to
    /// index resolution.
    fn manifest_main(&self, dir: &Path) -> Option<String> {
        let manifest_path = dir.join("package.json");
        if !self.fs.is_file(&manifest_path) {
            return None;
        }
        let content = self.fs.read_to_string(&manifest_path).ok()?;
        PackageManifest::parse(&content).ok()?.main
    }

    fn probe_index(&self, dir: &Path) -> Option<PathBuf> {
        self.extensions
            .iter()
            .map(|ext| dir.join(format!("index{ext}")))
            .find(|candidate| self.fs.is_file(candidate))
    }
}

/// Whether an identifier addresses the requester's own folder instead of
/// a registry package. A bare leading dot ("dotenv"-style hidden names)
/// does not count.
fn is_relative(identifier: &str) -> bool {
    identifier == "."
        || identifier == ".."
        || identifier.starts_with("./")
        || identifier.starts_with("../")
}
