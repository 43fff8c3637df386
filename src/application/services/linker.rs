//! Tree walking and package linking
//!
//! Walks the dependency tree depth-first, deduplicates at folder level,
//! and links each root-level package into the output registry directory
//! exactly once. Whatever already occupies a target path stays in place.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{is_root_package, plan_link, LinkPlan, ModuleArena, ModuleKind};
use crate::infrastructure::traits::{FileSystem, PathState};

/// Outcome of one linking run.
#[derive(Debug, Clone)]
pub struct LinkReport {
    /// Links created during this run, in walk order
    pub created: Vec<LinkPlan>,
    /// Planned links skipped because the target path was occupied
    pub skipped: usize,
}

/// Accumulator threaded through one walk.
#[derive(Debug, Default)]
struct RunState {
    /// Module folders already inspected; repeat visits skip
    /// classification but never recursion
    visited_folders: HashSet<PathBuf>,
    /// Package names already handled, whatever the outcome
    linked_names: HashSet<String>,
    created: Vec<LinkPlan>,
    skipped: usize,
}

/// Service linking root-level packages beneath an output directory.
pub struct LinkService {
    fs: Arc<dyn FileSystem>,
    registry_dir: String,
    ignore: HashSet<String>,
}

impl LinkService {
    /// Create a new link service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: &Settings) -> Self {
        Self {
            fs,
            registry_dir: settings.registry_dir.clone(),
            ignore: settings.ignore.iter().cloned().collect(),
        }
    }

    /// Link every reachable root-level package beneath `output`.
    ///
    /// Creates the registry directory up front, then walks the tree.
    /// Occupied targets are skipped silently; the first occupant wins.
    #[instrument(level = "debug", skip(self, arena))]
    pub fn link_tree(&self, arena: &ModuleArena, output: &Path) -> ApplicationResult<LinkReport> {
        let registry_root = output.join(&self.registry_dir);
        self.fs
            .create_dir_all(&registry_root)
            .with_path_context("create registry dir", &registry_root)?;

        let mut state = RunState::default();
        self.walk_roots(arena, &mut state, Some(output))?;

        debug!(
            "link_tree: {} created, {} skipped",
            state.created.len(),
            state.skipped
        );
        Ok(LinkReport {
            created: state.created,
            skipped: state.skipped,
        })
    }

    /// Compute the link plans for a tree without touching the output.
    pub fn plan_tree(&self, arena: &ModuleArena) -> ApplicationResult<Vec<LinkPlan>> {
        let mut state = RunState::default();
        self.walk_roots(arena, &mut state, None)?;
        Ok(state.created)
    }

    fn walk_roots(
        &self,
        arena: &ModuleArena,
        state: &mut RunState,
        output: Option<&Path>,
    ) -> ApplicationResult<()> {
        let root = match arena.root().and_then(|index| arena.get_node(index)) {
            Some(node) => node,
            None => return Ok(()),
        };
        // the entry module itself is never a link candidate; start at
        // its imports
        for &child in &root.children {
            self.walk(arena, child, state, output)?;
        }
        Ok(())
    }

    fn walk(
        &self,
        arena: &ModuleArena,
        index: Index,
        state: &mut RunState,
        output: Option<&Path>,
    ) -> ApplicationResult<()> {
        let node = match arena.get_node(index) {
            Some(node) => node,
            None => return Ok(()),
        };

        let path = match &node.data.kind {
            ModuleKind::Core => {
                debug!("walk: {} is runtime-provided, stopping", node.data.identifier);
                return Ok(());
            }
            ModuleKind::External { path, .. } => path,
        };

        if self.ignore.contains(&node.data.identifier) {
            debug!("walk: {} is ignored, stopping", node.data.identifier);
            return Ok(());
        }

        let folder = self.fs.owning_folder(path);
        if state.visited_folders.insert(folder.clone())
            && is_root_package(&folder, &self.registry_dir)
        {
            if let Some(plan) = plan_link(&folder, &self.registry_dir) {
                self.apply(plan, state, output)?;
            }
        }

        // recurse even when the folder was visited before: a nested copy
        // may be the only route to packages still missing at the root
        for &child in &node.children {
            self.walk(arena, child, state, output)?;
        }
        Ok(())
    }

    fn apply(
        &self,
        plan: LinkPlan,
        state: &mut RunState,
        output: Option<&Path>,
    ) -> ApplicationResult<()> {
        if !state.linked_names.insert(plan.package_name.clone()) {
            debug!("apply: {} already handled", plan.package_name);
            return Ok(());
        }

        let output = match output {
            Some(output) => output,
            None => {
                // dry run: record the plan as if the target were free
                state.created.push(plan);
                return Ok(());
            }
        };

        let target = output.join(&plan.target);
        match self.fs.probe(&target) {
            PathState::Absent => {
                self.fs
                    .link_or_copy(&plan.source, &target)
                    .with_path_context("link package", &target)?;
                debug!(
                    "apply: {} -> {}",
                    plan.target.display(),
                    plan.source.display()
                );
                state.created.push(plan);
            }
            PathState::Dir => {
                debug!("apply: {} already present", plan.target.display());
                state.skipped += 1;
            }
            PathState::Other => {
                warn!(
                    "apply: {} exists but is not a package directory, leaving it in place",
                    target.display()
                );
                state.skipped += 1;
            }
        }
        Ok(())
    }
}
