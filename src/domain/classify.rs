//! Registry-path classification and link planning
//!
//! A package is root-level when its path crosses the registry directory
//! ("node_modules") exactly once. Only root-level packages are linked into
//! the output tree; nested copies stay reachable through whichever parent
//! package carries them.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Count path components equal to the registry directory name.
/// Only whole components count, so "node_modules_backup" never matches.
pub fn registry_occurrences(path: &Path, registry_dir: &str) -> usize {
    let registry = OsStr::new(registry_dir);
    path.components()
        .filter(|component| matches!(component, Component::Normal(name) if *name == registry))
        .count()
}

/// Whether `folder` is the install location of a top-level package.
pub fn is_root_package(folder: &Path, registry_dir: &str) -> bool {
    registry_occurrences(folder, registry_dir) == 1
}

/// Planned link for one root-level package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPlan {
    /// First path segment after the registry directory
    pub package_name: String,
    /// Absolute package folder the link points at
    pub source: PathBuf,
    /// Link location, relative to the output directory
    pub target: PathBuf,
}

/// Compute the link plan for a module folder.
///
/// Splits the path at its first registry segment: everything up to and
/// including the following segment is the package folder to link, and the
/// link lands at `<registry_dir>/<package_name>`. Returns `None` for paths
/// that never cross the registry directory (entry-project modules) or that
/// end directly on it.
pub fn plan_link(folder: &Path, registry_dir: &str) -> Option<LinkPlan> {
    let registry = OsStr::new(registry_dir);
    let mut components = folder.components();
    let mut source = PathBuf::new();

    loop {
        let component = components.next()?;
        source.push(component);
        if matches!(component, Component::Normal(name) if name == registry) {
            break;
        }
    }

    let package_name = match components.next()? {
        Component::Normal(name) => name.to_string_lossy().into_owned(),
        _ => return None,
    };
    source.push(&package_name);

    Some(LinkPlan {
        target: Path::new(registry_dir).join(&package_name),
        source,
        package_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/app/src/index.js", 0)]
    #[case("/app/node_modules/left-pad", 1)]
    #[case("/app/node_modules/a/node_modules/b", 2)]
    #[case("/app/node_modules_backup/x", 0)]
    fn given_path_when_counting_registry_segments_then_whole_components_match(
        #[case] path: &str,
        #[case] expected: usize,
    ) {
        assert_eq!(
            registry_occurrences(Path::new(path), "node_modules"),
            expected
        );
    }

    #[rstest]
    #[case("/app/node_modules/left-pad", true)]
    #[case("/app/node_modules/left-pad/lib", true)]
    #[case("/app/node_modules/a/node_modules/b", false)]
    #[case("/app/lib", false)]
    fn given_folder_when_classifying_then_root_iff_single_segment(
        #[case] folder: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_root_package(Path::new(folder), "node_modules"), expected);
    }

    #[test]
    fn given_folder_inside_package_when_planning_then_links_package_root() {
        let plan =
            plan_link(Path::new("/app/node_modules/left-pad/lib"), "node_modules").expect("plan");

        assert_eq!(plan.package_name, "left-pad");
        assert_eq!(plan.source, Path::new("/app/node_modules/left-pad"));
        assert_eq!(plan.target, Path::new("node_modules/left-pad"));
    }

    #[test]
    fn given_scoped_package_when_planning_then_scope_directory_is_the_unit() {
        let plan = plan_link(Path::new("/app/node_modules/@scope/pkg"), "node_modules")
            .expect("plan");

        assert_eq!(plan.package_name, "@scope");
        assert_eq!(plan.source, Path::new("/app/node_modules/@scope"));
        assert_eq!(plan.target, Path::new("node_modules/@scope"));
    }

    #[test]
    fn given_path_without_registry_segment_when_planning_then_none() {
        assert!(plan_link(Path::new("/app/src/lib"), "node_modules").is_none());
        assert!(plan_link(Path::new("/app/node_modules"), "node_modules").is_none());
    }
}
