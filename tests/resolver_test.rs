//! Tests for NodeResolver
//!
//! Resolution probes run against real temp directories laid out like
//! small package trees.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use nodelink::application::services::NodeResolver;
use nodelink::application::ApplicationError;
use nodelink::config::Settings;
use nodelink::domain::DomainError;
use nodelink::infrastructure::traits::RealFileSystem;

/// Canonicalized temp root, so expected paths match canonicalized
/// resolution results (macOS temp dirs live behind a symlink).
fn project_root(temp: &TempDir) -> PathBuf {
    temp.path().canonicalize().expect("canonicalize temp root")
}

/// Helper to create a module file, creating parent directories as needed.
fn write_module(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).expect("create module dirs");
    std::fs::write(&path, content).expect("write module file");
    path
}

fn resolver() -> NodeResolver {
    NodeResolver::new(Arc::new(RealFileSystem), &Settings::default())
}

// ============================================================
// Relative identifiers
// ============================================================

#[test]
fn given_relative_identifier_when_resolving_then_extension_appended() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let root = project_root(&temp);
    let requester = write_module(&root, "app/index.js", "");
    let helper = write_module(&root, "app/lib/helper.js", "");

    // Act
    let resolved = resolver().resolve("./lib/helper", &requester).unwrap();

    // Assert
    assert_eq!(resolved, helper);
}

#[test]
fn given_exact_file_name_when_resolving_then_no_extension_probing() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let root = project_root(&temp);
    let requester = write_module(&root, "app/index.js", "");
    let helper = write_module(&root, "app/lib/helper.js", "");

    // Act
    let resolved = resolver().resolve("./lib/helper.js", &requester).unwrap();

    // Assert
    assert_eq!(resolved, helper);
}

#[test]
fn given_json_identifier_when_resolving_then_probed_in_extension_order() {
    // Arrange: only the .json candidate exists
    let temp = TempDir::new().unwrap();
    let root = project_root(&temp);
    let requester = write_module(&root, "app/index.js", "");
    let data = write_module(&root, "app/data.json", "{}");

    // Act
    let resolved = resolver().resolve("./data", &requester).unwrap();

    // Assert
    assert_eq!(resolved, data);
}

// ============================================================
// Bare identifiers and registry lookup
// ============================================================

#[test]
fn given_bare_identifier_when_resolving_then_registry_package_found() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let root = project_root(&temp);
    let requester = write_module(&root, "app/index.js", "");
    let pkg_entry = write_module(&root, "app/node_modules/left-pad/index.js", "");

    // Act
    let resolved = resolver().resolve("left-pad", &requester).unwrap();

    // Assert
    assert_eq!(resolved, pkg_entry);
}

#[test]
fn given_manifest_main_when_resolving_then_main_entry_wins_over_index() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let root = project_root(&temp);
    let requester = write_module(&root, "app/index.js", "");
    write_module(
        &root,
        "app/node_modules/pkg/package.json",
        r#"{"name": "pkg", "main": "lib/entry.js"}"#,
    );
    let main_entry = write_module(&root, "app/node_modules/pkg/lib/entry.js", "");
    write_module(&root, "app/node_modules/pkg/index.js", "");

    // Act
    let resolved = resolver().resolve("pkg", &requester).unwrap();

    // Assert
    assert_eq!(resolved, main_entry);
}

#[test]
fn given_manifest_main_naming_directory_when_resolving_then_index_inside_it() {
    // Arrange: "main" points at a folder, its index file is the entry
    let temp = TempDir::new().unwrap();
    let root = project_root(&temp);
    let requester = write_module(&root, "app/index.js", "");
    write_module(
        &root,
        "app/node_modules/pkg/package.json",
        r#"{"main": "lib"}"#,
    );
    let nested_index = write_module(&root, "app/node_modules/pkg/lib/index.js", "");

    // Act
    let resolved = resolver().resolve("pkg", &requester).unwrap();

    // Assert
    assert_eq!(resolved, nested_index);
}

#[test]
fn given_no_manifest_when_resolving_then_index_fallback() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let root = project_root(&temp);
    let requester = write_module(&root, "app/index.js", "");
    let index = write_module(&root, "app/node_modules/bare/index.js", "");

    // Act
    let resolved = resolver().resolve("bare", &requester).unwrap();

    // Assert
    assert_eq!(resolved, index);
}

#[test]
fn given_malformed_manifest_when_resolving_then_index_fallback() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let root = project_root(&temp);
    let requester = write_module(&root, "app/index.js", "");
    write_module(&root, "app/node_modules/pkg/package.json", "not json at all");
    let index = write_module(&root, "app/node_modules/pkg/index.js", "");

    // Act
    let resolved = resolver().resolve("pkg", &requester).unwrap();

    // Assert
    assert_eq!(resolved, index);
}

// ============================================================
// Scope narrowing and climbing
// ============================================================

#[test]
fn given_nested_registry_when_resolving_then_nearest_copy_shadows_root() {
    // Arrange: both the requester's own registry and the root registry
    // carry a copy of dup
    let temp = TempDir::new().unwrap();
    let root = project_root(&temp);
    let requester = write_module(&root, "app/node_modules/user/index.js", "");
    let nested = write_module(&root, "app/node_modules/user/node_modules/dup/index.js", "");
    write_module(&root, "app/node_modules/dup/index.js", "");

    // Act
    let resolved = resolver().resolve("dup", &requester).unwrap();

    // Assert
    assert_eq!(resolved, nested);
}

#[test]
fn given_requester_inside_package_when_resolving_then_search_climbs_to_root() {
    // Arrange: the requesting package has no registry of its own, so the
    // lookup climbs back out to the root one
    let temp = TempDir::new().unwrap();
    let root = project_root(&temp);
    let requester = write_module(&root, "app/node_modules/a/lib/deep.js", "");
    let sibling = write_module(&root, "app/node_modules/b/index.js", "");

    // Act
    let resolved = resolver().resolve("b", &requester).unwrap();

    // Assert
    assert_eq!(resolved, sibling);
}

// ============================================================
// Misses
// ============================================================

#[test]
fn given_missing_package_when_resolving_then_module_not_found() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let root = project_root(&temp);
    let requester = write_module(&root, "app/index.js", "");

    // Act
    let err = resolver().resolve("ghost", &requester).unwrap_err();

    // Assert
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::ModuleNotFound { .. })
    ));
    let message = err.to_string();
    assert!(message.contains("cannot find module 'ghost'"), "{message}");
}

#[test]
fn given_missing_relative_file_when_resolving_then_module_not_found() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let root = project_root(&temp);
    let requester = write_module(&root, "app/index.js", "");

    // Act
    let result = resolver().resolve("./missing", &requester);

    // Assert
    assert!(result.is_err());
}
