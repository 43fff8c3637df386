//! Dependency tree extraction from JavaScript sources
//!
//! Scans each module for `require(...)` calls and `import`/`export`
//! clauses, resolves every identifier through the scoped resolver, and
//! records the result in an arena-backed tree. Each file is scanned once;
//! later references become childless repeat nodes, which keeps the tree
//! finite across shared and circular dependencies.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use generational_arena::Index;
use itertools::Itertools;
use regex::Regex;
use tracing::{debug, instrument};

use crate::application::services::NodeResolver;
use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{is_core_module, ModuleArena, ModuleData};
use crate::infrastructure::traits::FileSystem;
use crate::util::path::PathExt;

/// Service extracting the dependency tree reachable from an entry file.
pub struct GraphService {
    fs: Arc<dyn FileSystem>,
    resolver: Arc<NodeResolver>,
    ignore: HashSet<String>,
    call_regex: Regex,
    clause_regex: Regex,
}

impl GraphService {
    /// Create a new graph service.
    pub fn new(fs: Arc<dyn FileSystem>, resolver: Arc<NodeResolver>, settings: &Settings) -> Self {
        Self {
            fs,
            resolver,
            ignore: settings.ignore.iter().cloned().collect(),
            call_regex: Regex::new(r#"\b(?:require|import)\s*\(\s*['"]([^'"]+)['"]\s*\)"#)
                .unwrap(),
            clause_regex: Regex::new(
                r#"(?m)^\s*(?:import|export)\s+(?:[^'";]*?\bfrom\s+)?['"]([^'"]+)['"]"#,
            )
            .unwrap(),
        }
    }

    /// Extract the dependency tree rooted at `entry`.
    ///
    /// Ignored identifiers produce no node and are never resolved, so
    /// they may be absent from disk. A resolution miss anywhere in the
    /// traversal aborts the whole extraction.
    #[instrument(level = "debug", skip(self))]
    pub fn extract(&self, entry: &Path) -> ApplicationResult<ModuleArena> {
        let entry = self
            .fs
            .canonicalize(entry)
            .with_path_context("canonicalize entry", entry)?;

        let mut arena = ModuleArena::new();
        let mut extracted = HashSet::new();
        extracted.insert(entry.clone());

        let root = arena.insert_node(
            ModuleData::external(entry.file_name_lossy(), entry.clone()),
            None,
        );
        self.extract_children(&mut arena, root, &entry, &mut extracted)?;

        debug!(
            "extract: {} nodes reachable from {}",
            arena.node_count(),
            entry.display()
        );
        Ok(arena)
    }

    fn extract_children(
        &self,
        arena: &mut ModuleArena,
        parent: Index,
        file: &Path,
        extracted: &mut HashSet<PathBuf>,
    ) -> ApplicationResult<()> {
        if !is_scannable(file) {
            return Ok(());
        }
        let source = self
            .fs
            .read_to_string(file)
            .with_path_context("read module", file)?;

        for identifier in self.scan_specifiers(&source) {
            if self.ignore.contains(&identifier) {
                debug!("extract: skipping ignored {}", identifier);
                continue;
            }
            if is_core_module(&identifier) {
                arena.insert_node(ModuleData::core(identifier), Some(parent));
                continue;
            }

            let resolved = self.resolver.resolve(&identifier, file)?;
            if extracted.insert(resolved.clone()) {
                let index =
                    arena.insert_node(ModuleData::external(identifier, resolved.clone()), Some(parent));
                self.extract_children(arena, index, &resolved, extracted)?;
            } else {
                arena.insert_node(ModuleData::repeat(identifier, resolved), Some(parent));
            }
        }
        Ok(())
    }

    /// Import specifiers found in the source, in source order,
    /// de-duplicated per file.
    fn scan_specifiers(&self, source: &str) -> Vec<String> {
        let stripped = strip_comments(source);

        let calls = self
            .call_regex
            .captures_iter(&stripped)
            .filter_map(|caps| caps.get(1))
            .map(|m| (m.start(), m.as_str().to_string()));
        let clauses = self
            .clause_regex
            .captures_iter(&stripped)
            .filter_map(|caps| caps.get(1))
            .map(|m| (m.start(), m.as_str().to_string()));

        calls
            .chain(clauses)
            .sorted_by_key(|(offset, _)| *offset)
            .map(|(_, identifier)| identifier)
            .unique()
            .collect()
    }
}

/// Only JavaScript sources carry import specifiers; `.json` files and
/// binary addons resolve to leaf nodes.
fn is_scannable(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "js" || ext == "mjs" || ext == "cjs")
        .unwrap_or(false)
}

/// Remove line and block comments, respecting string and template
/// literals so that quoted `//` sequences survive.
fn strip_comments(source: &str) -> String {
    enum State {
        Code,
        Line,
        Block,
        Quoted(char),
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::Line;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::Block;
                    // keep the tokens on either side separated
                    out.push(' ');
                }
                '\'' | '"' | '`' => {
                    state = State::Quoted(c);
                    out.push(c);
                }
                _ => out.push(c),
            },
            State::Line => {
                if c == '\n' {
                    state = State::Code;
                    out.push(c);
                }
            }
            State::Block => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                } else if c == '\n' {
                    // line structure feeds the anchored clause scan
                    out.push(c);
                }
            }
            State::Quoted(delimiter) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == delimiter {
                    state = State::Code;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_line_comment_when_stripping_then_code_before_it_survives() {
        assert_eq!(strip_comments("var a = 1; // note\nvar b;"), "var a = 1; \nvar b;");
    }

    #[test]
    fn given_block_comment_when_stripping_then_replaced_by_space() {
        assert_eq!(strip_comments("a/* gone */b"), "a b");
    }

    #[test]
    fn given_slashes_inside_string_when_stripping_then_string_intact() {
        assert_eq!(
            strip_comments(r#"var url = "https://example.com";"#),
            r#"var url = "https://example.com";"#
        );
    }

    #[test]
    fn given_escaped_quote_when_stripping_then_string_does_not_end_early() {
        assert_eq!(
            strip_comments(r#"var s = 'don\'t'; // tail"#),
            r#"var s = 'don\'t'; "#
        );
    }

    #[test]
    fn given_multiline_block_comment_when_stripping_then_newlines_kept() {
        assert_eq!(strip_comments("a/*\n\n*/b"), "a \n\nb");
    }

    #[test]
    fn given_paths_when_checking_then_only_script_sources_scannable() {
        assert!(is_scannable(Path::new("/m/index.js")));
        assert!(is_scannable(Path::new("/m/index.mjs")));
        assert!(is_scannable(Path::new("/m/index.cjs")));
        assert!(!is_scannable(Path::new("/m/data.json")));
        assert!(!is_scannable(Path::new("/m/addon.node")));
        assert!(!is_scannable(Path::new("/m/LICENSE")));
    }
}
