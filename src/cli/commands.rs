use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use generational_arena::Index;
use itertools::Itertools;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{self, Settings};
use crate::domain::{ModuleArena, ModuleKind};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Link {
            input,
            output,
            main_file,
            ignore,
            clean,
        }) => link(input, output, main_file.as_deref(), ignore, *clean),
        Some(Commands::Tree {
            input,
            main_file,
            ignore,
        }) => tree(input, main_file.as_deref(), ignore),
        Some(Commands::List {
            input,
            main_file,
            ignore,
        }) => list(input, main_file.as_deref(), ignore),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => config_show(),
            ConfigCommands::Init { global } => config_init(*global),
            ConfigCommands::Path => config_path(),
        },
        Some(Commands::Info) => info(),
        Some(Commands::Completion { shell }) => completion(*shell),
        None => Err(CliError::Usage(
            "no command given (try --help)".to_string(),
        )),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Build the service container for an input directory, applying CLI overrides
/// on top of the layered settings.
fn prepare(
    input: &Path,
    main_file: Option<&str>,
    ignore: &[String],
) -> CliResult<(ServiceContainer, PathBuf)> {
    if !input.is_dir() {
        return Err(CliError::InvalidArgs(format!(
            "input directory does not exist: {}",
            input.display()
        )));
    }
    let input = input
        .canonicalize()
        .map_err(|e| InfraError::io("canonicalize input directory", e))?;

    let mut settings = Settings::load(Some(&input)).map_err(InfraError::from)?;
    if let Some(main_file) = main_file {
        settings.main_file = main_file.to_string();
    }
    if !ignore.is_empty() {
        settings.ignore = Settings::merge_array(&settings.ignore, ignore);
    }
    debug!("effective settings: {:?}", settings);

    Ok((ServiceContainer::new(settings), input))
}

/// Resolve the entry module and extract its dependency graph.
fn extract_tree(container: &ServiceContainer, input: &Path) -> CliResult<ModuleArena> {
    let identifier = format!("./{}", container.settings.main_file);
    let entry = container
        .resolver
        .resolve(&identifier, input)
        .map_err(InfraError::from)?;
    let arena = container
        .graph
        .extract(&entry)
        .map_err(InfraError::from)?;
    Ok(arena)
}

#[instrument(level = "debug", skip(ignore))]
fn link(
    input: &Path,
    out_dir: &Path,
    main_file: Option<&str>,
    ignore: &[String],
    clean: bool,
) -> CliResult<()> {
    let (container, input) = prepare(input, main_file, ignore)?;

    if clean && container.fs.exists(out_dir) {
        container
            .fs
            .remove_dir_all(out_dir)
            .map_err(|e| InfraError::io("clean output directory", e))?;
    }

    let arena = extract_tree(&container, &input)?;
    let report = container
        .linker
        .link_tree(&arena, out_dir)
        .map_err(InfraError::from)?;

    for plan in &report.created {
        output::success(&format!(
            "{} -> {}",
            plan.target.display(),
            plan.source.display()
        ));
    }
    output::action(
        "Linked",
        &format!(
            "{} package(s) into {} ({} already present)",
            report.created.len(),
            out_dir.display(),
            report.skipped
        ),
    );
    Ok(())
}

#[instrument(level = "debug", skip(ignore))]
fn tree(input: &Path, main_file: Option<&str>, ignore: &[String]) -> CliResult<()> {
    let (container, input) = prepare(input, main_file, ignore)?;
    let arena = extract_tree(&container, &input)?;

    if let Some(root) = arena.root() {
        if let Some(rendered) = render_node(&arena, root) {
            println!("{}", rendered);
        }
    }
    output::detail(&format!(
        "{} module(s), depth {}",
        arena.node_count(),
        arena.depth()
    ));
    Ok(())
}

fn render_node(arena: &ModuleArena, index: Index) -> Option<Tree<String>> {
    let node = arena.get_node(index)?;
    let label = match &node.data.kind {
        ModuleKind::Core => format!("{} (core)", node.data.identifier),
        ModuleKind::External { repeat: true, .. } => {
            format!("{} (seen)", node.data.identifier)
        }
        ModuleKind::External { .. } => node.data.identifier.clone(),
    };
    let mut rendered = Tree::new(label);
    for &child in &node.children {
        if let Some(subtree) = render_node(arena, child) {
            rendered.push(subtree);
        }
    }
    Some(rendered)
}

#[instrument(level = "debug", skip(ignore))]
fn list(input: &Path, main_file: Option<&str>, ignore: &[String]) -> CliResult<()> {
    let (container, input) = prepare(input, main_file, ignore)?;
    let arena = extract_tree(&container, &input)?;
    let plans = container
        .linker
        .plan_tree(&arena)
        .map_err(InfraError::from)?;

    for target in plans
        .iter()
        .map(|plan| plan.target.display().to_string())
        .sorted()
    {
        output::info(&target);
    }
    Ok(())
}

fn config_show() -> CliResult<()> {
    let settings = Settings::load(None).map_err(InfraError::from)?;
    let rendered = settings.to_toml().map_err(InfraError::from)?;
    output::info(&rendered);
    Ok(())
}

fn config_init(global: bool) -> CliResult<()> {
    let path = if global {
        config::global_config_path().ok_or_else(|| {
            CliError::Usage("cannot determine global config directory".to_string())
        })?
    } else {
        PathBuf::from(config::PROJECT_CONFIG_FILE)
    };

    if path.exists() {
        return Err(CliError::Usage(format!(
            "config file already exists: {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| InfraError::io("create config directory", e))?;
        }
    }
    std::fs::write(&path, Settings::template())
        .map_err(|e| InfraError::io("write config file", e))?;

    output::success(&format!("created {}", path.display()));
    Ok(())
}

fn config_path() -> CliResult<()> {
    match config::global_config_path() {
        Some(path) => {
            let marker = if path.exists() { "" } else { " (not present)" };
            output::info(&format!("global:  {}{}", path.display(), marker));
        }
        None => output::warning("global config directory unavailable"),
    }
    output::info(&format!("project: ./{}", config::PROJECT_CONFIG_FILE));
    Ok(())
}

fn info() -> CliResult<()> {
    let settings = Settings::load(None).map_err(InfraError::from)?;

    output::header("nodelink");
    output::detail(&format!("version: {}", env!("CARGO_PKG_VERSION")));
    match config::global_config_path() {
        Some(path) if path.exists() => {
            output::detail(&format!("global config: {}", path.display()));
        }
        Some(path) => {
            output::detail(&format!("global config: {} (not present)", path.display()));
        }
        None => output::detail("global config: unavailable"),
    }
    println!();
    output::info(&settings.to_toml().map_err(InfraError::from)?);
    Ok(())
}

fn completion(shell: clap_complete::Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
