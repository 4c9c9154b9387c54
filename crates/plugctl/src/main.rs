mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use log::{debug, warn};

use plugctl_core::engine::{EngineLocator, FixedEngineLocator, SettingsEngineLocator};
use plugctl_core::kernel::constants;
use plugctl_core::{
    AutoConfirm, ChangeOutcome, ConfirmationPrompt, DirectoryTrash, Error, PluginDescriptor,
    PluginKey, PluginManager, PluginSource, Result, SearchField, Settings,
};

use crate::cli::CliPrompt;

/// Exit status when the user declines a confirmation
const EXIT_DECLINED: u8 = 2;

/// plugctl: inspect and toggle the plugins of an engine project
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Project root holding the .uproject file
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    /// Engine installation directory; skips engine lookup
    #[arg(long, global = true)]
    engine: Option<PathBuf>,

    /// Settings file (json, yaml or toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List plugins
    List {
        /// Only this source (project, engine or marketplace)
        #[arg(long)]
        source: Option<PluginSource>,
        /// Case-insensitive keyword
        #[arg(long)]
        search: Option<String>,
        /// Field the keyword is matched against; remembered in the settings file
        #[arg(long)]
        field: Option<SearchField>,
        /// Only this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one plugin in detail
    Show {
        name: String,
        #[arg(long)]
        source: Option<PluginSource>,
    },
    /// Enable a plugin and its disabled dependencies
    Enable {
        name: String,
        #[arg(long)]
        source: Option<PluginSource>,
        /// Accept cascading changes without asking
        #[arg(long, short)]
        yes: bool,
    },
    /// Disable a plugin and the enabled plugins depending on it
    Disable {
        name: String,
        #[arg(long)]
        source: Option<PluginSource>,
        /// Accept cascading changes without asking
        #[arg(long, short)]
        yes: bool,
    },
    /// Remove the project's override so the plugin's default applies
    Reset {
        name: String,
        #[arg(long)]
        source: Option<PluginSource>,
    },
    /// Rename the plugin directory to the plugin name
    Rename {
        name: String,
        #[arg(long)]
        source: Option<PluginSource>,
    },
    /// Move a plugin between the project and marketplace trees
    Move {
        name: String,
        /// Destination source (project or marketplace)
        #[arg(long)]
        to: PluginSource,
        #[arg(long)]
        from: Option<PluginSource>,
    },
    /// Delete a plugin directory
    Delete {
        name: String,
        #[arg(long)]
        source: Option<PluginSource>,
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
        /// Move the directory here instead of deleting it permanently
        #[arg(long)]
        trash_dir: Option<PathBuf>,
    },
    /// List plugin names installed in more than one source
    Conflicts,
    /// Show plugin counts
    Stats,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = env_logger::Env::default().default_filter_or(level);
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn settings_path(args: &CliArgs) -> Option<PathBuf> {
    args.config.clone().or_else(Settings::default_path)
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path),
        None => Ok(Settings::default()),
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);
    debug!("{} {} starting", constants::APP_NAME, constants::APP_VERSION);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<ExitCode> {
    let settings_file = settings_path(&args);
    let mut settings = load_settings(settings_file.as_deref())?;

    let locator: Box<dyn EngineLocator> = match &args.engine {
        Some(path) => Box::new(FixedEngineLocator::new(path)),
        None => Box::new(SettingsEngineLocator::from_settings(&settings)),
    };
    let manager = PluginManager::load(&args.project, locator)?;

    match args.command {
        Commands::List {
            source,
            search,
            field,
            category,
        } => {
            if let Some(field) = field {
                remember_search_field(&mut settings, settings_file.as_deref(), field);
            }
            list(
                manager,
                source,
                search.as_deref(),
                field.unwrap_or(settings.search_field),
                category,
            )
        }
        Commands::Show { name, source } => show(&manager, &name, source),
        Commands::Enable { name, source, yes } => {
            set_enabled(with_prompt(manager, yes), &name, source, true)
        }
        Commands::Disable { name, source, yes } => {
            set_enabled(with_prompt(manager, yes), &name, source, false)
        }
        Commands::Reset { name, source } => {
            let mut manager = manager;
            let source = resolve_source(&manager, &name, source)?;
            if manager.reset_to_default(&name, source)? {
                let state = state_label(manager.is_enabled(&name, source));
                println!("Reset {} to its default ({})", PluginKey::new(name, source), state);
            } else {
                println!("{} has no override", PluginKey::new(name, source));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Rename { name, source } => {
            let mut manager = manager;
            let source = resolve_source(&manager, &name, source)?;
            if manager.canonical_rename(&name, source)? {
                let plugin = manager.get_plugin(&name, source)?;
                println!("Renamed {} to {}", plugin.key(), plugin.directory.display());
            } else {
                println!("{} already uses its canonical directory", PluginKey::new(name, source));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Move { name, to, from } => {
            let mut manager = manager;
            let from = resolve_source(&manager, &name, from)?;
            let destination = manager.move_plugin(&name, from, to)?;
            println!("Moved '{}' from {} to {} ({})", name, from, to, destination.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Delete {
            name,
            source,
            yes,
            trash_dir,
        } => {
            let source = resolve_source(&manager, &name, source)?;
            let key = PluginKey::new(name.clone(), source);
            let question = format!("Delete {}?", key);
            if !yes && !CliPrompt.confirm(&question, std::slice::from_ref(&key)) {
                println!("Cancelled; nothing deleted");
                return Ok(ExitCode::from(EXIT_DECLINED));
            }

            let mut manager = match trash_dir {
                Some(dir) => manager.with_trash(Box::new(DirectoryTrash::new(dir))),
                None => manager,
            };
            manager.delete_plugin(&name, source)?;
            println!("Deleted {}", key);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Conflicts => {
            let conflicts = manager.conflicts();
            if conflicts.is_empty() {
                println!("No conflicts");
            }
            for conflict in conflicts {
                println!("{}", conflict.description());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Stats => {
            let stats = manager.stats();
            println!("Total:       {}", stats.total);
            println!("Project:     {}", stats.project);
            println!("Engine:      {}", stats.engine);
            println!("Marketplace: {}", stats.marketplace);
            println!("Enabled:     {}", stats.enabled);
            println!("Disabled:    {}", stats.disabled);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn with_prompt(manager: PluginManager, yes: bool) -> PluginManager {
    let prompt: Box<dyn ConfirmationPrompt> = if yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(CliPrompt)
    };
    manager.with_prompt(prompt)
}

/// The given source, or the first source holding `name`
fn resolve_source(
    manager: &PluginManager,
    name: &str,
    source: Option<PluginSource>,
) -> Result<PluginSource> {
    match source {
        Some(source) => Ok(source),
        None => manager
            .first_source_of(name)
            .ok_or_else(|| Error::from(format!("Plugin '{}' not found in any source", name))),
    }
}

fn remember_search_field(settings: &mut Settings, path: Option<&Path>, field: SearchField) {
    if settings.search_field == field {
        return;
    }
    settings.search_field = field;
    if let Some(path) = path {
        if let Err(e) = settings.save(path) {
            warn!("Could not save search field preference: {}", e);
        }
    }
}

fn state_label(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

fn list(
    mut manager: PluginManager,
    source: Option<PluginSource>,
    search: Option<&str>,
    field: SearchField,
    category: Option<String>,
) -> Result<ExitCode> {
    if let Some(keyword) = search {
        manager.search(keyword, field);
    }
    manager.set_category(category);

    let plugins = manager.get_plugins(source);
    if plugins.is_empty() {
        println!("No plugins");
        return Ok(ExitCode::SUCCESS);
    }
    for plugin in plugins {
        println!("{}", summary_line(&manager, plugin));
    }
    Ok(ExitCode::SUCCESS)
}

fn summary_line(manager: &PluginManager, plugin: &PluginDescriptor) -> String {
    let mut line = format!(
        "{:<8} {:<11} {:<32} {:<10} {}",
        state_label(plugin.is_enabled()),
        plugin.source.as_str(),
        plugin.name,
        plugin.version,
        plugin.category
    );
    if plugin.explicit_override.is_set() {
        line.push_str(" [override]");
    }
    if manager.has_conflict(&plugin.name) {
        line.push_str(" [conflict]");
    }
    line.trim_end().to_string()
}

fn show(manager: &PluginManager, name: &str, source: Option<PluginSource>) -> Result<ExitCode> {
    let source = resolve_source(manager, name, source)?;
    let plugin = manager.get_plugin(name, source)?;
    let resolver = manager.resolver();

    println!("Name:         {}", plugin.name);
    println!("Source:       {}", plugin.source);
    println!("Directory:    {}", plugin.directory.display());
    println!("Version:      {}", plugin.version);
    println!("Category:     {}", plugin.category);
    println!("Author:       {}", plugin.author);
    println!("Description:  {}", plugin.description);
    if !plugin.docs_url.is_empty() {
        println!("Docs:         {}", plugin.docs_url);
    }
    println!(
        "State:        {} (default {}, override {:?})",
        state_label(plugin.is_enabled()),
        state_label(plugin.enabled_by_default),
        plugin.explicit_override
    );
    println!("Dependencies: {}", join_or_none(&plugin.dependencies));
    let dependents: Vec<String> = resolver
        .all_dependents(name)
        .into_iter()
        .map(|key| key.to_string())
        .collect();
    println!("Dependents:   {}", join_or_none(&dependents));
    if let Some(other) = manager.conflict_detector().conflicting_plugin(name, source) {
        println!(
            "Conflict:     also installed in {} at {}",
            other.source,
            other.directory.display()
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

fn set_enabled(
    mut manager: PluginManager,
    name: &str,
    source: Option<PluginSource>,
    enable: bool,
) -> Result<ExitCode> {
    let source = resolve_source(&manager, name, source)?;
    let outcome = if enable {
        manager.enable(name, source)?
    } else {
        manager.disable(name, source)?
    };

    match outcome {
        ChangeOutcome::Applied(keys) => {
            for key in keys {
                println!("{} {}", if enable { "Enabled" } else { "Disabled" }, key);
            }
            Ok(ExitCode::SUCCESS)
        }
        ChangeOutcome::Declined => {
            println!("Cancelled; no changes written");
            Ok(ExitCode::from(EXIT_DECLINED))
        }
    }
}
