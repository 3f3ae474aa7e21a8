//! Command-line host for modhost startup modules.
//!
//! Loads the modules declared at build time before doing anything else, then
//! reports what happened. Failed modules never stop the host unless `--strict`
//! is given.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modhost_core::config::env_vars;
use modhost_core::{
    initialize_modules, resolve_self_directory, LoadReport, LoadStatus, ModuleDeclaration,
    ModuleLoader, NamingConvention, PlatformFamily, Retention, SearchDirectory,
    SymbolVisibility,
};
use serde_json::json;

/// modhost - load the declared shared modules and report the outcome.
#[derive(Parser, Debug)]
#[command(name = "modhost")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform (defaults to `status`).
    #[command(subcommand)]
    command: Option<Command>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    /// Exit with status 1 when any module failed to load.
    #[arg(long, global = true)]
    strict: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Show the startup load report.
    Status {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the declared modules and the file names they map to.
    List {
        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Load extra modules by base name, report, then unload them.
    Probe {
        /// Module base names (no prefix, suffix or directory).
        #[arg(required = true)]
        names: Vec<String>,
        /// Directory to search before the default locations.
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Keep the modules' symbols out of the global namespace.
        #[arg(long)]
        local: bool,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose, args.json_logs);

    // Before any other work, so module registrations are in place.
    let startup = initialize_modules();

    let probe_failures = match args.command.unwrap_or(Command::Status { json: false }) {
        Command::Status { json } => {
            print_report(startup, json)?;
            0
        }
        Command::List { json } => {
            list_modules(json)?;
            0
        }
        Command::Probe {
            names,
            dir,
            local,
            json,
        } => probe(names, dir, local, json)?,
    };

    if args.strict && any_failed(startup, probe_failures) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Whether the startup load or an ad-hoc probe left a module unloaded.
fn any_failed(startup: &LoadReport, probe_failures: usize) -> bool {
    probe_failures > 0 || startup.failed().next().is_some()
}

fn init_logging(verbose: bool, json_logs: bool) {
    let default_directive = if verbose { "modhost=debug" } else { "modhost=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    // Logs go to stderr so that reports on stdout stay parseable.
    if json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Print a load report as a table or JSON.
fn print_report(report: &LoadReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    match &report.search_directory {
        Some(dir) => println!("Search directory: {}", dir.display()),
        None => println!("Search directory: (none)"),
    }

    if report.is_empty() {
        println!("No modules declared.");
        return Ok(());
    }

    let name_width = column_width(report.outcomes().iter().map(|o| o.name.as_str()), "MODULE");
    let file_width = column_width(
        report.outcomes().iter().map(|o| o.file_name.as_str()),
        "FILE",
    );

    println!("{:name_width$}  {:file_width$}  STATUS", "MODULE", "FILE");
    for outcome in report.outcomes() {
        let status = match &outcome.status {
            LoadStatus::Loaded => "loaded".to_string(),
            LoadStatus::Failed { reason } => format!("failed: {}", reason),
        };
        println!(
            "{:name_width$}  {:file_width$}  {}",
            outcome.name, outcome.file_name, status
        );
    }

    println!(
        "\n{} loaded, {} failed",
        report.loaded().count(),
        report.failed().count()
    );
    Ok(())
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values.map(str::len).chain(Some(header.len())).max().unwrap_or(0)
}

/// Show the built-in declaration with the platform file names.
fn list_modules(json: bool) -> Result<()> {
    let declaration = ModuleDeclaration::builtin();
    let naming = NamingConvention::native();
    let search_directory = resolve_self_directory();

    if json {
        let modules: Vec<_> = declaration
            .iter()
            .map(|name| json!({ "name": name, "file_name": naming.file_name(name) }))
            .collect();
        let listing = json!({
            "platform": PlatformFamily::current(),
            "naming": naming,
            "search_directory": search_directory,
            "modules": modules,
        });
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!(
        "Platform: {:?} (prefix {:?}, suffix {:?})",
        PlatformFamily::current(),
        naming.prefix,
        naming.suffix
    );
    match search_directory {
        Some(dir) => println!("Search directory: {}", dir.display()),
        None => println!("Search directory: (none)"),
    }

    if declaration.is_empty() {
        println!("No modules declared (set {} at build time).", env_vars::MODULES);
        return Ok(());
    }

    for (index, name) in declaration.iter().enumerate() {
        println!("{:>3}. {} -> {}", index + 1, name, naming.file_name(name));
    }
    Ok(())
}

/// Load ad-hoc modules, print the outcome and unload them again.
///
/// Returns the number of modules that failed.
fn probe(names: Vec<String>, dir: Option<PathBuf>, local: bool, json: bool) -> Result<usize> {
    let declaration = ModuleDeclaration::new(names).context("Invalid probe arguments")?;

    let search_directory = match dir {
        Some(dir) => SearchDirectory::Fixed(
            std::fs::canonicalize(&dir)
                .with_context(|| format!("Cannot resolve directory {}", dir.display()))?,
        ),
        None => SearchDirectory::Resolve,
    };
    let visibility = if local {
        SymbolVisibility::Local
    } else {
        SymbolVisibility::Global
    };

    let session = ModuleLoader::native(declaration)
        .with_search_directory(search_directory)
        .with_visibility(visibility)
        .with_retention(Retention::Retain)
        .load_all();

    print_report(&session.report, json)?;
    let failed = session.report.failed().count();

    session.modules.unload();
    Ok(failed)
}
