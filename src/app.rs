//! Application entry: wires the CLI to the build session.

use anyhow::{Context, Result};
use yansi::Paint;

use crate::cli::{Cli, Commands, DiffArgs, OutputFormat, PlanArgs, SnapshotArgs};
use crate::config::Options;
use crate::diff::{CategoryDiff, DiffResult};
use crate::error::ExitCode;
use crate::input::BuildInput;
use crate::session::{BuildPlan, BuildSession};

/// Run the parsed CLI command and map the outcome to an exit code.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    crate::logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    match cli.command {
        Commands::Diff(args) => run_diff(args),
        Commands::Plan(args) => run_plan(args),
    }
}

fn session_from_args(args: &SnapshotArgs) -> Result<BuildSession> {
    let mut options = Options::new(args.root.clone(), &args.entries_root)
        .with_exclude(args.exclude.clone())
        .with_skip_hidden(!args.hidden)
        .with_io_threads(args.io_threads);
    if let Some(cache) = &args.cache {
        options = options.with_cache_path(cache);
    }
    BuildSession::new(options).context("Invalid configuration")
}

fn run_diff(args: DiffArgs) -> Result<ExitCode> {
    let mut session = session_from_args(&args.snapshot)?;
    let diff = session
        .compute()
        .context("Failed to compute the snapshot diff")?;

    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&diff)?);
        }
        OutputFormat::Text => print_diff(&diff),
    }

    if args.commit {
        session
            .commit()
            .context("Failed to persist the snapshot cache")?;
    }

    Ok(if diff.any_changed() {
        ExitCode::ChangesDetected
    } else {
        ExitCode::NoChanges
    })
}

fn run_plan(args: PlanArgs) -> Result<ExitCode> {
    let input = declared_input(&args)?;
    let mut session = session_from_args(&args.snapshot)?;
    let diff = session
        .compute()
        .context("Failed to compute the snapshot diff")?;
    let plan = session.plan(&input)?;

    let rendered = match &plan {
        BuildPlan::Full => serde_json::json!({ "plan": "full", "input": input }),
        BuildPlan::Unchanged => serde_json::json!({ "plan": "unchanged" }),
        BuildPlan::Partial(restricted) => {
            serde_json::json!({ "plan": "partial", "input": restricted })
        }
    };
    println!("{}", serde_json::to_string_pretty(&rendered)?);

    Ok(if diff.any_changed() {
        ExitCode::ChangesDetected
    } else {
        ExitCode::NoChanges
    })
}

fn declared_input(args: &PlanArgs) -> Result<BuildInput> {
    if let Some(path) = &args.input_json {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        return BuildInput::from_json(&json)
            .with_context(|| format!("Failed to parse input file: {}", path.display()));
    }
    Ok(BuildInput::Map(args.inputs.clone()))
}

fn print_diff(diff: &DiffResult) {
    print_category("public", &diff.public);
    print_category("entries", &diff.entries);

    if diff.any_changed() {
        println!("{}", "changes detected".yellow());
    } else {
        println!("{}", "no changes".green());
    }
}

fn print_category(name: &str, diff: &CategoryDiff) {
    println!(
        "{}: {} added, {} edited, {} deleted",
        name.bold(),
        diff.added.len(),
        diff.edited.len(),
        diff.deleted.len()
    );
    for path in &diff.added {
        println!("  {} {}", "A".green(), path.display());
    }
    for path in &diff.edited {
        println!("  {} {}", "M".yellow(), path.display());
    }
    for path in &diff.deleted {
        println!("  {} {}", "D".red(), path.display());
    }
}
