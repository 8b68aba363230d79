use clap::{Parser, Subcommand};
use flowsmith::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Build, check and rewrite n8n-compatible workflow documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log filter, e.g. `debug` or `flowsmith=trace`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the "Users to Google Sheet" sample workflow
    Sample {
        /// Output file
        out: PathBuf,
    },
    /// Import a workflow, or every workflow in a directory, and report problems
    Validate {
        /// Workflow document or directory of documents to check
        path: PathBuf,
        /// Also check documents in subdirectories
        #[arg(long, short)]
        recursive: bool,
    },
    /// Import a workflow and export it again
    Reformat {
        input: PathBuf,
        output: PathBuf,
        /// Write on a single line
        #[arg(long)]
        compact: bool,
        /// Write even if validation finds problems
        #[arg(long)]
        no_validate: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result = match cli.command {
        Command::Sample { out } => run_sample(&out),
        Command::Validate { path, recursive } => run_validate(&path, recursive),
        Command::Reformat {
            input,
            output,
            compact,
            no_validate,
        } => run_reformat(&input, &output, compact, no_validate),
    };

    if let Err(e) = result {
        exit_with_error(&e.to_string());
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info")),
    }
    .unwrap_or_else(|e| exit_with_error(&format!("Invalid log filter: {}", e)));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if let Err(e) = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
    {
        exit_with_error(&format!("Failed to initialize tracing: {}", e));
    }
}

/// Manual trigger -> fetch users over HTTP -> append or update them in a sheet.
fn sample_workflow() -> Result<Workflow> {
    let mut workflow = Workflow::new("Users to Google Sheet")?;

    let trigger = workflow.add_node(ManualTrigger::new().into_node()?)?;
    let fetch = workflow.add_node(
        HttpRequest::new("https://jsonplaceholder.typicode.com/users")
            .name("Fetch users")
            .into_node()?,
    )?;
    let store = workflow.add_node(
        GoogleSheets::append_or_update(&["email"])
            .document_id("YOUR_DOCUMENT_ID")
            .sheet_name("Users")
            .credential("YOUR_CREDENTIAL_ID", "Google Sheets account")
            .into_node()?,
    )?;

    workflow.connect(&trigger, &fetch)?;
    workflow.connect(&fetch, &store)?;
    Ok(workflow)
}

fn run_sample(out: &Path) -> Result<()> {
    let workflow = sample_workflow()?;
    workflow.export(out)?;
    println!("Wrote '{}' to {}", workflow.name(), out.display());
    Ok(())
}

fn run_validate(path: &Path, recursive: bool) -> Result<()> {
    let error_count = if path.is_dir() {
        let mut count = 0;
        for (file, result) in Workflow::import_dir(path, recursive)? {
            println!("{}", file.display());
            count += match result {
                Ok(workflow) => report(&workflow),
                Err(e) => {
                    println!("  error: {}", e);
                    1
                }
            };
        }
        count
    } else {
        report(&Workflow::import(path)?)
    };

    if error_count > 0 {
        exit_with_error(&format!("{} validation error(s)", error_count));
    }
    println!("OK");
    Ok(())
}

/// Prints one workflow's findings and returns how many errors it has.
fn report(workflow: &Workflow) -> usize {
    let errors = workflow.validate();

    println!(
        "{}: {} node(s), {} connection(s)",
        workflow.name(),
        workflow.nodes().len(),
        workflow.connections().len()
    );
    for warning in workflow.warnings() {
        println!("  warning: {}", warning);
    }
    for error in &errors {
        println!("  error: {}", error);
    }
    errors.len()
}

fn run_reformat(input: &Path, output: &Path, compact: bool, no_validate: bool) -> Result<()> {
    let workflow = Workflow::import(input)?;
    let options = ExportOptions::default()
        .with_pretty(!compact)
        .with_validation(!no_validate);
    workflow.export_with(output, &options)?;
    println!("Rewrote {} to {}", input.display(), output.display());
    Ok(())
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
