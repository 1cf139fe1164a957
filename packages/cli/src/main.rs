mod commands;
mod config;
mod offline;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    add_field, delete_field, publish, reorder, show, theme, toggle_required, update_field,
    versions, AddFieldArgs, Context, FieldArgs, FormArgs, ReorderArgs, ThemeArgs,
    UpdateFieldArgs,
};
use tracing_subscriber::EnvFilter;

/// Formdraft CLI - edit live forms through drafts
#[derive(Parser, Debug)]
#[command(name = "formdraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log engine decisions (branching, reconciliation)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Work against a seeded in-memory form instead of the API
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List a form's versions and their states
    Versions(FormArgs),

    /// Show a form and the fields being edited
    Show(FormArgs),

    /// Add a field at the end of the form
    AddField(AddFieldArgs),

    /// Change a field's label, description or required flag
    UpdateField(UpdateFieldArgs),

    /// Flip whether a field is required
    ToggleRequired(FieldArgs),

    /// Remove a field
    DeleteField(FieldArgs),

    /// Put the fields in a new order
    Reorder(ReorderArgs),

    /// Change theme colors
    Theme(ThemeArgs),

    /// Make the draft the live version
    Publish(FormArgs),
}

fn init_tracing(verbose: bool) {
    // Directive targets match by prefix, so this covers every formdraft_* crate
    let default = if verbose {
        "warn,formdraft=debug"
    } else {
        "warn,formdraft=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Command, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Command::Versions(args) => versions(args, ctx).await,
        Command::Show(args) => show(args, ctx).await,
        Command::AddField(args) => add_field(args, ctx).await,
        Command::UpdateField(args) => update_field(args, ctx).await,
        Command::ToggleRequired(args) => toggle_required(args, ctx).await,
        Command::DeleteField(args) => delete_field(args, ctx).await,
        Command::Reorder(args) => reorder(args, ctx).await,
        Command::Theme(args) => theme(args, ctx).await,
        Command::Publish(args) => publish(args, ctx).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match std::env::current_dir() {
        Ok(cwd) => match Context::connect(cli.offline, &cwd.display().to_string()) {
            Ok(ctx) => run(cli.command, &ctx).await,
            Err(err) => Err(err),
        },
        Err(err) => Err(anyhow::anyhow!("Cannot get current directory: {}", err)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
