use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, debug, info};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

mod cli;

use cli::render::{self, ListView};
use cli::{Cli, Commands};
use tasktrack::config::Config;
use tasktrack::domain::{Task, TaskId, TaskStatus, TaskUpdate};
use tasktrack::error::TaskError;
use tasktrack::store::{self, TaskStore};

fn setup_logging(cli: &Cli, config: &Config) {
    // RUST_LOG wins over config; --verbose wins over both
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(config.log_level.as_deref().unwrap_or("warn"));
    builder.parse_default_env();
    if cli.is_verbose() {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).format_timestamp(None).init();
}

/// Resolve config file plus command-line overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    if let Some(file) = &cli.file {
        config.storage.set_data_path(file.clone());
    }
    if cli.strict {
        config.storage.strict = true;
    }
    Ok(config)
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    let store = store::open_store(&config.storage)?;
    debug!("Using {} store at {}", store.backend(), config.storage.data_path().display());

    match &cli.command {
        Commands::Add { title } => handle_add_command(store.as_ref(), &Commands::joined_title(title)),
        Commands::List { status } => {
            let view = status.map(ListView::Status).unwrap_or(ListView::All);
            print_list(view, store.list_tasks(*status)?)
        }
        Commands::Show { id } => handle_show_command(store.as_ref(), *id),
        Commands::Done => print_list(ListView::Done, store.list_done()?),
        Commands::Pending => print_list(ListView::Pending, store.list_pending()?),
        Commands::InProgress => print_list(ListView::InProgress, store.list_in_progress()?),
        Commands::Update { id, title, status } => {
            handle_update_command(store.as_ref(), *id, title.as_deref(), *status)
        }
        Commands::Delete { id, yes } => handle_delete_command(store.as_ref(), *id, *yes),
    }
}

fn handle_add_command(store: &dyn TaskStore, title: &str) -> Result<()> {
    let task = store.add_task(title)?;
    info!("Added task #{}", task.id);
    println!("{} {}", format!("✅ Added task #{}:", task.id).green(), task.title.bold());
    Ok(())
}

fn print_list(view: ListView, tasks: Vec<Task>) -> Result<()> {
    println!("{}", render::task_list(view, &tasks));
    Ok(())
}

fn handle_show_command(store: &dyn TaskStore, id: TaskId) -> Result<()> {
    let task = store.get_task(id)?;
    println!("{}", render::task_detail(&task));
    Ok(())
}

fn handle_update_command(
    store: &dyn TaskStore,
    id: TaskId,
    title: Option<&str>,
    status: Option<TaskStatus>,
) -> Result<()> {
    let update = TaskUpdate::new(title, status)?;

    let task = store.update_task(id, &update)?;
    info!("Updated task #{}", id);

    if let Some(title) = update.new_title() {
        println!("📝 Updated title: {}", title);
    }
    if let Some(status) = update.new_status() {
        println!("🔄 Updated status: {}", status);
    }
    println!("{}", format!("✅ Task #{} updated!", task.id).green());
    Ok(())
}

fn handle_delete_command(store: &dyn TaskStore, id: TaskId, yes: bool) -> Result<()> {
    let task = store.get_task(id)?;

    if !yes {
        let question = format!("🗑️  Delete task #{}: '{}'?", task.id, task.title);
        if !confirm(&question)? {
            println!("{}", "❌ Deletion cancelled".red());
            return Ok(());
        }
    }

    if !store.delete_task(id)? {
        return Err(TaskError::NotFound(id).into());
    }
    info!("Deleted task #{}", id);
    println!("{}", format!("✅ Task #{} deleted!", id).green());
    Ok(())
}

/// Ask a yes/no question on stdin. Anything but y/yes is a no.
fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Map a failure to the process exit code, preferring the store's taxonomy.
fn exit_code_for(report: &eyre::Report) -> u8 {
    report
        .chain()
        .find_map(|cause| cause.downcast_ref::<TaskError>())
        .map(TaskError::exit_code)
        .unwrap_or(1)
}

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration, then set up logging from it
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "❌".red(), e);
            return ExitCode::from(1);
        }
    };
    setup_logging(&cli, &config);

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    match run_application(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "❌".red(), e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}
