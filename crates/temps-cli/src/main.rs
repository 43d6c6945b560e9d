//! Temps CLI - goal and funnel analytics from the command line
//!
//! Evaluates triggers against configured goals, manages goals and reports
//! funnel conversion for a project.

mod commands;

use clap::{Parser, Subcommand};
use commands::{EvaluateCommand, FunnelCommand, GoalCommand};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "TEMPS_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "TEMPS_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate triggers against the project's goals
    Evaluate(EvaluateCommand),
    /// Funnel analysis for goals with funnel steps
    Funnel(FunnelCommand),
    /// Goal management and conversion stats
    Goal(GoalCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Use log level from base CLI
    let log_level = cli.log_level.clone();

    // If RUST_LOG is set, use it directly; otherwise use our default filter
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .expect("Invalid RUST_LOG environment variable")
    } else {
        // All temps crates at the specified level, noisy dependencies at warn
        tracing_subscriber::EnvFilter::new(format!(
            "temps_cli={level},\
             temps_core={level},\
             temps_queue={level},\
             temps_entities={level},\
             temps_database={level},\
             temps_migrations={level},\
             temps_analytics_goals={level},\
             sqlx=warn,\
             sea_orm=warn,\
             sea_orm_migration=warn",
            level = log_level
        ))
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer() // "compact" or any other value
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");

    match cli.command {
        Commands::Evaluate(evaluate_cmd) => evaluate_cmd.execute(),
        Commands::Funnel(funnel_cmd) => funnel_cmd.execute(),
        Commands::Goal(goal_cmd) => goal_cmd.execute(),
    }
}
