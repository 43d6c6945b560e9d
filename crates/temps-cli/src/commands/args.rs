//! Arguments shared by the goal commands

use clap::Args;
use std::sync::Arc;
use temps_analytics_goals::GoalScope;
use temps_core::{parse_utc_datetime, DatabaseConfig, DateRange};
use temps_database::DbConnection;
use tracing::debug;

/// Output format for command results
#[derive(Debug, Clone, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors and formatting
    #[default]
    Text,
    /// JSON output for automation and scripting
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct ScopeArgs {
    /// Database connection URL
    #[arg(long, env = "TEMPS_DATABASE_URL")]
    pub database_url: String,

    /// Maximum number of pooled database connections
    #[arg(long, env = "TEMPS_DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Project whose goals are used
    #[arg(long, env = "TEMPS_PROJECT_ID")]
    pub project_id: i32,

    /// Restrict to one environment of the project
    #[arg(long, env = "TEMPS_ENVIRONMENT_ID")]
    pub environment_id: Option<i32>,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

impl ScopeArgs {
    pub fn scope(&self) -> GoalScope {
        GoalScope {
            project_id: self.project_id,
            environment_id: self.environment_id,
        }
    }

    pub async fn connect(&self) -> anyhow::Result<Arc<DbConnection>> {
        let mut config = DatabaseConfig::new(self.database_url.clone());
        config.max_connections = self.max_connections;
        config.min_connections = 1;

        debug!("Initializing database connection...");
        Ok(temps_database::establish_connection_with_config(&config).await?)
    }
}

#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    /// Start of the range (RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`)
    #[arg(long)]
    pub from: Option<String>,

    /// End of the range, defaults to now
    #[arg(long)]
    pub to: Option<String>,

    /// Length of the range in days when --from is not given
    #[arg(long, default_value_t = 30)]
    pub days: i64,
}

impl RangeArgs {
    pub fn resolve(&self) -> anyhow::Result<DateRange> {
        let end = match &self.to {
            Some(to) => parse_datetime(to)?,
            None => chrono::Utc::now(),
        };

        match &self.from {
            Some(from) => Ok(DateRange::new(parse_datetime(from)?, end)),
            None => Ok(DateRange::last_days(end, self.days)),
        }
    }
}

fn parse_datetime(input: &str) -> anyhow::Result<temps_core::UtcDateTime> {
    parse_utc_datetime(input).ok_or_else(|| anyhow::anyhow!("Invalid date '{}'", input))
}
