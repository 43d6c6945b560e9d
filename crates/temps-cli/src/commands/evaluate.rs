//! Evaluate triggers against the goals of a project
//!
//! Useful for replaying facts after goals were added or changed, and for
//! checking a goal definition against a sample trigger.

use clap::Args;
use colored::Colorize;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::Value;
use std::path::PathBuf;
use temps_analytics_goals::{GoalMatcher, Trigger};
use temps_core::Job;
use temps_entities::{conversions, events, request_sessions, visitor};
use temps_queue::BroadcastQueueService;
use tracing::{debug, info};

use super::args::{OutputFormat, ScopeArgs};

#[derive(Args)]
pub struct EvaluateCommand {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// JSON file holding one trigger or an array of triggers
    #[arg(long, conflicts_with = "event_id", required_unless_present = "event_id")]
    pub trigger_file: Option<PathBuf>,

    /// Evaluate a stored page view or custom event
    #[arg(long)]
    pub event_id: Option<i32>,

    /// Session the triggers belong to; its visitor is loaded as well
    #[arg(long)]
    pub session_id: Option<String>,
}

/// Parse a trigger file: a single trigger object or an array of them
pub fn parse_triggers(content: &str) -> anyhow::Result<Vec<Trigger>> {
    let value: Value = serde_json::from_str(content)?;
    let triggers = match value {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Trigger>, _>>()?,
        single => vec![serde_json::from_value(single)?],
    };
    Ok(triggers)
}

impl EvaluateCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }

    async fn run(self) -> anyhow::Result<()> {
        let db = self.scope.connect().await?;

        let triggers = match (&self.trigger_file, self.event_id) {
            (Some(path), _) => parse_triggers(&std::fs::read_to_string(path)?)?,
            (None, Some(event_id)) => {
                let event = events::Entity::find_by_id(event_id)
                    .filter(events::Column::ProjectId.eq(self.scope.project_id))
                    .one(db.as_ref())
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("Event {} not found", event_id))?;
                vec![Trigger::from_event(&event)]
            }
            (None, None) => anyhow::bail!("Either --trigger-file or --event-id is required"),
        };

        let (session, visitor) = match &self.session_id {
            Some(session_id) => load_visit(db.as_ref(), session_id).await?,
            None => (None, None),
        };

        let (queue, mut notifications) = BroadcastQueueService::create_broadcast_channel(1024);
        let matcher = GoalMatcher::new(db.clone(), std::sync::Arc::new(queue), self.scope.scope());

        info!("Evaluating {} triggers", triggers.len());

        let mut created: Vec<conversions::Model> = Vec::new();
        for trigger in &triggers {
            let conversions = matcher
                .evaluate(trigger, session.as_ref(), visitor.as_ref())
                .await?;
            debug!(
                "{} trigger produced {} conversions",
                trigger.kind(),
                conversions.len()
            );
            created.extend(conversions);
        }

        let mut published = 0;
        while let Ok(Job::GoalConverted(_)) = notifications.try_recv() {
            published += 1;
        }

        match self.scope.output_format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "triggers": triggers.len(),
                    "conversions": created,
                    "notifications": published,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => print_conversions(triggers.len(), &created),
        }

        Ok(())
    }
}

async fn load_visit(
    db: &DatabaseConnection,
    session_id: &str,
) -> anyhow::Result<(Option<request_sessions::Model>, Option<visitor::Model>)> {
    let session = request_sessions::Entity::find()
        .filter(request_sessions::Column::SessionId.eq(session_id))
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Session '{}' not found", session_id))?;

    let visitor = match session.visitor_id {
        Some(visitor_id) => visitor::Entity::find_by_id(visitor_id).one(db).await?,
        None => None,
    };

    Ok((Some(session), visitor))
}

fn print_conversions(trigger_count: usize, created: &[conversions::Model]) {
    println!();
    println!(
        "{} {}",
        "Triggers evaluated:".bright_white().bold(),
        trigger_count.to_string().bright_cyan()
    );
    println!(
        "{} {}",
        "Conversions recorded:".bright_white().bold(),
        created.len().to_string().bright_green().bold()
    );

    for conversion in created {
        let value = conversion
            .value
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} goal {} session {} value {}",
            format!("#{}", conversion.id).bright_cyan(),
            conversion.goal_id.to_string().bright_white(),
            conversion.session_id.as_deref().unwrap_or("-").bright_white(),
            value.bright_yellow()
        );
    }
    println!();
}
