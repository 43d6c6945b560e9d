//! Goal management commands

use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use temps_analytics_goals::{ConversionStatsService, CreateGoalRequest, GoalService, GoalStats};
use temps_entities::goals;
use tracing::info;

use super::args::{OutputFormat, RangeArgs, ScopeArgs};

#[derive(Args)]
pub struct GoalCommand {
    #[command(flatten)]
    pub scope: ScopeArgs,

    #[command(subcommand)]
    pub action: GoalAction,
}

#[derive(Subcommand)]
pub enum GoalAction {
    /// List active goals
    List,
    /// Create a goal from a JSON definition
    Create {
        /// JSON file with name, goal_type, conditions and optional value settings
        #[arg(long)]
        file: PathBuf,
    },
    /// Deactivate a goal; its conversions are kept
    Deactivate {
        #[arg(long)]
        goal_id: i32,
    },
    /// Conversion totals of a goal
    Stats {
        #[arg(long)]
        goal_id: i32,
        #[command(flatten)]
        range: RangeArgs,
    },
}

impl GoalCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }

    async fn run(self) -> anyhow::Result<()> {
        let db = self.scope.connect().await?;
        let scope = self.scope.scope();
        let service = GoalService::new(db.clone(), scope);
        let json = matches!(self.scope.output_format, OutputFormat::Json);

        match self.action {
            GoalAction::List => {
                let goals = service.list_goals().await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&goals)?);
                } else {
                    print_goals(&goals);
                }
            }
            GoalAction::Create { file } => {
                let request: CreateGoalRequest =
                    serde_json::from_str(&std::fs::read_to_string(&file)?)?;
                let goal = service.create_goal(request).await?;
                info!("Created goal {}", goal.id);
                if json {
                    println!("{}", serde_json::to_string_pretty(&goal)?);
                } else {
                    println!();
                    println!(
                        "{} {} {}",
                        "✅ Goal created:".bright_green().bold(),
                        goal.name.bright_cyan(),
                        format!("(id {})", goal.id).bright_white()
                    );
                    println!();
                }
            }
            GoalAction::Deactivate { goal_id } => {
                service.deactivate_goal(goal_id).await?;
                if !json {
                    println!("{} {}", "Goal deactivated:".bright_white().bold(), goal_id);
                }
            }
            GoalAction::Stats { goal_id, range } => {
                let goal = service.get_goal(goal_id).await?;
                let stats = ConversionStatsService::new(db.clone(), scope)
                    .goal_stats(&goal, &range.resolve()?)
                    .await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                } else {
                    print_stats(&stats);
                }
            }
        }

        Ok(())
    }
}

fn print_goals(goals: &[goals::Model]) {
    println!();
    if goals.is_empty() {
        println!("{}", "No active goals.".bright_white());
        println!();
        return;
    }
    for goal in goals {
        let policy = if goal.allow_multiple {
            "multiple"
        } else {
            "once per session"
        };
        let funnel = if goal.funnel_steps.is_some() {
            " funnel"
        } else {
            ""
        };
        println!(
            "  {} {} [{}] {}{}",
            format!("#{}", goal.id).bright_cyan(),
            goal.name.bright_white().bold(),
            goal.goal_type,
            policy.dimmed(),
            funnel.bright_yellow()
        );
    }
    println!();
}

fn print_stats(stats: &GoalStats) {
    println!();
    println!(
        "{} {}",
        "Goal:".bright_white().bold(),
        stats.goal_name.bright_cyan()
    );
    println!(
        "{} {}",
        "Conversions:".bright_white().bold(),
        stats.conversions.to_string().bright_green().bold()
    );
    println!("{} {}", "Unique visitors:".bright_white().bold(), stats.unique_visitors);
    println!("{} {}", "Unique sessions:".bright_white().bold(), stats.unique_sessions);
    println!(
        "{} {:.2}",
        "Total value:".bright_white().bold(),
        stats.total_value
    );
    let average = stats
        .average_value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string());
    println!("{} {}", "Average value:".bright_white().bold(), average);
    println!();
}
