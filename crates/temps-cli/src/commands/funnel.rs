//! Funnel analysis commands

use clap::{Args, Subcommand};
use colored::Colorize;
use temps_analytics_goals::{
    EventsVisitorQuery, FunnelAnalyzer, FunnelReport, GoalService, StepBottleneck,
};
use temps_core::DateRange;

use super::args::{OutputFormat, RangeArgs, ScopeArgs};

#[derive(Args)]
pub struct FunnelCommand {
    #[command(flatten)]
    pub scope: ScopeArgs,

    #[command(subcommand)]
    pub action: FunnelAction,
}

#[derive(Subcommand)]
pub enum FunnelAction {
    /// Visitors, conversion and drop-off per funnel step
    Analyze {
        /// Goal whose funnel steps are analyzed
        #[arg(long)]
        goal_id: i32,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Compare a range with a previous one
    Compare {
        #[arg(long)]
        goal_id: i32,
        #[command(flatten)]
        range: RangeArgs,
        /// Start of the previous range; defaults to the period right before
        #[arg(long, requires = "previous_to")]
        previous_from: Option<String>,
        /// End of the previous range
        #[arg(long, requires = "previous_from")]
        previous_to: Option<String>,
    },
    /// Steps with the highest drop-off
    Bottlenecks {
        #[arg(long)]
        goal_id: i32,
        #[command(flatten)]
        range: RangeArgs,
        /// Number of steps to show
        #[arg(long, default_value_t = 3)]
        limit: usize,
    },
}

impl FunnelCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }

    async fn run(self) -> anyhow::Result<()> {
        let db = self.scope.connect().await?;
        let scope = self.scope.scope();
        let goals = GoalService::new(db.clone(), scope);
        let analyzer = FunnelAnalyzer::new(EventsVisitorQuery::new(db.clone(), scope), scope);
        let json = matches!(self.scope.output_format, OutputFormat::Json);

        match self.action {
            FunnelAction::Analyze { goal_id, range } => {
                let goal = goals.get_goal(goal_id).await?;
                let report = analyzer.analyze(&goal, &range.resolve()?).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print_report(&report);
                }
            }
            FunnelAction::Compare {
                goal_id,
                range,
                previous_from,
                previous_to,
            } => {
                let goal = goals.get_goal(goal_id).await?;
                let current = range.resolve()?;
                let previous = match (previous_from, previous_to) {
                    (Some(from), Some(to)) => RangeArgs {
                        from: Some(from),
                        to: Some(to),
                        days: range.days,
                    }
                    .resolve()?,
                    _ => current.previous_period(),
                };

                let comparison = analyzer.compare(&goal, &current, &previous).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&comparison)?);
                } else {
                    print_report(&comparison.current);
                    print_report(&comparison.previous);
                    let change = format!("{:+.2} pp", comparison.change);
                    let change = if comparison.change < 0.0 {
                        change.bright_red()
                    } else {
                        change.bright_green()
                    };
                    println!(
                        "{} {}",
                        "Overall conversion change:".bright_white().bold(),
                        change.bold()
                    );
                    println!();
                }
            }
            FunnelAction::Bottlenecks {
                goal_id,
                range,
                limit,
            } => {
                let goal = goals.get_goal(goal_id).await?;
                let bottlenecks = analyzer
                    .get_bottlenecks(&goal, &range.resolve()?, limit)
                    .await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&bottlenecks)?);
                } else {
                    print_bottlenecks(&bottlenecks);
                }
            }
        }

        Ok(())
    }
}

fn format_range(range: &DateRange) -> String {
    format!(
        "{} → {}",
        range.start.format("%Y-%m-%d %H:%M"),
        range.end.format("%Y-%m-%d %H:%M")
    )
}

fn print_report(report: &FunnelReport) {
    println!();
    println!(
        "{} {} {}",
        "Funnel:".bright_white().bold(),
        report.goal_name.bright_cyan(),
        format_range(&report.range).dimmed()
    );
    for step in &report.steps {
        println!(
            "  {}. {:<30} {:>8} visitors  {:>7.2}% converted  {:>7.2}% dropped",
            step.step_index + 1,
            step.name,
            step.visitors,
            step.conversion_rate,
            step.dropoff_rate
        );
    }
    println!(
        "{} {}",
        "Overall conversion:".bright_white().bold(),
        format!("{:.2}%", report.overall_conversion).bright_green().bold()
    );
}

fn print_bottlenecks(bottlenecks: &[StepBottleneck]) {
    println!();
    if bottlenecks.is_empty() {
        println!("{}", "No bottlenecks: the funnel has a single step.".bright_white());
        return;
    }
    for (rank, step) in bottlenecks.iter().enumerate() {
        println!(
            "  {} step {} {} {} → {} visitors ({})",
            format!("#{}", rank + 1).bright_yellow().bold(),
            step.step_index + 1,
            step.name.bright_cyan(),
            step.previous_visitors,
            step.visitors,
            format!("{:.2}% drop-off", step.dropoff_rate).bright_red()
        );
    }
    println!();
}
