use sea_orm::*;
use std::collections::HashSet;
use std::sync::Arc;
use temps_core::DateRange;
use temps_entities::{conversions, goals};

use crate::error::GoalError;
use crate::types::{round2, GoalScope, GoalStats};

/// Aggregates over stored conversions
pub struct ConversionStatsService {
    db: Arc<DatabaseConnection>,
    scope: GoalScope,
}

impl ConversionStatsService {
    pub fn new(db: Arc<DatabaseConnection>, scope: GoalScope) -> Self {
        Self { db, scope }
    }

    /// Conversion totals of a goal within `range` (inclusive)
    pub async fn goal_stats(
        &self,
        goal: &goals::Model,
        range: &DateRange,
    ) -> Result<GoalStats, GoalError> {
        if goal.project_id != self.scope.project_id {
            return Err(GoalError::goal_not_found(goal.id));
        }

        let rows: Vec<(Option<i32>, Option<String>, Option<f64>)> = conversions::Entity::find()
            .select_only()
            .column(conversions::Column::VisitorId)
            .column(conversions::Column::SessionId)
            .column(conversions::Column::Value)
            .filter(conversions::Column::GoalId.eq(goal.id))
            .filter(conversions::Column::CreatedAt.gte(range.start))
            .filter(conversions::Column::CreatedAt.lte(range.end))
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        let mut visitors = HashSet::new();
        let mut sessions = HashSet::new();
        let mut total_value = 0.0;
        let mut valued = 0u64;

        for (visitor_id, session_id, value) in &rows {
            if let Some(visitor_id) = visitor_id {
                visitors.insert(*visitor_id);
            }
            if let Some(session_id) = session_id {
                sessions.insert(session_id.as_str());
            }
            if let Some(value) = value {
                total_value += value;
                valued += 1;
            }
        }

        Ok(GoalStats {
            goal_id: goal.id,
            goal_name: goal.name.clone(),
            range: *range,
            conversions: rows.len() as u64,
            unique_visitors: visitors.len() as u64,
            unique_sessions: sessions.len() as u64,
            total_value: round2(total_value),
            average_value: (valued > 0).then(|| round2(total_value / valued as f64)),
        })
    }
}
