use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::*;
use std::collections::HashSet;
use std::sync::Arc;
use temps_core::DateRange;
use temps_entities::events;

use super::funnel::{FunnelStepCriteria, VisitorQuery};
use crate::error::GoalError;
use crate::types::GoalScope;

/// Answers funnel step queries from the `events` table
pub struct EventsVisitorQuery {
    db: Arc<DatabaseConnection>,
    scope: GoalScope,
}

impl EventsVisitorQuery {
    pub fn new(db: Arc<DatabaseConnection>, scope: GoalScope) -> Self {
        Self { db, scope }
    }
}

#[async_trait]
impl VisitorQuery for EventsVisitorQuery {
    async fn distinct_visitors(
        &self,
        criteria: &FunnelStepCriteria,
        range: &DateRange,
    ) -> Result<HashSet<i32>, GoalError> {
        let mut query = events::Entity::find()
            .select_only()
            .column(events::Column::VisitorId)
            .distinct()
            .filter(events::Column::ProjectId.eq(self.scope.project_id))
            .filter(events::Column::VisitorId.is_not_null())
            .filter(events::Column::Timestamp.gte(range.start))
            .filter(events::Column::Timestamp.lte(range.end));

        if let Some(environment_id) = self.scope.environment_id {
            query = query.filter(events::Column::EnvironmentId.eq(environment_id));
        }

        // Unnamed events are matched by their type
        query = match criteria {
            FunnelStepCriteria::Event { event_name } => query.filter(
                Expr::expr(Func::coalesce([
                    Expr::col(events::Column::EventName).into(),
                    Expr::col(events::Column::EventType).into(),
                ]))
                .eq(event_name.as_str()),
            ),
            FunnelStepCriteria::PageView { path } => query
                .filter(events::Column::EventType.eq(events::PAGE_VIEW_EVENT_TYPE))
                .filter(events::Column::Pathname.eq(path.as_str())),
        };

        let visitors: Vec<Option<i32>> = query.into_tuple().all(self.db.as_ref()).await?;

        Ok(visitors.into_iter().flatten().collect())
    }
}
