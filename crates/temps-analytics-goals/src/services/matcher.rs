use sea_orm::*;
use std::sync::Arc;
use temps_core::{GoalConvertedJob, Job, JobQueue};
use temps_entities::{conversions, goals, request_sessions, visitor};
use tracing::{debug, error, info, warn};

use crate::conditions::GoalConditions;
use crate::error::GoalError;
use crate::types::{GoalScope, Trigger};
use crate::value::resolve_value;

/// Evaluates triggers against the active goals of one scope and records conversions
pub struct GoalMatcher {
    db: Arc<DatabaseConnection>,
    queue: Arc<dyn JobQueue>,
    scope: GoalScope,
}

/// Identity of the visit a trigger belongs to
struct VisitContext {
    session_id: Option<String>,
    visitor_id: Option<i32>,
}

impl GoalMatcher {
    pub fn new(db: Arc<DatabaseConnection>, queue: Arc<dyn JobQueue>, scope: GoalScope) -> Self {
        Self { db, queue, scope }
    }

    pub fn scope(&self) -> GoalScope {
        self.scope
    }

    /// Evaluate one trigger and return the conversions it created.
    ///
    /// The session and visitor records, when given, take precedence over the
    /// identifiers carried by the trigger. Goals that are malformed or fail
    /// to persist are logged and skipped; duplicates are skipped silently.
    pub async fn evaluate(
        &self,
        trigger: &Trigger,
        session: Option<&request_sessions::Model>,
        visitor: Option<&visitor::Model>,
    ) -> Result<Vec<conversions::Model>, GoalError> {
        let context = VisitContext {
            session_id: session
                .map(|s| s.session_id.clone())
                .or_else(|| trigger.session_id().map(str::to_owned)),
            visitor_id: visitor.map(|v| v.id).or_else(|| trigger.visitor_id()),
        };

        let candidates = self.candidate_goals(trigger).await?;
        debug!(
            "Evaluating {} trigger against {} candidate goals for project {}",
            trigger.kind(),
            candidates.len(),
            self.scope.project_id
        );

        let mut created = Vec::new();
        for row in candidates {
            let goal_id = row.id;
            let result = match row.into_model() {
                Ok(goal) => self.evaluate_goal(&goal, trigger, &context).await,
                Err(message) => Err(GoalError::InvalidDefinition { goal_id, message }),
            };

            match result {
                Ok(Some(conversion)) => created.push(conversion),
                Ok(None) => {}
                Err(
                    e @ (GoalError::InvalidConditions { .. } | GoalError::InvalidDefinition { .. }),
                ) => {
                    warn!("Skipping goal {}: {}", goal_id, e);
                }
                Err(e) => {
                    error!("Failed to evaluate goal {}: {}", goal_id, e);
                }
            }
        }

        Ok(created)
    }

    /// Active goals of the scope whose type applies to the trigger.
    /// Goals without an environment apply to every environment of the project.
    /// Rows are decoded one by one by the caller so a corrupt row only skips itself.
    async fn candidate_goals(&self, trigger: &Trigger) -> Result<Vec<goals::RawModel>, GoalError> {
        let goal_types: Vec<&'static str> =
            trigger.goal_types().iter().map(|t| t.as_str()).collect();

        let mut query = goals::Entity::find()
            .filter(goals::Column::ProjectId.eq(self.scope.project_id))
            .filter(goals::Column::IsActive.eq(true))
            .filter(goals::Column::GoalType.is_in(goal_types));

        if let Some(environment_id) = self.scope.environment_id {
            query = query.filter(
                Condition::any()
                    .add(goals::Column::EnvironmentId.is_null())
                    .add(goals::Column::EnvironmentId.eq(environment_id)),
            );
        }

        Ok(query
            .order_by_asc(goals::Column::Id)
            .into_model::<goals::RawModel>()
            .all(self.db.as_ref())
            .await?)
    }

    async fn evaluate_goal(
        &self,
        goal: &goals::Model,
        trigger: &Trigger,
        context: &VisitContext,
    ) -> Result<Option<conversions::Model>, GoalError> {
        let conditions = GoalConditions::parse(goal.goal_type, &goal.conditions).map_err(
            |message| GoalError::InvalidConditions {
                goal_id: goal.id,
                message,
            },
        )?;

        if !conditions.matches(trigger) {
            debug!("Goal {} conditions not met", goal.id);
            return Ok(None);
        }

        // Single-conversion goals are keyed by session; without a session
        // there is nothing to de-duplicate against.
        let single_session = match &context.session_id {
            Some(session_id) if !goal.allow_multiple => Some(session_id.as_str()),
            _ => None,
        };
        let dedup_key =
            single_session.map(|session_id| conversions::Model::dedup_key_for(goal.id, session_id));

        // Looked up by (goal, session) rather than by key: conversions stored
        // while the goal allowed multiple conversions carry no key.
        if let Some(session_id) = single_session {
            let existing = conversions::Entity::find()
                .filter(conversions::Column::GoalId.eq(goal.id))
                .filter(conversions::Column::SessionId.eq(session_id))
                .one(self.db.as_ref())
                .await?;
            if existing.is_some() {
                debug!("Goal {} already converted in session {}", goal.id, session_id);
                return Ok(None);
            }
        }

        let conversion = conversions::ActiveModel {
            goal_id: Set(goal.id),
            project_id: Set(goal.project_id),
            session_id: Set(context.session_id.clone()),
            visitor_id: Set(context.visitor_id),
            event_id: Set(trigger.event_id()),
            page_view_id: Set(trigger.page_view_id()),
            value: Set(resolve_value(goal, trigger)),
            metadata: Set(trigger.metadata()),
            dedup_key: Set(dedup_key),
            ..Default::default()
        };

        // The unique index on dedup_key settles races between concurrent
        // evaluations of the same session.
        let conversion = match conversion.insert(self.db.as_ref()).await {
            Ok(conversion) => conversion,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!(
                    "Goal {} conversion lost a concurrent insert, treating as duplicate",
                    goal.id
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "Goal {} ({}) converted, conversion {} value {:?}",
            goal.id, goal.name, conversion.id, conversion.value
        );

        self.notify(goal, &conversion).await;

        Ok(Some(conversion))
    }

    async fn notify(&self, goal: &goals::Model, conversion: &conversions::Model) {
        let job = Job::GoalConverted(GoalConvertedJob {
            goal_id: goal.id,
            goal_name: goal.name.clone(),
            project_id: conversion.project_id,
            conversion_id: conversion.id,
            session_id: conversion.session_id.clone(),
            visitor_id: conversion.visitor_id,
            value: conversion.value,
            converted_at: conversion.created_at,
        });

        if let Err(e) = self.queue.send(job).await {
            warn!(
                "Failed to publish conversion {} for goal {}: {}",
                conversion.id, goal.id, e
            );
        }
    }
}
