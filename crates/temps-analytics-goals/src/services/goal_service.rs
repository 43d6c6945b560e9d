use chrono::Utc;
use sea_orm::*;
use serde_json::Value;
use std::sync::Arc;
use temps_entities::{goals, types::GoalType, types::GoalValueType};
use tracing::info;

use super::funnel::parse_funnel_steps;
use crate::conditions::GoalConditions;
use crate::error::GoalError;
use crate::types::{CreateGoalRequest, GoalScope, UpdateGoalRequest};

/// Goal definitions of one scope
pub struct GoalService {
    db: Arc<DatabaseConnection>,
    scope: GoalScope,
}

impl GoalService {
    pub fn new(db: Arc<DatabaseConnection>, scope: GoalScope) -> Self {
        Self { db, scope }
    }

    /// List all active goals, oldest first
    pub async fn list_goals(&self) -> Result<Vec<goals::Model>, GoalError> {
        let mut query = goals::Entity::find()
            .filter(goals::Column::ProjectId.eq(self.scope.project_id))
            .filter(goals::Column::IsActive.eq(true));

        if let Some(environment_id) = self.scope.environment_id {
            query = query.filter(
                Condition::any()
                    .add(goals::Column::EnvironmentId.is_null())
                    .add(goals::Column::EnvironmentId.eq(environment_id)),
            );
        }

        Ok(query
            .order_by_asc(goals::Column::CreatedAt)
            .order_by_asc(goals::Column::Id)
            .all(self.db.as_ref())
            .await?)
    }

    /// Get a goal of this project, active or not
    pub async fn get_goal(&self, goal_id: i32) -> Result<goals::Model, GoalError> {
        goals::Entity::find_by_id(goal_id)
            .filter(goals::Column::ProjectId.eq(self.scope.project_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| GoalError::goal_not_found(goal_id))
    }

    pub async fn create_goal(&self, request: CreateGoalRequest) -> Result<goals::Model, GoalError> {
        validate_definition(
            &request.name,
            request.goal_type,
            &request.conditions,
            request.value_type,
            request.fixed_value,
            request.dynamic_value_path.as_deref(),
            request.funnel_steps.as_ref(),
        )?;

        let now = Utc::now();
        let goal = goals::ActiveModel {
            project_id: Set(self.scope.project_id),
            environment_id: Set(self.scope.environment_id),
            name: Set(request.name),
            description: Set(request.description),
            goal_type: Set(request.goal_type),
            conditions: Set(request.conditions),
            value_type: Set(request.value_type),
            fixed_value: Set(request.fixed_value),
            dynamic_value_path: Set(request.dynamic_value_path),
            allow_multiple: Set(request.allow_multiple),
            funnel_steps: Set(request.funnel_steps),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(
            "Created {} goal {} ({}) for project {}",
            goal.goal_type, goal.id, goal.name, goal.project_id
        );

        Ok(goal)
    }

    /// Update an existing goal; the resulting definition must still be valid
    pub async fn update_goal(
        &self,
        goal_id: i32,
        request: UpdateGoalRequest,
    ) -> Result<goals::Model, GoalError> {
        let existing = self.get_goal(goal_id).await?;

        let name = request.name.unwrap_or(existing.name.clone());
        let conditions = request.conditions.unwrap_or(existing.conditions.clone());
        let value_type = request.value_type.unwrap_or(existing.value_type);
        let fixed_value = request.fixed_value.unwrap_or(existing.fixed_value);
        let dynamic_value_path = request
            .dynamic_value_path
            .unwrap_or_else(|| existing.dynamic_value_path.clone());
        let funnel_steps = request
            .funnel_steps
            .unwrap_or_else(|| existing.funnel_steps.clone());

        validate_definition(
            &name,
            existing.goal_type,
            &conditions,
            value_type,
            fixed_value,
            dynamic_value_path.as_deref(),
            funnel_steps.as_ref(),
        )?;

        let mut goal: goals::ActiveModel = existing.into();
        goal.name = Set(name);
        if let Some(description) = request.description {
            goal.description = Set(description);
        }
        goal.conditions = Set(conditions);
        goal.value_type = Set(value_type);
        goal.fixed_value = Set(fixed_value);
        goal.dynamic_value_path = Set(dynamic_value_path);
        goal.funnel_steps = Set(funnel_steps);
        if let Some(allow_multiple) = request.allow_multiple {
            goal.allow_multiple = Set(allow_multiple);
        }
        if let Some(is_active) = request.is_active {
            goal.is_active = Set(is_active);
        }
        goal.updated_at = Set(Utc::now());

        Ok(goal.update(self.db.as_ref()).await?)
    }

    /// Deactivate a goal (soft delete); its conversions are kept
    pub async fn deactivate_goal(&self, goal_id: i32) -> Result<(), GoalError> {
        let goal = self.get_goal(goal_id).await?;

        let mut goal: goals::ActiveModel = goal.into();
        goal.is_active = Set(false);
        goal.updated_at = Set(Utc::now());
        goal.update(self.db.as_ref()).await?;

        info!("Deactivated goal {}", goal_id);
        Ok(())
    }
}

fn validate_definition(
    name: &str,
    goal_type: GoalType,
    conditions: &Value,
    value_type: GoalValueType,
    fixed_value: Option<f64>,
    dynamic_value_path: Option<&str>,
    funnel_steps: Option<&Value>,
) -> Result<(), GoalError> {
    if name.trim().is_empty() {
        return Err(GoalError::validation("goal name cannot be empty"));
    }

    GoalConditions::parse(goal_type, conditions)
        .map_err(|e| GoalError::validation(format!("invalid {} conditions: {}", goal_type, e)))?;

    match value_type {
        GoalValueType::Fixed if fixed_value.is_none() => {
            return Err(GoalError::validation("fixed value goals need fixed_value"));
        }
        GoalValueType::Dynamic if dynamic_value_path.map_or(true, |p| p.trim().is_empty()) => {
            return Err(GoalError::validation(
                "dynamic value goals need dynamic_value_path",
            ));
        }
        _ => {}
    }

    if let Some(steps) = funnel_steps {
        parse_funnel_steps(steps)
            .map_err(|e| GoalError::validation(format!("invalid funnel steps: {}", e)))?;
    }

    Ok(())
}
