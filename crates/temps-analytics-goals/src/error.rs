use sea_orm::DbErr;
use temps_core::ServiceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoalError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid conditions for goal {goal_id}: {message}")]
    InvalidConditions { goal_id: i32, message: String },

    #[error("Invalid definition for goal {goal_id}: {message}")]
    InvalidDefinition { goal_id: i32, message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{resource} not found")]
    NotFound { resource: String },
}

impl GoalError {
    pub fn configuration(message: impl Into<String>) -> Self {
        GoalError::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        GoalError::Validation {
            message: message.into(),
        }
    }

    pub fn goal_not_found(goal_id: i32) -> Self {
        GoalError::NotFound {
            resource: format!("Goal {}", goal_id),
        }
    }
}

impl From<GoalError> for ServiceError {
    fn from(error: GoalError) -> Self {
        match error {
            GoalError::Database(e) => ServiceError::Database(e.to_string()),
            GoalError::Configuration { message } => ServiceError::Configuration { message },
            e @ (GoalError::InvalidConditions { .. } | GoalError::InvalidDefinition { .. }) => {
                ServiceError::Validation {
                    message: e.to_string(),
                }
            }
            GoalError::Validation { message } => ServiceError::Validation { message },
            GoalError::NotFound { resource } => ServiceError::NotFound { resource },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_funnel_steps_is_recoverable_configuration_error() {
        let error: ServiceError = GoalError::configuration("goal has no funnel steps").into();
        assert!(matches!(error, ServiceError::Configuration { .. }));
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_invalid_conditions_maps_to_validation() {
        let error = GoalError::InvalidConditions {
            goal_id: 7,
            message: "min_seconds is required".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid conditions for goal 7: min_seconds is required"
        );

        let error: ServiceError = error.into();
        assert!(matches!(error, ServiceError::Validation { .. }));
    }

    #[test]
    fn test_database_errors_are_not_recoverable() {
        let error: ServiceError = GoalError::Database(DbErr::Custom("boom".into())).into();
        assert!(!error.is_recoverable());
    }
}
