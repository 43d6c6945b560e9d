//! `SeaORM` Entity for goals table
//!
//! `conditions` and `funnel_steps` are stored as raw JSON; the goal engine
//! parses them into typed variants per goal when evaluating, so one malformed
//! row never prevents loading the others.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr, FromQueryResult};
use serde::{Deserialize, Serialize};
use temps_core::DBDateTime;

use crate::types::{GoalType, GoalValueType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub environment_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    #[sea_orm(column_type = "Json")]
    pub conditions: Json,
    pub value_type: GoalValueType,
    #[sea_orm(column_type = "Double", nullable)]
    pub fixed_value: Option<f64>,
    pub dynamic_value_path: Option<String>,
    /// When false (the default) a goal converts at most once per session
    pub allow_multiple: bool,
    #[sea_orm(column_type = "Json", nullable)]
    pub funnel_steps: Option<Json>,
    pub is_active: bool,
    pub created_at: DBDateTime,
    pub updated_at: DBDateTime,
}

/// A goal row with its enum columns left as text.
///
/// Loaded through `Select::into_model` so that a row holding an unknown
/// `goal_type` or `value_type` fails on its own in `into_model()` instead of
/// failing the whole query.
#[derive(Clone, Debug, FromQueryResult)]
pub struct RawModel {
    pub id: i32,
    pub project_id: i32,
    pub environment_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub goal_type: String,
    pub conditions: Json,
    pub value_type: String,
    pub fixed_value: Option<f64>,
    pub dynamic_value_path: Option<String>,
    pub allow_multiple: bool,
    pub funnel_steps: Option<Json>,
    pub is_active: bool,
    pub created_at: DBDateTime,
    pub updated_at: DBDateTime,
}

impl RawModel {
    pub fn into_model(self) -> Result<Model, String> {
        Ok(Model {
            goal_type: self.goal_type.parse::<GoalType>()?,
            value_type: self.value_type.parse::<GoalValueType>()?,
            id: self.id,
            project_id: self.project_id,
            environment_id: self.environment_id,
            name: self.name,
            description: self.description,
            conditions: self.conditions,
            fixed_value: self.fixed_value,
            dynamic_value_path: self.dynamic_value_path,
            allow_multiple: self.allow_multiple,
            funnel_steps: self.funnel_steps,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::conversions::Entity")]
    Conversions,
}

impl Related<super::conversions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversions.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now();

        if insert && self.created_at.is_not_set() {
            self.created_at = Set(now);
        }
        if self.updated_at.is_not_set() || !insert {
            self.updated_at = Set(now);
        }

        Ok(self)
    }
}
