//! `SeaORM` Entity for conversions table
//!
//! Rows are written once by the goal matcher and never updated.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use temps_core::DBDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "conversions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub goal_id: i32,
    pub project_id: i32,
    pub session_id: Option<String>,
    pub visitor_id: Option<i32>,
    pub event_id: Option<i32>,
    pub page_view_id: Option<i32>,
    #[sea_orm(column_type = "Double", nullable)]
    pub value: Option<f64>,
    #[sea_orm(column_type = "Json")]
    pub metadata: Json,
    /// `"{goal_id}:{session_id}"` for single-conversion goals, NULL otherwise.
    /// Backed by a unique index.
    #[sea_orm(unique)]
    pub dedup_key: Option<String>,
    pub created_at: DBDateTime,
}

impl Model {
    pub fn dedup_key_for(goal_id: i32, session_id: &str) -> String {
        format!("{}:{}", goal_id, session_id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::goals::Entity",
        from = "Column::GoalId",
        to = "super::goals::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Goal,
}

impl Related<super::goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goal.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.created_at.is_not_set() {
            self.created_at = Set(chrono::Utc::now());
        }

        Ok(self)
    }
}
