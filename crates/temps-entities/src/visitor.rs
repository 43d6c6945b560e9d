use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use temps_core::DBDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "visitor")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Anonymous identifier issued by the tracking script
    pub visitor_id: String,
    pub project_id: i32,
    pub environment_id: Option<i32>,
    pub first_seen: DBDateTime,
    pub last_seen: DBDateTime,
    pub is_crawler: bool,
    #[sea_orm(column_type = "Json", nullable)]
    pub custom_data: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::request_sessions::Entity")]
    RequestSessions,
    #[sea_orm(has_many = "super::events::Entity")]
    Events,
}

impl Related<super::request_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestSessions.def()
    }
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
