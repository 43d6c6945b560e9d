//! `SeaORM` Entity for events table
//!
//! Holds both page views (`event_type = "page_view"`) and custom events.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use temps_core::DBDateTime;

pub const PAGE_VIEW_EVENT_TYPE: &str = "page_view";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub timestamp: DBDateTime,
    pub project_id: i32,
    pub environment_id: Option<i32>,

    // Session tracking
    pub session_id: Option<String>,
    pub visitor_id: Option<i32>,

    // Page data
    pub pathname: String,
    pub page_title: Option<String>,

    // Event details
    pub event_type: String,
    pub event_name: Option<String>,
    pub event_category: Option<String>,
    #[sea_orm(column_type = "Json", nullable)]
    pub props: Option<Json>,
    #[sea_orm(column_type = "Double", nullable)]
    pub value: Option<f64>,
}

impl Model {
    pub fn is_page_view(&self) -> bool {
        self.event_type == PAGE_VIEW_EVENT_TYPE
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::visitor::Entity",
        from = "Column::VisitorId",
        to = "super::visitor::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Visitor,
}

impl Related<super::visitor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visitor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
