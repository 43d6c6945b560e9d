//! Visitors, sessions and events written by the ingestion pipeline.
//!
//! The goal engine only reads these tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========================================
        // VISITOR TABLE
        // ========================================
        manager
            .create_table(
                Table::create()
                    .table(Visitor::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Visitor::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Visitor::VisitorId).string().not_null())
                    .col(ColumnDef::new(Visitor::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Visitor::EnvironmentId).integer().null())
                    .col(
                        ColumnDef::new(Visitor::FirstSeen)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Visitor::LastSeen)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Visitor::IsCrawler)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Visitor::CustomData).json().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_visitor_project_visitor_id")
                    .table(Visitor::Table)
                    .col(Visitor::ProjectId)
                    .col(Visitor::VisitorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ========================================
        // REQUEST_SESSIONS TABLE
        // ========================================
        manager
            .create_table(
                Table::create()
                    .table(RequestSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RequestSessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RequestSessions::SessionId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(RequestSessions::ProjectId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RequestSessions::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RequestSessions::LastAccessedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RequestSessions::PageCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(RequestSessions::Referrer).string().null())
                    .col(ColumnDef::new(RequestSessions::VisitorId).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_sessions_visitor")
                            .from(RequestSessions::Table, RequestSessions::VisitorId)
                            .to(Visitor::Table, Visitor::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ========================================
        // EVENTS TABLE
        // ========================================
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Events::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Events::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Events::EnvironmentId).integer().null())
                    .col(ColumnDef::new(Events::SessionId).string().null())
                    .col(ColumnDef::new(Events::VisitorId).integer().null())
                    .col(ColumnDef::new(Events::Pathname).string().not_null())
                    .col(ColumnDef::new(Events::PageTitle).string().null())
                    .col(ColumnDef::new(Events::EventType).string().not_null())
                    .col(ColumnDef::new(Events::EventName).string().null())
                    .col(ColumnDef::new(Events::EventCategory).string().null())
                    .col(ColumnDef::new(Events::Props).json().null())
                    .col(ColumnDef::new(Events::Value).double().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_visitor")
                            .from(Events::Table, Events::VisitorId)
                            .to(Visitor::Table, Visitor::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Funnel step lookups filter by project, type/name and time
        manager
            .create_index(
                Index::create()
                    .name("idx_events_project_type_timestamp")
                    .table(Events::Table)
                    .col(Events::ProjectId)
                    .col(Events::EventType)
                    .col(Events::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_project_name_timestamp")
                    .table(Events::Table)
                    .col(Events::ProjectId)
                    .col(Events::EventName)
                    .col(Events::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(RequestSessions::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Visitor::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Visitor {
    Table,
    Id,
    VisitorId,
    ProjectId,
    EnvironmentId,
    FirstSeen,
    LastSeen,
    IsCrawler,
    CustomData,
}

#[derive(DeriveIden)]
enum RequestSessions {
    Table,
    Id,
    SessionId,
    ProjectId,
    StartedAt,
    LastAccessedAt,
    PageCount,
    Referrer,
    VisitorId,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Timestamp,
    ProjectId,
    EnvironmentId,
    SessionId,
    VisitorId,
    Pathname,
    PageTitle,
    EventType,
    EventName,
    EventCategory,
    Props,
    Value,
}
