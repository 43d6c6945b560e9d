//! Goals and the conversions recorded against them.
//!
//! `conversions.dedup_key` carries a unique index: it is filled only for goals
//! that convert once per session, so concurrent evaluations of the same
//! (goal, session) pair cannot both insert. NULL keys never collide.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========================================
        // GOALS TABLE
        // ========================================
        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Goals::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Goals::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Goals::EnvironmentId).integer().null())
                    .col(ColumnDef::new(Goals::Name).string().not_null())
                    .col(ColumnDef::new(Goals::Description).text().null())
                    .col(ColumnDef::new(Goals::GoalType).string().not_null())
                    .col(ColumnDef::new(Goals::Conditions).json().not_null())
                    .col(
                        ColumnDef::new(Goals::ValueType)
                            .string()
                            .not_null()
                            .default("none"),
                    )
                    .col(ColumnDef::new(Goals::FixedValue).double().null())
                    .col(ColumnDef::new(Goals::DynamicValuePath).string().null())
                    .col(
                        ColumnDef::new(Goals::AllowMultiple)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Goals::FunnelSteps).json().null())
                    .col(
                        ColumnDef::new(Goals::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Goals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Goals::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Candidate lookup: active goals of one type within a project
        manager
            .create_index(
                Index::create()
                    .name("idx_goals_project_type_active")
                    .table(Goals::Table)
                    .col(Goals::ProjectId)
                    .col(Goals::GoalType)
                    .col(Goals::IsActive)
                    .to_owned(),
            )
            .await?;

        // ========================================
        // CONVERSIONS TABLE
        // ========================================
        manager
            .create_table(
                Table::create()
                    .table(Conversions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conversions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Conversions::GoalId).integer().not_null())
                    .col(ColumnDef::new(Conversions::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Conversions::SessionId).string().null())
                    .col(ColumnDef::new(Conversions::VisitorId).integer().null())
                    .col(ColumnDef::new(Conversions::EventId).integer().null())
                    .col(ColumnDef::new(Conversions::PageViewId).integer().null())
                    .col(ColumnDef::new(Conversions::Value).double().null())
                    .col(ColumnDef::new(Conversions::Metadata).json().not_null())
                    .col(ColumnDef::new(Conversions::DedupKey).string().null())
                    .col(
                        ColumnDef::new(Conversions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversions_goal")
                            .from(Conversions::Table, Conversions::GoalId)
                            .to(Goals::Table, Goals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_conversions_dedup_key")
                    .table(Conversions::Table)
                    .col(Conversions::DedupKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_conversions_goal_session")
                    .table(Conversions::Table)
                    .col(Conversions::GoalId)
                    .col(Conversions::SessionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_conversions_goal_created_at")
                    .table(Conversions::Table)
                    .col(Conversions::GoalId)
                    .col(Conversions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Conversions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Goals::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Goals {
    Table,
    Id,
    ProjectId,
    EnvironmentId,
    Name,
    Description,
    GoalType,
    Conditions,
    ValueType,
    FixedValue,
    DynamicValuePath,
    AllowMultiple,
    FunnelSteps,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Conversions {
    Table,
    Id,
    GoalId,
    ProjectId,
    SessionId,
    VisitorId,
    EventId,
    PageViewId,
    Value,
    Metadata,
    DedupKey,
    CreatedAt,
}
