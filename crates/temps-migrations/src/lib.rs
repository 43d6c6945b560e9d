//! Database migrations for the Temps goal engine

pub use sea_orm_migration::prelude::*;

mod migration;

pub use migration::Migrator;
