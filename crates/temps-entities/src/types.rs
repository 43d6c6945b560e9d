use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Kind of fact a goal listens to.
/// NOTE: Use db_type = "Text" for SQLite compatibility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    #[sea_orm(string_value = "event")]
    Event,
    #[sea_orm(string_value = "pageview")]
    Pageview,
    #[sea_orm(string_value = "duration")]
    Duration,
    #[sea_orm(string_value = "pages_per_session")]
    PagesPerSession,
}

impl Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Event => "event",
            GoalType::Pageview => "pageview",
            GoalType::Duration => "duration",
            GoalType::PagesPerSession => "pages_per_session",
        }
    }
}

impl FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" => Ok(GoalType::Event),
            "pageview" => Ok(GoalType::Pageview),
            "duration" => Ok(GoalType::Duration),
            "pages_per_session" => Ok(GoalType::PagesPerSession),
            other => Err(format!("unknown goal type '{}'", other)),
        }
    }
}

/// How the numeric value of a conversion is obtained.
/// NOTE: Use db_type = "Text" for SQLite compatibility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum GoalValueType {
    #[default]
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "fixed")]
    Fixed,
    #[sea_orm(string_value = "dynamic")]
    Dynamic,
}

impl Display for GoalValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl GoalValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalValueType::None => "none",
            GoalValueType::Fixed => "fixed",
            GoalValueType::Dynamic => "dynamic",
        }
    }
}

impl FromStr for GoalValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(GoalValueType::None),
            "fixed" => Ok(GoalValueType::Fixed),
            "dynamic" => Ok(GoalValueType::Dynamic),
            other => Err(format!("unknown value type '{}'", other)),
        }
    }
}
