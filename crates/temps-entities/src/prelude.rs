pub use super::conversions::Entity as Conversions;
pub use super::events::Entity as Events;
pub use super::goals::Entity as Goals;
pub use super::request_sessions::Entity as RequestSessions;
pub use super::visitor::Entity as Visitor;
