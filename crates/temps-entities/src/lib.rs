pub mod types;

// Analytics facts produced by the ingestion pipeline
pub mod events;
pub mod request_sessions;
pub mod visitor;

// Goal engine entities
pub mod conversions;
pub mod goals;

pub mod prelude;
