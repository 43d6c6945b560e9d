use chrono::{Duration, TimeZone, Utc};
use temps_core::config::DatabaseConfig;
use temps_core::DateRange;

#[test]
fn test_database_config_serialization() {
    let config = DatabaseConfig {
        url: "postgresql://localhost:5432/test".to_string(),
        max_connections: 10,
        min_connections: 1,
    };

    // Test serialization
    let serialized = serde_json::to_string(&config).unwrap();
    assert!(serialized.contains("postgresql://localhost:5432/test"));
    assert!(serialized.contains("10"));

    // Test deserialization
    let deserialized: DatabaseConfig = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized.url, config.url);
    assert_eq!(deserialized.max_connections, config.max_connections);
    assert_eq!(deserialized.min_connections, config.min_connections);
}

#[test]
fn test_date_range_deserializes_lenient_bounds() {
    let range: DateRange =
        serde_json::from_str(r#"{"start":"2024-03-01","end":"2024-03-08T12:00:00"}"#).unwrap();

    assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap());

    let invalid = serde_json::from_str::<DateRange>(r#"{"start":"yesterday","end":"2024-03-08"}"#);
    assert!(invalid.is_err());
}

#[test]
fn test_date_range_previous_period_does_not_overlap() {
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
    let current = DateRange::last_days(now, 7);
    let previous = current.previous_period();

    assert_eq!(previous.start, current.start - Duration::days(7));
    assert!(previous.end < current.start);
    assert!(current.contains(current.start));
    assert!(!previous.contains(current.start));
    assert!(!previous.contains(now));
}
