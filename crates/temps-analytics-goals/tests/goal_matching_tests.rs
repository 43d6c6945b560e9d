//! End-to-end goal evaluation against a migrated database

use chrono::{Duration, Utc};
use sea_orm::*;
use serde_json::{json, Value};
use std::sync::Arc;
use temps_analytics_goals::{
    CreateGoalRequest, EventTrigger, GoalMatcher, GoalScope, GoalService, PageViewTrigger,
    SessionTrigger, Trigger, UpdateGoalRequest,
};
use temps_core::Job;
use temps_database::test_utils::TestDatabase;
use temps_entities::types::{GoalType, GoalValueType};
use temps_entities::{conversions, goals, request_sessions, visitor};
use temps_queue::BroadcastQueueService;
use tokio::sync::broadcast;

struct Harness {
    _test_db: TestDatabase,
    db: Arc<DatabaseConnection>,
    goals: GoalService,
    matcher: GoalMatcher,
    jobs: broadcast::Receiver<Job>,
}

async fn harness() -> Harness {
    let test_db = TestDatabase::with_migrations()
        .await
        .expect("Failed to create test database");
    let db = test_db.connection_arc();
    let (queue, jobs) = BroadcastQueueService::create_job_queue_arc_with_receiver(64);
    let scope = GoalScope::project(1);

    Harness {
        goals: GoalService::new(db.clone(), scope),
        matcher: GoalMatcher::new(db.clone(), queue, scope),
        db,
        jobs,
        _test_db: test_db,
    }
}

impl Harness {
    async fn create_goal(&self, request: CreateGoalRequest) -> goals::Model {
        self.goals
            .create_goal(request)
            .await
            .expect("Failed to create goal")
    }

    async fn stored_conversions(&self, goal_id: i32) -> Vec<conversions::Model> {
        conversions::Entity::find()
            .filter(conversions::Column::GoalId.eq(goal_id))
            .order_by_asc(conversions::Column::Id)
            .all(self.db.as_ref())
            .await
            .expect("Failed to load conversions")
    }
}

fn properties(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn purchase(session_id: &str, value: f64) -> Trigger {
    let mut event = EventTrigger::new("purchase");
    event.value = Some(value);
    event.properties = properties(json!({"total": value}));
    event.session_id = Some(session_id.to_string());
    Trigger::Event(event)
}

fn page_view(path: &str, session_id: &str) -> Trigger {
    let mut page_view = PageViewTrigger::new(path);
    page_view.session_id = Some(session_id.to_string());
    Trigger::PageView(page_view)
}

#[tokio::test]
async fn test_purchase_with_dynamic_value() {
    let h = harness().await;
    let mut request = CreateGoalRequest::new(
        "Big purchase",
        GoalType::Event,
        json!({"event_name": "purchase", "min_value": 100}),
    );
    request.value_type = GoalValueType::Dynamic;
    request.dynamic_value_path = Some("total".to_string());
    let goal = h.create_goal(request).await;

    let created = h
        .matcher
        .evaluate(&purchase("s-1", 150.0), None, None)
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].goal_id, goal.id);
    assert_eq!(created[0].value, Some(150.0));
    assert_eq!(created[0].metadata["event_name"], json!("purchase"));

    // Below min_value
    let created = h
        .matcher
        .evaluate(&purchase("s-2", 99.0), None, None)
        .await
        .unwrap();
    assert!(created.is_empty());
}

#[tokio::test]
async fn test_thank_you_page_pattern() {
    let h = harness().await;
    let goal = h
        .create_goal(CreateGoalRequest::new(
            "Order confirmed",
            GoalType::Pageview,
            json!({"path_pattern": "/thank-you*"}),
        ))
        .await;

    let created = h
        .matcher
        .evaluate(&page_view("/thank-you/order-123", "s-1"), None, None)
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].goal_id, goal.id);
    assert_eq!(created[0].value, None);
    assert_eq!(created[0].metadata["path"], json!("/thank-you/order-123"));

    let created = h
        .matcher
        .evaluate(&page_view("/cart", "s-1"), None, None)
        .await
        .unwrap();
    assert!(created.is_empty());
}

#[tokio::test]
async fn test_session_duration_goal() {
    let h = harness().await;
    h.create_goal(CreateGoalRequest::new(
        "Long visit",
        GoalType::Duration,
        json!({"min_seconds": 300}),
    ))
    .await;

    let mut long = SessionTrigger::new(600, 2);
    long.session_id = Some("s-long".to_string());
    let mut short = SessionTrigger::new(100, 2);
    short.session_id = Some("s-short".to_string());

    let created = h
        .matcher
        .evaluate(&Trigger::Session(long), None, None)
        .await
        .unwrap();
    assert_eq!(created.len(), 1);

    let created = h
        .matcher
        .evaluate(&Trigger::Session(short), None, None)
        .await
        .unwrap();
    assert!(created.is_empty());
}

#[tokio::test]
async fn test_single_goal_converts_once_per_session() {
    let h = harness().await;
    let goal = h
        .create_goal(CreateGoalRequest::new(
            "Purchase",
            GoalType::Event,
            json!({"event_name": "purchase"}),
        ))
        .await;

    let first = h
        .matcher
        .evaluate(&purchase("s-1", 10.0), None, None)
        .await
        .unwrap();
    let second = h
        .matcher
        .evaluate(&purchase("s-1", 20.0), None, None)
        .await
        .unwrap();
    let other_session = h
        .matcher
        .evaluate(&purchase("s-2", 30.0), None, None)
        .await
        .unwrap();

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(other_session.len(), 1);
    assert_eq!(h.stored_conversions(goal.id).await.len(), 2);
}

#[tokio::test]
async fn test_multiple_policy_converts_every_time() {
    let h = harness().await;
    let mut request = CreateGoalRequest::new(
        "Add to cart",
        GoalType::Event,
        json!({"event_name": "purchase"}),
    );
    request.allow_multiple = true;
    let goal = h.create_goal(request).await;

    h.matcher
        .evaluate(&purchase("s-1", 10.0), None, None)
        .await
        .unwrap();
    h.matcher
        .evaluate(&purchase("s-1", 20.0), None, None)
        .await
        .unwrap();

    let stored = h.stored_conversions(goal.id).await;
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|c| c.dedup_key.is_none()));
}

#[tokio::test]
async fn test_switching_to_single_policy_respects_earlier_conversions() {
    let h = harness().await;
    let mut request = CreateGoalRequest::new(
        "Pricing visit",
        GoalType::Pageview,
        json!({"path_exact": "/p"}),
    );
    request.allow_multiple = true;
    let goal = h.create_goal(request).await;

    let first = h
        .matcher
        .evaluate(&page_view("/p", "s-1"), None, None)
        .await
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].dedup_key, None);

    h.goals
        .update_goal(
            goal.id,
            UpdateGoalRequest {
                allow_multiple: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let again = h
        .matcher
        .evaluate(&page_view("/p", "s-1"), None, None)
        .await
        .unwrap();
    assert!(again.is_empty());
    assert_eq!(h.stored_conversions(goal.id).await.len(), 1);

    let other_session = h
        .matcher
        .evaluate(&page_view("/p", "s-2"), None, None)
        .await
        .unwrap();
    assert_eq!(other_session.len(), 1);
    assert!(other_session[0].dedup_key.is_some());
}

#[tokio::test]
async fn test_concurrent_evaluations_store_one_conversion() {
    let h = harness().await;
    let goal = h
        .create_goal(CreateGoalRequest::new(
            "Pricing",
            GoalType::Pageview,
            json!({"path_contains": "pricing"}),
        ))
        .await;

    let first = page_view("/pricing", "s-race");
    let second = page_view("/pricing/teams", "s-race");
    let (a, b) = tokio::join!(
        h.matcher.evaluate(&first, None, None),
        h.matcher.evaluate(&second, None, None)
    );

    let created = a.unwrap().len() + b.unwrap().len();
    assert_eq!(created, 1);
    assert_eq!(h.stored_conversions(goal.id).await.len(), 1);
}

#[tokio::test]
async fn test_unique_index_rejects_duplicate_session_conversion() {
    let h = harness().await;
    let goal = h
        .create_goal(CreateGoalRequest::new(
            "Pricing",
            GoalType::Pageview,
            json!({"path_exact": "/pricing"}),
        ))
        .await;

    // Simulates a conversion stored by another worker between lookup and insert
    let key = conversions::Model::dedup_key_for(goal.id, "s-1");
    let duplicate = || conversions::ActiveModel {
        goal_id: Set(goal.id),
        project_id: Set(1),
        session_id: Set(Some("s-1".to_string())),
        metadata: Set(json!({})),
        dedup_key: Set(Some(key.clone())),
        ..Default::default()
    };

    duplicate().insert(h.db.as_ref()).await.unwrap();
    let err = duplicate().insert(h.db.as_ref()).await.unwrap_err();
    assert!(matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));

    let created = h
        .matcher
        .evaluate(&page_view("/pricing", "s-1"), None, None)
        .await
        .unwrap();
    assert!(created.is_empty());
}

#[tokio::test]
async fn test_malformed_goal_does_not_block_others() {
    let h = harness().await;

    // Stored directly, bypassing validation
    goals::ActiveModel {
        project_id: Set(1),
        name: Set("Broken".to_string()),
        goal_type: Set(GoalType::Pageview),
        conditions: Set(json!({"path_regex": "/([unclosed/"})),
        value_type: Set(GoalValueType::None),
        allow_multiple: Set(false),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(h.db.as_ref())
    .await
    .unwrap();

    let healthy = h
        .create_goal(CreateGoalRequest::new(
            "Docs",
            GoalType::Pageview,
            json!({"path_contains": "/docs"}),
        ))
        .await;

    let created = h
        .matcher
        .evaluate(&page_view("/docs/intro", "s-1"), None, None)
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].goal_id, healthy.id);
}

#[tokio::test]
async fn test_fixed_value_and_property_conditions() {
    let h = harness().await;
    let mut request = CreateGoalRequest::new(
        "Pro signup",
        GoalType::Event,
        json!({
            "event_name": "signup",
            "property_matches": {"plan": {"in": ["pro", "team"]}, "seats": {"gte": 2}}
        }),
    );
    request.value_type = GoalValueType::Fixed;
    request.fixed_value = Some(49.0);
    h.create_goal(request).await;

    let mut pro = EventTrigger::new("signup");
    pro.properties = properties(json!({"plan": "pro", "seats": "3", "total": 1000}));
    pro.session_id = Some("s-1".to_string());
    let created = h
        .matcher
        .evaluate(&Trigger::Event(pro), None, None)
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].value, Some(49.0));

    let mut free = EventTrigger::new("signup");
    free.properties = properties(json!({"plan": "free", "seats": 5}));
    free.session_id = Some("s-2".to_string());
    let created = h
        .matcher
        .evaluate(&Trigger::Event(free), None, None)
        .await
        .unwrap();
    assert!(created.is_empty());
}

#[tokio::test]
async fn test_session_and_visitor_records_take_precedence() {
    let h = harness().await;
    let goal = h
        .create_goal(CreateGoalRequest::new(
            "Pricing",
            GoalType::Pageview,
            json!({"path_exact": "/pricing"}),
        ))
        .await;

    let now = Utc::now();
    let visitor = visitor::ActiveModel {
        visitor_id: Set("anon-42".to_string()),
        project_id: Set(1),
        first_seen: Set(now),
        last_seen: Set(now),
        is_crawler: Set(false),
        ..Default::default()
    }
    .insert(h.db.as_ref())
    .await
    .unwrap();
    let session = request_sessions::ActiveModel {
        session_id: Set("server-session".to_string()),
        project_id: Set(1),
        started_at: Set(now - Duration::minutes(5)),
        last_accessed_at: Set(now),
        page_count: Set(3),
        visitor_id: Set(Some(visitor.id)),
        ..Default::default()
    }
    .insert(h.db.as_ref())
    .await
    .unwrap();

    let created = h
        .matcher
        .evaluate(
            &page_view("/pricing", "client-session"),
            Some(&session),
            Some(&visitor),
        )
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].session_id.as_deref(), Some("server-session"));
    assert_eq!(created[0].visitor_id, Some(visitor.id));
    assert_eq!(
        created[0].dedup_key,
        Some(conversions::Model::dedup_key_for(goal.id, "server-session"))
    );

    // A finished session converts session goals through the same records
    h.create_goal(CreateGoalRequest::new(
        "Engaged",
        GoalType::PagesPerSession,
        json!({"min_pages": 3}),
    ))
    .await;
    let trigger = Trigger::Session(SessionTrigger::from_request_session(&session));
    let created = h
        .matcher
        .evaluate(&trigger, Some(&session), Some(&visitor))
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].metadata["page_count"], json!(3));
}

#[tokio::test]
async fn test_conversion_notification_is_published() {
    let mut h = harness().await;
    let goal = h
        .create_goal(CreateGoalRequest::new(
            "Purchase",
            GoalType::Event,
            json!({"event_name": "purchase"}),
        ))
        .await;

    let created = h
        .matcher
        .evaluate(&purchase("s-1", 75.0), None, None)
        .await
        .unwrap();

    let job = h.jobs.try_recv().expect("Expected a published job");
    match job {
        Job::GoalConverted(job) => {
            assert_eq!(job.goal_id, goal.id);
            assert_eq!(job.goal_name, "Purchase");
            assert_eq!(job.conversion_id, created[0].id);
            assert_eq!(job.session_id.as_deref(), Some("s-1"));
        }
    }

    // Duplicates publish nothing
    h.matcher
        .evaluate(&purchase("s-1", 75.0), None, None)
        .await
        .unwrap();
    assert!(h.jobs.try_recv().is_err());
}

#[tokio::test]
async fn test_deactivated_goal_stops_converting() {
    let h = harness().await;
    let goal = h
        .create_goal(CreateGoalRequest::new(
            "Pricing",
            GoalType::Pageview,
            json!({"path_exact": "/pricing"}),
        ))
        .await;
    h.goals.deactivate_goal(goal.id).await.unwrap();

    let created = h
        .matcher
        .evaluate(&page_view("/pricing", "s-1"), None, None)
        .await
        .unwrap();
    assert!(created.is_empty());
}
