//! End-to-end lifecycle tests against a wiremock dashboard.

use ceph_pool_control::{
    ClientConfig, ControlError, CreateOutcome, DeleteOutcome, HttpPoolClient, Operation,
    PoolController, PoolLifecycle, PoolObserved, PoolSpec, PoolType, ReconcileOutcome,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

async fn controller(server: &MockServer) -> PoolController<HttpPoolClient> {
    init_tracing();
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token": "t1"})))
        .expect(1)
        .mount(server)
        .await;

    let config = ClientConfig::new(server.uri(), "admin", "secret");
    PoolController::new(HttpPoolClient::new(&config).unwrap())
}

fn tracked_default(name: &str) -> PoolObserved {
    PoolObserved {
        name: name.to_string(),
        pool_type: Some(PoolType::Replicated),
        pg_num: Some(32),
        pgp_num: Some(32),
        size: Some(3),
        application: String::new(),
    }
}

#[tokio::test]
async fn create_with_defaults() {
    let server = MockServer::start().await;
    let controller = controller(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/pool"))
        .and(header("authorization", "Bearer t1"))
        .and(body_json(json!({
            "pool": "pool-a",
            "pool_type": "replicated",
            "pg_num": 32,
            "pgp_num": 32,
            "size": 3
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = controller.create(&PoolSpec::new("pool-a")).await.unwrap();

    assert_eq!(outcome, CreateOutcome::Created(tracked_default("pool-a")));
}

#[tokio::test]
async fn create_reports_application_failure_as_warning() {
    let server = MockServer::start().await;
    let controller = controller(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/pool"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/pool/pool-b"))
        .and(body_json(json!({"application_metadata": ["rbd"]})))
        .respond_with(ResponseTemplate::new(500).set_body_string("mgr unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = controller
        .create(&PoolSpec::new("pool-b").with_application("rbd"))
        .await
        .unwrap();

    let warning = outcome.warning().expect("expected a warning");
    assert!(warning.to_string().contains("rbd"));
    assert!(warning.message.contains("500"));
    assert_eq!(outcome.pool().name, "pool-b");
}

#[tokio::test]
async fn create_failure_carries_status_and_body() {
    let server = MockServer::start().await;
    let controller = controller(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/pool"))
        .respond_with(ResponseTemplate::new(400).set_body_string("pool already exists"))
        .mount(&server)
        .await;

    let err = controller
        .create(&PoolSpec::new("pool-a"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("pool already exists"));
    assert!(err.to_string().contains("could not create pool \"pool-a\""));
}

#[tokio::test]
async fn read_of_missing_pool_is_gone() {
    let server = MockServer::start().await;
    let controller = controller(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/pool/missing-pool"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let outcome = controller
        .read(&PoolObserved::named("missing-pool"))
        .await
        .unwrap();

    assert!(outcome.is_gone());
}

#[tokio::test]
async fn read_overlays_remote_record() {
    let server = MockServer::start().await;
    let controller = controller(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/pool/pool-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pool_name": "pool-a",
            "type": "replicated",
            "pg_num": 64,
            "pgp_num": 64,
            "size": 3,
            "application_metadata": ["rbd"]
        })))
        .mount(&server)
        .await;

    let observed = controller
        .read(&tracked_default("pool-a"))
        .await
        .unwrap()
        .into_observed()
        .unwrap();

    assert_eq!(observed.pg_num, Some(64));
    assert_eq!(observed.application, "rbd");
}

#[tokio::test]
async fn size_update_sets_one_property_and_rereads() {
    let server = MockServer::start().await;
    let controller = controller(&server).await;
    Mock::given(method("PUT"))
        .and(path("/api/pool/pool-a"))
        .and(body_json(json!({"size": 2})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pool/pool-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "replicated",
            "pg_num": 32,
            "pgp_num": 32,
            "size": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let observed = controller
        .update(&PoolSpec::new("pool-a").with_size(2), &tracked_default("pool-a"))
        .await
        .unwrap();

    assert_eq!(observed.size, Some(2));
    assert_eq!(observed.pg_num, Some(32));
}

#[tokio::test]
async fn update_failure_names_operation() {
    let server = MockServer::start().await;
    let controller = controller(&server).await;
    Mock::given(method("PUT"))
        .and(path("/api/pool/pool-a"))
        .respond_with(ResponseTemplate::new(400).set_body_string("pg_num must be a power of two"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let err = controller
        .update(&PoolSpec::new("pool-a").with_pg_num(33), &tracked_default("pool-a"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ControlError::Operation {
            operation: Operation::Update,
            ..
        }
    ));
    assert!(err.to_string().contains("power of two"));
}

#[tokio::test]
async fn delete_of_absent_pool() {
    let server = MockServer::start().await;
    let controller = controller(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/pool/pool-a"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let err = controller.delete("pool-a").await.unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(
        controller.destroy("pool-a").await.unwrap(),
        DeleteOutcome::AlreadyAbsent
    );
}

#[tokio::test]
async fn reconcile_noop_makes_no_pool_calls() {
    let server = MockServer::start().await;
    let config = ClientConfig::new(server.uri(), "admin", "secret");
    let controller = PoolController::new(HttpPoolClient::new(&config).unwrap());
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let tracked = tracked_default("pool-a");
    let outcome = controller
        .reconcile(&PoolSpec::new("pool-a").with_size(3), Some(&tracked))
        .await
        .unwrap();

    assert_eq!(outcome, ReconcileOutcome::Unchanged(tracked));
}

#[tokio::test]
async fn delete_addresses_only_the_named_pool() {
    let server = MockServer::start().await;
    let controller = controller(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/pool/prod"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/pool/prod%3Fx"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(
        controller.destroy("prod?x").await.unwrap(),
        DeleteOutcome::AlreadyAbsent
    );
}
