//! End-to-end lifecycle tests against a mock RMON installation.

use rmon_provider::testing::{assert_plan_changes_attribute, ProviderTester};
use rmon_provider::{ProviderService, RmonProvider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_rmon() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1.0/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-1"})),
        )
        .mount(&server)
        .await;
    server
}

async fn configured_provider(server: &MockServer) -> RmonProvider {
    let provider = RmonProvider::new();
    let diagnostics = provider
        .configure(json!({
            "base_url": server.uri(),
            "login": "admin",
            "password": "secret",
            "terraform_version": "1.7.0",
        }))
        .await
        .unwrap();
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    provider
}

#[tokio::test]
async fn create_tcp_check_assigns_handle_and_reads_back() {
    let server = mock_rmon().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/rmon/check/tcp"))
        .and(body_partial_json(json!({
            "name": "db-check",
            "ip": "10.0.0.5",
            "port": 5432,
            "place": "agent",
            "entities": [12],
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 77})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1.0/rmon/check/tcp/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "db-check",
            "description": "",
            "enabled": 1,
            "check_group": "",
            "place": "agent",
            "entities": [12],
            "interval": 120,
            "check_timeout": 5,
            "ip": "10.0.0.5",
            "port": 5432,
            "retries": 3,
            "runbook": "",
        })))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let state = provider
        .create(
            "rmon_check_tcp",
            json!({
                "name": "db-check",
                "enabled": true,
                "place": "agent",
                "entities": [12],
                "interval": 120,
                "check_timeout": 5,
                "ip": "10.0.0.5",
                "port": 5432,
            }),
        )
        .await
        .unwrap();

    assert_eq!(state["id"], "77");
    assert_eq!(state["ip"], "10.0.0.5");
    assert_eq!(state["port"], 5432);
    assert_eq!(state["entities"], json!([12]));
    assert_eq!(state["enabled"], true);
}

#[tokio::test]
async fn check_placed_everywhere_normalizes_entities() {
    let server = mock_rmon().await;

    Mock::given(method("GET"))
        .and(path("/api/v1.0/rmon/check/tcp/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "global",
            "enabled": 0,
            "place": "all",
            "entities": [1, 2, 3, 4],
            "ip": "10.0.0.5",
            "port": 5432,
        })))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let state = provider
        .read("rmon_check_tcp", json!({"id": "9"}))
        .await
        .unwrap();

    assert_eq!(state["place"], "all");
    assert_eq!(state["entities"], json!([]));
}

#[tokio::test]
async fn update_with_changed_port_carries_reconfigure() {
    let server = mock_rmon().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1.0/rmon/agent/4"))
        .and(body_partial_json(json!({
            "port": 5102,
            "reconfigure": true,
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1.0/rmon/agent/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "edge",
            "description": "",
            "enabled": 1,
            "shared": 0,
            "server_id": 3,
            "port": 5102,
            "region_id": 0,
        })))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let prior = json!({
        "id": "4",
        "name": "edge",
        "enabled": true,
        "server_id": 3,
        "port": 5101,
    });
    let planned = json!({
        "name": "edge",
        "enabled": true,
        "server_id": 3,
        "port": 5102,
    });

    let state = provider
        .update("rmon_agent", prior, planned)
        .await
        .unwrap();
    assert_eq!(state["port"], 5102);
}

#[tokio::test]
async fn update_with_same_port_omits_reconfigure() {
    let server = mock_rmon().await;

    // Reject any body carrying the rebind flag.
    Mock::given(method("PUT"))
        .and(path("/api/v1.0/rmon/agent/4"))
        .and(body_partial_json(json!({"reconfigure": true})))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1.0/rmon/agent/4"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1.0/rmon/agent/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "edge-2",
            "description": "",
            "enabled": 1,
            "shared": 0,
            "server_id": 3,
            "port": 5101,
            "region_id": 0,
        })))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let prior = json!({"id": "4", "name": "edge", "server_id": 3, "port": 5101});
    let planned = json!({"name": "edge-2", "server_id": 3, "port": 5101});

    let state = provider
        .update("rmon_agent", prior, planned)
        .await
        .unwrap();
    assert_eq!(state["name"], "edge-2");
}

#[tokio::test]
async fn delete_is_idempotent_on_404() {
    let server = mock_rmon().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1.0/group/5"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1.0/group/5"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let state = json!({"id": "5", "name": "ops"});

    provider.delete("rmon_group", state.clone()).await.unwrap();
    // Deleting the already-deleted entity still succeeds.
    provider.delete("rmon_group", state).await.unwrap();
}

#[tokio::test]
async fn read_of_missing_entity_is_not_found() {
    let server = mock_rmon().await;

    Mock::given(method("GET"))
        .and(path("/api/v1.0/group/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let err = provider
        .read("rmon_group", json!({"id": "999"}))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        rmon_provider::ProviderError::NotFound(_)
    ));
}

#[tokio::test]
async fn import_is_read_by_handle() {
    let server = mock_rmon().await;

    Mock::given(method("GET"))
        .and(path("/api/v1.0/rmon/region/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "eu-west",
            "description": "",
            "enabled": 1,
            "shared": 0,
            "country_id": 2,
            "group_id": 1,
        })))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let imported = provider
        .import_resource("rmon_region", "12")
        .await
        .unwrap();

    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].resource_type, "rmon_region");
    assert_eq!(imported[0].state["id"], "12");
    assert_eq!(imported[0].state["name"], "eu-west");
    assert_eq!(imported[0].state["enabled"], true);
}

#[tokio::test]
async fn quote_stripping_applies_on_create_and_read() {
    let server = mock_rmon().await;

    // The wire never sees the quote.
    Mock::given(method("POST"))
        .and(path("/api/v1.0/rmon/country"))
        .and(body_partial_json(json!({"name": "Cote dIvoire"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 3})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1.0/rmon/country/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Cote d'Ivoire",
            "description": "",
            "enabled": 1,
            "shared": 0,
        })))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let state = provider
        .create("rmon_country", json!({"name": "Cote d'Ivoire", "enabled": true}))
        .await
        .unwrap();

    // Reads strip the quote the service re-introduced.
    assert_eq!(state["name"], "Cote dIvoire");
}

#[tokio::test]
async fn tester_drives_the_full_crud_lifecycle() {
    let server = mock_rmon().await;

    Mock::given(method("POST"))
        .and(path("/api/v1.0/rmon/check-group"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 21})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1.0/rmon/check-group/21"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "latency", "group_id": 1})),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1.0/rmon/check-group/21"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1.0/rmon/check-group/21"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let tester = ProviderTester::new(configured_provider(&server).await);

    let plan = tester
        .plan_create("rmon_check_group", json!({"name": "latency", "group_id": 1}))
        .await
        .unwrap();
    assert_plan_changes_attribute(&plan, "name");

    let state = tester
        .lifecycle_crud(
            "rmon_check_group",
            json!({"name": "latency", "group_id": 1}),
            json!({"name": "latency", "group_id": 1}),
        )
        .await
        .unwrap();
    assert_eq!(state["id"], "21");
    assert_eq!(state["name"], "latency");
}
