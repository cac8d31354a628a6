//! Integration tests for the request handlers.
//!
//! Each test drives the handlers the way an HTTP adapter would and checks
//! the status code and JSON payload.

use serde_json::json;
use tempfile::TempDir;

use cfgstore::api::handlers::{self, ApiResponse};
use cfgstore::api::{ProjectPayload, ResourcePayload, Resources, StagePayload};
use cfgstore::core::config::Config;
use cfgstore::store::ConfigStore;

// =============================================================================
// Test Fixtures
// =============================================================================

const SHIPYARD: &str = "stages:\n  - name: dev\n    deployment_strategy: direct\n  - name: staging\n    deployment_strategy: blue_green_service\n";

fn new_store() -> (TempDir, ConfigStore) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let mut config = Config::default();
    config.set_data_dir(dir.path().to_path_buf());
    let store = ConfigStore::open(&config).expect("failed to open store");
    (dir, store)
}

fn project_body(name: &str) -> ProjectPayload {
    ProjectPayload {
        project_name: name.into(),
    }
}

fn stage_body(name: &str) -> StagePayload {
    StagePayload {
        stage_name: name.into(),
    }
}

fn resources(items: &[(&str, &str)]) -> Resources {
    Resources {
        resources: items
            .iter()
            .map(|(uri, content)| ResourcePayload {
                resource_uri: uri.to_string(),
                resource_content: content.to_string(),
            })
            .collect(),
    }
}

fn version_of(response: &ApiResponse) -> String {
    response.body.as_ref().unwrap()["version"]
        .as_str()
        .unwrap()
        .to_string()
}

fn message_of(response: &ApiResponse) -> String {
    response.error_payload().expect("error payload").message
}

/// A store with project `shop`, its pipeline definition, and stage `dev`.
fn shop() -> (TempDir, ConfigStore) {
    let (dir, store) = new_store();
    assert_eq!(handlers::post_project(&store, &project_body("shop")).status, 204);
    assert_eq!(
        handlers::put_project_resources(&store, "shop", &resources(&[("shipyard.yaml", SHIPYARD)]))
            .status,
        201
    );
    assert_eq!(handlers::post_stage(&store, "shop", &stage_body("dev")).status, 204);
    (dir, store)
}

// =============================================================================
// Projects
// =============================================================================

#[test]
fn post_project_conflicts() {
    let (_dir, store) = new_store();
    assert_eq!(handlers::post_project(&store, &project_body("shop")).status, 204);

    let response = handlers::post_project(&store, &project_body("shop"));
    assert_eq!(response.status, 409);
    assert_eq!(response.error_payload().unwrap().code, 409);

    assert_eq!(handlers::post_project(&store, &project_body("Bad Name")).status, 400);
}

#[test]
fn delete_project() {
    let (_dir, store) = new_store();
    assert_eq!(handlers::delete_project(&store, "shop").status, 404);
    handlers::post_project(&store, &project_body("shop"));
    assert_eq!(handlers::delete_project(&store, "shop").status, 204);
    assert_eq!(handlers::get_stages(&store, "shop").status, 404);
}

// =============================================================================
// Stages
// =============================================================================

#[test]
fn post_stage_requires_project() {
    let (_dir, store) = new_store();
    let response = handlers::post_stage(&store, "ghost", &stage_body("dev"));
    assert_eq!(response.status, 400);
    assert_eq!(message_of(&response), "Project does not exist.");
}

#[test]
fn post_stage_twice_is_bad_request() {
    let (_dir, store) = shop();
    let response = handlers::post_stage(&store, "shop", &stage_body("dev"));
    assert_eq!(response.status, 400);
    assert_eq!(message_of(&response), "Could not create stage.");
}

#[test]
fn get_stages_lists_pipeline() {
    let (_dir, store) = shop();
    let response = handlers::get_stages(&store, "shop");
    assert_eq!(response.status, 200);
    assert_eq!(
        response.body.unwrap(),
        json!({
            "stages": [{ "stageName": "dev" }, { "stageName": "staging" }],
            "pageSize": 2,
            "totalCount": 2,
            "nextPageKey": ""
        })
    );
}

#[test]
fn get_stages_without_definition_is_server_error() {
    let (_dir, store) = new_store();
    handlers::post_project(&store, &project_body("shop"));

    let response = handlers::get_stages(&store, "shop");
    assert_eq!(response.status, 500);
    assert_eq!(message_of(&response), "Could not retrieve stages.");

    handlers::put_project_resources(&store, "shop", &resources(&[("shipyard.yaml", "stages: [")]));
    let response = handlers::get_stages(&store, "shop");
    assert_eq!(response.status, 500);
    assert_eq!(message_of(&response), "Could not read shipyard file.");

    assert_eq!(handlers::get_stages(&store, "ghost").status, 404);
}

#[test]
fn get_stage_by_branch_state() {
    let (_dir, store) = shop();

    let response = handlers::get_stage(&store, "shop", "dev");
    assert_eq!(response.status, 200);
    assert_eq!(response.body.unwrap(), json!({ "stageName": "dev" }));

    // In the definition but never created.
    let response = handlers::get_stage(&store, "shop", "staging");
    assert_eq!(response.status, 404);
    assert_eq!(message_of(&response), "Stage not found");

    let response = handlers::get_stage(&store, "shop", "master");
    assert_eq!(response.status, 404);
    assert_eq!(message_of(&response), "Stage not found");

    let response = handlers::get_stage(&store, "ghost", "dev");
    assert_eq!(response.status, 404);
    assert_eq!(message_of(&response), "Project not found");
}

#[test]
fn stage_update_and_delete_are_not_implemented() {
    let (_dir, store) = shop();
    assert_eq!(handlers::put_stage(&store, "shop", "dev").status, 501);
    assert_eq!(handlers::delete_stage(&store, "shop", "dev").status, 501);
    assert_eq!(handlers::delete_stage(&store, "ghost", "x").status, 501);
    assert_eq!(handlers::get_stage(&store, "shop", "dev").status, 200);
}

// =============================================================================
// Resources
// =============================================================================

#[test]
fn service_resource_roundtrip() {
    let (_dir, store) = shop();

    let put = handlers::put_service_resources(
        &store,
        "shop",
        "dev",
        "carts",
        &resources(&[("values.yaml", "replicas: 1"), ("templates/svc.yaml", "kind: Service")]),
    );
    assert_eq!(put.status, 201);
    let v1 = version_of(&put);

    let get = handlers::get_resource(&store, "shop", Some("dev"), Some("carts"), "values.yaml", None);
    assert_eq!(get.status, 200);
    assert_eq!(
        get.body.unwrap(),
        json!({ "resourceURI": "values.yaml", "resourceContent": "replicas: 1" })
    );

    let put = handlers::put_service_resources(
        &store,
        "shop",
        "dev",
        "carts",
        &resources(&[("values.yaml", "replicas: 3")]),
    );
    assert_ne!(version_of(&put), v1);

    let old = handlers::get_resource(
        &store,
        "shop",
        Some("dev"),
        Some("carts"),
        "values.yaml",
        Some(v1.as_str()),
    );
    assert_eq!(old.body.unwrap()["resourceContent"], "replicas: 1");
}

#[test]
fn identical_put_returns_same_version() {
    let (_dir, store) = shop();
    let body = resources(&[("a.yaml", "a: 1")]);
    let first = handlers::put_stage_resources(&store, "shop", "dev", &body);
    let second = handlers::put_stage_resources(&store, "shop", "dev", &body);
    assert_eq!(first.status, 201);
    assert_eq!(version_of(&first), version_of(&second));
}

#[test]
fn resource_put_failures_are_bad_requests() {
    let (_dir, store) = shop();

    let response = handlers::put_stage_resources(&store, "shop", "qa", &resources(&[("a", "x")]));
    assert_eq!(response.status, 400);

    let response = handlers::put_project_resources(&store, "shop", &resources(&[("../etc/passwd", "x")]));
    assert_eq!(response.status, 400);
    assert!(message_of(&response).contains("invalid resource path"));

    let response = handlers::put_project_resources(&store, "ghost", &resources(&[("a", "x")]));
    assert_eq!(response.status, 400);
}

#[test]
fn path_conflicts_are_reported_to_the_client() {
    let (_dir, store) = shop();
    handlers::put_stage_resources(&store, "shop", "dev", &resources(&[("svc/a", "x")]));

    let response = handlers::put_stage_resources(&store, "shop", "dev", &resources(&[("svc", "y")]));
    assert_eq!(response.status, 400);
    assert_eq!(message_of(&response), "resource 'svc' already exists");

    let response =
        handlers::put_stage_resources(&store, "shop", "dev", &resources(&[("svc/a/b", "y")]));
    assert_eq!(response.status, 400);
    assert_eq!(message_of(&response), "resource 'svc/a' already exists");
}

#[test]
fn get_resource_not_found_cases() {
    let (_dir, store) = shop();
    assert_eq!(
        handlers::get_resource(&store, "shop", Some("dev"), None, "missing.yaml", None).status,
        404
    );
    assert_eq!(
        handlers::get_resource(&store, "shop", Some("qa"), None, "a", None).status,
        404
    );
    assert_eq!(
        handlers::get_resource(&store, "ghost", None, None, "a", None).status,
        404
    );
    assert_eq!(
        handlers::get_resource(&store, "shop", None, None, "shipyard.yaml", Some("deadbeef")).status,
        404
    );
    assert_eq!(
        handlers::get_resource(&store, "shop", None, None, ".git/config", None).status,
        400
    );
}

#[test]
fn delete_resource_statuses() {
    let (_dir, store) = shop();
    handlers::put_stage_resources(&store, "shop", "dev", &resources(&[("a.yaml", "x")]));

    let response = handlers::delete_resource(&store, "shop", Some("dev"), None, "a.yaml");
    assert_eq!(response.status, 200);
    assert_eq!(version_of(&response).len(), 40);

    assert_eq!(
        handlers::delete_resource(&store, "shop", Some("dev"), None, "a.yaml").status,
        404
    );
    assert_eq!(
        handlers::delete_resource(&store, "shop", None, Some("carts"), "a.yaml").status,
        400
    );
}
