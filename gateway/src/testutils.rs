use crate::{AppState, router};
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PROJECT: &str = "Fabrikam";
pub const DEFAULT_USER: &str = "default@contoso.com";
pub const DEFAULT_ITERATION: &str = "Fabrikam\\Sprint 1";
/// `Basic base64(":default-token")`
pub const DEFAULT_AUTHORIZATION: &str = "Basic OmRlZmF1bHQtdG9rZW4=";

/// App state whose defaults point at the mock upstream.
pub fn test_state(server: &MockServer) -> AppState {
    let defaults = azure_devops::config::Config {
        organization: "contoso".into(),
        project: PROJECT.into(),
        access_token: "default-token".into(),
        base_url: server.uri(),
        default_user: DEFAULT_USER.into(),
        default_iteration: DEFAULT_ITERATION.into(),
        ..Default::default()
    };

    AppState::new(crate::config::Config::default(), defaults).expect("build app state")
}

/// Sends `request` through the router and returns the status and JSON body
/// (`Null` when the body is not JSON).
pub async fn send(server: &MockServer, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(test_state(server))
        .oneshot(request)
        .await
        .expect("infallible");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();

    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub async fn get(server: &MockServer, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).expect("build request");
    send(server, request).await
}

pub fn work_item(id: u64, iteration: &str) -> Value {
    json!({
        "id": id,
        "url": format!("https://contoso.visualstudio.com/_apis/wit/workItems/{id}"),
        "fields": {
            "System.Title": format!("Work item {id}"),
            "System.State": "Active",
            "System.WorkItemType": "Task",
            "System.AssignedTo": {"displayName": "Jane Doe"},
            "System.IterationPath": iteration,
            "System.CreatedDate": "2024-05-01T09:00:00Z"
        }
    })
}

/// Answers every WIQL query of the test project with `ids`.
pub async fn mount_wiql(server: &MockServer, ids: &[u64]) {
    let work_items: Vec<Value> = ids.iter().map(|id| json!({"id": id, "url": ""})).collect();

    Mock::given(method("POST"))
        .and(path(format!("/{PROJECT}/_apis/wit/wiql")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"queryType": "flat", "workItems": work_items})),
        )
        .mount(server)
        .await;
}
