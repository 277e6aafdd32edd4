use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use itemproc_api::app::services::AppServices;
use itemproc_infra::{BatchProcessorConfig, InMemoryItemStore, ItemStore};
use itemproc_items::NewItem;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(seed: Vec<NewItem>) -> Self {
        let store = Arc::new(InMemoryItemStore::new());
        for item in seed {
            store.create(item).await.expect("seed item");
        }
        let services = AppServices::new(store, BatchProcessorConfig::default());

        // Same router as prod, bound to an ephemeral port.
        let app = itemproc_api::app::build_app(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn new_item(n: u32) -> NewItem {
    NewItem {
        name: format!("Item_{n}"),
        description: Some(format!("Desc_{n}")),
        status: format!("Status_{n}"),
        email: format!("a@b{n}.com"),
    }
}

fn three_items() -> Vec<NewItem> {
    (1..=3).map(new_item).collect()
}

#[tokio::test]
async fn health_is_ok() {
    let server = TestServer::spawn(vec![]).await;
    let res = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_is_empty_without_items() {
    let server = TestServer::spawn(vec![]).await;
    let res = reqwest::get(server.url("/api/items")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_returns_every_item_in_id_order() {
    let server = TestServer::spawn(three_items()).await;
    let body: Value = reqwest::get(server.url("/api/items"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["id"], 1);
    assert_eq!(items[0]["name"], "Item_1");
    assert_eq!(items[2]["email"], "a@b3.com");
}

#[tokio::test]
async fn get_returns_item_or_404() {
    let server = TestServer::spawn(three_items()).await;

    let res = reqwest::get(server.url("/api/items/2")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "id": 2,
            "name": "Item_2",
            "description": "Desc_2",
            "status": "Status_2",
            "email": "a@b2.com",
        })
    );

    let res = reqwest::get(server.url("/api/items/99")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() {
    let server = TestServer::spawn(vec![]).await;
    let res = reqwest::get(server.url("/api/items/abc")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn process_marks_all_items_then_finds_nothing() {
    let server = TestServer::spawn(three_items()).await;

    let res = reqwest::get(server.url("/api/items/process")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let processed = body.as_array().unwrap();
    assert_eq!(processed.len(), 3);
    for (i, item) in processed.iter().enumerate() {
        assert_eq!(item["id"], i as u64 + 1);
        assert_eq!(item["status"], "PROCESSED");
    }

    let body: Value = reqwest::get(server.url("/api/items/process"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!([]));

    let listed: Value = reqwest::get(server.url("/api/items"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed
        .as_array()
        .unwrap()
        .iter()
        .all(|item| item["status"] == "PROCESSED"));
}

#[tokio::test]
async fn create_valid_item_returns_201() {
    let server = TestServer::spawn(vec![]).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/items"))
        .json(&json!({
            "name": "Item_1",
            "description": "Desc_1",
            "status": "Status_1",
            "email": "a@b1.com",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "Item_1");

    let res = reqwest::get(server.url("/api/items/1")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_with_invalid_email_is_rejected() {
    let server = TestServer::spawn(vec![]).await;
    let res = reqwest::Client::new()
        .post(server.url("/api/items"))
        .json(&json!({
            "name": "Item_1",
            "description": "Desc_1",
            "status": "Status_1",
            "email": "ab1.com",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!(["Invalid email format"]));
}

#[tokio::test]
async fn create_with_blank_name_is_rejected() {
    let server = TestServer::spawn(vec![]).await;
    let res = reqwest::Client::new()
        .post(server.url("/api/items"))
        .json(&json!({
            "name": "",
            "description": "Desc_1",
            "status": "Status_1",
            "email": "a@b1.com",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!(["Name must not be blank"]));
}

#[tokio::test]
async fn create_reports_name_and_email_together() {
    let server = TestServer::spawn(vec![]).await;
    let res = reqwest::Client::new()
        .post(server.url("/api/items"))
        .json(&json!({
            "name": "",
            "description": "Desc_1",
            "status": "12345678",
            "email": "ab1.com",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!(["Name must not be blank", "Invalid email format"]));

    let listed: Value = reqwest::get(server.url("/api/items"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn malformed_json_body_is_bad_request() {
    let server = TestServer::spawn(vec![]).await;
    let res = reqwest::Client::new()
        .post(server.url("/api/items"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn create_with_overlong_email_is_rejected() {
    let server = TestServer::spawn(vec![]).await;
    let res = reqwest::Client::new()
        .post(server.url("/api/items"))
        .json(&json!({
            "name": "Item_1",
            "description": "Desc_1",
            "status": "Status_1",
            "email": format!("{}@example.com", "a".repeat(40)),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!(["Email cannot exceed 50 characters"]));
}

#[tokio::test]
async fn wrongly_typed_field_is_bad_request() {
    let server = TestServer::spawn(three_items()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/items"))
        .json(&json!({
            "name": 5,
            "status": "Status_1",
            "email": "a@b1.com",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");

    let res = client
        .put(server.url("/api/items/1"))
        .json(&json!({ "status": ["New"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_existing_item() {
    let server = TestServer::spawn(three_items()).await;
    let res = reqwest::Client::new()
        .put(server.url("/api/items/1"))
        .json(&json!({
            "name": "Item_new",
            "description": "Desc_new",
            "status": "New",
            "email": "new@b1.com",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "id": 1,
            "name": "Item_new",
            "description": "Desc_new",
            "status": "New",
            "email": "new@b1.com",
        })
    );
}

#[tokio::test]
async fn update_missing_item_is_404() {
    let server = TestServer::spawn(vec![]).await;
    let res = reqwest::Client::new()
        .put(server.url("/api/items/1"))
        .json(&json!({ "name": "Item_new", "status": "New" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_with_too_long_status_is_rejected() {
    let server = TestServer::spawn(three_items()).await;
    let res = reqwest::Client::new()
        .put(server.url("/api/items/1"))
        .json(&json!({
            "name": "Item_new",
            "status": "New123456789012345678901",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!(["Status cannot exceed 20 characters"]));

    let stored: Value = reqwest::get(server.url("/api/items/1"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored["name"], "Item_1");
}

#[tokio::test]
async fn update_with_invalid_email_is_rejected_even_when_missing() {
    let server = TestServer::spawn(vec![]).await;
    let res = reqwest::Client::new()
        .put(server.url("/api/items/7"))
        .json(&json!({ "email": "ab1.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!(["Invalid email format"]));
}

#[tokio::test]
async fn status_only_update_keeps_other_fields() {
    let server = TestServer::spawn(three_items()).await;
    let res = reqwest::Client::new()
        .put(server.url("/api/items/2"))
        .json(&json!({ "status": "New" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "New");
    assert_eq!(body["name"], "Item_2");
    assert_eq!(body["description"], "Desc_2");
    assert_eq!(body["email"], "a@b2.com");
}

#[tokio::test]
async fn delete_returns_204_then_404() {
    let server = TestServer::spawn(three_items()).await;
    let client = reqwest::Client::new();

    let res = client.delete(server.url("/api/items/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.delete(server.url("/api/items/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = reqwest::get(server.url("/api/items/1")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
