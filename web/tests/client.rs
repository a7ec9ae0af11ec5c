//! HTTP client tests against a server on an ephemeral port.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{routing::get, Router};
use starter_todos::{InMemoryTodoRepository, Todo, TodoChanges};
use starter_web::{build_router, AppState, Config, TodoClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{address}")
}

async fn client() -> TodoClient {
    let state = AppState::new(Config::default(), Arc::new(InMemoryTodoRepository::seeded()));
    let base = serve(build_router(state)).await;
    TodoClient::new(format!("{base}/api"), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn client_round_trip() {
    let client = client().await;

    assert_eq!(client.hello().await.unwrap().message, "Hello from the API!");

    let created = client.create("From the client", false).await.unwrap();
    assert_eq!(created.text, "From the client");

    let updated = client
        .update(
            &created.id,
            &TodoChanges {
                text: None,
                completed: Some(true),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated, Todo { completed: true, ..created.clone() });

    let completed = client.list(Some(true)).await.unwrap();
    assert_eq!(completed.len(), 2);
    assert_eq!(completed[1], updated);

    let deleted = client.delete(&created.id).await.unwrap();
    assert_eq!(deleted.message, "Todo deleted successfully");
    assert_eq!(client.list(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn client_maps_error_responses() {
    let client = client().await;

    let err = client.delete("missing").await.unwrap_err();
    assert_eq!(err.status, 404);
    assert_eq!(err.message, "Todo not found");
    assert_eq!(err.code(), Some("NOT_FOUND"));

    let err = client.create("   ", false).await.unwrap_err();
    assert_eq!(err.status, 400);
    assert_eq!(err.code(), Some("VALIDATION_ERROR"));
}

#[tokio::test]
async fn client_times_out_with_408() {
    let slow = Router::new().route(
        "/api/hello",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "too late"
        }),
    );
    let base = serve(slow).await;
    let client = TodoClient::new(format!("{base}/api"), Duration::from_millis(100)).unwrap();

    let err = client.hello().await.unwrap_err();

    assert_eq!(err.status, 408);
    assert_eq!(err.message, "Request timeout");
}

#[tokio::test]
async fn client_from_config_uses_base_path() {
    let state = AppState::new(Config::default(), Arc::new(InMemoryTodoRepository::seeded()));
    let base = serve(build_router(state)).await;

    let mut config = Config::default();
    config.app.url = format!("{base}/");
    let client = TodoClient::from_config(&config).unwrap();

    assert_eq!(client.list(None).await.unwrap().len(), 3);
}
