use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{ServerState, router};

const PASSWORD: &str = "password";

/// Router over a fresh database with alice, bob and carol registered.
async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    for email in ["alice@example.com", "bob@example.com", "carol@example.com"] {
        engine.register_user(email, PASSWORD).await.unwrap();
    }

    router(ServerState {
        engine: Arc::new(engine),
    })
}

fn basic(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{email}:{password}")))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    credentials: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some((email, password)) = credentials {
        request = request.header(header::AUTHORIZATION, basic(email, password));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

const ALICE: Option<(&str, &str)> = Some(("alice@example.com", PASSWORD));
const BOB: Option<(&str, &str)> = Some(("bob@example.com", PASSWORD));

#[tokio::test]
async fn requests_without_valid_credentials_are_rejected() {
    let app = app().await;

    let (status, _) = send(&app, "GET", "/balance", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "GET",
        "/balance",
        Some(("alice@example.com", "wrong-password")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "GET",
        "/balance",
        Some(("nobody@example.com", PASSWORD)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_and_list_users() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        ALICE,
        Some(json!({"email": "dave@example.com", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "dave@example.com");
    assert_eq!(body["id"], 4);

    let (status, body) = send(&app, "GET", "/users", ALICE, None).await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|user| user["email"].as_str().unwrap())
        .collect();
    assert_eq!(
        emails,
        vec![
            "alice@example.com",
            "bob@example.com",
            "carol@example.com",
            "dave@example.com"
        ]
    );

    // The new user can authenticate straight away.
    let (status, _) = send(
        &app,
        "GET",
        "/balance",
        Some(("dave@example.com", "secret")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_registrations_are_rejected() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        ALICE,
        Some(json!({"email": "bob@example.com", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        "POST",
        "/users",
        ALICE,
        Some(json!({"email": "dave@example.com", "password": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/users",
        ALICE,
        Some(json!({"email": "not-an-email", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn posted_expense_shows_in_owner_balance() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/expenses",
        ALICE,
        Some(json!({
            "description": "Food",
            "amount": 42.0,
            "created_at": "2026-01-01T12:00:00Z",
            "users": [{"id": 2}, {"id": 3}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_i64());

    let (status, body) = send(&app, "GET", "/balance", ALICE, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "balance": 28.0,
            "debit": [],
            "credit": [
                {"user_id": 2, "amount": 14.0},
                {"user_id": 3, "amount": 14.0}
            ]
        })
    );

    let (status, body) = send(&app, "GET", "/balance", BOB, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], -14.0);
    assert_eq!(body["debit"], json!([{"user_id": 1, "amount": 14.0}]));
}

#[tokio::test]
async fn invalid_expenses_are_rejected() {
    let app = app().await;

    for (users, amount) in [
        (json!([]), 10.0),
        (json!([{"id": 1}]), 10.0),
        (json!([{"id": 2}, {"id": 2}]), 10.0),
        (json!([{"id": 2}]), -5.0),
        (json!([{"id": 99}]), 10.0),
    ] {
        let (status, body) = send(
            &app,
            "POST",
            "/expenses",
            ALICE,
            Some(json!({
                "description": "Taxi",
                "amount": amount,
                "created_at": "2026-01-01T12:00:00Z",
                "users": users
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(body["error"].is_string());
    }

    let (_, body) = send(&app, "GET", "/balance", ALICE, None).await;
    assert_eq!(body["balance"], 0.0);
}

#[tokio::test]
async fn served_over_tcp() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine
        .register_user("alice@example.com", PASSWORD)
        .await
        .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(engine, listener).unwrap();

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET /balance HTTP/1.1\r\nHost: {addr}\r\nAuthorization: {}\r\nConnection: close\r\n\r\n",
        basic("alice@example.com", PASSWORD)
    );
    tokio::io::AsyncWriteExt::write_all(&mut stream, request.as_bytes())
        .await
        .unwrap();
    let mut response = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut stream, &mut response)
        .await
        .unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains(r#""balance":0.0"#), "{response}");
}
