use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use chroma_api::{AppStateInner, router};
use chroma_core::normalize::{TimeFormat, parse_offset};
use chroma_core::session::{AdminCredentials, SessionStore};
use chroma_db::Database;

const ADMIN_EMAIL: &str = "admin@chroma.local";
const ADMIN_PASSWORD: &str = "palette-keeper";

fn app() -> (Router, Arc<Database>) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let creds = AdminCredentials::from_password(ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();
    let sessions = SessionStore::new(creds, chrono::Duration::hours(1));
    let format = TimeFormat::new(parse_offset("+07:00").unwrap());

    let state = Arc::new(AppStateInner::new(db.clone(), sessions, format, 20, 10));
    (router(state), db)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router) -> String {
    let (status, _, body) = send(
        app,
        json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn rest_read_orders_and_counts() {
    let (app, db) = app();
    for day in 1..=3 {
        let ts = format!("2024-01-0{}T09:00:00Z", day);
        db.insert_scan(&format!("Tone {}", day), 90.0, None, &ts).unwrap();
    }

    let req = Request::builder()
        .uri("/rest/v1/scans?select=*&order=created_at.desc&limit=2&offset=0")
        .header("Prefer", "count=exact")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_RANGE], "0-1/3");
    let tones: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["tone_result"].as_str().unwrap())
        .collect();
    assert_eq!(tones, vec!["Tone 3", "Tone 2"]);

    let (_, headers, body) = send(&app, get("/rest/v1/scans?order=created_at.asc&offset=2", None)).await;
    assert_eq!(headers[header::CONTENT_RANGE], "2-2/*");
    assert_eq!(body[0]["tone_result"], "Tone 3");
}

#[tokio::test]
async fn rest_read_rejects_unknown_tables_and_orders() {
    let (app, _) = app();

    let (status, _, body) = send(&app, get("/rest/v1/users", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _, _) = send(&app, get("/rest/v1/scans?order=tone_result.desc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rest_read_rejects_offsets_past_the_addressable_range() {
    let (app, db) = app();
    db.insert_scan("Warm Autumn", 90.0, None, "2024-01-05T10:00:00Z").unwrap();

    for offset in ["9223372036854775808", "18446744073709551615"] {
        let uri = format!("/rest/v1/scans?offset={}&limit=5", offset);
        let (status, _, body) = send(&app, get(&uri, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "offset {offset}");
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    // Largest addressable offset is simply past the end
    let (status, headers, body) =
        send(&app, get("/rest/v1/scans?offset=9223372036854775807&limit=5", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
    assert_eq!(headers[header::CONTENT_RANGE], "*/*");
}

#[tokio::test]
async fn public_writes_are_validated() {
    let (app, _) = app();

    let (status, _, body) = send(
        &app,
        json_request(
            Method::POST,
            "/scans",
            None,
            json!({ "tone_result": "Warm Autumn", "confidence": 93.7 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_i64().unwrap() > 0);

    let (status, _, body) = send(
        &app,
        json_request(
            Method::POST,
            "/scans",
            None,
            json!({ "tone_result": "Warm Autumn", "confidence": 140 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _, body) = send(
        &app,
        json_request(
            Method::POST,
            "/palettes",
            None,
            json!({ "season_name": "Autumn", "colors": ["#8b4513", "#8B4513"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let palette_id = body["id"].as_i64().unwrap();

    let (_, _, body) = send(&app, get("/rest/v1/saved_palettes", None)).await;
    assert_eq!(body[0]["colors"], json!(["#8B4513"]));

    let uri = format!("/palettes/{}", palette_id);
    let req = Request::builder().method(Method::DELETE).uri(&uri).body(Body::empty()).unwrap();
    assert_eq!(send(&app, req).await.0, StatusCode::NO_CONTENT);
    let req = Request::builder().method(Method::DELETE).uri(&uri).body(Body::empty()).unwrap();
    assert_eq!(send(&app, req).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_require_a_session() {
    let (app, _) = app();

    let (status, _, body) = send(&app, get("/admin/activity", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let bogus = uuid::Uuid::new_v4().to_string();
    let (status, _, _) = send(&app, get("/admin/stats", Some(&bogus))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(
        &app,
        json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({ "email": ADMIN_EMAIL, "password": "guess" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app).await;
    let (status, _, _) = send(&app, get("/admin/stats", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/auth/logout")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, req).await.0, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, get("/admin/stats", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn activity_merges_scans_and_palettes() {
    let (app, db) = app();
    db.insert_scan("Warm Autumn", 93.7, Some("rgb(200,150,100)"), "2024-01-05T10:00:00Z")
        .unwrap();
    db.insert_palette("Autumn", &["#8B4513".to_string()], "2024-01-05T11:00:00Z")
        .unwrap();

    let token = login(&app).await;
    let (status, _, body) = send(&app, get("/admin/activity", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["kind"], "PALETTE");
    assert_eq!(entries[0]["description"], "Saved Palette: Autumn");
    assert_eq!(entries[0]["display_time"], "5 Jan 18:00");
    assert_eq!(entries[1]["kind"], "SCAN");
    assert_eq!(entries[1]["description"], "Detected: Warm Autumn (94%)");
    assert_eq!(entries[1]["actor"], "Guest");
    assert_eq!(entries[1]["status"], "SUCCESS");
}

#[tokio::test]
async fn history_pages_through_scans() {
    let (app, db) = app();
    for minute in 0..10 {
        let ts = format!("2024-01-05T10:{:02}:00Z", minute);
        db.insert_scan(&format!("Tone {}", minute), 80.0, None, &ts).unwrap();
    }
    let token = login(&app).await;

    let (_, _, first) = send(&app, get("/admin/history", Some(&token))).await;
    assert_eq!(first["page"], 0);
    assert_eq!(first["records"].as_array().unwrap().len(), 10);
    assert_eq!(first["records"][0]["tone_result"], "Tone 9");
    assert_eq!(first["has_next"], true);
    assert_eq!(first["has_previous"], false);

    let (_, _, second) = send(&app, get("/admin/history?page=1", Some(&token))).await;
    assert!(second["records"].as_array().unwrap().is_empty());
    assert_eq!(second["has_next"], false);
    assert_eq!(second["has_previous"], true);
}

#[tokio::test]
async fn stats_summarize_the_collections() {
    let (app, db) = app();
    db.insert_scan("Cool Summer", 90.0, None, "2024-01-05T10:00:00Z").unwrap();
    db.insert_scan("Warm Spring", 85.25, None, "2024-01-05T11:00:00Z").unwrap();
    db.insert_palette("Summer", &["#B0C4DE".to_string()], "2024-01-05T12:00:00Z")
        .unwrap();

    let token = login(&app).await;
    let (_, _, body) = send(&app, get("/admin/stats", Some(&token))).await;
    assert_eq!(body["total_scans"], 2);
    assert_eq!(body["total_palettes"], 1);
    assert_eq!(body["avg_confidence"], 87.6);
    assert_eq!(body["recent_scans"][0]["tone_result"], "Warm Spring");
}

#[tokio::test]
async fn back_office_content_management() {
    let (app, _) = app();
    let token = login(&app).await;

    let (_, _, seasons) = send(&app, get("/seasons", None)).await;
    let autumn = seasons
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "Autumn")
        .unwrap()
        .clone();
    let uri = format!("/admin/seasons/{}/colors", autumn["id"]);

    let (status, _, _) = send(
        &app,
        json_request(Method::PUT, &uri, Some(&token), json!({ "colors": ["#a0522d"] })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, seasons) = send(&app, get("/seasons", None)).await;
    let autumn = seasons
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "Autumn")
        .unwrap()
        .clone();
    assert_eq!(autumn["colors"], json!(["#A0522D"]));

    let (status, _, _) = send(
        &app,
        json_request(Method::PUT, &uri, Some(&token), json!({ "colors": ["red"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, created) = send(
        &app,
        json_request(
            Method::POST,
            "/admin/tips",
            Some(&token),
            json!({ "title": "Neutrals", "description": "Anchor bold colors with neutrals." }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, _, tips) = send(&app, get("/tips", None)).await;
    assert_eq!(tips[0]["title"], "Neutrals");
    assert_eq!(tips[0]["category"], "Basic Theory");

    let req = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/admin/tips/{}", created["id"]))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, req).await.0, StatusCode::NO_CONTENT);

    let (_, _, tips) = send(&app, get("/tips", None)).await;
    assert!(tips.as_array().unwrap().is_empty());
}
