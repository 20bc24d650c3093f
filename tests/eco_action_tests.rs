// tests/eco_action_tests.rs

mod common;

use common::spawn_app;
use serde_json::{Value, json};

fn bottle_action() -> Value {
    json!({
        "title": "Use reusable water bottle",
        "description": "Replace single-use plastic bottles with a reusable alternative",
        "impact": "Reduces plastic waste by 1,460 bottles per year",
        "points": 15
    })
}

#[tokio::test]
async fn create_list_and_complete_an_eco_action() {
    // Arrange
    let app = spawn_app().await;
    let (token, _) = app.register("Alex Chen", "student").await;

    // Act: create
    let response = app.post("/api/eco-actions", Some(&token), bottle_action()).await;

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    let action = &body["data"];
    assert_eq!(action["completed"], false);
    assert!(action["completedAt"].is_null());
    let id = action["id"].as_i64().unwrap();

    let listed = app.get_data("/api/eco-actions", &token).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Act: complete twice
    let first: Value = app
        .post(&format!("/api/eco-actions/{}/complete", id), Some(&token), json!({}))
        .await
        .json()
        .await
        .unwrap();
    let second: Value = app
        .post(&format!("/api/eco-actions/{}/complete", id), Some(&token), json!({}))
        .await
        .json()
        .await
        .unwrap();

    // Assert: idempotent, and no points move onto the account
    assert_eq!(first["data"]["completed"], true);
    assert!(first["data"]["completedAt"].is_string());
    assert_eq!(first["data"]["completedAt"], second["data"]["completedAt"]);

    let profile = app.get_data("/api/auth/profile", &token).await;
    assert_eq!(profile["points"], 100);
}

#[tokio::test]
async fn special_characters_round_trip_unchanged() {
    // Arrange
    let app = spawn_app().await;
    let (token, _) = app.register("Alex Chen", "student").await;

    let mut action = bottle_action();
    action["title"] = json!("Bike & bus to school");
    action["description"] = json!("Use 2 < 3 cars for the school run");
    action["impact"] = json!("Cuts CO2 & traffic");

    // Act
    let response = app.post("/api/eco-actions", Some(&token), action).await;

    // Assert: stored as typed, no entity encoding
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Bike & bus to school");
    assert_eq!(body["data"]["description"], "Use 2 < 3 cars for the school run");
    assert_eq!(body["data"]["impact"], "Cuts CO2 & traffic");

    let listed = app.get_data("/api/eco-actions", &token).await;
    assert_eq!(listed[0]["title"], "Bike & bus to school");
}

#[tokio::test]
async fn length_limits_count_raw_characters() {
    let app = spawn_app().await;
    let (token, _) = app.register("Alex Chen", "student").await;

    // 150 ampersands would exceed 200 characters once entity encoded.
    let mut action = bottle_action();
    action["title"] = json!("&".repeat(150));
    let response = app.post("/api/eco-actions", Some(&token), action).await;
    assert_eq!(response.status().as_u16(), 201);

    let mut too_long = bottle_action();
    too_long["impact"] = json!("x".repeat(201));
    let response = app.post("/api/eco-actions", Some(&token), too_long).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Impact must be between 1 and 200 characters")
    );
}

#[tokio::test]
async fn markup_in_free_text_is_rejected() {
    let app = spawn_app().await;
    let (token, _) = app.register("Alex Chen", "student").await;

    let mut action = bottle_action();
    action["title"] = json!("Plant a tree<script>alert(1)</script>");
    let response = app.post("/api/eco-actions", Some(&token), action).await;
    assert_eq!(response.status().as_u16(), 400);

    let mut action = bottle_action();
    action["description"] = json!("<b onclick=\"steal()\">Recycle</b>");
    let response = app.post("/api/eco-actions", Some(&token), action).await;
    assert_eq!(response.status().as_u16(), 400);

    let listed = app.get_data("/api/eco-actions", &token).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn invalid_eco_actions_are_rejected() {
    let app = spawn_app().await;
    let (token, _) = app.register("Alex Chen", "student").await;

    let mut empty_title = bottle_action();
    empty_title["title"] = json!("   ");
    let response = app.post("/api/eco-actions", Some(&token), empty_title).await;
    assert_eq!(response.status().as_u16(), 400);

    let mut negative = bottle_action();
    negative["points"] = json!(-5);
    let response = app.post("/api/eco-actions", Some(&token), negative).await;
    assert_eq!(response.status().as_u16(), 400);

    let unauthenticated = app.post("/api/eco-actions", None, bottle_action()).await;
    assert_eq!(unauthenticated.status().as_u16(), 401);
}

#[tokio::test]
async fn only_the_owner_can_complete_an_action() {
    // Arrange
    let app = spawn_app().await;
    let (owner, _) = app.register("Alex Chen", "student").await;
    let (other, _) = app.register("Emma Rodriguez", "student").await;
    let body: Value = app
        .post("/api/eco-actions", Some(&owner), bottle_action())
        .await
        .json()
        .await
        .unwrap();
    let id = body["data"]["id"].as_i64().unwrap();

    // Act
    let response = app
        .post(&format!("/api/eco-actions/{}/complete", id), Some(&other), json!({}))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    let missing = app
        .post("/api/eco-actions/9999/complete", Some(&owner), json!({}))
        .await;
    assert_eq!(missing.status().as_u16(), 404);

    let others_view = app.get_data("/api/eco-actions", &other).await;
    assert_eq!(others_view, json!([]));
}
