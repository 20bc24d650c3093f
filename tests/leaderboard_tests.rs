// tests/leaderboard_tests.rs

mod common;

use common::spawn_app_with_catalog;
use serde_json::Value;

#[tokio::test]
async fn leaderboard_ranks_students_by_points_then_id() {
    // Arrange
    let app = spawn_app_with_catalog().await;
    let (alex, alex_user) = app.register("Alex Chen", "student").await;
    let (emma, emma_user) = app.register("Emma Rodriguez", "student").await;
    let (_, sam_user) = app.register("Sam Lee", "student").await;
    let (_, kim_user) = app.register("Kim Park", "student").await;
    let (teacher, _) = app.register("Ms. Johnson", "teacher").await;

    let ocean = app.module_id(&alex, "Ocean Pollution Crisis").await;
    let energy = app.module_id(&alex, "Renewable Energy Heroes").await;
    app.submit(&alex, ocean, &[3, 1, 2]).await; // 250
    app.submit(&emma, energy, &[2, 1]).await; // 220

    // Act
    let data = app.get_data("/api/leaderboard", &teacher).await;

    // Assert
    let board = data["leaderboard"].as_array().unwrap();
    let ids: Vec<&Value> = board.iter().map(|e| &e["id"]).collect();
    assert_eq!(
        ids,
        vec![&alex_user["id"], &emma_user["id"], &sam_user["id"], &kim_user["id"]]
    );
    assert_eq!(board[0]["rank"], 1);
    assert_eq!(board[0]["points"], 250);
    assert_eq!(board[0]["badges"], 3);
    assert_eq!(board[3]["rank"], 4);
}

#[tokio::test]
async fn leaderboard_respects_limit_and_role() {
    let app = spawn_app_with_catalog().await;
    let (token, _) = app.register("Alex Chen", "student").await;
    app.register("Emma Rodriguez", "student").await;
    app.register("Sam Lee", "student").await;
    app.register("Ms. Johnson", "teacher").await;

    let top_two = app.get_data("/api/leaderboard?limit=2", &token).await;
    assert_eq!(top_two["leaderboard"].as_array().unwrap().len(), 2);

    // Non-positive limits clamp to one entry
    let clamped = app.get_data("/api/leaderboard?limit=0", &token).await;
    assert_eq!(clamped["leaderboard"].as_array().unwrap().len(), 1);

    let teachers = app.get_data("/api/leaderboard?role=teacher", &token).await;
    let teachers = teachers["leaderboard"].as_array().unwrap();
    assert_eq!(teachers.len(), 1);
    assert_eq!(teachers[0]["name"], "Ms. Johnson");

    let bad_role = app.get("/api/leaderboard?role=admin", Some(&token)).await;
    assert_eq!(bad_role.status().as_u16(), 400);

    let bad_limit = app.get("/api/leaderboard?limit=lots", Some(&token)).await;
    assert_eq!(bad_limit.status().as_u16(), 400);
}

#[tokio::test]
async fn rank_lookup_counts_strictly_higher_peers() {
    // Arrange
    let app = spawn_app_with_catalog().await;
    let (alex, alex_user) = app.register("Alex Chen", "student").await;
    let (_, emma_user) = app.register("Emma Rodriguez", "student").await;
    let (_, sam_user) = app.register("Sam Lee", "student").await;
    app.register("Ms. Johnson", "teacher").await;
    let ocean = app.module_id(&alex, "Ocean Pollution Crisis").await;
    app.submit(&alex, ocean, &[3, 1, 2]).await;

    // Act
    let top = app
        .get_data(&format!("/api/leaderboard/rank/{}", alex_user["id"]), &alex)
        .await;
    let emma = app
        .get_data(&format!("/api/leaderboard/rank/{}", emma_user["id"]), &alex)
        .await;
    let sam = app
        .get_data(&format!("/api/leaderboard/rank/{}", sam_user["id"]), &alex)
        .await;

    // Assert
    assert_eq!(top["rank"], 1);
    assert_eq!(top["totalUsers"], 3);
    assert_eq!(top["points"], 250);
    // Emma and Sam are tied and share a rank
    assert_eq!(emma["rank"], 2);
    assert_eq!(sam["rank"], 2);
}

#[tokio::test]
async fn rank_of_unknown_user_is_404() {
    let app = spawn_app_with_catalog().await;
    let (token, _) = app.register("Alex Chen", "student").await;

    let response = app.get("/api/leaderboard/rank/424242", Some(&token)).await;

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "User not found");
}
