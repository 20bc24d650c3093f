// tests/dashboard_tests.rs

mod common;

use common::{PASSWORD, spawn_app_with_catalog, unique_email};
use serde_json::{Value, json};

#[tokio::test]
async fn dashboard_requires_a_token() {
    let app = spawn_app_with_catalog().await;

    let response = app.get("/api/dashboard", None).await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn student_dashboard_reflects_real_activity() {
    // Arrange
    let app = spawn_app_with_catalog().await;
    let (token, _) = app.register("Alex Chen", "student").await;
    let ocean = app.module_id(&token, "Ocean Pollution Crisis").await;
    app.submit(&token, ocean, &[3, 1, 2]).await;
    app.post(
        "/api/eco-actions",
        Some(&token),
        json!({
            "title": "Take shorter showers",
            "description": "Reduce shower time to conserve water",
            "impact": "Saves 25 gallons of water per week",
            "points": 10
        }),
    )
    .await;

    // Act
    let data = app.get_data("/api/dashboard", &token).await;

    // Assert
    assert_eq!(data["role"], "student");
    assert_eq!(data["user"]["points"], 250);

    let recommended = data["recommendedModules"].as_array().unwrap();
    assert_eq!(recommended.len(), 3);
    assert!(recommended.iter().all(|m| m["id"] != ocean));

    let weekly = data["weeklyActivity"].as_array().unwrap();
    assert_eq!(weekly.len(), 7);
    assert_eq!(weekly[6], 1);
    assert_eq!(weekly.iter().filter_map(Value::as_i64).sum::<i64>(), 1);

    assert_eq!(data["ecoActions"][0]["title"], "Take shorter showers");
    assert_eq!(data["recentAchievements"][0]["module"]["title"], "Ocean Pollution Crisis");
    assert_eq!(
        data["stats"],
        json!({ "totalModules": 1, "completedModules": 1, "averageScore": 100 })
    );
}

#[tokio::test]
async fn teacher_dashboard_aggregates_the_class() {
    // Arrange
    let app = spawn_app_with_catalog().await;
    let (alex, _) = app.register("Alex Chen", "student").await;
    let (emma, _) = app.register("Emma Rodriguez", "student").await;
    app.register("Sam Lee", "student").await;
    let (teacher, _) = app.register("Ms. Johnson", "teacher").await;

    let ocean = app.module_id(&alex, "Ocean Pollution Crisis").await;
    app.submit(&alex, ocean, &[3, 1, 2]).await; // 100, badges
    app.submit(&emma, ocean, &[0, 0, 2]).await; // 33, no badges

    // Act
    let data = app.get_data("/api/dashboard", &teacher).await;

    // Assert
    assert_eq!(data["role"], "teacher");
    let stats = &data["classStats"];
    assert_eq!(stats["totalStudents"], 3);
    assert_eq!(stats["activeToday"], 2);
    // (100 + 33) / 2 = 66.5
    assert_eq!(stats["averageScore"], 67);
    assert_eq!(stats["completionRate"], 50);

    let students = data["studentProgress"].as_array().unwrap();
    assert_eq!(students.len(), 3);
    assert_eq!(students[0]["name"], "Alex Chen");
    assert_eq!(students[0]["weeklyActivity"], 1);
    assert_eq!(students[0]["modulesCompleted"], 1);
    assert_eq!(students[0]["status"], "needs attention");
    assert_eq!(students[2]["averageScore"], 0);

    let achievements = data["recentAchievements"].as_array().unwrap();
    assert_eq!(achievements.len(), 1);
    assert_eq!(achievements[0]["student"], "Alex Chen");
    assert_eq!(achievements[0]["badge"], "Perfect Score");
}

#[tokio::test]
async fn parent_dashboard_only_shows_linked_children() {
    // Arrange
    let app = spawn_app_with_catalog().await;
    let parent_email = unique_email("sarah");
    let (parent, _) = app
        .register_with(json!({
            "name": "Sarah Wilson",
            "email": parent_email,
            "password": PASSWORD,
            "role": "parent"
        }))
        .await;
    let (child, child_user) = app
        .register_with(json!({
            "name": "Kid Wilson",
            "email": unique_email("kid"),
            "password": PASSWORD,
            "role": "student",
            "parentEmail": parent_email
        }))
        .await;
    app.register("Somebody Else", "student").await;

    let forest = app.module_id(&child, "Forest Conservation Quest").await;
    app.submit(&child, forest, &[2, 2]).await;

    // Act
    let data = app.get_data("/api/dashboard", &parent).await;

    // Assert
    assert_eq!(data["role"], "parent");
    let children = data["children"].as_array().unwrap();
    assert_eq!(children.len(), 1);

    let kid = &children[0];
    assert_eq!(kid["id"], child_user["id"]);
    assert_eq!(kid["points"], 280);
    assert_eq!(kid["weeklyGoal"], 5);
    assert_eq!(kid["weeklyProgress"], 1);
    assert_eq!(kid["totalTimeSpent"], 120);
    assert_eq!(kid["modulesCompleted"], 1);
    assert_eq!(
        kid["recentBadges"],
        json!(["Welcome", "Perfect Score", "Eco Warrior"])
    );
    assert_eq!(kid["weeklyActivity"][6], 1);
    assert_eq!(kid["recentModules"][0]["name"], "Forest Conservation Quest");
    assert_eq!(kid["recentModules"][0]["score"], 100);
    assert_eq!(kid["ecoActions"], json!([]));
}
