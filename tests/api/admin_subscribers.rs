use crate::helpers::{TestApp, assert_message, spawn_app};

async fn subscribe_all(app: &TestApp, people: &[(&str, &str)]) {
    for (name, email) in people {
        let response = app.subscribe(name, email).await;
        assert_eq!(response.status().as_u16(), 200);
    }
}

fn names(body: &serde_json::Value) -> Vec<&str> {
    body["subscribers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect()
}

#[actix_web::test]
async fn anonymous_listing_is_forbidden() {
    let app = spawn_app().await;

    let response = app.get_admin_subscribers().await;

    assert_message(response, 403, "Insufficient permissions").await;
}

#[actix_web::test]
async fn anonymous_callers_cannot_get_a_search_token() {
    let app = spawn_app().await;

    let response = app.get_search_token().await;

    assert_message(response, 403, "Insufficient permissions").await;
}

#[actix_web::test]
async fn listing_returns_everyone_newest_first() {
    let app = spawn_app().await;
    subscribe_all(
        &app,
        &[("Alice", "alice@x.com"), ("Bob", "bob@y.com"), ("Cy", "cy@z.org")],
    )
    .await;
    app.login_test_user().await;

    let response = app.get_admin_subscribers().await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["total"], 3);
    assert_eq!(names(&body), ["Cy", "Bob", "Alice"]);
    let first = &body["subscribers"][0];
    assert_eq!(first["email"], "cy@z.org");
    assert!(first["id"].is_i64());
    assert!(first["created_at"].is_string());
}

#[actix_web::test]
async fn empty_directory_is_an_empty_list() {
    let app = spawn_app().await;
    app.login_test_user().await;

    let body: serde_json::Value = app.search("").await.json().await.unwrap();

    assert_eq!(body["total"], 0);
    assert!(body["subscribers"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn search_matches_name_or_email() {
    let app = spawn_app().await;
    subscribe_all(&app, &[("Alice", "alice@x.com"), ("Bob", "bob@y.com")]).await;
    app.login_test_user().await;

    let bob: serde_json::Value = app.search("bob").await.json().await.unwrap();
    let alice: serde_json::Value = app.search("x.com").await.json().await.unwrap();
    let both: serde_json::Value = app.search("  ").await.json().await.unwrap();

    assert_eq!(names(&bob), ["Bob"]);
    assert_eq!(bob["total"], 1);
    assert_eq!(names(&alice), ["Alice"]);
    assert_eq!(names(&both), ["Bob", "Alice"]);
}

#[actix_web::test]
async fn search_ignores_case() {
    let app = spawn_app().await;
    subscribe_all(&app, &[("Alice", "alice@x.com"), ("Bob", "bob@y.com")]).await;
    app.login_test_user().await;

    let body: serde_json::Value = app.search("ALI").await.json().await.unwrap();

    assert_eq!(names(&body), ["Alice"]);
}

#[actix_web::test]
async fn wildcards_in_search_match_literally() {
    let app = spawn_app().await;
    subscribe_all(
        &app,
        &[("Alice", "alice@x.com"), ("Bob_Smith", "bob.smith@y.com")],
    )
    .await;
    app.login_test_user().await;

    let percent: serde_json::Value = app.search("%").await.json().await.unwrap();
    let underscore: serde_json::Value = app.search("_").await.json().await.unwrap();

    assert_eq!(percent["total"], 0);
    assert_eq!(names(&underscore), ["Bob_Smith"]);
}

#[actix_web::test]
async fn search_is_idempotent() {
    let app = spawn_app().await;
    subscribe_all(&app, &[("Alice", "alice@x.com"), ("Alina", "alina@x.com")]).await;
    app.login_test_user().await;

    let first: serde_json::Value = app.search("ali").await.json().await.unwrap();
    let second: serde_json::Value = app.search("ali").await.json().await.unwrap();

    assert_eq!(first, second);
}

#[actix_web::test]
async fn search_without_token_is_rejected() {
    let app = spawn_app().await;
    app.login_test_user().await;

    let response = app
        .post_search(&serde_json::json!({ "search": "bob" }))
        .await;

    assert_message(response, 403, "Security check failed").await;
}

#[actix_web::test]
async fn subscription_token_cannot_be_used_to_search() {
    let app = spawn_app().await;
    app.login_test_user().await;
    let token = app.get_subscription_token().await;

    let response = app
        .post_search(&serde_json::json!({ "token": token, "search": "bob" }))
        .await;

    assert_message(response, 403, "Security check failed").await;
}

#[actix_web::test]
async fn search_token_stops_working_for_a_logged_out_session() {
    let app = spawn_app().await;
    app.login_test_user().await;
    let body: serde_json::Value = app.get_search_token().await.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_owned();
    app.post_logout().await;

    let response = app
        .post_search(&serde_json::json!({ "token": token, "search": "bob" }))
        .await;

    assert_eq!(response.status().as_u16(), 403);
}
