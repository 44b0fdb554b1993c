use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use cinelog::config::Config;
use cinelog::realtime::EventHub;
use cinelog::state::AppState;
use cinelog::{db, routes};

fn test_app() -> (Router, TempDir) {
    let tmp = TempDir::new().unwrap();
    let pool = db::create_pool(&tmp.path().join("test.db")).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let state = AppState {
        db: pool,
        events: EventHub::default(),
        config: Config::default(),
    };

    (routes::router().with_state(state), tmp)
}

/// Sends a JSON request and returns (status, parsed body, set-cookie value).
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.to_string());

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value, set_cookie)
}

async fn register(app: &Router, username: &str) -> (String, String) {
    let (status, body, cookie) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": username, "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {:?}", body);
    (body["id"].as_str().unwrap().to_string(), cookie.unwrap())
}

async fn resolve_movie(app: &Router, cookie: &str, imdb_id: &str, title: &str) -> String {
    let (status, body, _) = send(
        app,
        "POST",
        "/movies",
        Some(cookie),
        Some(json!({ "imdb_id": imdb_id, "title": title, "year": "1995" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_logout_round_trip() {
    let (app, _tmp) = test_app();

    let (_, cookie) = register(&app, "alice").await;

    let (status, body, _) = send(&app, "GET", "/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["display_name"], "alice");

    let (status, _, _) = send(&app, "POST", "/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Session revoked
    let (status, _, _) = send(&app, "GET", "/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, cookie) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.is_some());
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let (app, _tmp) = test_app();
    register(&app, "alice").await;

    let (status, body, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "alice", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username already taken");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (app, _tmp) = test_app();
    register(&app, "alice").await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn review_lifecycle_and_visibility() {
    let (app, _tmp) = test_app();
    let (_, cookie) = register(&app, "alice").await;

    // Resolving the same imdb id twice yields one internal id
    let movie = resolve_movie(&app, &cookie, "tt0113277", "Heat").await;
    let again = resolve_movie(&app, &cookie, "tt0113277", "Heat").await;
    assert_eq!(movie, again);

    // Creating a review requires authentication
    let (status, _, _) = send(
        &app,
        "POST",
        "/reviews",
        None,
        Some(json!({ "movie_id": movie, "rating": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, review, _) = send(
        &app,
        "POST",
        "/reviews",
        Some(&cookie),
        Some(json!({ "movie_id": movie, "rating": 8, "review_text": "Great film" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(review["rating"], 8);
    assert_eq!(review["is_public"], true);
    let review_id = review["id"].as_str().unwrap().to_string();

    // First element of the public feed, joined with author and movie
    let (status, feed, _) = send(&app, "GET", "/reviews?limit=1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed[0]["id"], review_id.as_str());
    assert_eq!(feed[0]["user"]["username"], "alice");
    assert_eq!(feed[0]["movie"]["title"], "Heat");

    let (status, full, _) = send(&app, "GET", &format!("/reviews/{}", review_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(full["movie"]["imdb_id"], "tt0113277");

    // Out-of-range rating patch is rejected
    let (status, _, _) = send(
        &app,
        "PATCH",
        &format!("/reviews/{}", review_id),
        Some(&cookie),
        Some(json!({ "rating": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Hiding the review makes it unfetchable and drops it from the feed
    let (status, patched, _) = send(
        &app,
        "PATCH",
        &format!("/reviews/{}", review_id),
        Some(&cookie),
        Some(json!({ "is_public": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["is_public"], false);
    assert_eq!(patched["review_text"], "Great film");

    let (status, _, _) = send(&app, "GET", &format!("/reviews/{}", review_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, feed, _) = send(&app, "GET", "/reviews", None, None).await;
    assert_eq!(feed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn comments_and_votes() {
    let (app, _tmp) = test_app();
    let (_, alice) = register(&app, "alice").await;
    let (_, bob) = register(&app, "bob").await;

    let movie = resolve_movie(&app, &alice, "tt1", "Heat").await;
    let (_, review, _) = send(
        &app,
        "POST",
        "/reviews",
        Some(&alice),
        Some(json!({ "movie_id": movie, "rating": 8 })),
    )
    .await;
    let review_id = review["id"].as_str().unwrap();

    let comments_uri = format!("/reviews/{}/comments", review_id);
    for text in ["first!", "second!"] {
        let (status, comment, _) = send(
            &app,
            "POST",
            &comments_uri,
            Some(&bob),
            Some(json!({ "comment_text": text })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(comment["user"]["username"], "bob");
    }

    // Oldest first
    let (status, comments, _) = send(&app, "GET", &comments_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comments[0]["comment_text"], "first!");
    assert_eq!(comments[1]["comment_text"], "second!");
    let comment_id = comments[0]["id"].as_str().unwrap().to_string();

    // Voting twice keeps one row with the latest polarity
    let vote_uri = format!("/comments/{}/vote", comment_id);
    let (status, _, _) = send(&app, "PUT", &vote_uri, Some(&alice), Some(json!({ "vote_type": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(&app, "PUT", &vote_uri, Some(&alice), Some(json!({ "vote_type": -1 }))).await;
    assert_eq!(status, StatusCode::OK);

    let counts_uri = format!("/comments/{}/votes", comment_id);
    let (_, counts, _) = send(&app, "GET", &counts_uri, None, None).await;
    assert_eq!(counts, json!({ "upvotes": 0, "downvotes": 1 }));

    let (status, _, _) = send(&app, "PUT", &vote_uri, Some(&bob), Some(json!({ "vote_type": 2 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, "DELETE", &vote_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, counts, _) = send(&app, "GET", &counts_uri, None, None).await;
    assert_eq!(counts, json!({ "upvotes": 0, "downvotes": 0 }));

    // Only the author may delete a comment
    let comment_uri = format!("/comments/{}", comment_id);
    let (status, _, _) = send(&app, "DELETE", &comment_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, "DELETE", &comment_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn follow_graph() {
    let (app, _tmp) = test_app();
    let (alice_id, alice) = register(&app, "alice").await;
    let (bob_id, bob) = register(&app, "bob").await;

    let follow_uri = format!("/profiles/{}/follow", bob_id);
    let (status, _, _) = send(&app, "POST", &follow_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body, _) = send(&app, "POST", &follow_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Already following");

    let (_, status_body, _) = send(&app, "GET", &follow_uri, Some(&alice), None).await;
    assert_eq!(status_body, json!({ "following": true }));

    // Self-follow rejected before it hits the database
    let self_uri = format!("/profiles/{}/follow", alice_id);
    let (status, _, _) = send(&app, "POST", &self_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, followers, _) = send(
        &app,
        "GET",
        &format!("/profiles/{}/followers", bob_id),
        None,
        None,
    )
    .await;
    assert_eq!(followers[0]["username"], "alice");

    let (_, following, _) = send(
        &app,
        "GET",
        &format!("/profiles/{}/following", alice_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(following[0]["username"], "bob");

    let (status, _, _) = send(&app, "DELETE", &follow_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, "DELETE", &follow_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn saved_movie_library() {
    let (app, _tmp) = test_app();
    let (alice_id, alice) = register(&app, "alice").await;
    let movie = resolve_movie(&app, &alice, "tt1", "Heat").await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/library",
        Some(&alice),
        Some(json!({ "movie_id": movie, "list": "watchlist" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body, _) = send(
        &app,
        "POST",
        "/library",
        Some(&alice),
        Some(json!({ "movie_id": movie, "list": "watchlist" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Already in list");

    let (status, library, _) = send(
        &app,
        "GET",
        &format!("/profiles/{}/library/watchlist", alice_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(library[0]["movie"]["title"], "Heat");

    let (status, _, _) = send(
        &app,
        "GET",
        &format!("/profiles/{}/library/wishlist", alice_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        "DELETE",
        &format!("/library/{}/watchlist", movie),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn custom_list_sharing() {
    let (app, _tmp) = test_app();
    let (_, alice) = register(&app, "alice").await;
    let movie = resolve_movie(&app, &alice, "tt1", "Heat").await;

    // Private by default
    let (status, list, _) = send(
        &app,
        "POST",
        "/lists",
        Some(&alice),
        Some(json!({ "name": "Crime night" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(list["is_public"], false);
    let list_id = list["id"].as_str().unwrap().to_string();
    let list_uri = format!("/lists/{}", list_id);

    let (status, _, _) = send(
        &app,
        "POST",
        &format!("/lists/{}/movies", list_id),
        Some(&alice),
        Some(json!({ "movie_id": movie })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Owner sees it; anonymous viewers do not
    let (status, full, _) = send(&app, "GET", &list_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(full["movies"][0]["movie"]["title"], "Heat");
    let (status, _, _) = send(&app, "GET", &list_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Publishing makes it browsable
    let (status, _, _) = send(
        &app,
        "PATCH",
        &list_uri,
        Some(&alice),
        Some(json!({ "is_public": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, "GET", &list_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, public, _) = send(&app, "GET", "/lists/public", None, None).await;
    assert_eq!(public[0]["name"], "Crime night");
    assert_eq!(public[0]["user"]["username"], "alice");
    assert_eq!(public[0]["movie_count"], 1);

    // Deletion cascades; the list is gone for everyone
    let (status, _, _) = send(&app, "DELETE", &list_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, "GET", &list_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
