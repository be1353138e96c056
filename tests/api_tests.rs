use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::{json, Value};

use movie_review_api::{
    config::Config,
    routes::{create_router, AppState},
};

const ADMIN_EMAIL: &str = "admin@example.com";

fn create_test_server() -> TestServer {
    let config = Config {
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        ..Config::default()
    };
    let app = create_router(AppState::in_memory(config));
    TestServer::new(app).unwrap()
}

fn authorized(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

/// Registers an account and returns (token, user id)
async fn register(server: &TestServer, username: &str, email: &str) -> (String, String) {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "email": email,
            "password": "secret123"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_str().unwrap().to_string(),
    )
}

async fn create_movie(server: &TestServer, token: &str, body: Value) -> String {
    let response = authorized(server.post("/api/movies"), token).json(&body).await;
    response.assert_status(StatusCode::CREATED);
    let movie: Value = response.json();
    movie["id"].as_str().unwrap().to_string()
}

async fn submit_review(server: &TestServer, token: &str, movie_id: &str, rating: i32) -> String {
    let response = authorized(
        server.post(&format!("/api/movies/{}/reviews", movie_id)),
        token,
    )
    .json(&json!({ "rating": rating, "review_text": "Seen it" }))
    .await;
    response.assert_status(StatusCode::CREATED);
    let review: Value = response.json();
    review["id"].as_str().unwrap().to_string()
}

async fn average_rating(server: &TestServer, movie_id: &str) -> f64 {
    let response = server.get(&format!("/api/movies/{}", movie_id)).await;
    response.assert_status_ok();
    let detail: Value = response.json();
    detail["movie"]["average_rating"].as_f64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let server = create_test_server();
    let response = server.get("/health").await;
    let request_id = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_register_login_logout() {
    let server = create_test_server();
    let (token, user_id) = register(&server, "alice", "Alice@Example.com").await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": "alice2",
            "email": "alice@example.com",
            "password": "secret123"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "wrong-password" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "secret123" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["id"], user_id.as_str());
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"].get("password_hash").is_none());

    let response = authorized(server.post("/api/auth/logout"), &token).await;
    response.assert_status_ok();

    let response = authorized(server.get(&format!("/api/users/{}", user_id)), &token).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let server = create_test_server();

    let response = server
        .post("/api/movies")
        .json(&json!({ "title": "Heat" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body["error"].is_string());

    let response = authorized(server.post("/api/auth/logout"), "not-a-session").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_only_admins_add_movies() {
    let server = create_test_server();
    let (admin, _) = register(&server, "admin", ADMIN_EMAIL).await;
    let (viewer, _) = register(&server, "viewer", "viewer@example.com").await;

    let response = authorized(server.post("/api/movies"), &viewer)
        .json(&json!({ "title": "Heat", "genre": ["Crime"] }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = authorized(server.post("/api/movies"), &admin)
        .json(&json!({ "title": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let id = create_movie(
        &server,
        &admin,
        json!({ "title": "Heat", "genre": ["Crime"], "release_year": 1995 }),
    )
    .await;

    let response = server.get(&format!("/api/movies/{}", id)).await;
    response.assert_status_ok();
    let detail: Value = response.json();
    assert_eq!(detail["movie"]["title"], "Heat");
    assert_eq!(detail["movie"]["average_rating"], 0.0);
    assert_eq!(detail["reviews"], json!([]));
}

#[tokio::test]
async fn test_list_filters_and_pagination() {
    let server = create_test_server();
    let (admin, _) = register(&server, "admin", ADMIN_EMAIL).await;

    create_movie(&server, &admin, json!({ "title": "Alien", "genre": ["Horror", "Sci-Fi"], "release_year": 1979 })).await;
    create_movie(&server, &admin, json!({ "title": "Aliens", "genre": ["Action", "Sci-Fi"], "release_year": 1986 })).await;
    create_movie(&server, &admin, json!({ "title": "Heat", "genre": ["Crime"], "release_year": 1995 })).await;

    let response = server.get("/api/movies").add_query_param("genre", "Sci-Fi").await;
    let movies: Vec<Value> = response.json();
    assert_eq!(movies.len(), 2);

    let response = server.get("/api/movies").add_query_param("search", "alien").await;
    let movies: Vec<Value> = response.json();
    assert_eq!(movies.len(), 2);

    let response = server.get("/api/movies").add_query_param("year", 1995).await;
    let movies: Vec<Value> = response.json();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0]["title"], "Heat");

    let response = server
        .get("/api/movies")
        .add_query_param("page", 2)
        .add_query_param("limit", 2)
        .await;
    let movies: Vec<Value> = response.json();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0]["title"], "Heat");

    let response = server
        .get("/api/movies")
        .add_query_param("sort", "recent")
        .add_query_param("limit", 1)
        .await;
    let movies: Vec<Value> = response.json();
    assert_eq!(movies[0]["title"], "Heat");

    let response = server.get("/api/movies").add_query_param("page", 0).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/movies")
        .add_query_param("page", usize::MAX)
        .add_query_param("limit", 4)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reviews_drive_average_rating() {
    let server = create_test_server();
    let (admin, _) = register(&server, "admin", ADMIN_EMAIL).await;
    let (a, _) = register(&server, "a", "a@example.com").await;
    let (b, _) = register(&server, "b", "b@example.com").await;
    let (c, _) = register(&server, "c", "c@example.com").await;

    let movie_id = create_movie(&server, &admin, json!({ "title": "Heat", "genre": ["Crime"] })).await;

    submit_review(&server, &a, &movie_id, 5).await;
    let middle = submit_review(&server, &b, &movie_id, 3).await;
    submit_review(&server, &c, &movie_id, 4).await;
    assert_eq!(average_rating(&server, &movie_id).await, 4.0);

    let response = server.get(&format!("/api/movies/{}/reviews", movie_id)).await;
    let reviews: Vec<Value> = response.json();
    assert_eq!(reviews.len(), 3);
    assert!(reviews.iter().any(|r| r["username"] == "b"));

    let response = authorized(server.delete(&format!("/api/reviews/{}", middle)), &b).await;
    response.assert_status_ok();
    assert_eq!(average_rating(&server, &movie_id).await, 4.5);

    let response = authorized(server.post(&format!("/api/movies/{}/reviews", movie_id)), &a)
        .json(&json!({ "rating": 6 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(average_rating(&server, &movie_id).await, 4.5);
}

#[tokio::test]
async fn test_only_author_deletes_review() {
    let server = create_test_server();
    let (admin, _) = register(&server, "admin", ADMIN_EMAIL).await;
    let (author, _) = register(&server, "author", "author@example.com").await;
    let (other, _) = register(&server, "other", "other@example.com").await;

    let movie_id = create_movie(&server, &admin, json!({ "title": "Heat", "genre": ["Crime"] })).await;
    let review_id = submit_review(&server, &author, &movie_id, 2).await;

    for token in [&other, &admin] {
        let response =
            authorized(server.delete(&format!("/api/reviews/{}", review_id)), token).await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    let response = server.get(&format!("/api/movies/{}/reviews", movie_id)).await;
    let reviews: Vec<Value> = response.json();
    assert_eq!(reviews.len(), 1);
    assert_eq!(average_rating(&server, &movie_id).await, 2.0);
}

#[tokio::test]
async fn test_movie_deletion_rules() {
    let server = create_test_server();
    let (admin, _) = register(&server, "admin", ADMIN_EMAIL).await;
    let (viewer, _) = register(&server, "viewer", "viewer@example.com").await;

    let movie_id = create_movie(&server, &admin, json!({ "title": "Heat" })).await;

    let missing = uuid::Uuid::new_v4();
    let response = authorized(server.delete(&format!("/api/movies/{}", missing)), &viewer).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = authorized(server.delete(&format!("/api/movies/{}", movie_id)), &viewer).await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = authorized(server.delete(&format!("/api/movies/{}", movie_id)), &admin).await;
    response.assert_status_ok();

    let response = server.get(&format!("/api/movies/{}", movie_id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_movie_is_not_found() {
    let server = create_test_server();
    let id = uuid::Uuid::new_v4();

    let response = server.get(&format!("/api/movies/{}", id)).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server.get(&format!("/api/movies/{}/recommendations", id)).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server.get("/api/movies/not-a-uuid").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_share_genre() {
    let server = create_test_server();
    let (admin, _) = register(&server, "admin", ADMIN_EMAIL).await;
    let (a, _) = register(&server, "a", "a@example.com").await;

    let target = create_movie(&server, &admin, json!({ "title": "Alien", "genre": ["Horror", "Sci-Fi"] })).await;
    let b = create_movie(&server, &admin, json!({ "title": "Aliens", "genre": ["Sci-Fi"] })).await;
    let c = create_movie(&server, &admin, json!({ "title": "The Thing", "genre": ["Horror"] })).await;
    create_movie(&server, &admin, json!({ "title": "Heat", "genre": ["Crime"] })).await;

    submit_review(&server, &a, &b, 3).await;
    submit_review(&server, &a, &c, 5).await;

    let response = server
        .get(&format!("/api/movies/{}/recommendations", target))
        .await;
    response.assert_status_ok();
    let recommended: Vec<Value> = response.json();
    let titles: Vec<&str> = recommended
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["The Thing", "Aliens"]);

    let response = server
        .get(&format!("/api/movies/{}/recommendations", target))
        .add_query_param("limit", 1)
        .await;
    let recommended: Vec<Value> = response.json();
    assert_eq!(recommended.len(), 1);
    assert_eq!(recommended[0]["id"], c.as_str());

    let response = server.get(&format!("/api/movies/{}", target)).await;
    let detail: Value = response.json();
    assert_eq!(detail["recommendations"].as_array().unwrap().len(), 2);

    let response = server
        .get(&format!("/api/movies/{}/recommendations", target))
        .add_query_param("limit", 0)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_watchlist_flow() {
    let server = create_test_server();
    let (admin, _) = register(&server, "admin", ADMIN_EMAIL).await;
    let (viewer, viewer_id) = register(&server, "viewer", "viewer@example.com").await;
    let (other, _) = register(&server, "other", "other@example.com").await;

    let movie_id = create_movie(&server, &admin, json!({ "title": "Heat" })).await;
    let watchlist_path = format!("/api/users/{}/watchlist", viewer_id);

    let response = authorized(server.post(&watchlist_path), &viewer)
        .json(&json!({ "movie_id": movie_id }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = authorized(server.post(&watchlist_path), &viewer)
        .json(&json!({ "movie_id": movie_id }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = authorized(server.get(&watchlist_path), &other).await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = authorized(server.get(&watchlist_path), &viewer).await;
    response.assert_status_ok();
    let items: Vec<Value> = response.json();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["movie"]["title"], "Heat");

    let remove_path = format!("{}/{}", watchlist_path, movie_id);
    let response = authorized(server.delete(&remove_path), &viewer).await;
    response.assert_status_ok();

    let response = authorized(server.delete(&remove_path), &viewer).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_lists_reviews_and_updates() {
    let server = create_test_server();
    let (admin, _) = register(&server, "admin", ADMIN_EMAIL).await;
    let (viewer, viewer_id) = register(&server, "viewer", "viewer@example.com").await;

    let movie_id = create_movie(&server, &admin, json!({ "title": "Heat" })).await;
    submit_review(&server, &viewer, &movie_id, 4).await;

    let profile_path = format!("/api/users/{}", viewer_id);
    let response = authorized(server.get(&profile_path), &viewer).await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["user"]["username"], "viewer");
    assert_eq!(profile["reviews"][0]["movie_title"], "Heat");

    let response = authorized(server.put(&profile_path), &viewer)
        .json(&json!({ "username": "cinephile" }))
        .await;
    response.assert_status_ok();
    let user: Value = response.json();
    assert_eq!(user["username"], "cinephile");

    let response = authorized(server.get(&profile_path), &admin).await;
    response.assert_status_ok();
}
