use std::sync::Arc;

use actix_web::{App, http::StatusCode, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};

use todolist_core::domain::{NewUser, Todo, TodoChanges, User};
use todolist_core::error::RepoError;
use todolist_core::ports::{PasswordService, TodoRepository, TokenService, UserRepository};
use todolist_infra::{Argon2PasswordService, InMemoryRepository, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::middleware::auth::AuthGate;
use crate::state::AppState;

const SECRET: &str = "test-secret";

fn tokens(secret: &str) -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(JwtConfig {
        secret: secret.to_string(),
        ..JwtConfig::default()
    }))
}

fn memory_state() -> AppState {
    let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
    AppState::new(Arc::new(InMemoryRepository::new()), passwords, tokens(SECRET))
}

fn bearer(state: &AppState) -> String {
    let token = state
        .tokens
        .generate_token("alice@example.com", "alice")
        .unwrap();
    format!("Bearer {token}")
}

macro_rules! init_app {
    ($state:expr, $gate:expr) => {{
        let gate = $gate;
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(move |cfg| configure_routes(cfg, gate)),
        )
        .await
    }};
    ($state:expr) => {{
        let state = $state;
        let gate = AuthGate::Bearer(state.tokens.clone());
        init_app!(state, gate)
    }};
}

/// Storage that fails every call.
struct FailingRepository;

#[async_trait]
impl TodoRepository for FailingRepository {
    async fn create(&self, _title: &str, _description: &str) -> Result<Todo, RepoError> {
        Err(RepoError::Query("connection reset".to_string()))
    }

    async fn find_all(&self) -> Result<Vec<Todo>, RepoError> {
        Err(RepoError::Query("connection reset".to_string()))
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<Todo>, RepoError> {
        Err(RepoError::Query("connection reset".to_string()))
    }

    async fn update(&self, _id: i64, _changes: TodoChanges) -> Result<u64, RepoError> {
        Err(RepoError::Query("connection reset".to_string()))
    }

    async fn delete(&self, _id: i64) -> Result<u64, RepoError> {
        Err(RepoError::Query("connection reset".to_string()))
    }
}

#[async_trait]
impl UserRepository for FailingRepository {
    async fn create_user(&self, _user: NewUser) -> Result<User, RepoError> {
        Err(RepoError::Query("connection reset".to_string()))
    }

    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, RepoError> {
        Err(RepoError::Query("connection reset".to_string()))
    }
}

fn failing_state() -> AppState {
    let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
    AppState::new(Arc::new(FailingRepository), passwords, tokens(SECRET))
}

/// Storage where every todo exists but no update ever lands, as when a
/// concurrent delete wins the race after the existence check.
struct StaleRepository;

#[async_trait]
impl TodoRepository for StaleRepository {
    async fn create(&self, _title: &str, _description: &str) -> Result<Todo, RepoError> {
        Err(RepoError::Query("read only".to_string()))
    }

    async fn find_all(&self) -> Result<Vec<Todo>, RepoError> {
        Ok(Vec::new())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, RepoError> {
        Ok(Some(Todo {
            id,
            title: "Buy milk".to_string(),
            description: "2 liters".to_string(),
            status: false,
        }))
    }

    async fn update(&self, _id: i64, _changes: TodoChanges) -> Result<u64, RepoError> {
        Ok(0)
    }

    async fn delete(&self, _id: i64) -> Result<u64, RepoError> {
        Ok(0)
    }
}

#[async_trait]
impl UserRepository for StaleRepository {
    async fn create_user(&self, _user: NewUser) -> Result<User, RepoError> {
        Err(RepoError::Query("read only".to_string()))
    }

    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, RepoError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Todo CRUD
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn test_create_todo() {
    let state = memory_state();
    let auth = bearer(&state);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/create_todolist")
        .insert_header(("Authorization", auth))
        .set_json(json!({"title": "Buy milk", "description": "2 liters"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 201);
    assert_eq!(body["message"], "create todolist successfully");
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["title"], "Buy milk");
    assert_eq!(body["data"]["status"], false);
}

#[actix_web::test]
async fn test_create_rejects_short_title_and_bad_json() {
    let state = memory_state();
    let auth = bearer(&state);
    let app = init_app!(state.clone());

    let req = test::TestRequest::post()
        .uri("/api/create_todolist")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({"title": "A", "description": "long enough"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": 400, "message": "invalid input validation"}));

    let req = test::TestRequest::post()
        .uri("/api/create_todolist")
        .insert_header(("Authorization", auth))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"title\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "invalid input validation");

    assert!(state.todos.find_all().await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_find_all_empty() {
    let state = memory_state();
    let auth = bearer(&state);
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/find_all_todolist")
        .insert_header(("Authorization", auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["more"], 0);
    assert_eq!(body["data"], json!([]));
}

#[actix_web::test]
async fn test_find_by_id_unknown_and_non_numeric() {
    let state = memory_state();
    let auth = bearer(&state);
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/find_by_id_todolist/999")
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": 404, "message": "todolist by id not found"}));

    let req = test::TestRequest::get()
        .uri("/api/find_by_id_todolist/abc")
        .insert_header(("Authorization", auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_update_unknown_id_is_not_found() {
    let state = memory_state();
    let auth = bearer(&state);
    let app = init_app!(state.clone());

    let req = test::TestRequest::put()
        .uri("/api/update_todolist/7")
        .insert_header(("Authorization", auth))
        .set_json(json!({"title": "New title", "description": "", "status": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "todolist by id not found");

    assert!(state.todos.find_all().await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_update_keeps_omitted_fields() {
    let state = memory_state();
    let auth = bearer(&state);
    let todo = state.todos.create("Buy milk", "2 liters").await.unwrap();
    let app = init_app!(state.clone());

    let req = test::TestRequest::put()
        .uri(&format!("/api/update_todolist/{}", todo.id))
        .insert_header(("Authorization", auth))
        .set_json(json!({"description": "3 liters", "status": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "update todolist successfully");
    assert_eq!(body["data"]["description"], "3 liters");

    let stored = state.todos.find_by_id(todo.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Buy milk");
    assert_eq!(stored.description, "3 liters");
    assert!(stored.status);
}

#[actix_web::test]
async fn test_update_rejects_short_title() {
    let state = memory_state();
    let auth = bearer(&state);
    let todo = state.todos.create("Buy milk", "2 liters").await.unwrap();
    let app = init_app!(state.clone());

    let req = test::TestRequest::put()
        .uri(&format!("/api/update_todolist/{}", todo.id))
        .insert_header(("Authorization", auth))
        .set_json(json!({"title": "X", "status": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let stored = state.todos.find_by_id(todo.id).await.unwrap().unwrap();
    assert_eq!(stored, todo);
}

#[actix_web::test]
async fn test_delete_unknown_and_repeated() {
    let state = memory_state();
    let auth = bearer(&state);
    let todo = state.todos.create("Buy milk", "2 liters").await.unwrap();
    let app = init_app!(state);

    let delete = |id: i64| {
        test::TestRequest::delete()
            .uri(&format!("/api/delete_todolist/{id}"))
            .insert_header(("Authorization", auth.clone()))
            .to_request()
    };

    let resp = test::call_service(&app, delete(todo.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": 200, "message": "delete todolist successfully"}));

    for _ in 0..2 {
        let resp = test::call_service(&app, delete(todo.id)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "id not found");
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/find_by_id_todolist/{}", todo.id))
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_todo_round_trip() {
    let state = memory_state();
    let auth = bearer(&state);
    let app = init_app!(state);

    for (title, description) in [("First", "first item"), ("Second", "second item")] {
        let req = test::TestRequest::post()
            .uri("/api/create_todolist")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({"title": title, "description": description}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::put()
        .uri("/api/update_todolist/2")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({"title": "Second!", "status": true}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/find_all_todolist")
        .insert_header(("Authorization", auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["more"], 2);
    assert_eq!(body["data"][0]["id"], 1);
    assert_eq!(body["data"][0]["status"], false);
    assert_eq!(body["data"][1]["title"], "Second!");
    assert_eq!(body["data"][1]["description"], "second item");
    assert_eq!(body["data"][1]["status"], true);
}

// ---------------------------------------------------------------------------
// Register / login
// ---------------------------------------------------------------------------

fn register_alice() -> test::TestRequest {
    test::TestRequest::post().uri("/register").set_json(json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": "wonderland"
    }))
}

#[actix_web::test]
async fn test_register_and_duplicate() {
    let app = init_app!(memory_state());

    let resp = test::call_service(&app, register_alice().to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "username": "alice2",
            "email": "alice@example.com",
            "password": "other"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": 409, "message": "user already exists"}));
}

#[actix_web::test]
async fn test_register_missing_username() {
    let app = init_app!(memory_state());

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({"email": "bob@example.com", "password": "builder"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "username is required");
}

#[actix_web::test]
async fn test_login_failures_look_alike() {
    let app = init_app!(memory_state());
    let resp = test::call_service(&app, register_alice().to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let mut bodies = Vec::new();
    for (email, password) in [
        ("alice@example.com", "not-the-password"),
        ("nobody@example.com", "wonderland"),
    ] {
        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"email": email, "password": password}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        bodies.push(body);
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0]["message"], "Invalid credentials");
}

#[actix_web::test]
async fn test_login_issues_usable_token() {
    let state = memory_state();
    let app = init_app!(state.clone());
    let resp = test::call_service(&app, register_alice().to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"email": "alice@example.com", "password": "wonderland"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "hello alice! you are now logged in");

    let token = body["token"].as_str().unwrap();
    let claims = state.tokens.validate_token(token).unwrap();
    assert_eq!(claims.subject, "alice@example.com");

    let req = test::TestRequest::get()
        .uri("/api/find_all_todolist")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_login_short_credentials() {
    let app = init_app!(memory_state());

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"email": "a", "password": "wonderland"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Auth gate
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn test_gate_rejections() {
    let state = memory_state();
    let app = init_app!(state.clone());

    let req = test::TestRequest::get()
        .uri("/api/find_all_todolist")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Authorization token not provided");

    let req = test::TestRequest::get()
        .uri("/api/find_all_todolist")
        .insert_header(("Authorization", "Bearer garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "invalid or expired token");

    let foreign = tokens("someone-else")
        .generate_token("mallory@example.com", "mallory")
        .unwrap();
    let req = test::TestRequest::post()
        .uri("/api/create_todolist")
        .insert_header(("Authorization", format!("Bearer {foreign}")))
        .set_json(json!({"title": "Sneaky", "description": "should not land"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert!(state.todos.find_all().await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_static_key_gate() {
    let app = init_app!(memory_state(), AuthGate::StaticKey(Arc::from("secret_lock")));

    let req = test::TestRequest::get()
        .uri("/api/find_all_todolist")
        .insert_header(("Authorization", "secret_lock"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/find_all_todolist")
        .insert_header(("Authorization", "wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": 401, "message": "unauthorized"}));
}

#[actix_web::test]
async fn test_public_routes_skip_gate() {
    let app = init_app!(memory_state(), AuthGate::StaticKey(Arc::from("secret_lock")));

    let resp = test::call_service(&app, register_alice().to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Storage failures
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn test_storage_failures_are_500() {
    let state = failing_state();
    let auth = bearer(&state);
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/find_all_todolist")
        .insert_header(("Authorization", auth.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "connection reset");

    let req = test::TestRequest::post()
        .uri("/api/create_todolist")
        .insert_header(("Authorization", auth))
        .set_json(json!({"title": "Buy milk", "description": "2 liters"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "internal server error");

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({"username": "bob", "email": "bob@example.com", "password": "pw"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "failed to create user");
}

#[actix_web::test]
async fn test_lookup_failures_are_500() {
    let state = failing_state();
    let auth = bearer(&state);
    let app = init_app!(state);

    let requests = [
        test::TestRequest::get().uri("/api/find_by_id_todolist/1"),
        test::TestRequest::put()
            .uri("/api/update_todolist/1")
            .set_json(json!({"title": "New title", "status": true})),
        test::TestRequest::delete().uri("/api/delete_todolist/1"),
    ];
    for req in requests {
        let req = req.insert_header(("Authorization", auth.clone())).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"status": 500, "message": "connection reset"}));
    }

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"email": "alice@example.com", "password": "wonderland"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "an error occurred");
}

// ---------------------------------------------------------------------------
// Edge cases
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn test_update_with_no_rows_changed() {
    let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
    let state = AppState::new(Arc::new(StaleRepository), passwords, tokens(SECRET));
    let auth = bearer(&state);
    let app = init_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/update_todolist/3")
        .insert_header(("Authorization", auth))
        .set_json(json!({"title": "New title", "status": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": 200, "message": "not change"}));
}

#[actix_web::test]
async fn test_update_and_delete_non_numeric_id() {
    let state = memory_state();
    let auth = bearer(&state);
    let app = init_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/update_todolist/abc")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({"title": "New title", "status": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "invalid digit found in string");

    let req = test::TestRequest::delete()
        .uri("/api/delete_todolist/abc")
        .insert_header(("Authorization", auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "invalid digit found in string");
}

#[actix_web::test]
async fn test_update_reports_body_error_before_id() {
    let state = memory_state();
    let auth = bearer(&state);
    let app = init_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/update_todolist/abc")
        .insert_header(("Authorization", auth))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"status\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_ne!(body["message"], "invalid digit found in string");
}

#[actix_web::test]
async fn test_login_one_character_password() {
    let app = init_app!(memory_state());

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"email": "alice@example.com", "password": "w"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "email and password must be at least 2 characters long"
    );
}
