//! Todo CRUD handlers.

use actix_web::{HttpResponse, web};

use todolist_shared::dto::{CreateTodoRequest, UpdateTodoRequest};
use todolist_shared::{DataResponse, ListResponse, MessageResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const TODO_NOT_FOUND: &str = "todolist by id not found";

fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse().map_err(|e: std::num::ParseIntError| {
        tracing::error!(id = %raw, error = %e, "Invalid todolist id");
        AppError::BadRequest(e.to_string())
    })
}

/// POST /api/create_todolist
pub async fn create(
    state: web::Data<AppState>,
    identity: Option<Identity>,
    body: web::Json<CreateTodoRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let todo = state
        .todos
        .create(&req.title, &req.description)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create todolist");
            AppError::Internal("internal server error".to_string())
        })?;

    tracing::info!(
        todo_id = todo.id,
        created_by = identity.as_ref().map(|i| i.username.as_str()),
        created_by_email = identity.as_ref().map(|i| i.email.as_str()),
        "create todolist successfully"
    );
    Ok(HttpResponse::Created().json(DataResponse::new(
        201,
        "create todolist successfully",
        todo,
    )))
}

/// GET /api/find_all_todolist
pub async fn find_all(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let todos = state.todos.find_all().await?;

    tracing::info!(count = todos.len(), "get all todolist successfully");
    Ok(HttpResponse::Ok().json(ListResponse::new(
        200,
        "get all todolist successfully",
        todos,
    )))
}

/// GET /api/find_by_id_todolist/{id}
pub async fn find_by_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    let todo = state.todos.find_by_id(id).await?.ok_or_else(|| {
        tracing::error!(todo_id = id, "{}", TODO_NOT_FOUND);
        AppError::NotFound(TODO_NOT_FOUND.to_string())
    })?;

    tracing::info!(todo_id = id, "get todolist by id successfully");
    Ok(HttpResponse::Ok().json(DataResponse::new(
        200,
        "get todolist by id successfully",
        todo,
    )))
}

/// PUT /api/update_todolist/{id}
///
/// The body is extracted before the id is parsed, so a request with both a
/// malformed body and a non-numeric id reports the body error.
///
/// Looks the row up before writing so a missing id is a 404. The check and the
/// write are separate statements; a concurrent delete between them shows up as
/// zero affected rows.
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateTodoRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let req = body.into_inner();
    req.validate()?;

    if state.todos.find_by_id(id).await?.is_none() {
        tracing::error!(todo_id = id, "{}", TODO_NOT_FOUND);
        return Err(AppError::NotFound(TODO_NOT_FOUND.to_string()));
    }

    let affected = state.todos.update(id, req.changes()).await?;
    if affected == 0 {
        tracing::info!(todo_id = id, "update todolist changed no rows");
        return Ok(HttpResponse::Ok().json(MessageResponse::new(200, "not change")));
    }

    tracing::info!(todo_id = id, "update todolist successfully");
    Ok(HttpResponse::Ok().json(DataResponse::new(
        200,
        "update todolist successfully",
        req,
    )))
}

/// DELETE /api/delete_todolist/{id}
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    if state.todos.delete(id).await? == 0 {
        tracing::error!(todo_id = id, "id not found");
        return Err(AppError::NotFound("id not found".to_string()));
    }

    tracing::info!(todo_id = id, "delete todolist successfully");
    Ok(HttpResponse::Ok().json(MessageResponse::new(
        200,
        "delete todolist successfully",
    )))
}
