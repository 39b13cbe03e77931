use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{Todo, TodoInput, TodoPatch},
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Parses a todo id from its path segment.
///
/// A malformed id is reported the same way as a missing record (404), so the
/// response shape never hints at which part of the lookup failed.
fn parse_todo_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Todo not found".into()))
}

/// Lists the authenticated user's todos.
///
/// Only todos created by the requesting user are returned, newest first.
///
/// ## Responses:
/// - `200 OK`: `{"todos": [...]}`.
/// - `401 Unauthorized`: If the request lacks a valid session token.
#[get("")]
pub async fn get_todos(
    pool: web::Data<PgPool>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    let todos = sqlx::query_as::<_, Todo>(
        "SELECT id, text, completed, completed_at, creator_id, created_at
         FROM todos WHERE creator_id = $1
         ORDER BY created_at DESC",
    )
    .bind(current.user.id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(json!({ "todos": todos })))
}

/// Creates a new todo owned by the authenticated user.
///
/// ## Request Body:
/// - `text`: The todo's text. Trimmed; at least 2 characters after trimming.
///
/// ## Responses:
/// - `200 OK`: Returns the created todo.
/// - `400 Bad Request`: If the text is missing or too short.
/// - `401 Unauthorized`: If the request lacks a valid session token.
#[post("")]
pub async fn create_todo(
    pool: web::Data<PgPool>,
    todo_data: web::Json<TodoInput>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    let todo = Todo::new(todo_data.into_inner(), current.user.id);

    let result = sqlx::query_as::<_, Todo>(
        "INSERT INTO todos (id, text, completed, completed_at, creator_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, text, completed, completed_at, creator_id, created_at",
    )
    .bind(todo.id)
    .bind(todo.text)
    .bind(todo.completed)
    .bind(todo.completed_at)
    .bind(todo.creator_id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Retrieves one of the authenticated user's todos by id.
///
/// The lookup filters by id and creator in the same statement: a todo that
/// exists but belongs to another user is indistinguishable from one that
/// does not exist.
///
/// ## Responses:
/// - `200 OK`: `{"todo": ...}`.
/// - `401 Unauthorized`: If the request lacks a valid session token.
/// - `404 Not Found`: Missing, malformed id, or owned by someone else.
#[get("/{id}")]
pub async fn get_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<String>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    let todo_uuid = parse_todo_id(&todo_id)?;

    let todo = sqlx::query_as::<_, Todo>(
        "SELECT id, text, completed, completed_at, creator_id, created_at
         FROM todos WHERE id = $1 AND creator_id = $2",
    )
    .bind(todo_uuid)
    .bind(current.user.id)
    .fetch_optional(&**pool)
    .await?;

    match todo {
        Some(todo) => Ok(HttpResponse::Ok().json(json!({ "todo": todo }))),
        None => Err(AppError::NotFound("Todo not found".into())),
    }
}

/// Updates one of the authenticated user's todos.
///
/// ## Request Body:
/// - `text` (optional): Replacement text, trimmed and re-validated.
/// - `completed` (optional): Setting `true` stamps `completed_at` with the
///   current time in epoch milliseconds. Anything else (including omitting
///   the field) resets `completed` to false and clears `completed_at`.
///
/// ## Responses:
/// - `200 OK`: `{"todo": ...}` with the updated record.
/// - `400 Bad Request`: If the replacement text is too short.
/// - `401 Unauthorized`: If the request lacks a valid session token.
/// - `404 Not Found`: Missing, malformed id, or owned by someone else.
#[patch("/{id}")]
pub async fn patch_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<String>,
    patch_data: web::Json<TodoPatch>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    patch_data.validate()?;
    let todo_uuid = parse_todo_id(&todo_id)?;

    let (completed, completed_at) = patch_data.completion();
    let text = patch_data.text.as_deref().map(str::trim);

    let todo = sqlx::query_as::<_, Todo>(
        "UPDATE todos
         SET text = COALESCE($1, text), completed = $2, completed_at = $3
         WHERE id = $4 AND creator_id = $5
         RETURNING id, text, completed, completed_at, creator_id, created_at",
    )
    .bind(text)
    .bind(completed)
    .bind(completed_at)
    .bind(todo_uuid)
    .bind(current.user.id)
    .fetch_optional(&**pool)
    .await?;

    match todo {
        Some(todo) => Ok(HttpResponse::Ok().json(json!({ "todo": todo }))),
        None => Err(AppError::NotFound("Todo not found".into())),
    }
}

/// Deletes one of the authenticated user's todos.
///
/// ## Responses:
/// - `200 OK`: `{"todo": ...}` with the deleted record.
/// - `401 Unauthorized`: If the request lacks a valid session token.
/// - `404 Not Found`: Missing, malformed id, or owned by someone else.
#[delete("/{id}")]
pub async fn delete_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<String>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    let todo_uuid = parse_todo_id(&todo_id)?;

    let todo = sqlx::query_as::<_, Todo>(
        "DELETE FROM todos WHERE id = $1 AND creator_id = $2
         RETURNING id, text, completed, completed_at, creator_id, created_at",
    )
    .bind(todo_uuid)
    .bind(current.user.id)
    .fetch_optional(&**pool)
    .await?;

    match todo {
        Some(todo) => Ok(HttpResponse::Ok().json(json!({ "todo": todo }))),
        None => Err(AppError::NotFound("Todo not found".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_todo_id_rejects_garbage_as_not_found() {
        match parse_todo_id("123") {
            Err(AppError::NotFound(_)) => {}
            other => panic!("Expected NotFound for malformed id, got {:?}", other),
        }

        assert!(parse_todo_id("b5f1f1c0-0000-4000-8000-000000000000").is_ok());
    }
}
