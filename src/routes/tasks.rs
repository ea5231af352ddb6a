use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{Task, TaskInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::info;
use uuid::Uuid;
use validator::Validate;

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Loads a task only if `user_id` owns it. Foreign tasks look missing.
async fn find_owned(state: &AppState, task_id: Uuid, user_id: i64) -> Result<Task, AppError> {
    state
        .tasks
        .find(task_id)
        .await?
        .filter(|task| task.user_id == user_id)
        .ok_or_else(task_not_found)
}

/// Retrieves the authenticated user's tasks, newest first.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `401 Unauthorized`: no authenticated identity.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list_for_user(current_user.id()).await?;
    info!(
        "returning {} tasks for {}",
        tasks.len(),
        current_user.principal().email
    );

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: 1 to 200 characters (required).
/// - `description` (optional): up to 1000 characters.
/// - `completed` (optional): defaults to `false`.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `401 Unauthorized`: no authenticated identity.
/// - `422 Unprocessable Entity`: validation failed.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), current_user.id());
    let task = state.tasks.create(task).await?;
    info!("created task {} for user {}", task.id, task.user_id);

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `404 Not Found`: no such task, or the caller does not own it.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = find_owned(&state, task_id.into_inner(), current_user.id()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates title, description and (when given) the completed flag.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `404 Not Found`: no such task, or the caller does not own it.
/// - `422 Unprocessable Entity`: validation failed.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let mut task = find_owned(&state, task_id.into_inner(), current_user.id()).await?;
    task.apply(task_data.into_inner());

    let task = state
        .tasks
        .update(task)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task the caller owns.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `404 Not Found`: no such task, or the caller does not own it.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();

    if !state.tasks.delete(task_id, current_user.id()).await? {
        return Err(task_not_found());
    }
    info!("deleted task {} for user {}", task_id, current_user.id());

    Ok(HttpResponse::NoContent().finish())
}
