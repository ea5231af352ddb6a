use crate::{auth::CurrentUser, error::AppError, models::ProfileUpdate, state::AppState};
use actix_web::{get, put, web, HttpResponse, Responder};
use log::info;
use validator::Validate;

/// Returns the caller's profile.
///
/// ## Responses:
/// - `200 OK`: `{id, name, email, created_at}`.
/// - `401 Unauthorized`: no authenticated identity.
/// - `404 Not Found`: the account disappeared after the request was authenticated.
#[get("/me")]
pub async fn get_profile(
    state: web::Data<AppState>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let user = state
        .users
        .find_by_id(current_user.id())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(user))
}

/// Updates the caller's display name.
#[put("/me")]
pub async fn update_profile(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    profile_data: web::Json<ProfileUpdate>,
) -> Result<impl Responder, AppError> {
    let mut profile_data = profile_data.into_inner();
    profile_data.name = profile_data.name.trim().to_string();
    profile_data.validate()?;

    let user = state
        .users
        .update_name(current_user.id(), &profile_data.name)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    info!("user {} updated their profile", user.id);

    Ok(HttpResponse::Ok().json(user))
}
