use crate::{
    auth::{
        hash_password, normalize_email, verify_password, AuthResponse, LoginRequest,
        SignupRequest,
    },
    error::AppError,
    models::NewUser,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use log::{info, warn};
use validator::Validate;

/// Register a new user
///
/// Creates a new account and returns a bearer token for it. The email is
/// trimmed and lowercased before it is stored or signed.
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    signup_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    let mut signup_data = signup_data.into_inner();
    signup_data.normalize();
    signup_data.validate()?;

    if state.users.find_by_email(&signup_data.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = hash_password(&signup_data.password, state.bcrypt_cost)?;

    let user = state
        .users
        .create(NewUser {
            name: signup_data.name,
            email: signup_data.email,
            password_hash,
        })
        .await?;

    let token = state.tokens.issue(&user.email)?;
    info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

/// Login user
///
/// Checks the password against the stored hash and returns a fresh token.
/// Unknown emails and wrong passwords get the same 401.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let mut login_data = login_data.into_inner();
    login_data.email = normalize_email(&login_data.email);
    login_data.validate()?;

    let user = state.users.find_by_email(&login_data.email).await?;

    match user {
        Some(user) => {
            if verify_password(&login_data.password, &user.password_hash)? {
                let token = state.tokens.issue(&user.email)?;
                info!("user {} logged in", user.id);
                Ok(HttpResponse::Ok().json(AuthResponse {
                    token,
                    user_id: user.id,
                }))
            } else {
                warn!("failed login for user {}", user.id);
                Err(AppError::Unauthorized("Invalid credentials".into()))
            }
        }
        None => Err(AppError::Unauthorized("Invalid credentials".into())),
    }
}
