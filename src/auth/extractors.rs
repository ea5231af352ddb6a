use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::context::AuthenticatedContext;
use crate::error::AppError;
use crate::models::Principal;

/// The caller's identity, for handlers that require one.
///
/// Reads the `AuthenticatedContext` bound by `AuthMiddleware`. When the request
/// is anonymous (no token, bad token, unknown user) extraction fails with
/// `AppError::Unauthorized`, which is the only place a missing identity turns
/// into a 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedContext);

impl CurrentUser {
    pub fn principal(&self) -> &Principal {
        self.0.principal()
    }

    pub fn id(&self) -> i64 {
        self.0.principal().id
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedContext>().cloned() {
            Some(context) => ready(Ok(CurrentUser(context))),
            None => {
                let err = AppError::Unauthorized("Authentication required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
