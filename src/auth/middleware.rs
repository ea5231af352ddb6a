use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use chrono::Utc;
use futures::future::{ready, LocalBoxFuture, Ready};
use log::{debug, error, warn};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::context::AuthenticatedContext;
use crate::auth::identity::IdentityResolver;
use crate::auth::token::TokenCodec;
use crate::models::Principal;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a request continues without an identity. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anonymous {
    /// The path is under the public prefix; authentication was skipped.
    PublicPath,
    /// No `Authorization` header, or not a `Bearer` credential.
    NoCredential,
    /// The token failed verification or is expired.
    InvalidToken,
    /// The token verified but carries no usable subject.
    NoSubject,
    /// No user matches the token subject.
    IdentityNotFound,
    /// The user store could not be queried.
    StoreUnavailable,
}

impl fmt::Display for Anonymous {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Anonymous::PublicPath => "public path",
            Anonymous::NoCredential => "no bearer credential",
            Anonymous::InvalidToken => "invalid token",
            Anonymous::NoSubject => "token has no subject",
            Anonymous::IdentityNotFound => "identity not found",
            Anonymous::StoreUnavailable => "user store unavailable",
        };
        f.write_str(reason)
    }
}

/// Decides who, if anyone, a request is acting as.
///
/// Holds only shared read-only state (the codec and the user store handle), so a
/// single instance serves every worker.
pub struct Authenticator {
    codec: Arc<TokenCodec>,
    resolver: IdentityResolver,
    public_prefix: String,
}

impl Authenticator {
    pub fn new(
        codec: Arc<TokenCodec>,
        resolver: IdentityResolver,
        public_prefix: impl Into<String>,
    ) -> Self {
        Self {
            codec,
            resolver,
            public_prefix: public_prefix.into(),
        }
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Runs bypass, extraction, verification, subject extraction and identity
    /// resolution for one request. Never fails: every problem becomes an
    /// `Anonymous` reason.
    pub async fn authenticate(
        &self,
        path: &str,
        authorization: Option<&str>,
    ) -> Result<Principal, Anonymous> {
        if path.starts_with(&self.public_prefix) {
            return Err(Anonymous::PublicPath);
        }

        let token = authorization
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .ok_or(Anonymous::NoCredential)?;
        debug!("bearer token present ({} chars)", token.len());

        // Same outcome as `is_valid` then `extract_subject`, from one decode.
        let claims = self
            .codec
            .verify_at(token, Utc::now().timestamp())
            .map_err(|e| {
                warn!("continuing without identity, token unusable: {}", e);
                Anonymous::InvalidToken
            })?;

        let subject = claims.sub;
        if subject.trim().is_empty() {
            warn!("bearer token has a blank subject");
            return Err(Anonymous::NoSubject);
        }

        match self.resolver.resolve(&subject).await {
            Ok(Some(principal)) => Ok(principal),
            Ok(None) => {
                warn!("no user for token subject '{}'", subject);
                Err(Anonymous::IdentityNotFound)
            }
            Err(e) => {
                error!("identity lookup failed for '{}': {}", subject, e);
                Err(Anonymous::StoreUnavailable)
            }
        }
    }
}

/// Marks a request whose authentication pass has already run.
#[derive(Debug, Clone, Copy)]
struct AuthPass;

/// Binds an `AuthenticatedContext` to each request that presents a valid
/// bearer token for a known user.
///
/// Never rejects a request: anonymous requests are forwarded unchanged and
/// protected handlers enforce identity through the `CurrentUser` extractor.
pub struct AuthMiddleware {
    authenticator: Arc<Authenticator>,
}

impl AuthMiddleware {
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self { authenticator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            authenticator: Arc::clone(&self.authenticator),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    authenticator: Arc<Authenticator>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let authenticator = Arc::clone(&self.authenticator);

        Box::pin(async move {
            if req.extensions().get::<AuthPass>().is_some() {
                return service.call(req).await;
            }
            req.extensions_mut().insert(AuthPass);

            let path = req.path().to_owned();
            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            match authenticator
                .authenticate(&path, authorization.as_deref())
                .await
            {
                Ok(principal) => bind_context(&req, principal),
                Err(reason) => debug!("continuing anonymously for {}: {}", path, reason),
            }

            service.call(req).await
        })
    }
}

fn bind_context(req: &ServiceRequest, principal: Principal) {
    let mut extensions = req.extensions_mut();
    if extensions.get::<AuthenticatedContext>().is_some() {
        debug!("request already authenticated; keeping existing context");
        return;
    }
    debug!("authenticated request for {}", principal.email);
    extensions.insert(AuthenticatedContext::new(principal));
}
