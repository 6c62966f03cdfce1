//! Auth gate middleware and the identity extractor.

use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{self, HeaderValue},
};
use futures::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::sync::Arc;

use todolist_core::ports::{AuthError, TokenClaims, TokenService};

use crate::config::GateMode;
use crate::middleware::error::AppError;

const INVALID_TOKEN: &str = "invalid or expired token";
const UNAUTHORIZED: &str = "unauthorized";

/// Identity of the caller, attached to the request by the bearer gate.
///
/// Use this in handlers that need the caller:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub email: String,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            email: claims.subject,
            username: claims.username,
        }
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Identity>()
                .cloned()
                .ok_or_else(|| AppError::Unauthorized(UNAUTHORIZED.to_string())),
        )
    }
}

/// The check run before every protected handler.
#[derive(Clone)]
pub enum AuthGate {
    /// Signed token after a `Bearer ` prefix.
    Bearer(Arc<dyn TokenService>),
    /// Header must equal a fixed shared secret.
    StaticKey(Arc<str>),
}

impl AuthGate {
    pub fn new(mode: &GateMode, tokens: Arc<dyn TokenService>) -> Self {
        match mode {
            GateMode::Jwt => AuthGate::Bearer(tokens),
            GateMode::StaticKey(key) => AuthGate::StaticKey(Arc::from(key.as_str())),
        }
    }

    /// Decide on an `Authorization` header value. The bearer gate yields the
    /// caller's identity; the static gate has none to give.
    pub fn authenticate(&self, header: Option<&HeaderValue>) -> Result<Option<Identity>, AppError> {
        match self {
            AuthGate::StaticKey(key) => match header {
                Some(value) if value.as_bytes() == key.as_bytes() => Ok(None),
                _ => Err(AppError::Unauthorized(UNAUTHORIZED.to_string())),
            },
            AuthGate::Bearer(tokens) => {
                // An empty header counts as absent.
                let value = header.filter(|v| !v.is_empty()).ok_or_else(|| {
                    AppError::Unauthorized(AuthError::MissingAuth.to_string())
                })?;

                let token = value
                    .to_str()
                    .ok()
                    .and_then(|s| s.strip_prefix("Bearer "))
                    .ok_or_else(|| AppError::BadRequest(INVALID_TOKEN.to_string()))?;

                match tokens.validate_token(token) {
                    Ok(claims) => Ok(Some(Identity::from(claims))),
                    Err(AuthError::InvalidSignature) => {
                        Err(AppError::Unauthorized(UNAUTHORIZED.to_string()))
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Token rejected");
                        Err(AppError::BadRequest(INVALID_TOKEN.to_string()))
                    }
                }
            }
        }
    }
}

/// Middleware factory that applies an [`AuthGate`] to a scope.
pub struct AuthMiddleware {
    gate: AuthGate,
}

impl AuthMiddleware {
    pub fn new(gate: AuthGate) -> Self {
        Self { gate }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            gate: self.gate.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    gate: AuthGate,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.gate.authenticate(req.headers().get(header::AUTHORIZATION)) {
            Ok(identity) => {
                if let Some(identity) = identity {
                    req.extensions_mut().insert(identity);
                }

                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(err) => {
                tracing::warn!(path = %req.path(), reason = %err, "Request rejected by auth gate");

                let response = err.error_response();
                let (http_req, _payload) = req.into_parts();
                let srv_response = ServiceResponse::new(http_req, response);
                Box::pin(async move { Ok(srv_response.map_into_right_body()) })
            }
        }
    }
}
