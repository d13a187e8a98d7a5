//! Bearer-token verification.
//!
//! Tokens are minted by the auth service; here they are only checked. The
//! middleware stores the token subject in the request extensions and
//! [`current_actor`] turns it into a live user record.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http, Error, HttpMessage, HttpRequest, ResponseError,
};
use futures::future::{ok, Ready};
use jsonwebtoken::{decode, DecodingKey, Validation};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::User;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Subject of a verified token, placed in the request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

pub fn verify_token(token: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(token_data.claims.sub)
}

/// Rejects requests carrying an invalid bearer token. Requests without one
/// pass through; handlers refuse them when they look for an actor.
#[derive(Debug, Clone)]
pub struct Authentication {
    secret: Rc<String>,
}

impl Authentication {
    pub fn new(secret: impl Into<String>) -> Self {
        Authentication {
            secret: Rc::new(secret.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = AuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddleware {
            service,
            secret: self.secret.clone(),
        })
    }
}

pub struct AuthMiddleware<S> {
    service: S,
    secret: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let bearer = req
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string());

        if let Some(token) = bearer {
            match verify_token(&token, &self.secret) {
                Ok(user_id) => {
                    req.extensions_mut().insert(AuthenticatedUser(user_id));
                }
                Err(e) => {
                    debug!("Rejected bearer token: {}", e);
                    let resp = AppError::Unauthorized("Not authorized, token failed".into())
                        .error_response();
                    let (req_parts, _payload) = req.into_parts();
                    let srv_resp = ServiceResponse::new(req_parts, resp);
                    return Box::pin(async move { Ok(srv_resp) });
                }
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_boxed_body())
        })
    }
}

/// Resolve the caller. Missing tokens and unknown or deactivated accounts
/// are both unauthorized.
pub async fn current_actor(req: &HttpRequest, state: &AppState) -> AppResult<User> {
    let user_id = req
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.0.clone())
        .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".into()))?;

    match state.users.get(&user_id).await? {
        Some(user) if user.is_active => Ok(user),
        _ => Err(AppError::Unauthorized("User not found or inactive".into())),
    }
}
