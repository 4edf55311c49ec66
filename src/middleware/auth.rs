use std::future::{ready, Ready};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;

use crate::{
    config::Config,
    error::AppError,
    models::role::Role,
    utils::jwt::{validate_token, SignedDetails, TokenKind},
};

/// Validates the bearer token and stores its claims in the request
/// extensions.
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthenticationMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationMiddleware { service }))
    }
}

pub struct AuthenticationMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                let res = req.error_response(err).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}

fn authenticate(req: &ServiceRequest) -> Result<SignedDetails, AppError> {
    let config = req
        .app_data::<web::Data<Config>>()
        .ok_or_else(|| AppError::Internal(String::from("configuration is not registered")))?;
    claims_from_headers(req.headers(), config)
}

/// Reads and validates the access token in the `Authorization` header.
pub fn claims_from_headers(
    headers: &HeaderMap,
    config: &Config,
) -> Result<SignedDetails, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized(String::from("No authorization header")))?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();

    let claims = validate_token(token, &config.secret_key).map_err(|e| {
        log::debug!("Rejected token: {e}");
        AppError::Unauthorized(String::from("invalid token"))
    })?;
    if claims.kind != TokenKind::Access {
        log::debug!("Rejected {:?} token for {}", claims.kind, claims.user_id);
        return Err(AppError::Unauthorized(String::from("invalid token")));
    }
    Ok(claims)
}

/// Restricts a route to the listed roles. Must run inside `Authentication`.
pub struct CheckRole {
    allowed: &'static [Role],
}

impl CheckRole {
    pub fn new(allowed: &'static [Role]) -> Self {
        CheckRole { allowed }
    }

    pub fn admin() -> Self {
        CheckRole::new(&[Role::Admin])
    }
}

impl<S, B> Transform<S, ServiceRequest> for CheckRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = CheckRoleMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CheckRoleMiddleware {
            service,
            allowed: self.allowed,
        }))
    }
}

pub struct CheckRoleMiddleware<S> {
    service: S,
    allowed: &'static [Role],
}

impl<S, B> Service<ServiceRequest> for CheckRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let is_allowed = req
            .extensions()
            .get::<SignedDetails>()
            .map(|claims| self.allowed.contains(&claims.role))
            .unwrap_or(false);

        if !is_allowed {
            let res = req
                .error_response(AppError::Unauthorized(String::from("unauthorized")))
                .map_into_right_body();
            return Box::pin(async move { Ok(res) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

/// Claims of the caller, available on routes wrapped by `Authentication`.
pub struct AuthUser(pub SignedDetails);

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.0.role == Role::Admin
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<SignedDetails>().cloned();
        ready(
            claims
                .map(AuthUser)
                .ok_or_else(|| AppError::Unauthorized(String::from("unauthorized"))),
        )
    }
}
