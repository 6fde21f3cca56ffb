use crate::auth::auth::{AuthUser, bearer_token};
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::utils::token_denylist::TokenDenylist;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use tracing::debug;

fn reject(req: ServiceRequest, err: AppError) -> Result<ServiceResponse<BoxBody>, Error> {
    debug!(path = %req.path(), reason = %err, "Request rejected by auth middleware");
    Ok(req.into_response(err.error_response()))
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;
    let denylist = req
        .app_data::<Data<TokenDenylist>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Token denylist missing"))?;

    let claims = match bearer_token(req.headers()).map(|t| verify_token(t, &config.jwt_secret)) {
        Some(Ok(claims)) => claims,
        Some(Err(e)) => {
            debug!(error = %e, "Token verification failed");
            return reject(req, AppError::Forbidden("Invalid token"));
        }
        None => return reject(req, AppError::Unauthorized("Unauthorized")),
    };

    if denylist.is_revoked(&claims.jti) {
        return reject(req, AppError::Unauthorized("Token has been revoked"));
    }

    req.extensions_mut().insert(AuthUser::from(claims));

    next.call(req).await
}
