use crate::{
    auth::{
        auth::bearer_token,
        jwt::{generate_access_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    error::AppError,
    model::user::User,
    models::{LoginReqDto, LoginResponse, MessageResponse},
    store::RecordStore,
    utils::token_denylist::TokenDenylist,
};
use actix_web::{HttpRequest, HttpResponse, web};
use once_cell::sync::Lazy;
use tracing::{debug, error, info, instrument};

// Verified against when the username is unknown, so both paths cost one
// argon2 verification.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_password("attendance-dummy-password").unwrap_or_default());

/// Looks the user up by name and checks the password against its stored hash.
pub fn authenticate(store: &dyn RecordStore, username: &str, password: &str) -> Option<User> {
    let Some(user) = store.load().users.into_iter().find(|u| u.username == username) else {
        let _ = verify_password(password, &DUMMY_HASH);
        debug!("User not found");
        return None;
    };

    match verify_password(password, &user.password) {
        Ok(()) => Some(user),
        Err(e) => {
            debug!(user_id = user.id, error = %e, "Password mismatch");
            None
        }
    }
}

/// Log in
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Username or password missing", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse, example = json!({
            "message": "Invalid credentials"
        }))
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<dyn RecordStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    let LoginReqDto { username, password } = user.into_inner();
    if username.trim().is_empty() || password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(AppError::BadRequest("Username or password required".into()));
    }

    let store = store.into_inner();
    let user = web::block(move || authenticate(store.as_ref(), &username, &password)).await?;

    let Some(user) = user else {
        info!("Invalid credentials");
        return Err(AppError::InvalidCredentials);
    };

    let token = generate_access_token(&user, &config.jwt_secret, config.access_token_ttl)
        .map_err(|e| {
            error!(error = %e, "Failed to sign access token");
            AppError::Internal
        })?;

    info!(user_id = user.id, role = %user.role, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        role: user.role,
        username: user.username,
        id: user.id,
    }))
}

/// Log out
///
/// Revokes the presented token until it would have expired.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 400, description = "No token provided", body = MessageResponse),
        (status = 401, description = "Invalid token", body = MessageResponse)
    ),
    tag = "Auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    req: HttpRequest,
    config: web::Data<Config>,
    denylist: web::Data<TokenDenylist>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::BadRequest("No token provided".into()))?;

    let claims = verify_token(token, &config.jwt_secret).map_err(|e| {
        info!(error = %e, "Logout with invalid token");
        AppError::Unauthorized("Invalid token")
    })?;

    denylist.revoke(&claims.jti).await;
    info!(user_id = claims.id, "Logout successful");

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Logout successful".into(),
    }))
}
