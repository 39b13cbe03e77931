use crate::{
    auth::{CurrentUser, LoginRequest, SignupRequest, AUTH_HEADER},
    directory::UserDirectory,
    error::AppError,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Sign up a new user
///
/// Creates an account, opens a session, and returns the session token in the
/// `x-auth` response header alongside the user body. Failed validation and
/// duplicate emails both return 400.
#[post("/users")]
pub async fn signup(
    directory: web::Data<UserDirectory>,
    signup_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    signup_data.validate()?;

    let user = directory
        .create(&signup_data.email, &signup_data.password)
        .await?;
    let token = directory.open_session(user.id).await?;

    Ok(HttpResponse::Ok()
        .insert_header((AUTH_HEADER, token))
        .json(user))
}

/// Log in an existing user
///
/// Verifies credentials, opens a new session (existing sessions stay valid),
/// and returns the token in the `x-auth` response header. Bad credentials
/// return 400 with no token header; the response does not distinguish an
/// unknown email from a wrong password.
#[post("/users/login")]
pub async fn login(
    directory: web::Data<UserDirectory>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = directory
        .find_by_credentials(&login_data.email, &login_data.password)
        .await?;
    let token = directory.open_session(user.id).await?;

    Ok(HttpResponse::Ok()
        .insert_header((AUTH_HEADER, token))
        .json(user))
}

/// Return the authenticated user
///
/// The identity was resolved by `AuthMiddleware`; this handler just echoes
/// the user body back.
#[get("/users/me")]
pub async fn me(current: CurrentUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(current.user))
}

/// Log out the current session
///
/// Revokes exactly the token that authenticated this request by removing it
/// from the user's stored token list. Other sessions for the same user are
/// unaffected. Revoking an already-absent token is a no-op.
#[delete("/users/me/token")]
pub async fn logout(
    directory: web::Data<UserDirectory>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    directory
        .detach_token(current.user.id, &current.token)
        .await?;

    Ok(HttpResponse::Ok().finish())
}
