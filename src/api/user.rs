use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::Config,
    database::Db,
    error::AppError,
    middleware::{auth::claims_from_headers, AuthUser, Authentication, CheckRole},
    models::{
        role::Role,
        user::{self, LoginRequest, NewUser, SignUpRequest, User},
    },
    utils::{
        common_struct::DataResponse,
        jwt::generate_all_tokens,
        pagination::ListQuery,
        password::{hash_password, verify_password},
    },
};

#[derive(Serialize)]
pub struct LoginResponse {
    pub code: u16,
    pub message: String,
    pub token: String,
    pub refresh_token: String,
    pub user: User,
}

#[post("/users/signup")]
pub async fn sign_up(
    req: HttpRequest,
    body: web::Json<SignUpRequest>,
    db: Db,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let requested = body.validate()?;
    let caller_is_admin = claims_from_headers(req.headers(), &config)
        .map(|claims| claims.role == Role::Admin)
        .unwrap_or(false);
    let role = user::signup_role(
        requested,
        &body.email,
        caller_is_admin,
        config.admin_email.as_deref(),
    )?;

    let password = body.password.clone();
    let hashed_password = web::block(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let user_id = Uuid::new_v4().to_string();
    let tokens = generate_all_tokens(body.email.trim(), &user_id, role, &config)?;

    let client = db.lock().await;
    if user::email_or_phone_taken(&body.email, &body.phone, &client).await? {
        return Err(AppError::Conflict(String::from(
            "this email or phone number already exists",
        )));
    }

    let created = user::add_user(
        &NewUser {
            user_id: &user_id,
            request: &body,
            role,
            hashed_password: &hashed_password,
            token: &tokens.token,
            refresh_token: &tokens.refresh_token,
        },
        &client,
    )
    .await?;

    log::info!("User {} signed up as {}", created.user_id, created.role);
    Ok(HttpResponse::Created().json(DataResponse::created("Successfully signed up", created)))
}

#[post("/users/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: Db,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let invalid = || AppError::Unauthorized(String::from("email or password is incorrect"));

    let credentials = {
        let client = db.lock().await;
        let found = user::get_credentials_by_email(&body.email, &client).await?;
        found.ok_or_else(invalid)?
    };

    let provided = body.password.clone();
    let stored = credentials.password.clone();
    let matches = web::block(move || verify_password(&provided, &stored))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    if !matches {
        return Err(invalid());
    }

    let found = credentials.user;
    let role: Role = found.role.parse().map_err(AppError::Internal)?;
    let tokens = generate_all_tokens(&found.email, &found.user_id, role, &config)?;

    let client = db.lock().await;
    user::update_tokens(&found.user_id, &tokens.token, &tokens.refresh_token, &client).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        code: 200,
        message: String::from("Login successfully"),
        token: tokens.token,
        refresh_token: tokens.refresh_token,
        user: found,
    }))
}

#[get("/users", wrap = "CheckRole::admin()", wrap = "Authentication")]
pub async fn get_users(query: web::Query<ListQuery>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    let result = user::get_users(query.search(), query.page(), &client).await?;
    Ok(HttpResponse::Ok().json(result.into_response("Successful.")))
}

#[get("/users/{user_id}", wrap = "Authentication")]
pub async fn get_user(
    path: web::Path<String>,
    caller: AuthUser,
    db: Db,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    if !caller.is_admin() && caller.0.user_id != user_id {
        return Err(AppError::Unauthorized(String::from(
            "unauthorized to access this resource",
        )));
    }

    let client = db.lock().await;
    match user::get_user_by_id(&user_id, &client).await? {
        Some(found) => {
            Ok(HttpResponse::Ok().json(DataResponse::ok("User fetched successfully.", found)))
        }
        None => Err(AppError::NotFound(String::from("user_id not found"))),
    }
}
