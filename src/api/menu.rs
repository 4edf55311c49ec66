use actix_web::{get, patch, post, web, HttpResponse};
use uuid::Uuid;

use crate::{
    database::Db,
    error::AppError,
    middleware::{Authentication, CheckRole},
    models::menu::{self, MenuRequest},
    utils::{common_struct::DataResponse, pagination::ListQuery},
};

#[get("/menus", wrap = "Authentication")]
pub async fn get_menus(query: web::Query<ListQuery>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    let result = menu::get_menus(query.search(), query.page(), &client).await?;
    Ok(HttpResponse::Ok().json(result.into_response("Successful.")))
}

#[get("/menus/{menu_id}", wrap = "Authentication")]
pub async fn get_menu(path: web::Path<String>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    match menu::get_menu_by_id(&path, &client).await? {
        Some(found) => {
            Ok(HttpResponse::Ok().json(DataResponse::ok("Menu fetched successfully.", found)))
        }
        None => Err(AppError::NotFound(String::from("menu_id not found"))),
    }
}

#[post("/menus", wrap = "CheckRole::admin()", wrap = "Authentication")]
pub async fn create_menu(body: web::Json<MenuRequest>, db: Db) -> Result<HttpResponse, AppError> {
    let values = body.into_inner().into_new()?;
    let menu_id = Uuid::new_v4().to_string();

    let client = db.lock().await;
    let created = menu::add_menu(&menu_id, &values, &client).await?;
    Ok(HttpResponse::Created().json(DataResponse::created("menu created", created)))
}

#[patch("/menus/{menu_id}", wrap = "CheckRole::admin()", wrap = "Authentication")]
pub async fn update_menu(
    path: web::Path<String>,
    body: web::Json<MenuRequest>,
    db: Db,
) -> Result<HttpResponse, AppError> {
    let menu_id = path.into_inner();
    let client = db.lock().await;

    let existing = menu::get_menu_by_id(&menu_id, &client)
        .await?
        .ok_or_else(|| AppError::NotFound(String::from("menu_id not found")))?;

    let values = body.into_inner().apply_to(&existing)?;
    let updated = menu::update_menu(&menu_id, &values, &client).await?;
    Ok(HttpResponse::Ok().json(DataResponse::ok("menu updated", updated)))
}
