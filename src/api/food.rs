use actix_web::{get, patch, post, web, HttpResponse};
use uuid::Uuid;

use crate::{
    database::Db,
    error::AppError,
    middleware::{Authentication, CheckRole},
    models::{
        food::{self, FoodRequest},
        menu,
    },
    utils::{common_struct::DataResponse, pagination::ListQuery},
};

#[get("/foods", wrap = "Authentication")]
pub async fn get_foods(query: web::Query<ListQuery>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    let result = food::get_foods(query.search(), query.page(), &client).await?;
    Ok(HttpResponse::Ok().json(result.into_response("Successful.")))
}

#[get("/foods/{food_id}", wrap = "Authentication")]
pub async fn get_food(path: web::Path<String>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    match food::get_food_by_id(&path, &client).await? {
        Some(found) => {
            Ok(HttpResponse::Ok().json(DataResponse::ok("Food fetched successfully.", found)))
        }
        None => Err(AppError::NotFound(String::from("food_id not found"))),
    }
}

#[post("/foods", wrap = "CheckRole::admin()", wrap = "Authentication")]
pub async fn add_food(body: web::Json<FoodRequest>, db: Db) -> Result<HttpResponse, AppError> {
    let values = body.into_inner().into_new()?;

    let client = db.lock().await;
    if !menu::menu_exists(&values.menu_id, &client).await? {
        return Err(AppError::NotFound(String::from("menu_id not found")));
    }

    let food_id = Uuid::new_v4().to_string();
    let created = food::add_food(&food_id, &values, &client).await?;
    Ok(HttpResponse::Created().json(DataResponse::created("Food created", created)))
}

#[patch("/foods/{food_id}", wrap = "CheckRole::admin()", wrap = "Authentication")]
pub async fn update_food(
    path: web::Path<String>,
    body: web::Json<FoodRequest>,
    db: Db,
) -> Result<HttpResponse, AppError> {
    let food_id = path.into_inner();
    let client = db.lock().await;

    let existing = food::get_food_by_id(&food_id, &client)
        .await?
        .ok_or_else(|| AppError::NotFound(String::from("food_id not found")))?;

    let values = body.into_inner().apply_to(&existing)?;
    if values.menu_id != existing.menu_id && !menu::menu_exists(&values.menu_id, &client).await? {
        return Err(AppError::NotFound(String::from("menu_id not found")));
    }

    let updated = food::update_food(&food_id, &values, &client).await?;
    Ok(HttpResponse::Ok().json(DataResponse::ok("Food updated", updated)))
}
