use actix_web::{get, patch, post, web, HttpResponse};

use crate::{
    database::Db,
    error::AppError,
    middleware::{AuthUser, Authentication, CheckRole},
    models::{
        order::{self, CreateOrderRequest, UpdateOrderRequest},
        order_item, table,
    },
    utils::{common_struct::DataResponse, pagination::ListQuery},
};

#[get("/orders", wrap = "Authentication")]
pub async fn get_orders(query: web::Query<ListQuery>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    let result = order::get_orders(query.page(), &client).await?;
    Ok(HttpResponse::Ok().json(result.into_response("Successful.")))
}

#[get("/orders/{order_id}", wrap = "Authentication")]
pub async fn get_order(path: web::Path<String>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    match order::get_order_detail(&path, &client).await? {
        Some(detail) => {
            Ok(HttpResponse::Ok().json(DataResponse::ok("Order fetched successfully.", detail)))
        }
        None => Err(AppError::NotFound(String::from("order_id not found"))),
    }
}

#[get("/orders/{order_id}/items", wrap = "Authentication")]
pub async fn get_items_by_order(path: web::Path<String>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    if !order::order_exists(&path, &client).await? {
        return Err(AppError::NotFound(String::from("order_id not found")));
    }
    let items = order_item::get_items_for_order(&path, &client).await?;
    Ok(HttpResponse::Ok().json(DataResponse::ok("Successful.", items)))
}

#[post("/orders", wrap = "Authentication")]
pub async fn create_order(
    body: web::Json<CreateOrderRequest>,
    caller: AuthUser,
    db: Db,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let mut client = db.lock().await;
    if let Some(table_id) = &body.table_id {
        if !table::table_exists(table_id, &client).await? {
            return Err(AppError::NotFound(String::from("table_id not found")));
        }
    }

    let detail = order::create_order(&body, &mut client).await?;
    log::info!(
        "Order {} created by {} with {} items",
        detail.order.order_id,
        caller.0.user_id,
        detail.order_items.len()
    );
    Ok(HttpResponse::Created().json(DataResponse::created("order created", detail)))
}

#[patch("/orders/{order_id}", wrap = "CheckRole::admin()", wrap = "Authentication")]
pub async fn update_order(
    path: web::Path<String>,
    body: web::Json<UpdateOrderRequest>,
    db: Db,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let client = db.lock().await;

    let existing = order::get_order_by_id(&order_id, &client)
        .await?
        .ok_or_else(|| AppError::NotFound(String::from("order_id not found")))?;

    let (order_date, table_id) = body.into_inner().apply_to(&existing)?;
    if let Some(id) = &table_id {
        if existing.table_id.as_ref() != Some(id) && !table::table_exists(id, &client).await? {
            return Err(AppError::NotFound(String::from("table_id not found")));
        }
    }

    let updated = order::update_order(&order_id, order_date, &table_id, &client).await?;
    Ok(HttpResponse::Ok().json(DataResponse::ok("order updated", updated)))
}
