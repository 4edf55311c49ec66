use actix_web::{get, patch, post, web, HttpResponse};
use uuid::Uuid;

use crate::{
    database::Db,
    error::AppError,
    middleware::Authentication,
    models::{
        food, order,
        order_item::{self, CreateOrderItemRequest, NewOrderItem, UpdateOrderItemRequest},
    },
    utils::{common_struct::DataResponse, pagination::ListQuery},
};

#[get("/orderItems", wrap = "Authentication")]
pub async fn get_order_items(
    query: web::Query<ListQuery>,
    db: Db,
) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    let result = order_item::get_order_items(query.page(), &client).await?;
    Ok(HttpResponse::Ok().json(result.into_response("Successful.")))
}

#[get("/orderItems/{order_item_id}", wrap = "Authentication")]
pub async fn get_order_item(path: web::Path<String>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    match order_item::get_order_item_by_id(&path, &client).await? {
        Some(item) => {
            Ok(HttpResponse::Ok().json(DataResponse::ok("Order item fetched successfully.", item)))
        }
        None => Err(AppError::NotFound(String::from("order_item_id not found"))),
    }
}

#[post("/orderItems", wrap = "Authentication")]
pub async fn create_order_item(
    body: web::Json<CreateOrderItemRequest>,
    db: Db,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let client = db.lock().await;
    if !order::order_exists(&body.order_id, &client).await? {
        return Err(AppError::NotFound(String::from("order_id not found")));
    }
    let priced = food::get_priced_food(&body.food_id, &*client)
        .await?
        .ok_or_else(|| AppError::NotFound(String::from("food_id not found")))?;

    let order_item_id = Uuid::new_v4().to_string();
    let created = order_item::insert_order_item(
        &NewOrderItem {
            order_item_id: &order_item_id,
            order_id: &body.order_id,
            food_id: &body.food_id,
            quantity: body.quantity,
            unit_price: priced.price,
        },
        &*client,
    )
    .await?;
    Ok(HttpResponse::Created().json(DataResponse::created("order item created", created)))
}

#[patch("/orderItems/{order_item_id}", wrap = "Authentication")]
pub async fn update_order_item(
    path: web::Path<String>,
    body: web::Json<UpdateOrderItemRequest>,
    db: Db,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let order_item_id = path.into_inner();
    let client = db.lock().await;

    let existing = order_item::get_order_item_by_id(&order_item_id, &client)
        .await?
        .ok_or_else(|| AppError::NotFound(String::from("order_item_id not found")))?;

    let quantity = body.quantity.unwrap_or(existing.quantity);
    let (food_id, unit_price) = match &body.food_id {
        Some(food_id) if *food_id != existing.food_id => {
            let priced = food::get_priced_food(food_id, &*client)
                .await?
                .ok_or_else(|| AppError::NotFound(String::from("food_id not found")))?;
            (food_id.clone(), priced.price)
        }
        _ => (existing.food_id, existing.unit_price),
    };

    let updated = order_item::update_order_item(
        &order_item_id,
        &food_id,
        quantity,
        unit_price,
        &client,
    )
    .await?;
    Ok(HttpResponse::Ok().json(DataResponse::ok("order item updated", updated)))
}
