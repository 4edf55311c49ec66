use actix_web::{get, patch, post, web, HttpResponse};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    database::Db,
    error::AppError,
    middleware::{Authentication, CheckRole},
    models::{
        invoice::{self, InvoiceRequest},
        order,
    },
    utils::{common_struct::DataResponse, pagination::ListQuery},
};

#[get("/invoices", wrap = "Authentication")]
pub async fn get_invoices(query: web::Query<ListQuery>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    let result = invoice::get_invoices(query.page(), &client).await?;
    Ok(HttpResponse::Ok().json(result.into_response("Successful.")))
}

#[get("/invoices/{invoice_id}", wrap = "Authentication")]
pub async fn get_invoice(path: web::Path<String>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    match invoice::get_invoice_view(&path, &client).await? {
        Some(view) => {
            Ok(HttpResponse::Ok().json(DataResponse::ok("Invoice fetched successfully.", view)))
        }
        None => Err(AppError::NotFound(String::from("invoice_id not found"))),
    }
}

#[post("/invoices", wrap = "CheckRole::admin()", wrap = "Authentication")]
pub async fn create_invoice(
    body: web::Json<InvoiceRequest>,
    db: Db,
) -> Result<HttpResponse, AppError> {
    let values = body.into_inner().into_new(Utc::now())?;

    let client = db.lock().await;
    if !order::order_exists(&values.order_id, &client).await? {
        return Err(AppError::NotFound(String::from("order_id not found")));
    }

    let invoice_id = Uuid::new_v4().to_string();
    let created = invoice::add_invoice(&invoice_id, &values, &client).await?;
    log::info!("Invoice {} issued for order {}", created.invoice_id, created.order_id);
    Ok(HttpResponse::Created().json(DataResponse::created("invoice created", created)))
}

#[patch("/invoices/{invoice_id}", wrap = "CheckRole::admin()", wrap = "Authentication")]
pub async fn update_invoice(
    path: web::Path<String>,
    body: web::Json<InvoiceRequest>,
    db: Db,
) -> Result<HttpResponse, AppError> {
    let invoice_id = path.into_inner();
    let client = db.lock().await;

    let existing = invoice::get_invoice_by_id(&invoice_id, &client)
        .await?
        .ok_or_else(|| AppError::NotFound(String::from("invoice_id not found")))?;

    let values = body.into_inner().apply_to(&existing)?;
    if values.order_id != existing.order_id
        && !order::order_exists(&values.order_id, &client).await?
    {
        return Err(AppError::NotFound(String::from("order_id not found")));
    }

    let updated = invoice::update_invoice(&invoice_id, &values, &client).await?;
    Ok(HttpResponse::Ok().json(DataResponse::ok("invoice updated", updated)))
}
