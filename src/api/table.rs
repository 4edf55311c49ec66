use actix_web::{get, patch, post, web, HttpResponse};
use uuid::Uuid;

use crate::{
    database::Db,
    error::AppError,
    middleware::{Authentication, CheckRole},
    models::table::{self, TableRequest},
    utils::{common_struct::DataResponse, pagination::ListQuery},
};

#[get("/table", wrap = "Authentication")]
pub async fn get_tables(query: web::Query<ListQuery>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    let result = table::get_tables(query.page(), &client).await?;
    Ok(HttpResponse::Ok().json(result.into_response("Successful.")))
}

#[get("/table/{table_id}", wrap = "Authentication")]
pub async fn get_table(path: web::Path<String>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    match table::get_table_by_id(&path, &client).await? {
        Some(found) => {
            Ok(HttpResponse::Ok().json(DataResponse::ok("Table fetched successfully.", found)))
        }
        None => Err(AppError::NotFound(String::from("table_id not found"))),
    }
}

#[post("/table", wrap = "CheckRole::admin()", wrap = "Authentication")]
pub async fn create_table(body: web::Json<TableRequest>, db: Db) -> Result<HttpResponse, AppError> {
    let values = body.into_inner().into_new()?;
    let table_id = Uuid::new_v4().to_string();

    let client = db.lock().await;
    let created = table::add_table(&table_id, &values, &client).await?;
    Ok(HttpResponse::Created().json(DataResponse::created("table created", created)))
}

#[patch("/table/{table_id}", wrap = "CheckRole::admin()", wrap = "Authentication")]
pub async fn update_table(
    path: web::Path<String>,
    body: web::Json<TableRequest>,
    db: Db,
) -> Result<HttpResponse, AppError> {
    let table_id = path.into_inner();
    let client = db.lock().await;

    let existing = table::get_table_by_id(&table_id, &client)
        .await?
        .ok_or_else(|| AppError::NotFound(String::from("table_id not found")))?;

    let values = body.into_inner().apply_to(&existing)?;
    let updated = table::update_table(&table_id, &values, &client).await?;
    Ok(HttpResponse::Ok().json(DataResponse::ok("table updated", updated)))
}
