use actix_web::{get, patch, post, web, HttpResponse};
use uuid::Uuid;

use crate::{
    database::Db,
    error::AppError,
    middleware::{Authentication, CheckRole},
    models::note::{self, NoteRequest},
    utils::{common_struct::DataResponse, pagination::ListQuery},
};

#[get("/notes", wrap = "Authentication")]
pub async fn get_notes(query: web::Query<ListQuery>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    let result = note::get_notes(query.search(), query.page(), &client).await?;
    Ok(HttpResponse::Ok().json(result.into_response("Successful.")))
}

#[get("/notes/{note_id}", wrap = "Authentication")]
pub async fn get_note(path: web::Path<String>, db: Db) -> Result<HttpResponse, AppError> {
    let client = db.lock().await;
    match note::get_note_by_id(&path, &client).await? {
        Some(found) => {
            Ok(HttpResponse::Ok().json(DataResponse::ok("Note fetched successfully.", found)))
        }
        None => Err(AppError::NotFound(String::from("note_id not found"))),
    }
}

#[post("/notes", wrap = "CheckRole::admin()", wrap = "Authentication")]
pub async fn create_note(body: web::Json<NoteRequest>, db: Db) -> Result<HttpResponse, AppError> {
    let (title, text) = body.into_inner().into_new()?;
    let note_id = Uuid::new_v4().to_string();

    let client = db.lock().await;
    let created = note::add_note(&note_id, &title, &text, &client).await?;
    Ok(HttpResponse::Created().json(DataResponse::created("note created", created)))
}

#[patch("/notes/{note_id}", wrap = "Authentication")]
pub async fn update_note(
    path: web::Path<String>,
    body: web::Json<NoteRequest>,
    db: Db,
) -> Result<HttpResponse, AppError> {
    let note_id = path.into_inner();
    let client = db.lock().await;

    let existing = note::get_note_by_id(&note_id, &client)
        .await?
        .ok_or_else(|| AppError::NotFound(String::from("note_id not found")))?;

    let (title, text) = body.into_inner().apply_to(&existing)?;
    let updated = note::update_note(&note_id, &title, &text, &client).await?;
    Ok(HttpResponse::Ok().json(DataResponse::ok("note updated", updated)))
}
