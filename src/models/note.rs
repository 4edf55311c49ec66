use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::{Client, Error, Row};

use crate::{
    error::AppError,
    utils::{
        common_struct::PaginationResult,
        pagination::Page,
        sql::{fetch_page, PaginationOptions},
        validation,
    },
};

const NOTE_COLUMNS: &str = "note_id, title, text, created_at, updated_at";

#[derive(Debug, Serialize, Deserialize)]
pub struct Note {
    pub note_id: String,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn map_note(row: &Row) -> Note {
    Note {
        note_id: row.get("note_id"),
        title: row.get("title"),
        text: row.get("text"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct NoteRequest {
    pub title: Option<String>,
    pub text: Option<String>,
}

impl NoteRequest {
    pub fn into_new(self) -> Result<(String, String), AppError> {
        let title = self.title.unwrap_or_default();
        validation::required("title", &title)?;
        validation::max_length("title", &title, 255)?;
        Ok((title, self.text.unwrap_or_default()))
    }

    pub fn apply_to(self, note: &Note) -> Result<(String, String), AppError> {
        let title = self.title.unwrap_or_else(|| note.title.clone());
        validation::required("title", &title)?;
        validation::max_length("title", &title, 255)?;
        Ok((title, self.text.unwrap_or_else(|| note.text.clone())))
    }
}

pub async fn get_notes(
    search: Option<&str>,
    page: Page,
    client: &Client,
) -> Result<PaginationResult<Note>, Error> {
    fetch_page(
        client,
        PaginationOptions {
            select_columns: NOTE_COLUMNS,
            base_query: "from notes where deleted_at is null",
            search_columns: vec!["title", "text"],
            search,
            order_options: Some("created_at desc"),
            page,
        },
        vec![],
        map_note,
    )
    .await
}

pub async fn get_note_by_id(note_id: &str, client: &Client) -> Result<Option<Note>, Error> {
    let sql = format!("select {NOTE_COLUMNS} from notes where note_id = $1 and deleted_at is null");
    let row = client.query_opt(&sql, &[&note_id]).await?;
    Ok(row.as_ref().map(map_note))
}

pub async fn add_note(
    note_id: &str,
    title: &str,
    text: &str,
    client: &Client,
) -> Result<Note, Error> {
    let sql = format!(
        "insert into notes (note_id, title, text) values ($1, $2, $3) returning {NOTE_COLUMNS}"
    );
    let row = client
        .query_one(&sql, &[&note_id, &title.trim(), &text])
        .await?;
    Ok(map_note(&row))
}

pub async fn update_note(
    note_id: &str,
    title: &str,
    text: &str,
    client: &Client,
) -> Result<Note, Error> {
    let sql = format!(
        "update notes set title = $1, text = $2, updated_at = current_timestamp where note_id = $3 and deleted_at is null returning {NOTE_COLUMNS}"
    );
    let row = client
        .query_one(&sql, &[&title.trim(), &text, &note_id])
        .await?;
    Ok(map_note(&row))
}
