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

const TABLE_COLUMNS: &str = "table_id, number_of_guests, table_number, created_at, updated_at";

#[derive(Debug, Serialize, Deserialize)]
pub struct Table {
    pub table_id: String,
    pub number_of_guests: i32,
    pub table_number: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn map_table(row: &Row) -> Table {
    Table {
        table_id: row.get("table_id"),
        number_of_guests: row.get("number_of_guests"),
        table_number: row.get("table_number"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct TableRequest {
    #[serde(alias = "number_of_guest")]
    pub number_of_guests: Option<i32>,
    pub table_number: Option<i32>,
}

#[derive(Debug, PartialEq)]
pub struct TableValues {
    pub number_of_guests: i32,
    pub table_number: i32,
}

impl TableRequest {
    pub fn into_new(self) -> Result<TableValues, AppError> {
        let values = TableValues {
            number_of_guests: self.number_of_guests.ok_or_else(|| {
                AppError::BadRequest(String::from("number_of_guests is required"))
            })?,
            table_number: self
                .table_number
                .ok_or_else(|| AppError::BadRequest(String::from("table_number is required")))?,
        };
        values.validate()?;
        Ok(values)
    }

    pub fn apply_to(self, table: &Table) -> Result<TableValues, AppError> {
        let values = TableValues {
            number_of_guests: self.number_of_guests.unwrap_or(table.number_of_guests),
            table_number: self.table_number.unwrap_or(table.table_number),
        };
        values.validate()?;
        Ok(values)
    }
}

impl TableValues {
    fn validate(&self) -> Result<(), AppError> {
        validation::positive("number_of_guests", self.number_of_guests)?;
        validation::positive("table_number", self.table_number)
    }
}

pub async fn get_tables(page: Page, client: &Client) -> Result<PaginationResult<Table>, Error> {
    fetch_page(
        client,
        PaginationOptions {
            select_columns: TABLE_COLUMNS,
            base_query: "from tables where deleted_at is null",
            search_columns: vec![],
            search: None,
            order_options: Some("table_number"),
            page,
        },
        vec![],
        map_table,
    )
    .await
}

pub async fn get_table_by_id(table_id: &str, client: &Client) -> Result<Option<Table>, Error> {
    let sql = format!(
        "select {TABLE_COLUMNS} from tables where table_id = $1 and deleted_at is null"
    );
    let row = client.query_opt(&sql, &[&table_id]).await?;
    Ok(row.as_ref().map(map_table))
}

pub async fn table_exists(table_id: &str, client: &Client) -> Result<bool, Error> {
    let row = client
        .query_opt(
            "select 1 from tables where table_id = $1 and deleted_at is null",
            &[&table_id],
        )
        .await?;
    Ok(row.is_some())
}

pub async fn add_table(
    table_id: &str,
    data: &TableValues,
    client: &Client,
) -> Result<Table, Error> {
    let sql = format!(
        "insert into tables (table_id, number_of_guests, table_number) values ($1, $2, $3) returning {TABLE_COLUMNS}"
    );
    let row = client
        .query_one(&sql, &[&table_id, &data.number_of_guests, &data.table_number])
        .await?;
    Ok(map_table(&row))
}

pub async fn update_table(
    table_id: &str,
    data: &TableValues,
    client: &Client,
) -> Result<Table, Error> {
    let sql = format!(
        "update tables set number_of_guests = $1, table_number = $2, updated_at = current_timestamp where table_id = $3 and deleted_at is null returning {TABLE_COLUMNS}"
    );
    let row = client
        .query_one(&sql, &[&data.number_of_guests, &data.table_number, &table_id])
        .await?;
    Ok(map_table(&row))
}
