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

const MENU_COLUMNS: &str = "menu_id, name, category, start_date, end_date, created_at, updated_at";

#[derive(Debug, Serialize, Deserialize)]
pub struct Menu {
    pub menu_id: String,
    pub name: String,
    pub category: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn map_menu(row: &Row) -> Menu {
    Menu {
        menu_id: row.get("menu_id"),
        name: row.get("name"),
        category: row.get("category"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Body of both create and update; on update, absent fields keep their
/// stored value.
#[derive(Debug, Deserialize, Default)]
pub struct MenuRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq)]
pub struct MenuValues {
    pub name: String,
    pub category: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl MenuRequest {
    pub fn into_new(self) -> Result<MenuValues, AppError> {
        let values = MenuValues {
            name: self.name.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            start_date: self.start_date,
            end_date: self.end_date,
        };
        values.validate()?;
        Ok(values)
    }

    pub fn apply_to(self, menu: &Menu) -> Result<MenuValues, AppError> {
        let values = MenuValues {
            name: self.name.unwrap_or_else(|| menu.name.clone()),
            category: self.category.unwrap_or_else(|| menu.category.clone()),
            start_date: self.start_date.or(menu.start_date),
            end_date: self.end_date.or(menu.end_date),
        };
        values.validate()?;
        Ok(values)
    }
}

impl MenuValues {
    fn validate(&self) -> Result<(), AppError> {
        validation::required("name", &self.name)?;
        validation::required("category", &self.category)?;
        validation::max_length("name", &self.name, 255)?;
        validation::max_length("category", &self.category, 255)?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(AppError::BadRequest(String::from(
                    "end_date must be after start_date",
                )));
            }
        }
        Ok(())
    }
}

pub async fn get_menus(
    search: Option<&str>,
    page: Page,
    client: &Client,
) -> Result<PaginationResult<Menu>, Error> {
    fetch_page(
        client,
        PaginationOptions {
            select_columns: MENU_COLUMNS,
            base_query: "from menus where deleted_at is null",
            search_columns: vec!["name", "category"],
            search,
            order_options: Some("created_at desc"),
            page,
        },
        vec![],
        map_menu,
    )
    .await
}

pub async fn get_menu_by_id(menu_id: &str, client: &Client) -> Result<Option<Menu>, Error> {
    let sql = format!("select {MENU_COLUMNS} from menus where menu_id = $1 and deleted_at is null");
    let row = client.query_opt(&sql, &[&menu_id]).await?;
    Ok(row.as_ref().map(map_menu))
}

pub async fn menu_exists(menu_id: &str, client: &Client) -> Result<bool, Error> {
    let row = client
        .query_opt(
            "select 1 from menus where menu_id = $1 and deleted_at is null",
            &[&menu_id],
        )
        .await?;
    Ok(row.is_some())
}

pub async fn add_menu(menu_id: &str, data: &MenuValues, client: &Client) -> Result<Menu, Error> {
    let sql = format!(
        "insert into menus (menu_id, name, category, start_date, end_date) values ($1, $2, $3, $4, $5) returning {MENU_COLUMNS}"
    );
    let row = client
        .query_one(
            &sql,
            &[
                &menu_id,
                &data.name.trim(),
                &data.category.trim(),
                &data.start_date,
                &data.end_date,
            ],
        )
        .await?;
    Ok(map_menu(&row))
}

pub async fn update_menu(menu_id: &str, data: &MenuValues, client: &Client) -> Result<Menu, Error> {
    let sql = format!(
        "update menus set name = $1, category = $2, start_date = $3, end_date = $4, updated_at = current_timestamp where menu_id = $5 and deleted_at is null returning {MENU_COLUMNS}"
    );
    let row = client
        .query_one(
            &sql,
            &[
                &data.name.trim(),
                &data.category.trim(),
                &data.start_date,
                &data.end_date,
                &menu_id,
            ],
        )
        .await?;
    Ok(map_menu(&row))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn stored() -> Menu {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Menu {
            menu_id: String::from("m-1"),
            name: String::from("Winter"),
            category: String::from("Seasonal"),
            start_date: Some(start),
            end_date: Some(start + Duration::days(90)),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn create_requires_name_and_category() {
        let err = MenuRequest {
            category: Some(String::from("Drinks")),
            ..Default::default()
        }
        .into_new()
        .unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn create_rejects_names_wider_than_column() {
        let err = MenuRequest {
            name: Some("x".repeat(300)),
            category: Some(String::from("Drinks")),
            ..Default::default()
        }
        .into_new()
        .unwrap_err();
        assert_eq!(err.to_string(), "name must be at most 255 characters");
    }

    #[test]
    fn create_rejects_inverted_dates() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let err = MenuRequest {
            name: Some(String::from("Summer")),
            category: Some(String::from("Seasonal")),
            start_date: Some(start),
            end_date: Some(start - Duration::days(1)),
        }
        .into_new()
        .unwrap_err();
        assert_eq!(err.to_string(), "end_date must be after start_date");
    }

    #[test]
    fn update_checks_merged_dates() {
        let menu = stored();
        let too_late = menu.end_date.unwrap() + Duration::days(1);
        let err = MenuRequest {
            start_date: Some(too_late),
            ..Default::default()
        }
        .apply_to(&menu)
        .unwrap_err();
        assert_eq!(err.to_string(), "end_date must be after start_date");
    }

    #[test]
    fn update_keeps_absent_fields() {
        let menu = stored();
        let values = MenuRequest {
            name: Some(String::from("Winter Specials")),
            ..Default::default()
        }
        .apply_to(&menu)
        .unwrap();
        assert_eq!(values.name, "Winter Specials");
        assert_eq!(values.category, "Seasonal");
        assert_eq!(values.end_date, menu.end_date);
    }
}
