use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::{Client, Error, GenericClient, Row};

use crate::{
    error::AppError,
    utils::{
        common_struct::PaginationResult,
        pagination::Page,
        sql::{fetch_page, PaginationOptions},
        validation,
    },
};

const FOOD_COLUMNS: &str = "food_id, name, price, food_image, menu_id, created_at, updated_at";

#[derive(Debug, Serialize, Deserialize)]
pub struct Food {
    pub food_id: String,
    pub name: String,
    pub price: f64,
    pub food_image: String,
    pub menu_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn map_food(row: &Row) -> Food {
    Food {
        food_id: row.get("food_id"),
        name: row.get("name"),
        price: row.get("price"),
        food_image: row.get("food_image"),
        menu_id: row.get("menu_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FoodRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub food_image: Option<String>,
    pub menu_id: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct FoodValues {
    pub name: String,
    pub price: f64,
    pub food_image: String,
    pub menu_id: String,
}

impl FoodRequest {
    pub fn into_new(self) -> Result<FoodValues, AppError> {
        let price = self
            .price
            .ok_or_else(|| AppError::BadRequest(String::from("price is required")))?;
        let values = FoodValues {
            name: self.name.unwrap_or_default(),
            price: to_fixed(price),
            food_image: self.food_image.unwrap_or_default(),
            menu_id: self.menu_id.unwrap_or_default(),
        };
        values.validate()?;
        Ok(values)
    }

    pub fn apply_to(self, food: &Food) -> Result<FoodValues, AppError> {
        let values = FoodValues {
            name: self.name.unwrap_or_else(|| food.name.clone()),
            price: self.price.map(to_fixed).unwrap_or(food.price),
            food_image: self.food_image.unwrap_or_else(|| food.food_image.clone()),
            menu_id: self.menu_id.unwrap_or_else(|| food.menu_id.clone()),
        };
        values.validate()?;
        Ok(values)
    }
}

impl FoodValues {
    fn validate(&self) -> Result<(), AppError> {
        validation::length("name", &self.name, 2, 100)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::BadRequest(String::from(
                "price must be a non-negative number",
            )));
        }
        validation::required("food_image", &self.food_image)?;
        validation::max_length("food_image", &self.food_image, 512)?;
        validation::required("menu_id", &self.menu_id)?;
        Ok(())
    }
}

/// Rounds a price to two decimal places.
pub fn to_fixed(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

pub async fn get_foods(
    search: Option<&str>,
    page: Page,
    client: &Client,
) -> Result<PaginationResult<Food>, Error> {
    fetch_page(
        client,
        PaginationOptions {
            select_columns: FOOD_COLUMNS,
            base_query: "from foods where deleted_at is null",
            search_columns: vec!["name"],
            search,
            order_options: Some("created_at desc"),
            page,
        },
        vec![],
        map_food,
    )
    .await
}

pub async fn get_food_by_id(food_id: &str, client: &Client) -> Result<Option<Food>, Error> {
    let sql = format!("select {FOOD_COLUMNS} from foods where food_id = $1 and deleted_at is null");
    let row = client.query_opt(&sql, &[&food_id]).await?;
    Ok(row.as_ref().map(map_food))
}

/// Name and current price of a food, as used when pricing order lines.
#[derive(Debug)]
pub struct PricedFood {
    pub name: String,
    pub price: f64,
}

/// Works on a plain client or inside a transaction.
pub async fn get_priced_food<C: GenericClient>(
    food_id: &str,
    client: &C,
) -> Result<Option<PricedFood>, Error> {
    let row = client
        .query_opt(
            "select name, price from foods where food_id = $1 and deleted_at is null",
            &[&food_id],
        )
        .await?;
    Ok(row.map(|row| PricedFood {
        name: row.get("name"),
        price: row.get("price"),
    }))
}

pub async fn add_food(food_id: &str, data: &FoodValues, client: &Client) -> Result<Food, Error> {
    let sql = format!(
        "insert into foods (food_id, name, price, food_image, menu_id) values ($1, $2, $3, $4, $5) returning {FOOD_COLUMNS}"
    );
    let row = client
        .query_one(
            &sql,
            &[
                &food_id,
                &data.name.trim(),
                &data.price,
                &data.food_image.trim(),
                &data.menu_id,
            ],
        )
        .await?;
    Ok(map_food(&row))
}

pub async fn update_food(food_id: &str, data: &FoodValues, client: &Client) -> Result<Food, Error> {
    let sql = format!(
        "update foods set name = $1, price = $2, food_image = $3, menu_id = $4, updated_at = current_timestamp where food_id = $5 and deleted_at is null returning {FOOD_COLUMNS}"
    );
    let row = client
        .query_one(
            &sql,
            &[
                &data.name.trim(),
                &data.price,
                &data.food_image.trim(),
                &data.menu_id,
                &food_id,
            ],
        )
        .await?;
    Ok(map_food(&row))
}
