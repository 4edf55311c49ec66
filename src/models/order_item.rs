use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::{Client, Error, GenericClient, Row};

use crate::{
    error::AppError,
    models::food::to_fixed,
    utils::{
        common_struct::PaginationResult,
        pagination::Page,
        sql::{fetch_page, PaginationOptions},
        validation,
    },
};

const ORDER_ITEM_COLUMNS: &str =
    "order_item_id, order_id, food_id, quantity, unit_price, created_at, updated_at";

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_item_id: String,
    pub order_id: String,
    pub food_id: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn map_order_item(row: &Row) -> OrderItem {
    OrderItem {
        order_item_id: row.get("order_item_id"),
        order_id: row.get("order_id"),
        food_id: row.get("food_id"),
        quantity: row.get("quantity"),
        unit_price: row.get("unit_price"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// A line of an order joined with its food, as shown on orders and invoices.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrderItemDetail {
    pub order_item_id: String,
    pub food_id: String,
    pub food_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub amount: f64,
}

impl OrderItemDetail {
    pub fn new(item: &OrderItem, food_name: String) -> Self {
        OrderItemDetail {
            order_item_id: item.order_item_id.clone(),
            food_id: item.food_id.clone(),
            food_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            amount: line_amount(item.quantity, item.unit_price),
        }
    }
}

pub fn line_amount(quantity: i32, unit_price: f64) -> f64 {
    to_fixed(f64::from(quantity) * unit_price)
}

pub fn total_amount(items: &[OrderItemDetail]) -> f64 {
    to_fixed(items.iter().map(|item| item.amount).sum())
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderItemRequest {
    pub order_id: String,
    pub food_id: String,
    pub quantity: i32,
}

impl CreateOrderItemRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::required("order_id", &self.order_id)?;
        validation::required("food_id", &self.food_id)?;
        validation::positive("quantity", self.quantity)
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateOrderItemRequest {
    pub quantity: Option<i32>,
    pub food_id: Option<String>,
}

impl UpdateOrderItemRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(quantity) = self.quantity {
            validation::positive("quantity", quantity)?;
        }
        if let Some(food_id) = &self.food_id {
            validation::required("food_id", food_id)?;
        }
        Ok(())
    }
}

pub struct NewOrderItem<'a> {
    pub order_item_id: &'a str,
    pub order_id: &'a str,
    pub food_id: &'a str,
    pub quantity: i32,
    pub unit_price: f64,
}

pub async fn get_order_items(
    page: Page,
    client: &Client,
) -> Result<PaginationResult<OrderItem>, Error> {
    fetch_page(
        client,
        PaginationOptions {
            select_columns: ORDER_ITEM_COLUMNS,
            base_query: "from order_items where deleted_at is null",
            search_columns: vec![],
            search: None,
            order_options: Some("created_at desc"),
            page,
        },
        vec![],
        map_order_item,
    )
    .await
}

pub async fn get_order_item_by_id(
    order_item_id: &str,
    client: &Client,
) -> Result<Option<OrderItem>, Error> {
    let sql = format!(
        "select {ORDER_ITEM_COLUMNS} from order_items where order_item_id = $1 and deleted_at is null"
    );
    let row = client.query_opt(&sql, &[&order_item_id]).await?;
    Ok(row.as_ref().map(map_order_item))
}

pub async fn get_items_for_order(
    order_id: &str,
    client: &Client,
) -> Result<Vec<OrderItemDetail>, Error> {
    let rows = client
        .query(
            "select oi.order_item_id, oi.food_id, f.name as food_name, oi.quantity, oi.unit_price from order_items oi join foods f on f.food_id = oi.food_id where oi.order_id = $1 and oi.deleted_at is null order by oi.created_at, oi.id",
            &[&order_id],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let quantity: i32 = row.get("quantity");
            let unit_price: f64 = row.get("unit_price");
            OrderItemDetail {
                order_item_id: row.get("order_item_id"),
                food_id: row.get("food_id"),
                food_name: row.get("food_name"),
                quantity,
                unit_price,
                amount: line_amount(quantity, unit_price),
            }
        })
        .collect())
}

/// Works on a plain client or inside the order transaction.
pub async fn insert_order_item<C: GenericClient>(
    data: &NewOrderItem<'_>,
    client: &C,
) -> Result<OrderItem, Error> {
    let sql = format!(
        "insert into order_items (order_item_id, order_id, food_id, quantity, unit_price) values ($1, $2, $3, $4, $5) returning {ORDER_ITEM_COLUMNS}"
    );
    let row = client
        .query_one(
            sql.as_str(),
            &[
                &data.order_item_id,
                &data.order_id,
                &data.food_id,
                &data.quantity,
                &data.unit_price,
            ],
        )
        .await?;
    Ok(map_order_item(&row))
}

pub async fn update_order_item(
    order_item_id: &str,
    food_id: &str,
    quantity: i32,
    unit_price: f64,
    client: &Client,
) -> Result<OrderItem, Error> {
    let sql = format!(
        "update order_items set food_id = $1, quantity = $2, unit_price = $3, updated_at = current_timestamp where order_item_id = $4 and deleted_at is null returning {ORDER_ITEM_COLUMNS}"
    );
    let row = client
        .query_one(&sql, &[&food_id, &quantity, &unit_price, &order_item_id])
        .await?;
    Ok(map_order_item(&row))
}
