use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::{Client, Error, Row};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        food::get_priced_food,
        order_item::{self, insert_order_item, NewOrderItem, OrderItemDetail},
    },
    utils::{
        common_struct::PaginationResult,
        pagination::Page,
        sql::{fetch_page, PaginationOptions},
        validation,
    },
};

const ORDER_COLUMNS: &str = "order_id, order_date, table_id, created_at, updated_at";

#[derive(Debug, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub order_date: DateTime<Utc>,
    pub table_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn map_order(row: &Row) -> Order {
    Order {
        order_id: row.get("order_id"),
        order_date: row.get("order_date"),
        table_id: row.get("table_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderItemDetail>,
    pub total_amount: f64,
}

impl OrderDetail {
    pub fn new(order: Order, order_items: Vec<OrderItemDetail>) -> Self {
        let total_amount = order_item::total_amount(&order_items);
        OrderDetail {
            order,
            order_items,
            total_amount,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewOrderLine {
    pub food_id: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub order_date: Option<DateTime<Utc>>,
    pub table_id: Option<String>,
    #[serde(default)]
    pub order_items: Vec<NewOrderLine>,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.order_items.is_empty() {
            return Err(AppError::BadRequest(String::from(
                "order_items must contain at least one item",
            )));
        }
        for line in &self.order_items {
            validation::required("food_id", &line.food_id)?;
            validation::positive("quantity", line.quantity)?;
        }
        if let Some(table_id) = &self.table_id {
            validation::required("table_id", table_id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateOrderRequest {
    pub order_date: Option<DateTime<Utc>>,
    pub table_id: Option<String>,
}

impl UpdateOrderRequest {
    pub fn apply_to(self, order: &Order) -> Result<(DateTime<Utc>, Option<String>), AppError> {
        if let Some(table_id) = &self.table_id {
            validation::required("table_id", table_id)?;
        }
        Ok((
            self.order_date.unwrap_or(order.order_date),
            self.table_id.or_else(|| order.table_id.clone()),
        ))
    }
}

pub async fn get_orders(page: Page, client: &Client) -> Result<PaginationResult<Order>, Error> {
    fetch_page(
        client,
        PaginationOptions {
            select_columns: ORDER_COLUMNS,
            base_query: "from orders where deleted_at is null",
            search_columns: vec![],
            search: None,
            order_options: Some("order_date desc"),
            page,
        },
        vec![],
        map_order,
    )
    .await
}

pub async fn get_order_by_id(order_id: &str, client: &Client) -> Result<Option<Order>, Error> {
    let sql = format!(
        "select {ORDER_COLUMNS} from orders where order_id = $1 and deleted_at is null"
    );
    let row = client.query_opt(&sql, &[&order_id]).await?;
    Ok(row.as_ref().map(map_order))
}

pub async fn get_order_detail(
    order_id: &str,
    client: &Client,
) -> Result<Option<OrderDetail>, Error> {
    let order = match get_order_by_id(order_id, client).await? {
        Some(order) => order,
        None => return Ok(None),
    };
    let items = order_item::get_items_for_order(order_id, client).await?;
    Ok(Some(OrderDetail::new(order, items)))
}

pub async fn order_exists(order_id: &str, client: &Client) -> Result<bool, Error> {
    let row = client
        .query_opt(
            "select 1 from orders where order_id = $1 and deleted_at is null",
            &[&order_id],
        )
        .await?;
    Ok(row.is_some())
}

/// Inserts the order and all of its lines in one transaction. Each line is
/// priced from the food's current price; an unknown food or a failed insert
/// rolls back the whole order.
pub async fn create_order(
    data: &CreateOrderRequest,
    client: &mut Client,
) -> Result<OrderDetail, AppError> {
    let order_id = Uuid::new_v4().to_string();
    let order_date = data.order_date.unwrap_or_else(Utc::now);

    let transaction = client.transaction().await?;

    let sql = format!(
        "insert into orders (order_id, order_date, table_id) values ($1, $2, $3) returning {ORDER_COLUMNS}"
    );
    let row = transaction
        .query_one(&sql, &[&order_id, &order_date, &data.table_id])
        .await?;
    let order = map_order(&row);

    let mut items = Vec::with_capacity(data.order_items.len());
    for line in &data.order_items {
        let food = match get_priced_food(&line.food_id, &transaction).await? {
            Some(food) => food,
            None => {
                transaction.rollback().await?;
                return Err(AppError::NotFound(format!(
                    "food_id {} not found",
                    line.food_id
                )));
            }
        };

        let order_item_id = Uuid::new_v4().to_string();
        let inserted = insert_order_item(
            &NewOrderItem {
                order_item_id: &order_item_id,
                order_id: &order_id,
                food_id: &line.food_id,
                quantity: line.quantity,
                unit_price: food.price,
            },
            &transaction,
        )
        .await;

        match inserted {
            Ok(item) => items.push(OrderItemDetail::new(&item, food.name)),
            Err(e) => {
                transaction.rollback().await?;
                return Err(e.into());
            }
        }
    }

    transaction.commit().await?;

    Ok(OrderDetail::new(order, items))
}

pub async fn update_order(
    order_id: &str,
    order_date: DateTime<Utc>,
    table_id: &Option<String>,
    client: &Client,
) -> Result<Order, Error> {
    let sql = format!(
        "update orders set order_date = $1, table_id = $2, updated_at = current_timestamp where order_id = $3 and deleted_at is null returning {ORDER_COLUMNS}"
    );
    let row = client
        .query_one(&sql, &[&order_date, table_id, &order_id])
        .await?;
    Ok(map_order(&row))
}
