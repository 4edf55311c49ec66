//! Runs against a real PostgreSQL database named by `TEST_DATABASE_URL`;
//! skipped when the variable is unset.

use std::env;

use tablesync::{
    database,
    error::AppError,
    models::{
        food::{self, FoodValues},
        menu::{self, MenuValues},
        order::{self, CreateOrderRequest, NewOrderLine},
        table::{self, TableValues},
    },
};
use tokio_postgres::Client;
use uuid::Uuid;

async fn setup() -> Option<Client> {
    let url = env::var("TEST_DATABASE_URL").ok()?;
    let client = database::connect(&url).await.expect("connect to test database");
    database::init_schema(&client).await.expect("apply schema");
    Some(client)
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

async fn seed_food(client: &Client, price: f64) -> String {
    let menu_id = new_id();
    menu::add_menu(
        &menu_id,
        &MenuValues {
            name: String::from("Lunch"),
            category: String::from("Main"),
            start_date: None,
            end_date: None,
        },
        client,
    )
    .await
    .unwrap();

    let food_id = new_id();
    food::add_food(
        &food_id,
        &FoodValues {
            name: String::from("Pad Thai"),
            price,
            food_image: String::from("https://img.example/pad-thai.png"),
            menu_id,
        },
        client,
    )
    .await
    .unwrap();
    food_id
}

async fn seed_table(client: &Client) -> String {
    let table_id = new_id();
    table::add_table(
        &table_id,
        &TableValues {
            number_of_guests: 4,
            table_number: 12,
        },
        client,
    )
    .await
    .unwrap();
    table_id
}

async fn orders_for_table(client: &Client, table_id: &str) -> i64 {
    client
        .query_one(
            "select count(*) from orders where table_id = $1",
            &[&table_id],
        )
        .await
        .unwrap()
        .get(0)
}

#[tokio::test]
async fn order_is_created_with_priced_items() {
    let Some(mut client) = setup().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let food_id = seed_food(&client, 12.5).await;
    let table_id = seed_table(&client).await;

    let request = CreateOrderRequest {
        order_date: None,
        table_id: Some(table_id.clone()),
        order_items: vec![NewOrderLine {
            food_id: food_id.clone(),
            quantity: 3,
        }],
    };
    let detail = order::create_order(&request, &mut client).await.unwrap();

    assert_eq!(detail.order_items.len(), 1);
    assert_eq!(detail.order_items[0].unit_price, 12.5);
    assert_eq!(detail.total_amount, 37.5);
    assert_eq!(orders_for_table(&client, &table_id).await, 1);

    let stored = order::get_order_detail(&detail.order.order_id, &client)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.order_items[0].food_name, "Pad Thai");
}

#[tokio::test]
async fn unknown_food_rolls_back_the_whole_order() {
    let Some(mut client) = setup().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let food_id = seed_food(&client, 8.0).await;
    let table_id = seed_table(&client).await;
    let missing = new_id();

    let request = CreateOrderRequest {
        order_date: None,
        table_id: Some(table_id.clone()),
        order_items: vec![
            NewOrderLine {
                food_id,
                quantity: 1,
            },
            NewOrderLine {
                food_id: missing.clone(),
                quantity: 2,
            },
        ],
    };
    let err = order::create_order(&request, &mut client).await.unwrap_err();

    match err {
        AppError::NotFound(message) => assert_eq!(message, format!("food_id {missing} not found")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(orders_for_table(&client, &table_id).await, 0);
}

#[tokio::test]
async fn failed_item_insert_rolls_back_the_whole_order() {
    let Some(mut client) = setup().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let food_id = seed_food(&client, 4.25).await;
    let table_id = seed_table(&client).await;

    // quantity 0 passes the price lookup but violates the column check
    let request = CreateOrderRequest {
        order_date: None,
        table_id: Some(table_id.clone()),
        order_items: vec![
            NewOrderLine {
                food_id: food_id.clone(),
                quantity: 2,
            },
            NewOrderLine {
                food_id,
                quantity: 0,
            },
        ],
    };
    let err = order::create_order(&request, &mut client).await.unwrap_err();

    assert!(matches!(err, AppError::Database(_)), "unexpected error: {err:?}");
    assert_eq!(orders_for_table(&client, &table_id).await, 0);
}
