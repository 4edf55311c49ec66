use std::sync::Arc;

use actix_web::web;
use tokio::sync::Mutex;
use tokio_postgres::{Client, Error, NoTls};

const SCHEMA: &str = include_str!("../sql/schema.sql");

pub type Db = web::Data<Arc<Mutex<Client>>>;

pub async fn connect(database_url: &str) -> Result<Client, Error> {
    let (client, connection) = tokio_postgres::connect(database_url, NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("Database connection error: {e}");
        }
    });

    Ok(client)
}

pub async fn init_schema(client: &Client) -> Result<(), Error> {
    client.batch_execute(SCHEMA).await
}
