use std::{io, sync::Arc};

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tokio::sync::Mutex;

use tablesync::{api, config::Config, database};

fn to_io_error<E: std::fmt::Display>(err: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::load().map_err(to_io_error)?;
    let client = database::connect(&config.database_url)
        .await
        .map_err(to_io_error)?;
    database::init_schema(&client).await.map_err(to_io_error)?;

    let port = config.port;
    let db = web::Data::new(Arc::new(Mutex::new(client)));
    let config = web::Data::new(config);

    api::log_routes();
    log::info!("Listening on 0.0.0.0:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .app_data(api::json_config())
            .app_data(api::query_config())
            .app_data(db.clone())
            .app_data(config.clone())
            .configure(api::init)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
