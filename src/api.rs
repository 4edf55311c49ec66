mod food;
mod invoice;
mod menu;
mod note;
mod order;
mod order_item;
mod table;
mod user;

use std::fmt::Display;

use actix_web::{web, HttpRequest};

use crate::error::AppError;

/// Every registered route as `(method, path)`.
pub const ROUTES: &[(&str, &str)] = &[
    ("POST", "/users/signup"),
    ("POST", "/users/login"),
    ("GET", "/users"),
    ("GET", "/users/{user_id}"),
    ("GET", "/foods"),
    ("GET", "/foods/{food_id}"),
    ("POST", "/foods"),
    ("PATCH", "/foods/{food_id}"),
    ("GET", "/menus"),
    ("GET", "/menus/{menu_id}"),
    ("POST", "/menus"),
    ("PATCH", "/menus/{menu_id}"),
    ("GET", "/table"),
    ("GET", "/table/{table_id}"),
    ("POST", "/table"),
    ("PATCH", "/table/{table_id}"),
    ("GET", "/orders"),
    ("GET", "/orders/{order_id}"),
    ("GET", "/orders/{order_id}/items"),
    ("POST", "/orders"),
    ("PATCH", "/orders/{order_id}"),
    ("GET", "/orderItems"),
    ("GET", "/orderItems/{order_item_id}"),
    ("POST", "/orderItems"),
    ("PATCH", "/orderItems/{order_item_id}"),
    ("GET", "/invoices"),
    ("GET", "/invoices/{invoice_id}"),
    ("POST", "/invoices"),
    ("PATCH", "/invoices/{invoice_id}"),
    ("GET", "/notes"),
    ("GET", "/notes/{note_id}"),
    ("POST", "/notes"),
    ("PATCH", "/notes/{note_id}"),
];

const GROUP_ORDER: [&str; 8] = [
    "users",
    "foods",
    "menus",
    "table",
    "orders",
    "orderItems",
    "invoices",
    "notes",
];

fn resource_of(path: &str) -> &str {
    path.trim_start_matches('/').split('/').next().unwrap_or_default()
}

/// Groups routes by their leading path segment in the fixed resource order;
/// unknown resources follow as "others".
pub fn grouped_routes(routes: &[(&'static str, &'static str)]) -> Vec<(&'static str, Vec<String>)> {
    let mut groups: Vec<(&'static str, Vec<String>)> =
        GROUP_ORDER.iter().map(|name| (*name, vec![])).collect();
    let mut others = vec![];

    for (method, path) in routes {
        let line = format!("{method} {path}");
        match groups.iter_mut().find(|(name, _)| *name == resource_of(path)) {
            Some((_, lines)) => lines.push(line),
            None => others.push(line),
        }
    }

    groups.push(("others", others));
    groups.retain(|(_, lines)| !lines.is_empty());
    groups
}

pub fn log_routes() {
    for (group, lines) in grouped_routes(ROUTES) {
        log::info!("[{group}]");
        for line in lines {
            log::info!("    {line}");
        }
    }
}

fn reject_payload<E: Display>(err: E, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// JSON bodies that fail to parse answer 400 in the common envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(reject_payload)
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(reject_payload)
}

pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.service(user::sign_up);
    cfg.service(user::login);
    cfg.service(user::get_users);
    cfg.service(user::get_user);

    cfg.service(food::get_foods);
    cfg.service(food::get_food);
    cfg.service(food::add_food);
    cfg.service(food::update_food);

    cfg.service(menu::get_menus);
    cfg.service(menu::get_menu);
    cfg.service(menu::create_menu);
    cfg.service(menu::update_menu);

    cfg.service(table::get_tables);
    cfg.service(table::get_table);
    cfg.service(table::create_table);
    cfg.service(table::update_table);

    cfg.service(order::get_orders);
    cfg.service(order::get_items_by_order);
    cfg.service(order::get_order);
    cfg.service(order::create_order);
    cfg.service(order::update_order);

    cfg.service(order_item::get_order_items);
    cfg.service(order_item::get_order_item);
    cfg.service(order_item::create_order_item);
    cfg.service(order_item::update_order_item);

    cfg.service(invoice::get_invoices);
    cfg.service(invoice::get_invoice);
    cfg.service(invoice::create_invoice);
    cfg.service(invoice::update_invoice);

    cfg.service(note::get_notes);
    cfg.service(note::get_note);
    cfg.service(note::create_note);
    cfg.service(note::update_note);
}

#[cfg(test)]
mod tests {
    use actix_web::{
        http::{header::AUTHORIZATION, Method, StatusCode},
        test, App,
    };

    use super::*;
    use crate::{config::Config, models::role::Role, utils::jwt::generate_all_tokens};

    fn bearer(role: Role) -> String {
        let config = Config::for_tests();
        let pair = generate_all_tokens("staff@example.com", "user-42", role, &config).unwrap();
        format!("Bearer {}", pair.token)
    }

    // No database is registered: requests that get past routing and
    // middleware fail in extraction, never with 404.
    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(Config::for_tests()))
                    .app_data(json_config())
                    .app_data(query_config())
                    .configure(init),
            )
            .await
        };
    }

    fn concrete(path: &str) -> String {
        path.split('/')
            .map(|segment| if segment.starts_with('{') { "abc" } else { segment })
            .collect::<Vec<_>>()
            .join("/")
    }

    #[actix_web::test]
    async fn every_listed_route_is_registered() {
        let app = app!();
        for (method, path) in ROUTES {
            let req = test::TestRequest::default()
                .method(Method::from_bytes(method.as_bytes()).unwrap())
                .uri(&concrete(path))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_ne!(resp.status(), StatusCode::NOT_FOUND, "{method} {path}");
        }

        let req = test::TestRequest::get().uri("/kitchen").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn admin_routes_refuse_regular_users() {
        let app = app!();
        for (method, path) in [("POST", "/foods"), ("POST", "/invoices"), ("GET", "/users")] {
            let req = test::TestRequest::default()
                .method(Method::from_bytes(method.as_bytes()).unwrap())
                .uri(path)
                .insert_header((AUTHORIZATION, bearer(Role::User)))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{method} {path}");

            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["message"], "unauthorized");
        }
    }

    #[actix_web::test]
    async fn resource_routes_require_a_token() {
        let app = app!();
        let req = test::TestRequest::get().uri("/orders").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "No authorization header");
    }

    #[actix_web::test]
    async fn malformed_body_is_a_bad_request() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/foods")
            .insert_header((AUTHORIZATION, bearer(Role::Admin)))
            .insert_header(("content-type", "text/plain"))
            .set_payload("name=Ramen")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 400);
    }

    #[actix_web::test]
    async fn malformed_query_is_a_bad_request() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/foods?page=1&page=2")
            .insert_header((AUTHORIZATION, bearer(Role::User)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 400);
    }

    #[::core::prelude::v1::test]
    fn routes_are_grouped_in_resource_order() {
        let groups = grouped_routes(ROUTES);
        let names: Vec<&str> = groups.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["users", "foods", "menus", "table", "orders", "orderItems", "invoices", "notes"]
        );
        assert_eq!(groups[0].1[0], "POST /users/signup");
        assert_eq!(groups[4].1.len(), 5);
    }

    #[::core::prelude::v1::test]
    fn unknown_resources_go_last() {
        let groups = grouped_routes(&[("GET", "/health"), ("GET", "/notes")]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "notes");
        assert_eq!(groups[1], ("others", vec![String::from("GET /health")]));
    }

    #[::core::prelude::v1::test]
    fn every_route_belongs_to_a_known_resource() {
        let total: usize = grouped_routes(ROUTES)
            .iter()
            .filter(|(name, _)| *name != "others")
            .map(|(_, lines)| lines.len())
            .sum();
        assert_eq!(total, ROUTES.len());
    }
}
