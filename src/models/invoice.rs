use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::{Client, Error, Row};

use crate::{
    error::AppError,
    models::order_item::{self, OrderItemDetail},
    utils::{
        common_struct::PaginationResult,
        pagination::Page,
        sql::{fetch_page, PaginationOptions},
        validation,
    },
};

const INVOICE_COLUMNS: &str =
    "invoice_id, order_id, payment_method, payment_status, payment_due_date, created_at, updated_at";

pub const PAYMENT_METHODS: [&str; 2] = ["CARD", "CASH"];
pub const PAYMENT_STATUSES: [&str; 2] = ["PENDING", "PAID"];

#[derive(Debug, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: String,
    pub order_id: String,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub payment_due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn map_invoice(row: &Row) -> Invoice {
    Invoice {
        invoice_id: row.get("invoice_id"),
        order_id: row.get("order_id"),
        payment_method: row.get("payment_method"),
        payment_status: row.get("payment_status"),
        payment_due_date: row.get("payment_due_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Invoice together with what is owed for its order.
#[derive(Debug, Serialize)]
pub struct InvoiceView {
    pub invoice_id: String,
    pub order_id: String,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub payment_due_date: DateTime<Utc>,
    pub table_number: Option<i32>,
    pub order_details: Vec<OrderItemDetail>,
    pub total_amount_due: f64,
}

impl InvoiceView {
    pub fn new(
        invoice: Invoice,
        table_number: Option<i32>,
        order_details: Vec<OrderItemDetail>,
    ) -> Self {
        let total_amount_due = order_item::total_amount(&order_details);
        InvoiceView {
            invoice_id: invoice.invoice_id,
            order_id: invoice.order_id,
            payment_method: invoice.payment_method,
            payment_status: invoice.payment_status,
            payment_due_date: invoice.payment_due_date,
            table_number,
            order_details,
            total_amount_due,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct InvoiceRequest {
    pub order_id: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub payment_due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq)]
pub struct InvoiceValues {
    pub order_id: String,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub payment_due_date: DateTime<Utc>,
}

impl InvoiceRequest {
    pub fn into_new(self, now: DateTime<Utc>) -> Result<InvoiceValues, AppError> {
        let values = InvoiceValues {
            order_id: self.order_id.unwrap_or_default(),
            payment_method: normalize_method(self.payment_method),
            payment_status: self
                .payment_status
                .map(|s| s.trim().to_ascii_uppercase())
                .unwrap_or_else(|| String::from("PENDING")),
            payment_due_date: self.payment_due_date.unwrap_or(now + Duration::days(1)),
        };
        values.validate()?;
        Ok(values)
    }

    pub fn apply_to(self, invoice: &Invoice) -> Result<InvoiceValues, AppError> {
        let values = InvoiceValues {
            order_id: self.order_id.unwrap_or_else(|| invoice.order_id.clone()),
            payment_method: normalize_method(self.payment_method)
                .or_else(|| invoice.payment_method.clone()),
            payment_status: self
                .payment_status
                .map(|s| s.trim().to_ascii_uppercase())
                .unwrap_or_else(|| invoice.payment_status.clone()),
            payment_due_date: self.payment_due_date.unwrap_or(invoice.payment_due_date),
        };
        values.validate()?;
        Ok(values)
    }
}

/// Blank methods count as "not chosen yet".
fn normalize_method(method: Option<String>) -> Option<String> {
    method
        .map(|m| m.trim().to_ascii_uppercase())
        .filter(|m| !m.is_empty())
}

impl InvoiceValues {
    fn validate(&self) -> Result<(), AppError> {
        validation::required("order_id", &self.order_id)?;
        if let Some(method) = &self.payment_method {
            validation::one_of("payment_method", method, &PAYMENT_METHODS)?;
        }
        validation::one_of("payment_status", &self.payment_status, &PAYMENT_STATUSES)
    }
}

pub async fn get_invoices(page: Page, client: &Client) -> Result<PaginationResult<Invoice>, Error> {
    fetch_page(
        client,
        PaginationOptions {
            select_columns: INVOICE_COLUMNS,
            base_query: "from invoices where deleted_at is null",
            search_columns: vec![],
            search: None,
            order_options: Some("created_at desc"),
            page,
        },
        vec![],
        map_invoice,
    )
    .await
}

pub async fn get_invoice_by_id(
    invoice_id: &str,
    client: &Client,
) -> Result<Option<Invoice>, Error> {
    let sql = format!(
        "select {INVOICE_COLUMNS} from invoices where invoice_id = $1 and deleted_at is null"
    );
    let row = client.query_opt(&sql, &[&invoice_id]).await?;
    Ok(row.as_ref().map(map_invoice))
}

pub async fn get_invoice_view(
    invoice_id: &str,
    client: &Client,
) -> Result<Option<InvoiceView>, Error> {
    let invoice = match get_invoice_by_id(invoice_id, client).await? {
        Some(invoice) => invoice,
        None => return Ok(None),
    };

    let table_number: Option<i32> = client
        .query_opt(
            "select t.table_number from orders o join tables t on t.table_id = o.table_id where o.order_id = $1 and t.deleted_at is null",
            &[&invoice.order_id],
        )
        .await?
        .map(|row| row.get("table_number"));

    let items = order_item::get_items_for_order(&invoice.order_id, client).await?;

    Ok(Some(InvoiceView::new(invoice, table_number, items)))
}

pub async fn add_invoice(
    invoice_id: &str,
    data: &InvoiceValues,
    client: &Client,
) -> Result<Invoice, Error> {
    let sql = format!(
        "insert into invoices (invoice_id, order_id, payment_method, payment_status, payment_due_date) values ($1, $2, $3, $4, $5) returning {INVOICE_COLUMNS}"
    );
    let row = client
        .query_one(
            &sql,
            &[
                &invoice_id,
                &data.order_id,
                &data.payment_method,
                &data.payment_status,
                &data.payment_due_date,
            ],
        )
        .await?;
    Ok(map_invoice(&row))
}

pub async fn update_invoice(
    invoice_id: &str,
    data: &InvoiceValues,
    client: &Client,
) -> Result<Invoice, Error> {
    let sql = format!(
        "update invoices set order_id = $1, payment_method = $2, payment_status = $3, payment_due_date = $4, updated_at = current_timestamp where invoice_id = $5 and deleted_at is null returning {INVOICE_COLUMNS}"
    );
    let row = client
        .query_one(
            &sql,
            &[
                &data.order_id,
                &data.payment_method,
                &data.payment_status,
                &data.payment_due_date,
                &invoice_id,
            ],
        )
        .await?;
    Ok(map_invoice(&row))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn create_applies_defaults() {
        let values = InvoiceRequest {
            order_id: Some(String::from("o-1")),
            ..Default::default()
        }
        .into_new(now())
        .unwrap();
        assert_eq!(values.payment_status, "PENDING");
        assert_eq!(values.payment_method, None);
        assert_eq!(values.payment_due_date, now() + Duration::days(1));
    }

    #[test]
    fn payment_fields_are_normalized_and_checked() {
        let values = InvoiceRequest {
            order_id: Some(String::from("o-1")),
            payment_method: Some(String::from("card")),
            payment_status: Some(String::from("paid")),
            payment_due_date: None,
        }
        .into_new(now())
        .unwrap();
        assert_eq!(values.payment_method.as_deref(), Some("CARD"));
        assert_eq!(values.payment_status, "PAID");

        let err = InvoiceRequest {
            order_id: Some(String::from("o-1")),
            payment_method: Some(String::from("cheque")),
            ..Default::default()
        }
        .into_new(now())
        .unwrap_err();
        assert_eq!(err.to_string(), "payment_method must be one of: CARD, CASH");
    }

    #[test]
    fn order_id_is_required() {
        let err = InvoiceRequest::default().into_new(now()).unwrap_err();
        assert_eq!(err.to_string(), "order_id is required");
    }

    #[test]
    fn view_totals_the_order() {
        let invoice = Invoice {
            invoice_id: String::from("i-1"),
            order_id: String::from("o-1"),
            payment_method: None,
            payment_status: String::from("PENDING"),
            payment_due_date: now(),
            created_at: now(),
            updated_at: now(),
        };
        let line = |amount: f64| OrderItemDetail {
            order_item_id: String::from("oi"),
            food_id: String::from("f"),
            food_name: String::from("Tea"),
            quantity: 1,
            unit_price: amount,
            amount,
        };
        let view = InvoiceView::new(invoice, Some(4), vec![line(3.5), line(6.25)]);
        assert_eq!(view.total_amount_due, 9.75);
        assert_eq!(view.table_number, Some(4));
    }
}
