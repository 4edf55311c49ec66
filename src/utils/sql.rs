use tokio_postgres::{types::ToSql, Client, Error, Row};

use super::{common_struct::PaginationResult, pagination::Page};

pub type Params = Vec<Box<dyn ToSql + Sync>>;

pub struct PaginationOptions<'a> {
    pub select_columns: &'a str,
    /// `from ... where ...` clause; search conditions are appended with `and`.
    pub base_query: &'a str,
    pub search_columns: Vec<&'a str>,
    pub search: Option<&'a str>,
    pub order_options: Option<&'a str>,
    pub page: Page,
}

#[derive(Debug)]
pub struct PaginationQuery {
    pub query: String,
    pub count_query: String,
}

/// Escapes `ilike` wildcards so the search term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn generate_pagination_query(
    options: &PaginationOptions,
    params: &mut Params,
) -> PaginationQuery {
    let mut base_query = options.base_query.to_string();

    if let Some(search) = options.search {
        if !options.search_columns.is_empty() {
            params.push(Box::new(format!("%{}%", escape_like(search))));
            let index = params.len();
            let conditions = options
                .search_columns
                .iter()
                .map(|column| format!("{column} ilike ${index}"))
                .collect::<Vec<String>>()
                .join(" or ");
            base_query = format!("{base_query} and ({conditions})");
        }
    }

    let count_query = format!("select count(*) as total {base_query}");
    let mut query = format!("select {} {base_query}", options.select_columns);
    if let Some(order) = options.order_options {
        query = format!("{query} order by {order}");
    }
    query = format!(
        "{query} limit {} offset {}",
        options.page.limit,
        options.page.offset()
    );

    PaginationQuery { query, count_query }
}

pub async fn fetch_page<T, F>(
    client: &Client,
    options: PaginationOptions<'_>,
    mut params: Params,
    map_row: F,
) -> Result<PaginationResult<T>, Error>
where
    F: Fn(&Row) -> T,
{
    let result = generate_pagination_query(&options, &mut params);
    let params_slice: Vec<&(dyn ToSql + Sync)> = params.iter().map(AsRef::as_ref).collect();

    let row = client.query_one(&result.count_query, &params_slice).await?;
    let total: i64 = row.get("total");

    let data: Vec<T> = client
        .query(&result.query, &params_slice)
        .await?
        .iter()
        .map(map_row)
        .collect();

    Ok(PaginationResult {
        data,
        total,
        page: options.page.page,
        per_page: options.page.limit,
        page_counts: options.page.page_counts(total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options<'a>(search: Option<&'a str>) -> PaginationOptions<'a> {
        PaginationOptions {
            select_columns: "f.food_id, f.name",
            base_query: "from foods f where f.deleted_at is null",
            search_columns: vec!["f.name", "f.food_id"],
            search,
            order_options: Some("f.created_at desc"),
            page: Page { page: 2, limit: 10 },
        }
    }

    #[test]
    fn builds_query_without_search() {
        let mut params: Params = vec![];
        let result = generate_pagination_query(&options(None), &mut params);
        assert!(params.is_empty());
        assert_eq!(
            result.count_query,
            "select count(*) as total from foods f where f.deleted_at is null"
        );
        assert_eq!(
            result.query,
            "select f.food_id, f.name from foods f where f.deleted_at is null order by f.created_at desc limit 10 offset 10"
        );
    }

    #[test]
    fn search_is_bound_after_existing_params() {
        let mut params: Params = vec![Box::new(String::from("menu-1"))];
        let result = generate_pagination_query(&options(Some("soup")), &mut params);
        assert_eq!(params.len(), 2);
        assert!(result
            .count_query
            .ends_with("and (f.name ilike $2 or f.food_id ilike $2)"));
        assert!(result.query.contains("and (f.name ilike $2 or f.food_id ilike $2) order by"));
    }

    #[test]
    fn wildcards_in_search_are_literal() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("soup"), "soup");

        let mut params: Params = vec![];
        generate_pagination_query(&options(Some("%")), &mut params);
        assert_eq!(params.len(), 1);
        assert_eq!(format!("{:?}", params[0]), format!("{:?}", "%\\%%"));
    }
}
