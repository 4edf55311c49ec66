use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::{Client, Error, Row};

use crate::{
    error::AppError,
    models::role::Role,
    utils::{
        common_struct::PaginationResult,
        pagination::Page,
        sql::{fetch_page, PaginationOptions},
        validation,
    },
};

const USER_COLUMNS: &str =
    "user_id, first_name, last_name, email, avatar, phone, role, created_at, updated_at";

/// Public view of a user. Password and stored tokens never leave the
/// database layer.
#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub phone: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn map_user(row: &Row) -> User {
    User {
        user_id: row.get("user_id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        avatar: row.get("avatar"),
        phone: row.get("phone"),
        role: row.get("role"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub struct UserCredentials {
    pub user: User,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl SignUpRequest {
    /// Returns the requested role, USER when none is given.
    pub fn validate(&self) -> Result<Role, AppError> {
        validation::email("email", &self.email)?;
        validation::max_length("email", &self.email, 255)?;
        validation::min_length("password", &self.password, 8)?;
        validation::length("first_name", &self.first_name, 2, 100)?;
        validation::length("last_name", &self.last_name, 2, 100)?;
        validation::required("phone", &self.phone)?;
        validation::max_length("phone", &self.phone, 32)?;
        if let Some(avatar) = &self.avatar {
            validation::max_length("avatar", avatar, 512)?;
        }
        match self.role.as_deref() {
            None => Ok(Role::User),
            Some(role) => role.parse::<Role>().map_err(AppError::BadRequest),
        }
    }
}

/// An ADMIN account can only be created by an authenticated admin, or by the
/// configured bootstrap email.
pub fn signup_role(
    requested: Role,
    email: &str,
    caller_is_admin: bool,
    admin_email: Option<&str>,
) -> Result<Role, AppError> {
    if requested != Role::Admin || caller_is_admin {
        return Ok(requested);
    }
    match admin_email {
        Some(admin) if admin.eq_ignore_ascii_case(email.trim()) => Ok(Role::Admin),
        _ => Err(AppError::Unauthorized(String::from(
            "only an admin can create an admin account",
        ))),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub struct NewUser<'a> {
    pub user_id: &'a str,
    pub request: &'a SignUpRequest,
    pub role: Role,
    pub hashed_password: &'a str,
    pub token: &'a str,
    pub refresh_token: &'a str,
}

pub async fn get_users(
    search: Option<&str>,
    page: Page,
    client: &Client,
) -> Result<PaginationResult<User>, Error> {
    fetch_page(
        client,
        PaginationOptions {
            select_columns: USER_COLUMNS,
            base_query: "from users where deleted_at is null",
            search_columns: vec!["first_name", "last_name", "email"],
            search,
            order_options: Some("created_at desc"),
            page,
        },
        vec![],
        map_user,
    )
    .await
}

pub async fn get_user_by_id(user_id: &str, client: &Client) -> Result<Option<User>, Error> {
    let sql = format!("select {USER_COLUMNS} from users where user_id = $1 and deleted_at is null");
    let row = client.query_opt(&sql, &[&user_id]).await?;
    Ok(row.as_ref().map(map_user))
}

pub async fn get_credentials_by_email(
    email: &str,
    client: &Client,
) -> Result<Option<UserCredentials>, Error> {
    let sql = format!(
        "select {USER_COLUMNS}, password from users where lower(email) = lower($1) and deleted_at is null"
    );
    let row = client.query_opt(&sql, &[&email.trim()]).await?;
    Ok(row.map(|row| UserCredentials {
        user: map_user(&row),
        password: row.get("password"),
    }))
}

pub async fn email_or_phone_taken(
    email: &str,
    phone: &str,
    client: &Client,
) -> Result<bool, Error> {
    let row = client
        .query_one(
            "select count(*) as total from users where (lower(email) = lower($1) or phone = $2) and deleted_at is null",
            &[&email.trim(), &phone.trim()],
        )
        .await?;
    let total: i64 = row.get("total");
    Ok(total > 0)
}

pub async fn add_user(data: &NewUser<'_>, client: &Client) -> Result<User, Error> {
    let req = data.request;
    let sql = format!(
        "insert into users (user_id, first_name, last_name, email, password, avatar, phone, role, token, refresh_token) values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) returning {USER_COLUMNS}"
    );
    let row = client
        .query_one(
            &sql,
            &[
                &data.user_id,
                &req.first_name.trim(),
                &req.last_name.trim(),
                &req.email.trim(),
                &data.hashed_password,
                &req.avatar.as_deref().map(str::trim),
                &req.phone.trim(),
                &data.role.as_str(),
                &data.token,
                &data.refresh_token,
            ],
        )
        .await?;
    Ok(map_user(&row))
}

pub async fn update_tokens(
    user_id: &str,
    token: &str,
    refresh_token: &str,
    client: &Client,
) -> Result<(), Error> {
    client
        .execute(
            "update users set token = $1, refresh_token = $2, updated_at = current_timestamp where user_id = $3",
            &[&token, &refresh_token, &user_id],
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SignUpRequest {
        SignUpRequest {
            email: String::from("host@example.com"),
            password: String::from("Passw0rd!"),
            first_name: String::from("Ada"),
            last_name: String::from("Lovelace"),
            phone: String::from("+1234567890"),
            avatar: None,
            role: None,
        }
    }

    #[test]
    fn role_defaults_to_user() {
        assert_eq!(request().validate().unwrap(), Role::User);

        let mut req = request();
        req.role = Some(String::from("admin"));
        assert_eq!(req.validate().unwrap(), Role::Admin);
    }

    #[test]
    fn public_signup_cannot_claim_admin() {
        let err = signup_role(Role::Admin, "host@example.com", false, None).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let bootstrap = Some("owner@example.com");
        let err = signup_role(Role::Admin, "host@example.com", false, bootstrap).unwrap_err();
        assert_eq!(err.to_string(), "only an admin can create an admin account");

        assert_eq!(
            signup_role(Role::User, "host@example.com", false, None).unwrap(),
            Role::User
        );
    }

    #[test]
    fn admin_signup_by_admin_or_bootstrap_email() {
        assert_eq!(
            signup_role(Role::Admin, "host@example.com", true, None).unwrap(),
            Role::Admin
        );
        let bootstrap = Some("owner@example.com");
        assert_eq!(
            signup_role(Role::Admin, " Owner@Example.com ", false, bootstrap).unwrap(),
            Role::Admin
        );
    }

    #[test]
    fn fields_fit_their_columns() {
        let mut req = request();
        req.phone = "9".repeat(40);
        assert_eq!(req.validate().unwrap_err().to_string(), "phone must be at most 32 characters");

        let mut req = request();
        req.avatar = Some(format!("https://cdn.example.com/{}", "a".repeat(500)));
        assert_eq!(
            req.validate().unwrap_err().to_string(),
            "avatar must be at most 512 characters"
        );

        let mut req = request();
        req.email = format!("{}@example.com", "a".repeat(250));
        assert_eq!(req.validate().unwrap_err().to_string(), "email must be at most 255 characters");
    }

    #[test]
    fn signup_rules() {
        let mut req = request();
        req.password = String::from("short");
        assert!(req.validate().is_err());

        let mut req = request();
        req.first_name = String::from("A");
        assert!(req.validate().is_err());

        let mut req = request();
        req.role = Some(String::from("chef"));
        assert_eq!(req.validate().unwrap_err().to_string(), "role must be ADMIN or USER");

        let mut req = request();
        req.phone = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn user_serialization_has_no_secrets() {
        let user = User {
            user_id: String::from("u-1"),
            first_name: String::from("Ada"),
            last_name: String::from("Lovelace"),
            email: String::from("host@example.com"),
            avatar: None,
            phone: String::from("+1"),
            role: String::from("ADMIN"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("token").is_none());
        assert!(json.get("refresh_token").is_none());
    }
}
