pub mod common_struct;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod sql;
pub mod validation;
