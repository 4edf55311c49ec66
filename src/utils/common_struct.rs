use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct BaseResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Serialize, Debug)]
pub struct DataResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

#[derive(Serialize, Debug)]
pub struct PaginationResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub page_counts: i64,
}

pub struct PaginationResult<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub page_counts: i64,
}

impl<T> PaginationResult<T> {
    pub fn into_response(self, message: &str) -> PaginationResponse<T> {
        PaginationResponse {
            code: 200,
            message: String::from(message),
            data: self.data,
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            page_counts: self.page_counts,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn ok(message: &str, data: T) -> Self {
        DataResponse {
            code: 200,
            message: String::from(message),
            data: Some(data),
        }
    }

    pub fn created(message: &str, data: T) -> Self {
        DataResponse {
            code: 201,
            message: String::from(message),
            data: Some(data),
        }
    }
}
