pub mod auth;
pub mod response;

pub use auth::{api_key_middleware, verify_api_key, API_KEY_HEADER};
pub use response::{ApiResponse, ApiResult};
