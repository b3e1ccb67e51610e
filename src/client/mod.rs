pub mod http_client;
pub mod interceptor;
pub mod request;

pub use http_client::ApiClient;
pub use request::{ApiRequest, ApiResponse, RequestAttempt};
