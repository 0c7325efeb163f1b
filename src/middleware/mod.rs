mod error_handler;
mod rate_limit;
mod request_log;

pub use error_handler::log_errors;
pub use rate_limit::{client_ip, rate_limit};
pub use request_log::{REQUEST_ID_HEADER, log_requests};
