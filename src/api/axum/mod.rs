mod error;
mod handlers;
mod middleware;
mod routes;

pub use error::AppError;
pub use middleware::{REQUEST_ID_HEADER, RequestId, handle_panic, request_logger};
pub use routes::{AppState, app, page_routes};
