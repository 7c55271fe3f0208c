//! HTTP boundary: turns request bodies into generation calls and generation
//! errors into status codes and JSON bodies.

mod routes;
mod serve;

pub use routes::{ApiError, router};
pub use serve::{ServeHandle, serve};
