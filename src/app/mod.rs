mod generation_service;
mod observer;

pub use generation_service::GenerationService;
pub use observer::{GenerationObserver, TracingObserver};
