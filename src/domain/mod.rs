mod errors;
mod generation_contract;
pub mod job_schema;

pub use errors::{ConfigError, ErrorKind, GenerationError};
pub use generation_contract::{DEFAULT_LANGUAGE, DEFAULT_MODEL, GenerationJob, GenerationResult};
pub use job_schema::GenerationJobValidator;
