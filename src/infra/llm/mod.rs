mod dispatcher;
pub(crate) mod env;
mod model_registry;
mod prompt_builder;
mod provider;
mod provider_shape;
pub mod response_parsing;

pub use dispatcher::{DEFAULT_TIMEOUT, Dispatcher};
pub use model_registry::{ModelEndpoint, ModelRegistry};
pub use prompt_builder::{GenerationParams, PromptBuilder};
pub use provider::CodeGenerator;
pub use provider_shape::ResponseShape;
