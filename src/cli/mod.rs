mod cli;
mod input;
mod summary;
mod workflow;

pub use cli::Invocation;
pub use input::InputOptions;
pub use summary::PipelineOptions;
pub use workflow::{GeneralOptions, WorkflowOptions};
