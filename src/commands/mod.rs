mod inputs;
pub mod prepare;
mod samplesheet;
mod stage;
mod utils;

pub use stage::SubsamplePolicy;
pub use utils::{copy_file, same_file};
