mod exported;
mod pipeline;

pub use exported::{configured_pipeline, exported_pipeline};
pub use pipeline::Pipeline;
