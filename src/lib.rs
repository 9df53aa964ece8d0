pub mod classifiers;
pub mod config;
pub mod core;
pub mod errors;
pub mod evaluation;
pub mod loaders;
pub mod pipeline;
pub mod preprocessing;
pub mod tasks;
pub mod ui;
pub mod utils;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
