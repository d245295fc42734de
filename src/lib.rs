pub mod catalog;
pub mod core;
pub mod prompt;
pub mod providers;
pub mod registry;
pub mod runtime;
pub mod transport;

pub use crate::core::types::*;
pub use runtime::{TranslationRuntime, TranslationRuntimeBuilder};
