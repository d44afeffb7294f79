//! Normalization and filtering engine

mod filter;
mod magnet;
mod normalize;

pub use filter::{apply_smart_filter, SmartFilter};
pub use normalize::build_result_set;
