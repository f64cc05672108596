pub mod diy;
pub mod domain;

mod classes;
mod engine;
mod filter;
mod insights;
mod pricing;
mod severity;
mod zones;

pub use classes::{clean_label, is_hard_class, normalize_class};
pub use engine::{EstimateEngine, EstimatorConfig};
