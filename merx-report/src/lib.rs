pub mod engine;
pub mod views;

pub use engine::ReportingEngine;
pub use views::{CustomerOrderCount, OrderDetail};
