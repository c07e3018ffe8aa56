pub mod ledger;
pub mod models;
pub mod repository;

pub use ledger::OrderLedger;
pub use models::{NewOrderItem, Order, OrderItem, OrderLine};
pub use repository::OrderRepository;
