pub mod customer;
pub mod directory;
pub mod repository;

pub use customer::{Customer, NewCustomer};
pub use directory::CustomerDirectory;
pub use repository::CustomerRepository;
