pub mod catalog;
pub mod product;
pub mod repository;

pub use catalog::Catalog;
pub use product::{NewProduct, Product};
pub use repository::ProductRepository;
