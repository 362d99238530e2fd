//! Entity module - Contains all SeaORM entity definitions for the storefront tables.
//! Each entity has a Model struct for data and an Entity struct for operations.
//! The records are flat; no relations are enforced at this layer.

pub mod category;
pub mod news;
pub mod product;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use news::{Column as NewsColumn, Entity as News, Model as NewsModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
