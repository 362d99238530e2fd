//! Product entity - An item listed in the antiques catalog.
//!
//! Products carry a catalog article, a display name, a price and optional imagery.
//! Identifiers are assigned by the store on insert.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Thumbnail image (remote URL or data URL)
    pub photo_url: Option<String>,
    /// Main gallery image (remote URL or data URL)
    pub main_image: Option<String>,
    /// Catalog article number, e.g. "A-1024"
    pub article: String,
    /// Display name
    pub name: String,
    /// Price; always greater than zero
    pub price: f64,
    /// Identifier of the category this product is shown under
    pub category: Option<String>,
    /// Position within listings, ascending
    pub sort_order: Option<i32>,
    /// Free-form description
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Whether the storefront shows this product
    pub is_visible: bool,
    /// When the product was created
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
