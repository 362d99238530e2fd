//! Category entity - A catalog section. Identifiers are slugs chosen by the client.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Identifier of the catch-all category that can never be deleted.
pub const RESERVED_CATEGORY_ID: &str = "all";

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Client-supplied slug, e.g. "furniture"
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Icon name rendered by the storefront
    pub icon: String,
    /// Position within listings, ascending
    pub sort_order: Option<i32>,
}

/// `Category` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
