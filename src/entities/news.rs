//! News entity - Announcements shown in the storefront carousel and news pages.
//!
//! `updated_at` is refreshed on every update; unpublished items are hidden from
//! the default listing.

use sea_orm::{FromQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// News database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "news")]
pub struct Model {
    /// Unique identifier for the news item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Headline
    pub title: String,
    /// Short teaser shown in listings
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Cover image (remote URL or data URL)
    #[sea_orm(column_type = "Text", nullable)]
    pub image_url: Option<String>,
    /// Full article body
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,
    /// When the item was created
    pub created_at: DateTime,
    /// When the item was last modified
    pub updated_at: DateTime,
    /// Whether the item appears in the default listing
    pub published: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Listing projection: everything except the article body and modification time.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct Summary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime,
    pub published: bool,
}
