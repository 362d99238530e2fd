//! Product business logic - Handles all catalog product operations.
//!
//! This module lists, fetches, creates, partially updates and deletes products. Updates go
//! through the shared partial update builder with the product rule table below; the
//! visibility toggle reuses the same path with a one-column table. All functions are
//! async and return Result types for proper error handling throughout the system.

use crate::{
    core::{
        fields::{self, Payload},
        update::{FieldRule, PartialUpdate, ValueKind, apply_partial_update},
    },
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

impl PartialUpdate for Product {
    const RESOURCE: &'static str = "Product";

    const RULES: &'static [FieldRule] = &[
        FieldRule::present("photo_url", ValueKind::Text),
        FieldRule::present("main_image", ValueKind::Text),
        FieldRule::truthy("article", ValueKind::Text),
        FieldRule::truthy("name", ValueKind::Text),
        FieldRule::positive("price"),
        FieldRule::truthy("category", ValueKind::Text),
        FieldRule::present("sort_order", ValueKind::Integer),
        FieldRule::present("description", ValueKind::Text),
        FieldRule::present("is_visible", ValueKind::Bool),
    ];
}

/// Rule table for the visibility toggle.
pub const VISIBILITY_RULES: &[FieldRule] = &[FieldRule::present("is_visible", ValueKind::Bool)];

/// Fields accepted when creating a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub photo_url: Option<String>,
    pub main_image: Option<String>,
    pub article: String,
    pub name: String,
    pub price: f64,
    pub category: Option<String>,
    pub sort_order: i32,
    pub description: Option<String>,
    pub is_visible: bool,
}

impl NewProduct {
    /// Minimal product with the three required fields and defaults for the rest.
    #[must_use]
    pub fn new(article: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            photo_url: None,
            main_image: None,
            article: article.into(),
            name: name.into(),
            price,
            category: None,
            sort_order: 0,
            description: None,
            is_visible: true,
        }
    }

    /// Reads a create request body.
    ///
    /// # Errors
    /// Returns a validation error when `article` or `name` is blank, when `price` is
    /// missing or not greater than zero, or when a field has the wrong JSON type.
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        let article = fields::text(payload, "article")?.unwrap_or_default();
        let name = fields::text(payload, "name")?.unwrap_or_default();
        let price = fields::number(payload, "price")?.unwrap_or(0.0);

        if article.trim().is_empty() || name.trim().is_empty() || price <= 0.0 {
            return Err(Error::validation(
                "Fields article, name and price > 0 are required",
            ));
        }

        Ok(Self {
            photo_url: fields::text(payload, "photo_url")?,
            main_image: fields::text(payload, "main_image")?,
            category: fields::text(payload, "category")?,
            sort_order: fields::integer(payload, "sort_order")?.unwrap_or(0),
            description: fields::text(payload, "description")?,
            is_visible: fields::flag(payload, "is_visible")?.unwrap_or(true),
            ..Self::new(article.trim(), name.trim(), price)
        })
    }
}

/// Retrieves every product, ordered by sort position and then newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::SortOrder)
        .order_by_desc(product::Column::CreatedAt)
        .order_by_desc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product, stamping its creation time.
///
/// # Errors
/// Returns an error if:
/// - The article or name is empty or whitespace-only
/// - The price is not greater than zero or not finite (NaN, infinity)
/// - The database insert operation fails
#[instrument(skip(db, new_product), fields(article = %new_product.article))]
pub async fn create_product(
    db: &DatabaseConnection,
    new_product: NewProduct,
) -> Result<product::Model> {
    if new_product.article.trim().is_empty() || new_product.name.trim().is_empty() {
        return Err(Error::validation("Product article and name cannot be empty"));
    }
    if new_product.price <= 0.0 || !new_product.price.is_finite() {
        return Err(Error::validation("Product price must be greater than zero"));
    }

    let product = product::ActiveModel {
        photo_url: Set(new_product.photo_url),
        main_image: Set(new_product.main_image),
        article: Set(new_product.article),
        name: Set(new_product.name),
        price: Set(new_product.price),
        category: Set(new_product.category),
        sort_order: Set(Some(new_product.sort_order)),
        description: Set(new_product.description),
        is_visible: Set(new_product.is_visible),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };
    let created = product.insert(db).await?;
    info!(id = created.id, "Product created");
    Ok(created)
}

/// Applies the supplied fields of `payload` to an existing product.
///
/// # Errors
/// Returns an error if:
/// - No field in the payload qualifies for the update
/// - The product does not exist
/// - The database update operation fails
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    payload: &Payload,
) -> Result<product::Model> {
    apply_partial_update::<Product>(db, product_id.into(), Product::RULES, payload).await
}

/// Shows or hides a product on the storefront.
///
/// # Errors
/// Returns an error if `is_visible` is missing or not a boolean, if the product does
/// not exist, or if the database update operation fails.
pub async fn set_product_visibility(
    db: &DatabaseConnection,
    product_id: i64,
    payload: &Payload,
) -> Result<product::Model> {
    if fields::flag(payload, "is_visible")?.is_none() {
        return Err(Error::validation("Field 'is_visible' is required"));
    }
    apply_partial_update::<Product>(db, product_id.into(), VISIBILITY_RULES, payload).await
}

/// Permanently removes a product and returns its ID.
///
/// # Errors
/// Returns an error if the product does not exist or the delete fails.
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<i64> {
    let result = Product::delete_by_id(product_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found(Product::RESOURCE));
    }
    info!("Product deleted");
    Ok(product_id)
}
