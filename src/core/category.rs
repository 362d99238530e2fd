//! Category business logic.
//!
//! Categories are keyed by a slug the admin chooses. The catch-all `"all"` category
//! is reserved and can never be deleted.

use crate::{
    core::{
        fields::{self, Payload},
        update::{FieldRule, PartialUpdate, ValueKind, apply_partial_update},
    },
    entities::{Category, category},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument, warn};

/// Icon assigned when a create request does not name one.
pub const DEFAULT_ICON: &str = "Circle";

/// Sort position assigned when a create request does not give one.
pub const DEFAULT_SORT_ORDER: i32 = 999;

impl PartialUpdate for Category {
    const RESOURCE: &'static str = "Category";

    const RULES: &'static [FieldRule] = &[
        FieldRule::truthy("name", ValueKind::Text),
        FieldRule::truthy("icon", ValueKind::Text),
        FieldRule::present("sort_order", ValueKind::Integer),
    ];
}

/// Fields accepted when creating a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub sort_order: i32,
}

impl NewCategory {
    /// Reads a create request body, applying the default icon and sort position.
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        let id = fields::text(payload, "id")?.unwrap_or_default();
        let name = fields::text(payload, "name")?.unwrap_or_default();
        if id.trim().is_empty() || name.trim().is_empty() {
            return Err(Error::validation("Fields id and name are required"));
        }

        Ok(Self {
            id: id.trim().to_string(),
            name: name.trim().to_string(),
            icon: fields::text(payload, "icon")?
                .filter(|icon| !icon.is_empty())
                .unwrap_or_else(|| DEFAULT_ICON.to_string()),
            sort_order: fields::integer(payload, "sort_order")?.unwrap_or(DEFAULT_SORT_ORDER),
        })
    }
}

/// Retrieves every category in ascending sort position.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::SortOrder)
        .order_by_asc(category::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a category by its slug.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: &str,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a category under a client-chosen slug.
///
/// # Errors
/// Returns a validation error when the slug or name is blank or the slug is already
/// taken, and a database error if the insert fails.
#[instrument(skip(db, new_category), fields(id = %new_category.id))]
pub async fn create_category(
    db: &DatabaseConnection,
    new_category: NewCategory,
) -> Result<category::Model> {
    if new_category.id.trim().is_empty() || new_category.name.trim().is_empty() {
        return Err(Error::validation("Category id and name cannot be empty"));
    }
    if get_category_by_id(db, &new_category.id).await?.is_some() {
        return Err(Error::validation(format!(
            "Category '{}' already exists",
            new_category.id
        )));
    }

    let category = category::ActiveModel {
        id: Set(new_category.id),
        name: Set(new_category.name),
        icon: Set(new_category.icon),
        sort_order: Set(Some(new_category.sort_order)),
    };
    let created = category.insert(db).await?;
    info!("Category created");
    Ok(created)
}

/// Applies the supplied fields of `payload` to an existing category.
///
/// Empty `name` or `icon` values are ignored rather than clearing the column.
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: &str,
    payload: &Payload,
) -> Result<category::Model> {
    apply_partial_update::<Category>(
        db,
        category_id.to_string().into(),
        Category::RULES,
        payload,
    )
    .await
}

/// Deletes a category and returns its slug.
///
/// # Errors
/// Returns a validation error for the reserved `"all"` category, whether or not it
/// is stored, and a not-found error when no category has that slug.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, category_id: &str) -> Result<String> {
    if category_id == category::RESERVED_CATEGORY_ID {
        warn!("Refusing to delete the reserved category");
        return Err(Error::validation(format!(
            "Category '{}' cannot be deleted",
            category::RESERVED_CATEGORY_ID
        )));
    }

    let result = Category::delete_by_id(category_id.to_string())
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found(Category::RESOURCE));
    }
    info!("Category deleted");
    Ok(category_id.to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, IdenStatic, Iterable, MockDatabase};
    use serde_json::json;

    #[test]
    fn test_new_category_defaults() {
        let category =
            NewCategory::from_payload(&payload(json!({"id": "clocks", "name": "Clocks"}))).unwrap();
        assert_eq!(category.icon, DEFAULT_ICON);
        assert_eq!(category.sort_order, DEFAULT_SORT_ORDER);

        let result = NewCategory::from_payload(&payload(json!({"name": "Clocks"})));
        assert!(matches!(result, Err(Error::Validation { .. })));
        let result = NewCategory::from_payload(&payload(json!({"id": "clocks", "name": ""})));
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_and_list_categories() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, "all", "All", 0).await?;
        create_test_category(&db, "mirrors", "Mirrors", 20).await?;
        create_test_category(&db, "clocks", "Clocks", 10).await?;

        let ids: Vec<String> = list_categories(&db).await?.into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["all", "clocks", "mirrors"]);

        let fetched = get_category_by_id(&db, "clocks").await?.unwrap();
        assert_eq!(fetched.name, "Clocks");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_duplicate_category_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, "clocks", "Clocks", 10).await?;

        let result = create_test_category(&db, "clocks", "Other", 1).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_category_ignores_empty_icon() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_category(&db, "clocks", "Clocks", 10).await?;

        let updated = update_category(
            &db,
            "clocks",
            &payload(json!({"name": "Wall clocks", "icon": "", "sort_order": 1})),
        )
        .await?;
        assert_eq!(updated.id, "clocks");
        assert_eq!(updated.name, "Wall clocks");
        assert_eq!(updated.icon, created.icon);
        assert_eq!(updated.sort_order, Some(1));

        let result = update_category(&db, "clocks", &payload(json!({"name": null}))).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = update_category(&db, "nope", &payload(json!({"name": "X"}))).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_reserved_category_touches_nothing() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = delete_category(&db, "all").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(db.into_transaction_log().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_category() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, "all", "All", 0).await?;
        create_test_category(&db, "clocks", "Clocks", 10).await?;

        assert_eq!(delete_category(&db, "clocks").await?, "clocks");
        assert!(get_category_by_id(&db, "clocks").await?.is_none());

        let result = delete_category(&db, "clocks").await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        let result = delete_category(&db, "all").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(get_category_by_id(&db, "all").await?.is_some());
        Ok(())
    }

    #[test]
    fn test_rule_columns_exist_on_entity() {
        let columns: Vec<String> = category::Column::iter()
            .map(|c| c.as_str().to_owned())
            .collect();
        for rule in Category::RULES {
            assert!(
                columns.iter().any(|c| c == rule.column),
                "{} is not a column",
                rule.column
            );
        }
    }
}
