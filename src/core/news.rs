//! News business logic - Handles storefront announcements.
//!
//! Listings use a summary projection without the article body. Every update stamps
//! `updated_at` alongside the supplied fields.

use crate::{
    core::{
        fields::{self, Payload},
        update::{FieldRule, PartialUpdate, ValueKind, apply_partial_update},
    },
    entities::{News, news},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, Value, prelude::*};
use tracing::{info, instrument};

impl PartialUpdate for News {
    const RESOURCE: &'static str = "News item";

    const RULES: &'static [FieldRule] = &[
        FieldRule::truthy("title", ValueKind::Text),
        FieldRule::present("description", ValueKind::Text),
        FieldRule::present("image_url", ValueKind::Text),
        FieldRule::present("content", ValueKind::Text),
        FieldRule::present("published", ValueKind::Bool),
    ];

    fn stamps() -> Vec<(&'static str, Value)> {
        vec![("updated_at", chrono::Utc::now().naive_utc().into())]
    }
}

/// Fields accepted when creating a news item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNews {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub content: String,
    pub published: bool,
}

impl NewNews {
    /// Reads a create request body. Only `title` is required.
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        Ok(Self {
            title: fields::required_text(payload, "title")?,
            description: fields::text(payload, "description")?.unwrap_or_default(),
            image_url: fields::text(payload, "image_url")?.unwrap_or_default(),
            content: fields::text(payload, "content")?.unwrap_or_default(),
            published: fields::flag(payload, "published")?.unwrap_or(true),
        })
    }
}

/// Lists news items newest first, optionally restricted to published ones.
pub async fn list_news(db: &DatabaseConnection, only_published: bool) -> Result<Vec<news::Summary>> {
    let mut query = News::find()
        .select_only()
        .columns([
            news::Column::Id,
            news::Column::Title,
            news::Column::Description,
            news::Column::ImageUrl,
            news::Column::CreatedAt,
            news::Column::Published,
        ])
        .order_by_desc(news::Column::CreatedAt)
        .order_by_desc(news::Column::Id);
    if only_published {
        query = query.filter(news::Column::Published.eq(true));
    }

    query
        .into_model::<news::Summary>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a full news item, including its body.
pub async fn get_news_by_id(db: &DatabaseConnection, news_id: i64) -> Result<Option<news::Model>> {
    News::find_by_id(news_id).one(db).await.map_err(Into::into)
}

/// Creates a news item with both timestamps set to now.
#[instrument(skip(db, new_news))]
pub async fn create_news(db: &DatabaseConnection, new_news: NewNews) -> Result<news::Model> {
    if new_news.title.trim().is_empty() {
        return Err(Error::validation("News title cannot be empty"));
    }

    let now = chrono::Utc::now().naive_utc();
    let item = news::ActiveModel {
        title: Set(new_news.title),
        description: Set(Some(new_news.description)),
        image_url: Set(Some(new_news.image_url)),
        content: Set(Some(new_news.content)),
        published: Set(new_news.published),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = item.insert(db).await?;
    info!(id = created.id, "News item created");
    Ok(created)
}

/// Applies the supplied fields of `payload` to a news item and refreshes `updated_at`.
pub async fn update_news(
    db: &DatabaseConnection,
    news_id: i64,
    payload: &Payload,
) -> Result<news::Model> {
    apply_partial_update::<News>(db, news_id.into(), News::RULES, payload).await
}

/// Deletes a news item and returns its ID.
#[instrument(skip(db))]
pub async fn delete_news(db: &DatabaseConnection, news_id: i64) -> Result<i64> {
    let result = News::delete_by_id(news_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found(News::RESOURCE));
    }
    info!("News item deleted");
    Ok(news_id)
}
