//! Shared test utilities for the admin handlers.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test records with sensible defaults and building request fixtures.

#![allow(clippy::unwrap_used)]

use crate::{
    config::AppConfig,
    core::{
        category::{self, NewCategory},
        fields::Payload,
        news::{self, NewNews},
        product::{self, NewProduct},
    },
    entities,
    errors::Result,
    handlers::{HandlerContext, Request},
};
use image::{ImageFormat, Rgba, RgbaImage};
use sea_orm::{ConnectOptions, DatabaseConnection};
use serde_json::Value as JsonValue;
use std::io::Cursor;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
///
/// The pool is capped at one connection so every query sees the same memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Routes tracing output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("antiques_admin=debug")
        .with_test_writer()
        .try_init();
}

/// Unwraps a `json!` object literal into a request payload.
pub fn payload(value: JsonValue) -> Payload {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("test payload must be an object, got {other}"),
    }
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * `article`: `"ART-<name>"`
/// * `price`: 10.0
/// * `sort_order`: 0, visible
pub async fn create_test_product(db: &DatabaseConnection, name: &str) -> Result<entities::product::Model> {
    product::create_product(db, NewProduct::new(format!("ART-{name}"), name, 10.0)).await
}

/// Sets up a database holding one product.
/// Returns (db, product) for product-related tests.
pub async fn setup_with_product() -> Result<(DatabaseConnection, entities::product::Model)> {
    let db = setup_test_db().await?;
    let product = create_test_product(&db, "Test Product").await?;
    Ok((db, product))
}

/// Creates a test category with the default icon.
pub async fn create_test_category(
    db: &DatabaseConnection,
    id: &str,
    name: &str,
    sort_order: i32,
) -> Result<entities::category::Model> {
    category::create_category(
        db,
        NewCategory {
            id: id.to_string(),
            name: name.to_string(),
            icon: category::DEFAULT_ICON.to_string(),
            sort_order,
        },
    )
    .await
}

/// Creates a test news item with a short description and body.
pub async fn create_test_news(
    db: &DatabaseConnection,
    title: &str,
    published: bool,
) -> Result<entities::news::Model> {
    news::create_news(
        db,
        NewNews {
            title: title.to_string(),
            description: format!("About {title}"),
            image_url: String::new(),
            content: format!("{title} body"),
            published,
        },
    )
    .await
}

/// Handler context over a fresh in-memory database and default settings.
pub async fn setup_test_context() -> Result<HandlerContext> {
    let db = setup_test_db().await?;
    HandlerContext::new(db, AppConfig::default())
}

/// Builds a request envelope with a JSON body.
pub fn json_request(method: &str, body: &JsonValue) -> Request {
    Request {
        http_method: method.to_string(),
        body: Some(body.to_string()),
        ..Request::default()
    }
}

/// Builds a body-less request envelope with query parameters.
pub fn query_request(method: &str, query: &[(&str, &str)]) -> Request {
    Request {
        http_method: method.to_string(),
        query_string_parameters: Some(
            query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        ),
        ..Request::default()
    }
}

/// Encodes a `width` x `height` gradient with an alpha channel as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 200])
    });
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
    out
}
