//! Handler layer - one entry point per admin resource.
//!
//! Each handler takes the shared [`HandlerContext`] and one [`Request`], answers
//! preflights without touching storage, dispatches on the HTTP method and funnels
//! every outcome through the response shaper.

pub mod categories;
pub mod event;
pub mod images;
pub mod news;
pub mod products;
pub mod response;

pub use event::{Method, Request, Response};

use crate::config::AppConfig;
use crate::core::upload::UploadClient;
use crate::errors::Result;
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, info_span};

/// Shared data available to all handlers.
/// Built once per process and handed to every invocation.
#[derive(Debug)]
pub struct HandlerContext {
    /// Database connection for all storage operations
    pub database: DatabaseConnection,
    /// Read-only application settings
    pub config: Arc<AppConfig>,
    /// Client for the CDN upload endpoint
    pub uploader: UploadClient,
}

impl HandlerContext {
    /// Creates a context from a connection and the loaded settings.
    pub fn new(database: DatabaseConnection, config: AppConfig) -> Result<Self> {
        let uploader = UploadClient::new(&config.upload)?;
        Ok(Self {
            database,
            config: Arc::new(config),
            uploader,
        })
    }
}

/// Admin resources exposed as separate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Resource {
    Products,
    Categories,
    News,
    ImageCompress,
    ImageUpload,
}

/// Runs the handler for `resource`.
pub async fn handle(ctx: &HandlerContext, resource: Resource, request: &Request) -> Response {
    match resource {
        Resource::Products => products::handle(ctx, request).await,
        Resource::Categories => categories::handle(ctx, request).await,
        Resource::News => news::handle(ctx, request).await,
        Resource::ImageCompress => images::compress(ctx, request).await,
        Resource::ImageUpload => images::upload(ctx, request).await,
    }
}

/// Answers preflights, then awaits `dispatch` and shapes its outcome.
///
/// `dispatch` is only polled for non-OPTIONS requests.
pub(crate) async fn respond<F>(
    resource: &'static str,
    request: &Request,
    methods: &str,
    allowed_headers: &str,
    dispatch: F,
) -> Response
where
    F: Future<Output = Result<Response>>,
{
    let method = request.method();
    if method == Method::Options {
        return Response::preflight(methods, allowed_headers);
    }

    let span = info_span!("request", resource, method = %method);
    match dispatch.instrument(span).await {
        Ok(response) => response,
        Err(err) => Response::from_error(&err),
    }
}
