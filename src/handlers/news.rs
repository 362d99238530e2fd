//! News admin endpoint.
//!
//! Listing honours `?published=`: `"true"` (the default) returns only published
//! items, any other value returns everything.

use super::{Method, Request, Response, respond};
use crate::{
    core::{
        fields,
        news::{self, NewNews},
    },
    errors::{Error, Result},
    handlers::HandlerContext,
};
use serde_json::json;

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, X-Auth-Token";

/// Entry point for `/news`.
pub async fn handle(ctx: &HandlerContext, request: &Request) -> Response {
    respond(
        "news",
        request,
        ALLOWED_METHODS,
        ALLOWED_HEADERS,
        dispatch(ctx, request),
    )
    .await
}

async fn dispatch(ctx: &HandlerContext, request: &Request) -> Result<Response> {
    let db = &ctx.database;
    match request.method() {
        Method::Get => match query_id(request)? {
            Some(id) => {
                let found = news::get_news_by_id(db, id)
                    .await?
                    .ok_or_else(|| Error::not_found("News item"))?;
                Ok(Response::ok(&found))
            }
            None => {
                let only_published = request.query("published").unwrap_or("true") == "true";
                Ok(Response::ok(&news::list_news(db, only_published).await?))
            }
        },
        Method::Post => {
            let new_news = NewNews::from_payload(&request.json_body()?)?;
            let created = news::create_news(db, new_news).await?;
            Ok(Response::created(&created))
        }
        Method::Put => {
            let payload = request.json_body()?;
            let id = fields::record_id(&payload, "id")?
                .ok_or_else(|| Error::validation("News id is required"))?;
            Ok(Response::ok(&news::update_news(db, id, &payload).await?))
        }
        Method::Delete => {
            let id = query_id(request)?.ok_or_else(|| Error::validation("News id is required"))?;
            let deleted = news::delete_news(db, id).await?;
            Ok(Response::ok(&json!({ "message": "News item deleted", "id": deleted })))
        }
        other => Err(Error::MethodNotSupported {
            method: other.to_string(),
        }),
    }
}

fn query_id(request: &Request) -> Result<Option<i64>> {
    request
        .query("id")
        .filter(|raw| !raw.trim().is_empty())
        .map(fields::parse_id)
        .transpose()
}
