//! Categories admin endpoint.

use super::{Method, Request, Response, respond};
use crate::{
    core::{
        category::{self, NewCategory},
        fields,
    },
    errors::{Error, Result},
    handlers::HandlerContext,
};
use serde_json::json;

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, X-User-Id";

/// Entry point for `/categories`.
pub async fn handle(ctx: &HandlerContext, request: &Request) -> Response {
    respond(
        "categories",
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
        Method::Get => match query_id(request) {
            Some(id) => {
                let found = category::get_category_by_id(db, id)
                    .await?
                    .ok_or_else(|| Error::not_found("Category"))?;
                Ok(Response::ok(&found))
            }
            None => Ok(Response::ok(&category::list_categories(db).await?)),
        },
        Method::Post => {
            let new_category = NewCategory::from_payload(&request.json_body()?)?;
            let created = category::create_category(db, new_category).await?;
            Ok(Response::created(&created))
        }
        Method::Put => {
            let payload = request.json_body()?;
            let id = fields::text(&payload, "id")?
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .ok_or_else(|| Error::validation("Category id is required"))?;
            Ok(Response::ok(
                &category::update_category(db, &id, &payload).await?,
            ))
        }
        Method::Delete => {
            let id = query_id(request).ok_or_else(|| Error::validation("Category id is required"))?;
            let deleted = category::delete_category(db, id).await?;
            Ok(Response::ok(&json!({ "message": "Category deleted", "id": deleted })))
        }
        other => Err(Error::MethodNotSupported {
            method: other.to_string(),
        }),
    }
}

fn query_id(request: &Request) -> Option<&str> {
    request.query("id").map(str::trim).filter(|id| !id.is_empty())
}
