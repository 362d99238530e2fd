//! Products admin endpoint.

use super::{Method, Request, Response, respond};
use crate::{
    core::{
        fields::{self, Payload},
        product::{self, NewProduct},
    },
    errors::{Error, Result},
    handlers::HandlerContext,
};
use serde_json::json;

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, X-User-Id";

/// Entry point for `/products`.
pub async fn handle(ctx: &HandlerContext, request: &Request) -> Response {
    respond(
        "products",
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
                let found = product::get_product_by_id(db, id)
                    .await?
                    .ok_or_else(|| Error::not_found("Product"))?;
                Ok(Response::ok(&found))
            }
            None => Ok(Response::ok(&product::list_products(db).await?)),
        },
        Method::Post => {
            let new_product = NewProduct::from_payload(&request.json_body()?)?;
            let created = product::create_product(db, new_product).await?;
            Ok(Response::created(&created))
        }
        Method::Put => {
            let payload = request.json_body()?;
            let id = body_id(&payload)?;
            Ok(Response::ok(&product::update_product(db, id, &payload).await?))
        }
        Method::Patch => {
            let payload = request.json_body()?;
            let id = body_id(&payload)?;
            Ok(Response::ok(
                &product::set_product_visibility(db, id, &payload).await?,
            ))
        }
        Method::Delete => {
            let id = query_id(request)?.ok_or_else(|| Error::validation("Product id is required"))?;
            let deleted = product::delete_product(db, id).await?;
            Ok(Response::ok(&json!({ "message": "Product deleted", "id": deleted })))
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

fn body_id(payload: &Payload) -> Result<i64> {
    fields::record_id(payload, "id")?.ok_or_else(|| Error::validation("Product id is required"))
}
