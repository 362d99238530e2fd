//! Image endpoints: inline compressor and CDN upload proxy.
//!
//! Both accept `POST` only. The JSON form of the body is
//! `{"file": "<base64>", "filename": "...", "contentType": "..."}`.

use super::{Method, Request, Response, respond, response::JSON_CONTENT_TYPE};
use crate::{
    core::{
        fields::{self, Payload},
        image,
        upload::DEFAULT_CONTENT_TYPE,
    },
    errors::{Error, Result},
    handlers::HandlerContext,
};
use serde_json::json;
use tracing::debug;

pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, content-type";

const DEFAULT_FILENAME: &str = "image.jpg";
const DEFAULT_IMAGE_TYPE: &str = "image/jpeg";

/// A file carried inside a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileField {
    data: String,
    filename: String,
    content_type: String,
}

impl FileField {
    /// `None` when the body has no `file` key; a blank or `null` file is an error.
    fn from_payload(payload: &Payload) -> Result<Option<Self>> {
        if !payload.contains_key("file") {
            return Ok(None);
        }
        let data = fields::text(payload, "file")?
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| Error::validation("No file data provided"))?;
        Ok(Some(Self {
            data,
            filename: fields::text(payload, "filename")?
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            content_type: fields::text(payload, "contentType")?
                .unwrap_or_else(|| DEFAULT_IMAGE_TYPE.to_string()),
        }))
    }
}

fn require_post(request: &Request) -> Result<()> {
    match request.method() {
        Method::Post => Ok(()),
        other => Err(Error::MethodNotSupported {
            method: other.to_string(),
        }),
    }
}

fn require_body(request: &Request) -> Result<()> {
    if request.has_body() {
        Ok(())
    } else {
        Err(Error::validation("No data provided"))
    }
}

/// Entry point for the image compressor.
pub async fn compress(ctx: &HandlerContext, request: &Request) -> Response {
    respond(
        "image-compress",
        request,
        ALLOWED_METHODS,
        ALLOWED_HEADERS,
        compress_dispatch(ctx, request),
    )
    .await
}

async fn compress_dispatch(ctx: &HandlerContext, request: &Request) -> Result<Response> {
    require_post(request)?;
    require_body(request)?;

    let file = FileField::from_payload(&request.json_body()?)?
        .ok_or_else(|| Error::validation("No file data provided"))?;
    let bytes = image::decode_payload(&file.data)?;
    let compressed = image::compress(&bytes, &ctx.config.image)?;

    Ok(Response::ok(&json!({
        "url": compressed.data_url(),
        "filename": file.filename,
        "size": compressed.size(),
        "original_size": compressed.original_size,
        "compression_ratio": compressed.compression_ratio(),
    })))
}

/// Entry point for the CDN upload proxy.
pub async fn upload(ctx: &HandlerContext, request: &Request) -> Response {
    respond(
        "image-upload",
        request,
        ALLOWED_METHODS,
        ALLOWED_HEADERS,
        upload_dispatch(ctx, request),
    )
    .await
}

async fn upload_dispatch(ctx: &HandlerContext, request: &Request) -> Result<Response> {
    require_post(request)?;
    require_body(request)?;

    let json_file = match request.json_body() {
        Ok(payload) => FileField::from_payload(&payload)?,
        Err(_) => None,
    };

    let reply = if let Some(file) = json_file {
        debug!(filename = %file.filename, "Forwarding JSON file as multipart");
        let bytes = image::decode_payload(&file.data)?;
        ctx.uploader
            .upload_file(bytes, &file.filename, &file.content_type)
            .await?
    } else {
        let content_type = request
            .header("content-type")
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let mut bytes = request.body_bytes()?;
        if content_type.starts_with("image/") {
            bytes = image::unwrap_encoded(bytes);
        }
        debug!(%content_type, size = bytes.len(), "Forwarding raw body");
        ctx.uploader.upload_raw(bytes, &content_type).await?
    };

    Ok(Response::raw(
        reply.status,
        reply.content_type.as_deref().unwrap_or(JSON_CONTENT_TYPE),
        reply.body,
    ))
}
