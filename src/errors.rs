use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{message}")]
    Validation { message: String },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Method {method} is not supported")]
    MethodNotSupported { method: String },

    #[error("Upload endpoint returned {status}")]
    Upstream { status: u16, body: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for building a [`Error::NotFound`].
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Stable classification tag reported to callers in place of internals.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::NotFound { .. } => "NotFound",
            Self::MethodNotSupported { .. } => "MethodNotSupported",
            Self::Upstream { .. } => "UpstreamFailure",
            Self::Config { .. } => "ConfigError",
            Self::Database(_) => "DatabaseError",
            Self::Json(_) | Self::Decode(_) => "DecodeError",
            Self::Image(_) => "ImageError",
            Self::Http(_) => "HttpError",
            Self::Io(_) => "IoError",
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_are_stable() {
        assert_eq!(Error::validation("x").kind(), "ValidationError");
        assert_eq!(Error::not_found("Product").kind(), "NotFound");
        assert_eq!(
            Error::Upstream {
                status: 502,
                body: String::new()
            }
            .kind(),
            "UpstreamFailure"
        );
        assert_eq!(
            Error::Database(sea_orm::DbErr::Custom("boom".to_string())).kind(),
            "DatabaseError"
        );
    }

    #[test]
    fn test_not_found_message_names_resource() {
        assert_eq!(Error::not_found("Category").to_string(), "Category not found");
    }
}
