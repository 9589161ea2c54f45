//! Outcomes and how they are emitted.
//!
//! Each request produces exactly one [`Outcome`]. The emitter renders it as
//! a real HTTP response (origin mode) or as an edge reply.

use crate::edge::{EdgeReply, EdgeRequest, EdgeResponse};
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use prism_core::config::ServerConfig;
use prism_core::{ERROR_MAX_AGE, ImageFormat, cache_control};
use prism_storage::ObjectStore;

/// Terminal result of a derivative request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The terminal object exists; serve it.
    PassThrough {
        object_key: String,
        format: ImageFormat,
    },
    /// Permanent redirect to another public path.
    Redirect { path: String, max_age: u64 },
    /// Temporary redirect to the error asset.
    ErrorFallback,
}

impl Outcome {
    /// Label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PassThrough { .. } => "pass_through",
            Self::Redirect { .. } => "redirect",
            Self::ErrorFallback => "error_fallback",
        }
    }
}

struct RedirectParts {
    status: StatusCode,
    description: &'static str,
    location: String,
    cache_control: String,
}

/// Renders outcomes against the public host.
#[derive(Clone, Debug)]
pub struct ResponseEmitter {
    public_host: String,
    error_asset: String,
}

impl ResponseEmitter {
    pub fn new(public_host: impl Into<String>, error_asset: impl Into<String>) -> Self {
        Self {
            public_host: public_host.into(),
            error_asset: error_asset.into(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.public_host, &config.error_asset)
    }

    /// Absolute URL of a public path.
    pub fn location(&self, path: &str) -> String {
        format!(
            "https://{}/{}",
            self.public_host,
            path.trim_start_matches('/')
        )
    }

    fn error_redirect(&self) -> RedirectParts {
        RedirectParts {
            status: StatusCode::FOUND,
            description: "Found",
            location: self.location(&self.error_asset),
            cache_control: cache_control(ERROR_MAX_AGE),
        }
    }

    fn redirect(&self, outcome: &Outcome) -> Option<RedirectParts> {
        match outcome {
            Outcome::PassThrough { .. } => None,
            Outcome::Redirect { path, max_age } => Some(RedirectParts {
                status: StatusCode::MOVED_PERMANENTLY,
                description: "Moved Permanently",
                location: self.location(path),
                cache_control: cache_control(*max_age),
            }),
            Outcome::ErrorFallback => Some(self.error_redirect()),
        }
    }

    /// Emit an outcome as an HTTP response, reading pass-through bodies from `store`.
    pub async fn http(&self, outcome: Outcome, store: &dyn ObjectStore) -> Response {
        let parts = match &outcome {
            Outcome::PassThrough { object_key, format } => match store.get(object_key).await {
                Ok(data) => {
                    return (
                        StatusCode::OK,
                        [
                            (header::CONTENT_TYPE, format.mime_type().to_string()),
                            (
                                header::CACHE_CONTROL,
                                cache_control(prism_core::DERIVATIVE_MAX_AGE),
                            ),
                        ],
                        Body::from(data),
                    )
                        .into_response();
                }
                Err(e) => {
                    tracing::error!(key = %object_key, error = %e, "failed to read derivative");
                    self.error_redirect()
                }
            },
            other => match self.redirect(other) {
                Some(parts) => parts,
                None => self.error_redirect(),
            },
        };

        (
            parts.status,
            [
                (header::CACHE_CONTROL, parts.cache_control),
                (header::LOCATION, parts.location),
            ],
        )
            .into_response()
    }

    /// Emit an outcome as an edge reply; pass-through echoes `request`.
    pub fn edge(&self, outcome: Outcome, request: EdgeRequest) -> EdgeReply {
        match self.redirect(&outcome) {
            None => EdgeReply::Request(request),
            Some(parts) => EdgeReply::Response(
                EdgeResponse::new(parts.status.as_u16(), parts.description)
                    .with_header("Cache-Control", parts.cache_control)
                    .with_header("Location", parts.location),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter() -> ResponseEmitter {
        ResponseEmitter::new("img.example.com", "error.svg")
    }

    #[test]
    fn test_location_joins_host_and_path() {
        assert_eq!(
            emitter().location("media/m1s1x1z.jpg"),
            "https://img.example.com/media/m1s1x1z.jpg"
        );
        assert_eq!(
            emitter().location("/error.svg"),
            "https://img.example.com/error.svg"
        );
    }

    #[test]
    fn test_edge_redirect_reply() {
        let reply = emitter().edge(
            Outcome::Redirect {
                path: "media/m1s500x2000z-w300a43.jpg".into(),
                max_age: 31_536_000,
            },
            EdgeRequest::default(),
        );
        let EdgeReply::Response(response) = reply else {
            panic!("expected a response");
        };
        assert_eq!(response.status, "301");
        assert_eq!(response.status_description, "Moved Permanently");
        assert_eq!(
            response.headers["cache-control"][0].value,
            "max-age=31536000,public,immutable"
        );
        assert_eq!(
            response.headers["location"][0].value,
            "https://img.example.com/media/m1s500x2000z-w300a43.jpg"
        );
    }

    #[test]
    fn test_edge_error_reply() {
        let EdgeReply::Response(response) =
            emitter().edge(Outcome::ErrorFallback, EdgeRequest::default())
        else {
            panic!("expected a response");
        };
        assert_eq!(response.status, "302");
        assert_eq!(
            response.headers["cache-control"][0].value,
            "max-age=10,public,immutable"
        );
        assert_eq!(
            response.headers["location"][0].value,
            "https://img.example.com/error.svg"
        );
    }

    #[test]
    fn test_edge_pass_through_echoes_request() {
        let mut request = EdgeRequest::default();
        request.0.insert("uri".into(), "/media/m1s1x1z.jpg".into());
        let reply = emitter().edge(
            Outcome::PassThrough {
                object_key: "dist/image/media/m1s1x1z.jpg".into(),
                format: ImageFormat::Jpeg,
            },
            request.clone(),
        );
        assert_eq!(reply, EdgeReply::Request(request));
    }

    #[test]
    fn test_outcome_kinds() {
        assert_eq!(Outcome::ErrorFallback.kind(), "error_fallback");
        assert_eq!(
            Outcome::Redirect {
                path: String::new(),
                max_age: 0
            }
            .kind(),
            "redirect"
        );
    }
}
