use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap, StatusCode},
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;

/// JSON body extractor that mirrors a lenient JSON body parser: a missing body
/// or a non-JSON content type yields `T::default()`, a malformed JSON body is
/// a 400 and a body over the route's limit is a 413.
#[derive(Debug, Clone, Default)]
pub struct JsonPayload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonPayload<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json_content_type(req.headers()) {
            return Ok(Self(T::default()));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge(anyhow::anyhow!(e.body_text()))
            } else {
                AppError::BadRequest(anyhow::anyhow!(e.body_text()))
            }
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("invalid JSON body: {}", e)))
    }
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json" || essence.ends_with("+json")
}
