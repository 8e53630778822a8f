use axum::body::Body;
use serde::de::DeserializeOwned;

use crate::error::TtsError;

/// Extractor for JSON request bodies
///
/// Rejections use the service's `{"error": ...}` body instead of axum's
/// plain-text defaults.
pub struct ExtractPayload<T>(pub T);

/// Body limit for synthesis requests (1 MiB)
const BODY_LIMIT_BYTES: usize = 1 << 20;

fn is_json(headers: &http::HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

impl<S, T: DeserializeOwned> axum::extract::FromRequest<S> for ExtractPayload<T>
where
    S: Send + Sync,
{
    type Rejection = TtsError;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        if !is_json(&parts.headers) {
            return Err(TtsError::UnsupportedMediaType);
        }

        let bytes = axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
            if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                TtsError::PayloadTooLarge(BODY_LIMIT_BYTES)
            } else {
                TtsError::InvalidRequest(format!("Failed to read request body: {err}"))
            }
        })?;

        let payload = serde_json::from_slice::<T>(&bytes)
            .map_err(|e| TtsError::InvalidRequest(format!("Failed to parse request body: {e}")))?;

        Ok(Self(payload))
    }
}
