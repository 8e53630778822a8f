use std::{fmt::Display, str::FromStr};

use http::{HeaderValue, Method, header::HeaderName};
use murmur_config::{AnyOrList, CorsConfig};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build a Tower CORS layer from configuration
///
/// The synthesis headers are always exposed so browser clients can tell
/// fallback audio apart.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = match config.origins {
        AnyOrList::Any => AllowOrigin::any(),
        AnyOrList::List(ref origins) => AllowOrigin::list(parse_all::<HeaderValue>("origin", origins)),
    };

    let methods = match config.methods {
        AnyOrList::Any => AllowMethods::any(),
        AnyOrList::List(ref methods) => AllowMethods::list(parse_all::<Method>("method", methods)),
    };

    let headers = match config.headers {
        AnyOrList::Any => AllowHeaders::any(),
        AnyOrList::List(ref headers) => AllowHeaders::list(parse_all::<HeaderName>("header", headers)),
    };

    let mut layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .expose_headers([
            HeaderName::from_static(tts::PROVIDER_HEADER),
            HeaderName::from_static(tts::FALLBACK_HEADER),
        ]);

    if let Some(duration) = config.max_age_duration() {
        layer = layer.max_age(duration);
    }

    layer
}

fn parse_all<T>(kind: &str, values: &[String]) -> Vec<T>
where
    T: FromStr,
    T::Err: Display,
{
    values
        .iter()
        .filter_map(|value| match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("ignoring CORS {kind} '{value}': {e}");
                None
            }
        })
        .collect()
}
