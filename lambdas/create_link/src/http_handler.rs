use lambda_http::{http::StatusCode, tracing, Error, IntoResponse, Request};
use serde::{Deserialize, Serialize};
use shared::core::{IdGenerator, UrlRepository, UrlShortener};
use shared::utils::{json_response, text_response};
use std::collections::HashMap;

const LONG_URL_KEY: &str = "LongURL";

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenUrlResponse {
    #[serde(rename = "ShortURL")]
    pub short_url: String,
}

pub(crate) struct HandlerDeps<R: UrlRepository, G: IdGenerator> {
    pub url_shortener: UrlShortener<R, G>,
    pub base_url: String,
    /// Status for a body that is not a JSON object of strings.
    pub malformed_body_status: StatusCode,
}

/// Reads `LongURL` from a JSON object of strings. Other keys are ignored and a
/// missing key yields an empty URL.
fn parse_long_url(body: &[u8]) -> Result<String, serde_json::Error> {
    let mut fields: HashMap<String, String> = serde_json::from_slice(body)?;
    Ok(fields.remove(LONG_URL_KEY).unwrap_or_default())
}

pub(crate) async fn function_handler<R: UrlRepository, G: IdGenerator>(
    deps: &HandlerDeps<R, G>,
    event: Request,
) -> Result<impl IntoResponse, Error> {
    tracing::info!("Received event: {:?}", event);

    let long_url = match parse_long_url(event.body()) {
        Ok(long_url) => long_url,
        Err(e) => {
            tracing::warn!("Request body is not a JSON object of strings: {}", e);
            return text_response(&deps.malformed_body_status, &e.to_string());
        }
    };

    match deps.url_shortener.shorten_url(long_url).await {
        Ok(record) => json_response(
            &StatusCode::OK,
            &ShortenUrlResponse {
                short_url: format!("{}/{}", deps.base_url, record.code),
            },
        ),
        Err(e) => {
            tracing::error!("Failed to shorten URL: {}", e);
            text_response(&StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}
