use lambda_http::RequestExt;
use lambda_http::{http::StatusCode, tracing, Error, IntoResponse, Request};
use shared::core::UrlRepository;
use shared::utils::{redirect_response, text_response, NO_SUCH_SHORT_CODE};

const CODE_PATH_PARAMETER: &str = "param";

pub(crate) struct HandlerDeps<R: UrlRepository> {
    pub url_repo: R,
}

pub(crate) async fn function_handler<R: UrlRepository>(
    deps: &HandlerDeps<R>,
    event: Request,
) -> Result<impl IntoResponse, Error> {
    tracing::info!("Received event: {:?}", event);

    let code = event
        .path_parameters_ref()
        .and_then(|params| params.first(CODE_PATH_PARAMETER))
        .unwrap_or("");

    if code.is_empty() {
        tracing::warn!("No short code in path");
        return text_response(&StatusCode::BAD_REQUEST, NO_SUCH_SHORT_CODE);
    }

    match deps.url_repo.get_long_url(code).await {
        Err(e) => {
            tracing::error!("Failed to retrieve URL: {}", e);
            text_response(&StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
        Ok(Some(long_url)) if !long_url.is_empty() => match redirect_response(&long_url) {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::error!("Stored URL is not a valid Location header: {}", e);
                text_response(&StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
            }
        },
        Ok(_) => {
            tracing::warn!("No such short code: {}", code);
            text_response(&StatusCode::BAD_REQUEST, NO_SUCH_SHORT_CODE)
        }
    }
}
