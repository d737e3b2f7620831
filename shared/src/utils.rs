use lambda_http::http::{header, StatusCode};
use lambda_http::{Error, Response};
use serde::Serialize;

pub const NO_SUCH_SHORT_CODE: &str = "error: no such short code";

pub fn redirect_response(location: &str) -> Result<Response<String>, Error> {
    let response = Response::builder()
        .status(&StatusCode::FOUND)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::LOCATION, location)
        .body(location.to_string())
        .map_err(Box::new)?;

    Ok(response)
}

pub fn text_response(status: &StatusCode, body: &str) -> Result<Response<String>, Error> {
    let response = Response::builder()
        .status(status)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(body.to_string())
        .map_err(Box::new)?;

    Ok(response)
}

pub fn json_response(
    status: &StatusCode,
    body: &impl Serialize,
) -> Result<Response<String>, Error> {
    let response = Response::builder()
        .status(status)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::CONTENT_TYPE, "application/json")
        .body(serde_json::to_string(&body)?)
        .map_err(Box::new)?;

    Ok(response)
}
