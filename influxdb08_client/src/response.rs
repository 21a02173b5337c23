//! Turns a completed HTTP exchange into a value or an [`Error`].
//!
//! Every [`Client`](crate::Client) operation decides its outcome here and
//! nowhere else.
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::{DecodingError, Error, Result, transport::HttpResponse};

/// Return the raw body of a `200 OK` response.
///
/// `401` maps to [`Error::Authentication`], any other status to
/// [`Error::Request`]; both carry the response body unchanged.
pub fn interpret(response: HttpResponse) -> Result<String> {
    let HttpResponse { status, body } = response;
    match status {
        StatusCode::OK => Ok(body),
        StatusCode::UNAUTHORIZED => Err(Error::Authentication { body }),
        status => Err(Error::Request { status, body }),
    }
}

/// Like [`interpret`], then decode the body as JSON
pub fn interpret_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    let body = interpret(response)?;
    Ok(serde_json::from_str(&body).map_err(DecodingError::Json)?)
}
