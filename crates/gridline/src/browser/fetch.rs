//! Record loading over `fetch`.

use crate::error::LoadError;
use crate::source::parse_records;
use gridline_core::Record;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

fn request_error(err: &JsValue) -> LoadError {
    LoadError::Request(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// GET a JSON array of records.
///
/// # Errors
///
/// Fails when the request cannot be made, the server answers with an error
/// status, or the body is not a JSON array.
pub async fn fetch_records(url: &str) -> Result<Vec<Record>, LoadError> {
    let window = web_sys::window().ok_or_else(|| LoadError::Request("No window".to_string()))?;

    let init = RequestInit::new();
    init.set_method("GET");
    init.set_mode(RequestMode::Cors);
    let request = Request::new_with_str_and_init(url, &init).map_err(|e| request_error(&e))?;
    request
        .headers()
        .set("Accept", "application/json")
        .map_err(|e| request_error(&e))?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| request_error(&e))?
        .dyn_into()
        .map_err(|_| LoadError::Request("fetch did not return a Response".to_string()))?;

    if !response.ok() {
        return Err(LoadError::Status {
            status: response.status(),
        });
    }

    let text = JsFuture::from(response.text().map_err(|e| request_error(&e))?)
        .await
        .map_err(|e| request_error(&e))?
        .as_string()
        .ok_or_else(|| LoadError::Request("response body is not text".to_string()))?;

    log::debug!("fetched {} bytes from {url}", text.len());
    parse_records(&text)
}
