//! Browser `fetch()` transport for the translation and verification oracles.
//!
//! Only ever sends JSON POSTs; the oracle may live on another origin, so
//! requests go out in CORS mode. Works in both `Window` and
//! `WorkerGlobalScope` contexts.

use futures::{future::LocalBoxFuture, FutureExt};
use wasm_bindgen::JsCast;

use super::http::{HttpClient, HttpResponse};

/// Error type for the `web_sys::fetch`-backed HTTP client.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FetchHttpError(String);

/// A [`web_sys::fetch`]-backed implementation of [`HttpClient`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchHttpClient;

impl FetchHttpClient {
    pub const fn new() -> Self {
        Self
    }
}

impl HttpClient for FetchHttpClient {
    type Error = FetchHttpError;

    fn post<'a>(
        &'a self,
        url: &'a str,
        headers: &'a [(&'a str, &'a str)],
        body: Vec<u8>,
    ) -> LocalBoxFuture<'a, Result<HttpResponse, Self::Error>> {
        async move {
            let opts = web_sys::RequestInit::new();
            opts.set_method("POST");
            opts.set_mode(web_sys::RequestMode::Cors);

            let body_array = js_sys::Uint8Array::from(body.as_slice());
            opts.set_body(&body_array);

            let js_headers = web_sys::Headers::new()
                .map_err(|e| FetchHttpError(format!("Headers::new failed: {e:?}")))?;
            for &(name, value) in headers {
                js_headers
                    .set(name, value)
                    .map_err(|e| FetchHttpError(format!("header set failed: {e:?}")))?;
            }
            opts.set_headers(&js_headers);

            let request = web_sys::Request::new_with_str_and_init(url, &opts)
                .map_err(|e| FetchHttpError(format!("Request::new failed: {e:?}")))?;

            let promise = fetch_global(&request)
                .map_err(|e| FetchHttpError(format!("fetch failed: {e:?}")))?;

            let resp_value = wasm_bindgen_futures::JsFuture::from(promise)
                .await
                .map_err(|e| FetchHttpError(format!("fetch rejected: {e:?}")))?;

            let resp: web_sys::Response = resp_value
                .dyn_into()
                .map_err(|_| FetchHttpError("response is not a Response".into()))?;

            let status = resp.status();

            let body_promise = resp
                .array_buffer()
                .map_err(|e| FetchHttpError(format!("arrayBuffer() failed: {e:?}")))?;

            let body_value = wasm_bindgen_futures::JsFuture::from(body_promise)
                .await
                .map_err(|e| FetchHttpError(format!("body read failed: {e:?}")))?;

            let body = js_sys::Uint8Array::new(&body_value).to_vec();

            Ok(HttpResponse { status, body })
        }
        .boxed_local()
    }
}

/// Call `fetch()` on whichever global scope is available.
fn fetch_global(request: &web_sys::Request) -> Result<js_sys::Promise, wasm_bindgen::JsValue> {
    let global: js_sys::Object = js_sys::global().unchecked_into();

    if let Ok(window) = global.clone().dyn_into::<web_sys::Window>() {
        return Ok(window.fetch_with_request(request));
    }

    if let Ok(worker) = global.dyn_into::<web_sys::WorkerGlobalScope>() {
        return Ok(worker.fetch_with_request(request));
    }

    Err(wasm_bindgen::JsValue::from_str(
        "no global fetch available (not Window or WorkerGlobalScope)",
    ))
}
