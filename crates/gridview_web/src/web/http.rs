use gridview::api::{ApiRequest, Backend};
use gridview::config::ViewConfig;
use gridview::error::{Result, ViewError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// [`Backend`] over the browser `fetch` API.
#[derive(Clone)]
pub(super) struct FetchBackend {
    config: ViewConfig,
}

impl FetchBackend {
    pub(super) fn new(config: ViewConfig) -> Self {
        Self { config }
    }
}

fn js_message(v: &JsValue) -> String {
    v.as_string()
        .or_else(|| {
            v.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| "unknown error".to_string())
}

impl Backend for FetchBackend {
    async fn send(&self, request: &ApiRequest) -> Result<String> {
        let url = self.config.endpoint_url(request.path());
        let window = web_sys::window().ok_or(ViewError::Browser("no window".to_string()))?;

        let init = web_sys::RequestInit::new();
        init.set_method(request.method().as_str());
        init.set_mode(web_sys::RequestMode::Cors);
        let body = request.body();
        if let Some(body) = body.as_deref() {
            init.set_body(&JsValue::from_str(body));
        }

        let req = web_sys::Request::new_with_str_and_init(&url, &init)
            .map_err(|e| ViewError::Browser(format!("fetch: bad request: {}", js_message(&e))))?;
        if body.is_some() {
            req.headers()
                .set("Content-Type", "application/json")
                .map_err(|e| ViewError::Browser(js_message(&e)))?;
        }

        let resp = JsFuture::from(window.fetch_with_request(&req))
            .await
            .map_err(|e| ViewError::Network(js_message(&e)))?
            .dyn_into::<web_sys::Response>()
            .map_err(|_| ViewError::Browser("fetch: expected Response".to_string()))?;

        let text_promise = resp
            .text()
            .map_err(|e| ViewError::Browser(js_message(&e)))?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(|e| ViewError::Network(js_message(&e)))?
            .as_string()
            .unwrap_or_default();

        if !resp.ok() {
            return Err(ViewError::Status {
                endpoint: request.path(),
                status: resp.status(),
                body: text,
            });
        }
        Ok(text)
    }
}
