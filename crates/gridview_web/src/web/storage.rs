use gridview::config::ViewConfig;

const SETTINGS_KEY: &str = "gridview.settings.v1";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

fn local_storage_get_string(key: &str) -> Option<String> {
    local_storage().and_then(|s| s.get_item(key).ok().flatten())
}

fn local_storage_set_string(key: &str, value: &str) {
    if let Some(s) = local_storage() {
        let _ = s.set_item(key, value);
    }
}

/// `?backend=` on the page URL, if set.
fn backend_from_query() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params.get("backend").filter(|v| !v.trim().is_empty())
}

/// Stored settings (or defaults), with the query-string backend applied.
pub(super) fn load_settings() -> ViewConfig {
    let mut cfg = match local_storage_get_string(SETTINGS_KEY) {
        Some(raw) => ViewConfig::from_json_or_default(&raw),
        None => ViewConfig::default(),
    };
    if let Some(url) = backend_from_query() {
        tracing::info!(backend = %url, "backend overridden by query string");
        cfg.backend_url = url;
    }
    cfg.sanitized()
}

pub(super) fn save_settings(cfg: &ViewConfig) {
    match serde_json::to_string(cfg) {
        Ok(raw) => local_storage_set_string(SETTINGS_KEY, &raw),
        Err(e) => tracing::warn!("failed to serialize settings: {e}"),
    }
}
