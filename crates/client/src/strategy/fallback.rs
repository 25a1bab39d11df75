//! Synthesized responses for when neither network nor cache can answer.

use serde_json::json;
use swcache_core::ResponseSnapshot;
use url::Url;

const SCRIPT_PLACEHOLDER: &str = r#"console.error("swcache: failed to load script while offline");"#;

/// Whether the URL names a script the page will execute.
pub fn is_script(url: &Url) -> bool {
    let path = url.path();
    path.ends_with(".js") || path.ends_with(".mjs")
}

/// Shell asset unavailable: a valid script for script assets so the page
/// does not crash on a syntax error, plain text otherwise. Both are 503.
pub fn shell_unavailable(url: &Url) -> ResponseSnapshot {
    if is_script(url) {
        return ResponseSnapshot::new(503, SCRIPT_PLACEHOLDER).with_header("Content-Type", "application/javascript");
    }
    ResponseSnapshot::new(503, "Offline - Resource not available").with_header("Content-Type", "text/plain")
}

/// API read with no network and nothing cached.
pub fn read_unavailable() -> ResponseSnapshot {
    ResponseSnapshot::json(
        503,
        &json!({
            "error": true,
            "message": "Offline - this feature is not available while offline",
        }),
    )
}

/// API write with no network. Writes are never queued.
pub fn write_unavailable() -> ResponseSnapshot {
    ResponseSnapshot::json(
        503,
        &json!({
            "error": true,
            "message": "Operation failed. You are offline.",
        }),
    )
}

/// Empty collection listing served with a 200 so the page shows its normal
/// empty state. `offline_header` marks it as offline-origin data.
pub fn offline_listing(offline_header: &str) -> ResponseSnapshot {
    ResponseSnapshot::json(
        200,
        &json!({
            "error": false,
            "message": "Offline mode - showing stored data",
            "listStory": [],
        }),
    )
    .with_header(offline_header, "true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_fallback() {
        let url = Url::parse("http://localhost:3000/bundle.js?v=3").unwrap();
        let resp = shell_unavailable(&url);
        assert_eq!(resp.status, 503);
        assert_eq!(resp.header("Content-Type"), Some("application/javascript"));
        assert!(resp.text().starts_with("console.error("));
    }

    #[test]
    fn test_generic_fallback() {
        let url = Url::parse("http://localhost:3000/icons/icon-96x96.png").unwrap();
        let resp = shell_unavailable(&url);
        assert_eq!(resp.status, 503);
        assert_eq!(resp.status_text, "Service Unavailable");
        assert_eq!(resp.header("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_json_error_shape() {
        for resp in [read_unavailable(), write_unavailable()] {
            let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
            assert_eq!(resp.status, 503);
            assert_eq!(body["error"], true);
            assert!(body["message"].is_string());
        }
    }

    #[test]
    fn test_offline_listing_shape() {
        let resp = offline_listing("X-Offline");
        let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.header("x-offline"), Some("true"));
        assert_eq!(body["error"], false);
        assert_eq!(body["listStory"], json!([]));
    }
}
