//! Error responses, custom and generated.

use crate::http::response::Response;
use crate::site::registry::SiteRegistry;

/// Renders the response for an error status.
///
/// When the configured error directory holds a `<status>.html`, its
/// contents are sent verbatim under a `200` status line with
/// `Content-Type: text/html`. Otherwise a minimal generated page goes
/// out under the real status line. `version` falls back to `HTTP/1.1`
/// for requests rejected before a version was parsed.
pub async fn render(registry: &SiteRegistry, status: u16, version: Option<&str>) -> Response {
    let version = version.unwrap_or("HTTP/1.1");

    if let Some(dir) = registry.error_dir() {
        let page = dir.join(format!("{status}.html"));
        if let Ok(contents) = tokio::fs::read(&page).await {
            return Response::builder(version, 200, registry.status_reason(200))
                .standard_headers(registry.server_name())
                .header("Content-Type", "text/html")
                .body(contents)
                .build();
        }
    }

    let reason = registry.status_reason(status);
    let page = format!("<html>\n<body>\n<center><b>{status} {reason}</b></center>\n</body>\n</html>\n");

    Response::builder(version, status, reason)
        .standard_headers(registry.server_name())
        .header("Content-Type", "text/html")
        .body(page.into_bytes())
        .build()
}
