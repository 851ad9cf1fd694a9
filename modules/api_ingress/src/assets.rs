use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::IntoResponse,
};
use rust_embed::RustEmbed;

/// Stylesheet and navigation script shared by every page.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct StaticAssets;

pub async fn serve_static_asset(Path(file): Path<String>) -> Result<impl IntoResponse, StatusCode> {
    match StaticAssets::get(&file) {
        Some(content) => {
            let mime_type = content_type_for(&file);
            let body = content.data.into_owned();
            Ok((
                [
                    (header::CONTENT_TYPE, mime_type),
                    (header::CACHE_CONTROL, "public, max-age=3600"),
                ],
                body,
            ))
        }
        None => {
            tracing::warn!("Static asset not found: {}", file);
            Err(StatusCode::NOT_FOUND)
        }
    }
}

fn content_type_for(file: &str) -> &'static str {
    match file.rsplit('.').next().unwrap_or("") {
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(content_type_for("style.css"), "text/css; charset=utf-8");
        assert_eq!(
            content_type_for("script.js"),
            "application/javascript; charset=utf-8"
        );
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }

    #[test]
    fn bundled_assets_are_embedded() {
        assert!(StaticAssets::get("style.css").is_some());
        assert!(StaticAssets::get("script.js").is_some());
        assert!(StaticAssets::get("missing.css").is_none());
    }
}
