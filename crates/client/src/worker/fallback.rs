//! Locally synthesized responses for when neither network nor cache can answer.

use pwa_core::ProxyResponse;

const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Hors ligne - Simple App</title>
    <style>
        body {
            font-family: Arial, sans-serif;
            background: linear-gradient(135deg, #EDEDED 0%, #DBDBDB 100%);
            margin: 0;
            display: flex;
            justify-content: center;
            align-items: center;
            min-height: 100vh;
            color: #222;
        }
        .offline-container {
            text-align: center;
            background: white;
            padding: 40px;
            border-radius: 16px;
            box-shadow: 0 8px 16px rgba(0, 0, 0, 0.3);
            max-width: 400px;
            margin: 20px;
        }
        .offline-title { font-size: 24px; font-weight: bold; color: #F2A021; }
        .offline-message { margin-bottom: 25px; line-height: 1.6; color: #444; }
        .retry-btn {
            background-color: #2EAB9B;
            color: white;
            border: none;
            padding: 12px 24px;
            border-radius: 6px;
            cursor: pointer;
            font-size: 16px;
        }
        .retry-btn:hover { background-color: #259085; }
    </style>
</head>
<body>
    <div class="offline-container">
        <h1 class="offline-title">Mode Hors Ligne</h1>
        <p class="offline-message">
            Vous êtes actuellement hors ligne. Cette page sera disponible dès que votre connexion sera rétablie.
        </p>
        <button class="retry-btn" onclick="window.location.reload()">Réessayer</button>
    </div>
</body>
</html>
"#;

const PLACEHOLDER_IMAGE: &str = r##"<svg width="200" height="200" xmlns="http://www.w3.org/2000/svg">
    <rect width="200" height="200" fill="#EDEDED" stroke="#DBDBDB" stroke-width="2"/>
    <circle cx="100" cy="80" r="15" fill="#F2A021" opacity="0.7"/>
    <text x="100" y="100" font-family="Arial, sans-serif" font-size="14"
          text-anchor="middle" dominant-baseline="middle" fill="#888">Image non disponible</text>
    <rect x="85" y="120" width="30" height="4" fill="#2EAB9B" opacity="0.7"/>
</svg>
"##;

/// Offline placeholder document: always 200 and renderable, with a retry button.
pub fn offline_page() -> ProxyResponse {
    ProxyResponse::with_content_type(200, "text/html; charset=utf-8", OFFLINE_PAGE)
}

/// 200×200 SVG shown in place of an image that could not be loaded.
pub fn placeholder_image() -> ProxyResponse {
    ProxyResponse::with_content_type(200, "image/svg+xml", PLACEHOLDER_IMAGE)
}

/// Failure response for non-image assets.
pub fn asset_unavailable() -> ProxyResponse {
    ProxyResponse::with_content_type(404, "text/plain; charset=utf-8", "Asset non disponible")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_page() {
        let response = offline_page();
        assert_eq!(response.status, 200);
        assert!(response.content_type().unwrap().starts_with("text/html"));
        let html = response.text();
        assert!(html.contains("Mode Hors Ligne"));
        assert!(html.contains("window.location.reload()"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_placeholder_image_is_svg() {
        let response = placeholder_image();
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type(), Some("image/svg+xml"));
        let svg = response.text();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"width="200" height="200""#));
        assert_eq!(svg.matches("<rect").count(), 2);
    }

    #[test]
    fn test_asset_unavailable() {
        let response = asset_unavailable();
        assert_eq!(response.status, 404);
        assert_eq!(response.text(), "Asset non disponible");
    }
}
