use crate::error::{AppError, AppResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use qrcode::QrCode;
use qrcode::render::svg;

pub trait QrImageRenderer: Send + Sync {
    /// Renders `content` as an SVG document.
    fn render_svg(&self, content: &str) -> AppResult<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SvgQrRenderer;

impl QrImageRenderer for SvgQrRenderer {
    fn render_svg(&self, content: &str) -> AppResult<String> {
        let code = QrCode::new(content.as_bytes())
            .map_err(|e| AppError::InternalError(format!("QR encoding failed: {e}")))?;
        Ok(code
            .render::<svg::Color>()
            .min_dimensions(256, 256)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build())
    }
}

pub fn svg_data_url(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

/// Stand-in image used in exports when a code cannot be rendered.
pub fn placeholder_svg(label: &str) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="256" height="256" viewBox="0 0 256 256">"#,
            r##"<rect width="256" height="256" fill="#ffffff" stroke="#000000" stroke-width="4"/>"##,
            r#"<text x="128" y="132" font-family="monospace" font-size="16" text-anchor="middle">{}</text>"#,
            "</svg>"
        ),
        crate::utils::escape_html(label)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_svg_produces_svg_document() {
        let svg = SvgQrRenderer
            .render_svg("https://workersmate.example/memory/MEM-ABCD2345")
            .unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("#000000"));
    }

    #[test]
    fn test_render_svg_rejects_oversized_content() {
        let too_long = "x".repeat(8000);
        assert!(SvgQrRenderer.render_svg(&too_long).is_err());
    }

    #[test]
    fn test_svg_data_url_prefix() {
        let url = svg_data_url("<svg/>");
        assert!(url.starts_with("data:image/svg+xml;base64,"));
        let encoded = url.trim_start_matches("data:image/svg+xml;base64,");
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"<svg/>");
    }

    #[test]
    fn test_placeholder_escapes_label() {
        let svg = placeholder_svg("<MEM>");
        assert!(svg.contains("&lt;MEM&gt;"));
    }
}
