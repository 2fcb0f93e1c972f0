//! Description sanitizing.
//!
//! Idea descriptions come from a rich-text editor as HTML. Images, figures and
//! background styling are not allowed on the board, so they are stripped before
//! a description is stored or shown.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static FIGURE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<figure\b[^>]*>.*?</figure\s*>").expect("valid figure regex"));

static IMAGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("valid image regex"));

static STYLE_ATTRIBUTE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+style\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid style regex")
});

static BACKGROUND_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^background(?:-image)?\s*:").expect("valid background regex"));

/// Strip image markup and background declarations from editor HTML.
///
/// Pure and idempotent. Everything else passes through untouched.
pub fn sanitize_description(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let without_figures = FIGURE_PATTERN.replace_all(html, "");
    let without_images = IMAGE_PATTERN.replace_all(&without_figures, "");

    STYLE_ATTRIBUTE_PATTERN
        .replace_all(&without_images, |caps: &Captures| {
            let declarations = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();

            let kept: Vec<&str> = declarations
                .split(';')
                .map(str::trim)
                .filter(|part| !part.is_empty() && !BACKGROUND_DECLARATION.is_match(part))
                .collect();

            if kept.is_empty() {
                String::new()
            } else {
                format!(r#" style="{}""#, kept.join("; "))
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_html_passes_through() {
        let html = "<p>Hello <strong>team</strong></p>";
        assert_eq!(sanitize_description(html), html);
        assert_eq!(sanitize_description(""), "");
    }

    #[test]
    fn test_strips_images_and_figures() {
        let html = concat!(
            "<p>before</p>",
            "<figure class=\"image\"><img src=\"a.png\"><figcaption>cap</figcaption></figure>",
            "<p>mid<IMG SRC='b.png' /></p>",
            "<FIGURE>\n<img src=\"c.png\">\n</FIGURE>",
            "<p>after</p>"
        );
        assert_eq!(
            sanitize_description(html),
            "<p>before</p><p>mid</p><p>after</p>"
        );
    }

    #[test]
    fn test_strips_background_declarations() {
        let html = r#"<p style="color: red; background: url(x.png); font-weight: bold">x</p>"#;
        assert_eq!(
            sanitize_description(html),
            r#"<p style="color: red; font-weight: bold">x</p>"#
        );

        let html = r#"<span style="background-image:url(y.png)">y</span>"#;
        assert_eq!(sanitize_description(html), "<span>y</span>");

        let html = r#"<div style='BACKGROUND: blue;'>z</div>"#;
        assert_eq!(sanitize_description(html), "<div>z</div>");
    }

    #[test]
    fn test_keeps_background_color() {
        let html = r#"<mark style="background-color: yellow">hi</mark>"#;
        assert_eq!(sanitize_description(html), html);
    }

    #[test]
    fn test_idempotent() {
        let html = r#"<p style="background: red; color: blue">a<img src="b"></p>"#;
        let once = sanitize_description(html);
        assert_eq!(sanitize_description(&once), once);
    }
}
