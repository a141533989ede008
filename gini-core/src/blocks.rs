//! Inline HTML fragments shown in the chat in place of a normal reply.

use pulldown_cmark_escape::escape_html;

/// Spacer placed between the text answer and the structure card.
pub const SEPARATOR: &str =
    r#"<div style="margin: 24px 0; border-top: 1px solid #e5e7eb; padding-top: 24px;"></div>"#;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut out, text);
    out
}

pub fn error(title: &str, detail: &str) -> String {
    format!(
        r#"<div class="p-3 bg-red-50 border border-red-200 rounded-lg text-red-700"><strong>{}</strong><br/><p class="text-sm mt-1">{}</p></div>"#,
        escape(title),
        escape(detail)
    )
}

pub fn warning(title: &str, detail: &str) -> String {
    format!(
        r#"<div class="p-3 bg-yellow-50 border border-yellow-200 rounded-lg"><p class="text-sm text-yellow-800"><strong>{}</strong></p><p class="text-sm text-yellow-700">{}</p></div>"#,
        escape(title),
        escape(detail)
    )
}

pub fn text_error(detail: &str) -> String {
    error(
        "Text Response Error",
        &format!("Unable to process text response: {detail}"),
    )
}

pub fn image_error(detail: &str) -> String {
    error(
        "Molecular Structure Unavailable",
        &format!("Unable to generate molecular structure: {detail}"),
    )
}

pub fn limited_response() -> String {
    warning(
        "Limited Response",
        "The text response was shorter than expected. Please try rephrasing your question.",
    )
}

pub fn text_missing() -> String {
    warning(
        "Text Content Missing",
        "The text portion of the response was not received properly.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_are_escaped() {
        let html = text_error("<script>alert(1)</script>");
        assert!(html.contains("Text Response Error"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn notices() {
        assert!(limited_response().contains("Limited Response"));
        assert!(text_missing().contains("Text Content Missing"));
        assert!(image_error("Image webhook error: 500").contains("Molecular Structure Unavailable"));
    }
}
