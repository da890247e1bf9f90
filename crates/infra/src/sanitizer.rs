//! Rich-text description sanitizing.

/// Strips unsafe markup from admin-authored HTML before it is stored.
pub trait HtmlSanitizer: Send + Sync {
    fn sanitize(&self, html: &str) -> String;
}

/// `ammonia` with its default allow-list (formatting, lists, links; no scripts or handlers).
#[derive(Debug, Default, Clone, Copy)]
pub struct AmmoniaSanitizer;

impl HtmlSanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> String {
        ammonia::clean(html)
    }
}
