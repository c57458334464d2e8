// src/utils/html.rs

//! HTML-to-text utilities.

use scraper::Html;

/// Strip markup from an HTML fragment, returning normalized plain text.
///
/// # Examples
/// ```
/// use folio::utils::html::strip_tags;
///
/// assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
/// ```
pub fn strip_tags(fragment: &str) -> String {
    // Fast path: nothing that could be markup or an entity.
    if !fragment.contains('<') && !fragment.contains('&') {
        return normalize_whitespace(fragment);
    }

    let parsed = Html::parse_fragment(fragment);
    let text: String = parsed.root_element().text().collect::<Vec<_>>().join(" ");
    normalize_whitespace(&text)
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags_plain_passthrough() {
        assert_eq!(strip_tags("Hello world"), "Hello world");
    }

    #[test]
    fn test_strip_tags_removes_markup() {
        assert_eq!(
            strip_tags("<p>Grand <em>Opening</em><br>2024</p>"),
            "Grand Opening 2024"
        );
    }

    #[test]
    fn test_strip_tags_decodes_entities() {
        assert_eq!(strip_tags("Fish &amp; Chips"), "Fish & Chips");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
    }
}
