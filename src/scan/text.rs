// src/scan/text.rs
// =============================================================================
// Turns an HTML page into the plain text a visitor would actually read.
//
// - <script>, <style> and <noscript> contents are dropped entirely
// - every other text node is kept, joined with a space
// - any run of whitespace (newlines, tabs, non-breaking spaces) becomes a
//   single space, and the ends are trimmed
//
// html5ever repairs broken markup on its way in, so this never fails; the
// worst a malformed page can do is produce odd text.
// =============================================================================

use scraper::Html;

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript"];

pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut pieces: Vec<&str> = Vec::new();
    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |element| HIDDEN_ELEMENTS.contains(&element.name()))
        });

        if !hidden {
            pieces.push(text);
        }
    }

    normalize_whitespace(&pieces.join(" "))
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
