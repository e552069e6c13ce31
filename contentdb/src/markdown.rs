//! Markdown body rendering. Pure text → HTML; a record is never dropped
//! because of its body, so this path has no failure mode.

use pulldown_cmark::{html, Options, Parser};

/// Render a Markdown body to HTML.
pub fn render(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(text, options);
    let mut out = String::with_capacity(text.len() * 2);
    html::push_html(&mut out, parser);
    out
}
