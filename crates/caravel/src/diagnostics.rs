//! Fallback response bodies.
//!
//! Production gets a bare heading; every other mode gets the full error
//! chain and request line.

use std::error::Error as _;
use std::fmt::Write as _;

use caravel_core::{DispatchError, Request};

/// Body of the production not-found response.
pub const NOT_FOUND_BODY: &str =
    r#"<h1 style="font:28px/1.5 Helvetica,Arial,Verdana,sans-serif;">404 Not Found</h1>"#;

/// Body of the production error response.
pub const APPLICATION_ERROR_BODY: &str =
    r#"<h1 style="font:28px/1.5 Helvetica,Arial,Verdana,sans-serif;">Application Error</h1>"#;

/// Title of the diagnostic not-found page.
pub const NOT_FOUND_TITLE: &str = "404: Page Not Found";

/// Title of the diagnostic error page.
pub const ERROR_TITLE: &str = "500: Unexpected Error";

/// Escapes text for HTML element and attribute content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the diagnostic page for `error`.
pub fn render_diagnostics(title: &str, error: &DispatchError, request: &Request) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body style=\"font:14px/1.5 Helvetica,Arial,Verdana,sans-serif;\">\n\
         <h1>{title}</h1>\n\
         <table>\n\
         <tr><th align=\"left\">Code</th><td>{code}</td></tr>\n\
         <tr><th align=\"left\">Message</th><td>{message}</td></tr>\n\
         <tr><th align=\"left\">Request</th><td>{method} {uri}</td></tr>\n\
         <tr><th align=\"left\">Request ID</th><td>{id}</td></tr>\n\
         </table>\n",
        title = escape_html(title),
        code = error.error_code(),
        message = escape_html(&error.to_string()),
        method = escape_html(request.method().as_str()),
        uri = escape_html(request.raw_uri()),
        id = request.id(),
    );

    let mut source = error.source();
    if source.is_some() {
        html.push_str("<h2>Caused by</h2>\n<ol>\n");
        while let Some(cause) = source {
            let _ = writeln!(html, "<li>{}</li>", escape_html(&cause.to_string()));
            source = cause.source();
        }
        html.push_str("</ol>\n");
    }

    html.push_str("</body></html>\n");
    html
}
