//! Render a fetch document back to query text.

use super::ast::{Element, FetchDocument, Node};

/// Render the document as compact, single-line query text.
pub fn render(document: &FetchDocument) -> String {
    let mut out = String::new();
    render_element(&document.root, &mut out);
    out
}

fn render_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str(" />");
        return;
    }

    out.push('>');
    for child in &element.children {
        match child {
            Node::Element(child) => render_element(child, out),
            Node::Text(text) => out.push_str(&escape(text)),
        }
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn escape(raw: &str) -> String {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return raw.to_string();
    }
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
