//! Minimal SVG element writer.
//!
//! Enough structure to emit a well-formed document with escaped
//! attribute and text content; no DOM, no pretty-printing beyond one
//! element per line.

use std::fmt::Write;

/// Escape text for use in attribute values or element content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a coordinate without trailing noise (1 decimal is plenty at
/// canvas resolution; integers stay bare).
pub fn fmt_num(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.1}")
    }
}

/// Streaming SVG writer with open/close tag tracking.
#[derive(Debug, Default)]
pub struct SvgWriter {
    buf: String,
    stack: Vec<&'static str>,
}

impl SvgWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn indent(&mut self) {
        for _ in 0..self.stack.len() {
            self.buf.push_str("  ");
        }
    }

    fn write_attrs(&mut self, attrs: &[(&str, String)]) {
        for (name, value) in attrs {
            // Infallible on String.
            let _ = write!(self.buf, " {name}=\"{}\"", escape(value));
        }
    }

    /// Open a container element.
    pub fn open(&mut self, tag: &'static str, attrs: &[(&str, String)]) {
        self.indent();
        self.buf.push('<');
        self.buf.push_str(tag);
        self.write_attrs(attrs);
        self.buf.push_str(">\n");
        self.stack.push(tag);
    }

    /// Emit a self-closing element.
    pub fn element(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.indent();
        self.buf.push('<');
        self.buf.push_str(tag);
        self.write_attrs(attrs);
        self.buf.push_str("/>\n");
    }

    /// Emit an element wrapping escaped text content.
    pub fn text_element(&mut self, tag: &str, attrs: &[(&str, String)], text: &str) {
        self.indent();
        self.buf.push('<');
        self.buf.push_str(tag);
        self.write_attrs(attrs);
        let _ = write!(self.buf, ">{}</{tag}>\n", escape(text));
    }

    /// Close the innermost open element.
    pub fn close(&mut self) {
        if let Some(tag) = self.stack.pop() {
            self.indent();
            let _ = write!(self.buf, "</{tag}>\n");
        }
    }

    /// Close any remaining elements and return the document text.
    pub fn finish(mut self) -> String {
        while !self.stack.is_empty() {
            self.close();
        }
        self.buf
    }
}
