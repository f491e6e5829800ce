//! Markdown to HTML conversion for Quire documents.
//!
//! The content pipeline only depends on the [`MarkupConverter`] trait, so the
//! conversion engine is interchangeable. [`HtmlConverter`] is the default
//! engine: it walks a `pulldown-cmark` event stream and writes HTML fragments
//! suitable for direct embedding into a page's content area.
//!
//! Conversion is pure and total: the same input always yields the same output,
//! and malformed markup degrades to literal text instead of failing.
//!
//! # Example
//!
//! ```
//! use quire_renderer::{HtmlConverter, MarkupConverter};
//!
//! let html = HtmlConverter::new().convert("# Hello\nWorld");
//! assert_eq!(html, "<h1>Hello</h1>\n<p>World</p>\n");
//! ```

mod converter;
mod html;

pub use converter::{HtmlConverter, MarkupConverter};
pub use html::escape_html;
