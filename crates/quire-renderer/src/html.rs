//! HTML writer over a `pulldown-cmark` event stream.
//!
//! Every block element ends with a newline, so the fragment reads one block
//! per line. Text and attribute values are escaped; raw HTML written by the
//! author is passed through.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Tag, TagEnd};

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn alignment_style(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::None => "",
        Alignment::Left => r#" style="text-align: left""#,
        Alignment::Center => r#" style="text-align: center""#,
        Alignment::Right => r#" style="text-align: right""#,
    }
}

/// Code block being collected.
struct CodeBlock {
    lang: Option<String>,
    content: String,
}

/// Image being collected; alt text arrives as nested events.
struct PendingImage {
    src: String,
    title: String,
    alt: String,
}

/// Table layout state.
#[derive(Default)]
struct TableState {
    alignments: Vec<Alignment>,
    cell: usize,
    in_head: bool,
}

impl TableState {
    fn current_alignment(&self) -> Alignment {
        self.alignments
            .get(self.cell)
            .copied()
            .unwrap_or(Alignment::None)
    }
}

/// Single-use HTML writer.
pub(crate) struct HtmlWriter {
    output: String,
    code: Option<CodeBlock>,
    image: Option<PendingImage>,
    table: TableState,
}

impl HtmlWriter {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            output: String::with_capacity(capacity),
            code: None,
            image: None,
            table: TableState::default(),
        }
    }

    /// Consume the event stream and return the HTML fragment.
    pub(crate) fn write<'a, I>(mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }
        self.output
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.output.push_str("<br>\n"),
            Event::Rule => {
                self.block_start();
                self.output.push_str("<hr>\n");
            }
            Event::TaskListMarker(checked) => self.output.push_str(if checked {
                r#"<input type="checkbox" checked disabled> "#
            } else {
                r#"<input type="checkbox" disabled> "#
            }),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not enabled in parser options
            }
        }
    }

    /// Start block elements on a fresh line.
    fn block_start(&mut self) {
        if !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.block_start();
                self.output.push_str("<p>");
            }
            Tag::Heading { level, .. } => {
                self.block_start();
                self.output.push('<');
                self.output.push_str(heading_tag(level));
                self.output.push('>');
            }
            Tag::BlockQuote(_) => {
                self.block_start();
                self.output.push_str("<blockquote>\n");
            }
            Tag::CodeBlock(kind) => {
                self.block_start();
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .filter(|lang| !lang.is_empty())
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeBlock {
                    lang,
                    content: String::new(),
                });
            }
            Tag::List(start) => {
                self.block_start();
                match start {
                    Some(1) => self.output.push_str("<ol>\n"),
                    Some(n) => self.output.push_str(&format!("<ol start=\"{n}\">\n")),
                    None => self.output.push_str("<ul>\n"),
                }
            }
            Tag::Item => {
                self.block_start();
                self.output.push_str("<li>");
            }
            Tag::Table(alignments) => {
                self.block_start();
                self.table = TableState {
                    alignments,
                    ..TableState::default()
                };
                self.output.push_str("<table>\n");
            }
            Tag::TableHead => {
                self.table.in_head = true;
                self.table.cell = 0;
                self.output.push_str("<thead>\n<tr>");
            }
            Tag::TableRow => {
                self.table.cell = 0;
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let tag = if self.table.in_head { "th" } else { "td" };
                let style = alignment_style(self.table.current_alignment());
                self.output.push_str(&format!("<{tag}{style}>"));
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = format!(r#"<a href="{}""#, escape_html(&dest_url));
                if !title.is_empty() {
                    link.push_str(&format!(r#" title="{}""#, escape_html(&title)));
                }
                link.push('>');
                self.push_inline(&link);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(PendingImage {
                    src: dest_url.into_string(),
                    title: title.into_string(),
                    alt: String::new(),
                });
            }
            Tag::HtmlBlock
            | Tag::FootnoteDefinition(_)
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>\n"),
            TagEnd::Heading(level) => {
                self.output.push_str("</");
                self.output.push_str(heading_tag(level));
                self.output.push_str(">\n");
            }
            TagEnd::BlockQuote(_) => {
                self.block_start();
                self.output.push_str("</blockquote>\n");
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    match code.lang {
                        Some(lang) => self.output.push_str(&format!(
                            r#"<pre><code class="language-{}">"#,
                            escape_html(&lang)
                        )),
                        None => self.output.push_str("<pre><code>"),
                    }
                    self.output.push_str(&escape_html(&code.content));
                    self.output.push_str("</code></pre>\n");
                }
            }
            TagEnd::List(ordered) => {
                self.block_start();
                self.output
                    .push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            TagEnd::Item => self.output.push_str("</li>\n"),
            TagEnd::Table => self.output.push_str("</tbody>\n</table>\n"),
            TagEnd::TableHead => {
                self.table.in_head = false;
                self.output.push_str("</tr>\n</thead>\n<tbody>\n");
            }
            TagEnd::TableRow => self.output.push_str("</tr>\n"),
            TagEnd::TableCell => {
                self.output
                    .push_str(if self.table.in_head { "</th>" } else { "</td>" });
                self.table.cell += 1;
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                if let Some(image) = self.image.take() {
                    let title_attr = if image.title.is_empty() {
                        String::new()
                    } else {
                        format!(r#" title="{}""#, escape_html(&image.title))
                    };
                    self.output.push_str(&format!(
                        r#"<img src="{}" alt="{}"{title_attr}>"#,
                        escape_html(&image.src),
                        escape_html(&image.alt)
                    ));
                }
            }
            TagEnd::HtmlBlock
            | TagEnd::FootnoteDefinition
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition => {}
        }
    }

    /// Inline markup is dropped while collecting image alt text.
    fn push_inline(&mut self, html: &str) {
        if self.image.is_none() {
            self.output.push_str(html);
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.content.push_str(text);
        } else if let Some(image) = self.image.as_mut() {
            image.alt.push_str(text);
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if let Some(image) = self.image.as_mut() {
            image.alt.push_str(code);
        } else {
            self.output.push_str("<code>");
            self.output.push_str(&escape_html(code));
            self.output.push_str("</code>");
        }
    }

    fn soft_break(&mut self) {
        if let Some(image) = self.image.as_mut() {
            image.alt.push(' ');
        } else {
            self.output.push('\n');
        }
    }
}
