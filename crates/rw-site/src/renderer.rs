//! Markdown to HTML rendering.
//!
//! Headings get stable slug ids so that mini tables of contents and deep
//! links can point at them. Repeated headings are suffixed `-1`, `-2`, ...

use std::collections::HashMap;

use async_trait::async_trait;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use rw_pages::{BoxError, PageRenderer, RenderState};

/// Fallback id for headings whose text produces an empty slug.
const EMPTY_HEADING_ID: &str = "section";

/// Parser options: tables, strikethrough, task lists and GFM extensions.
fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}

/// Allocates unique heading ids within one document.
#[derive(Default)]
struct HeadingIds {
    seen: HashMap<String, usize>,
}

impl HeadingIds {
    fn next(&mut self, text: &str) -> String {
        let mut base = slug::slugify(text);
        if base.is_empty() {
            base = EMPTY_HEADING_ID.to_owned();
        }
        let count = self.seen.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        id
    }
}

/// Render a markdown document to HTML.
#[must_use]
pub fn render_markdown(markdown: &str) -> String {
    let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, options()).collect();

    // Collect heading text first; ids are assigned once each heading closes.
    let mut open: Option<(usize, String)> = None;
    let mut headings = Vec::new();
    for (index, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading { id: None, .. }) => open = Some((index, String::new())),
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, heading_text)) = &mut open {
                    heading_text.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(heading) = open.take() {
                    headings.push(heading);
                }
            }
            _ => {}
        }
    }

    let mut ids = HeadingIds::default();
    for (index, text) in headings {
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[index] {
            *id = Some(CowStr::from(ids.next(&text)));
        }
    }

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output
}

/// Render a one-line inline markdown string (a page title).
///
/// Returns the HTML (without a paragraph wrapper) and the plain text.
#[must_use]
pub fn render_inline(source: &str) -> (String, String) {
    let events: Vec<Event<'_>> = Parser::new_ext(source, options()).collect();

    let plain: String = events
        .iter()
        .filter_map(|event| match event {
            Event::Text(text) | Event::Code(text) => Some(&**text),
            Event::SoftBreak | Event::HardBreak => Some(" "),
            _ => None,
        })
        .collect();

    let mut output = String::new();
    html::push_html(
        &mut output,
        events.into_iter().filter(|event| {
            !matches!(
                event,
                Event::Start(Tag::Paragraph) | Event::End(TagEnd::Paragraph)
            )
        }),
    );

    (output.trim().to_owned(), plain.trim().to_owned())
}

/// [`PageRenderer`] that renders the page's markdown body.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownPageRenderer;

impl MarkdownPageRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PageRenderer for MarkdownPageRenderer {
    async fn render(&self, state: &RenderState) -> Result<String, BoxError> {
        Ok(render_markdown(&state.page().markdown))
    }
}
