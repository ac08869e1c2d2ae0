//! Markdown to sanitized HTML.
//!
//! [`MarkdownRenderer`] is the app's [`Renderer`]:
//!
//! - GitHub-flavored parsing via pulldown-cmark (tables, strikethrough,
//!   task lists).
//! - Fenced code blocks highlighted with syntect into class-based spans,
//!   wrapped in `<pre><code class="hljs language-…">`. Unknown languages
//!   render as plain text.
//! - The text of the first level-1 heading is captured in the same pass
//!   and returned with the HTML.
//! - The final HTML goes through ammonia, which drops scripts, event
//!   handler attributes, and `javascript:` URLs while keeping `class` on
//!   `pre`, `code`, and `span`.

use anyhow::Result;
use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use mdblog_core::render::{Rendered, Renderer};

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

const PLAINTEXT: &str = "plaintext";

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self
    }

    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<Rendered> {
        let (html, title) = to_html(markdown);
        Ok(Rendered {
            html: sanitize(&html),
            title,
        })
    }
}

/// Where the event walk currently is.
enum State {
    Normal,
    /// Inside the first level-1 heading.
    Title(String),
    /// Inside a fenced or indented code block.
    Code { lang: Option<String>, code: String },
}

/// Render to unsanitized HTML, returning the first H1's text alongside.
fn to_html(markdown: &str) -> (String, Option<String>) {
    let parser = Parser::new_ext(markdown, MarkdownRenderer::options());

    let mut title: Option<String> = None;
    let mut seen_h1 = false;
    let mut state = State::Normal;
    let mut events: Vec<Event> = Vec::new();

    for event in parser {
        state = match (state, event) {
            (State::Code { lang, code }, Event::End(TagEnd::CodeBlock)) => {
                let html = highlight(&code, lang.as_deref());
                events.push(Event::Html(CowStr::from(html)));
                State::Normal
            }
            (State::Code { lang, mut code }, Event::Text(text)) => {
                code.push_str(&text);
                State::Code { lang, code }
            }
            (code @ State::Code { .. }, _) => code,

            (State::Normal, Event::Start(Tag::CodeBlock(kind))) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => language_tag(&info),
                    CodeBlockKind::Indented => None,
                };
                State::Code {
                    lang,
                    code: String::new(),
                }
            }
            (State::Normal, event) if !seen_h1 && is_h1_start(&event) => {
                seen_h1 = true;
                events.push(event);
                State::Title(String::new())
            }
            (State::Normal, event) => {
                events.push(event);
                State::Normal
            }

            (State::Title(text), event @ Event::End(TagEnd::Heading(HeadingLevel::H1))) => {
                let text = text.trim();
                if !text.is_empty() {
                    title = Some(text.to_string());
                }
                events.push(event);
                State::Normal
            }
            (State::Title(mut text), event) => {
                if let Event::Text(t) | Event::Code(t) = &event {
                    text.push_str(t);
                }
                events.push(event);
                State::Title(text)
            }
        };
    }

    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    (html, title)
}

fn is_h1_start(event: &Event) -> bool {
    matches!(
        event,
        Event::Start(Tag::Heading {
            level: HeadingLevel::H1,
            ..
        })
    )
}

/// First word of a fence info string (`rust,ignore` → `rust`), restricted
/// to characters that are safe inside a class attribute.
fn language_tag(info: &str) -> Option<String> {
    let tag = info
        .split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .unwrap_or("");
    let tag: String = tag
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#' | '.'))
        .collect();
    (!tag.is_empty()).then_some(tag)
}

/// Resolve a language tag to a syntax, or `None` when it is unknown.
fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    SYNTAXES
        .find_syntax_by_token(lang)
        .filter(|s| s.name != "Plain Text")
}

/// Highlight a code block. Never fails: if syntect errors on a known
/// language the block is emitted as escaped plain text.
fn highlight(code: &str, lang: Option<&str>) -> String {
    let Some((syntax, lang)) = lang.and_then(|l| find_syntax(l).map(|s| (s, l))) else {
        return plain_block(code);
    };
    let class_lang = lang.to_ascii_lowercase();
    match classed_html(code, syntax) {
        Ok(html) => code_block(&class_lang, &html),
        Err(e) => {
            tracing::warn!(lang = %class_lang, error = %e, "highlighting failed, using plain text");
            plain_block(code)
        }
    }
}

fn classed_html(code: &str, syntax: &SyntaxReference) -> Result<String> {
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(generator.finalize())
}

fn plain_block(code: &str) -> String {
    code_block(PLAINTEXT, &Escape(code).to_string())
}

/// HTML-escapes `<`, `>`, `&`, `'` and `"` when displayed (same output as
/// syntect's internal `Escape`, which syntect does not export).
struct Escape<'a>(&'a str);

impl std::fmt::Display for Escape<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut last = 0;
        for (i, b) in self.0.bytes().enumerate() {
            let rep = match b {
                b'>' => "&gt;",
                b'<' => "&lt;",
                b'&' => "&amp;",
                b'\'' => "&#39;",
                b'"' => "&quot;",
                _ => continue,
            };
            f.write_str(&self.0[last..i])?;
            f.write_str(rep)?;
            last = i + 1;
        }
        f.write_str(&self.0[last..])
    }
}

fn code_block(class_lang: &str, inner_html: &str) -> String {
    format!(
        "<pre><code class=\"hljs language-{}\">{}</code></pre>\n",
        class_lang, inner_html
    )
}

fn sanitize(html: &str) -> String {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tags(&["input"])
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tag_attributes("pre", &["class"])
        .add_tag_attributes("code", &["class"])
        .add_tag_attributes("span", &["class"]);
    builder.clean(html).to_string()
}
