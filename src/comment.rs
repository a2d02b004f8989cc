use std::collections::BTreeSet;
use std::fmt;

pub const OPEN_MARKER: &str = "<!--";
pub const CLOSE_MARKER: &str = "-->";

/// Classification of a comment by the sentinel right after `<!--`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommentKind {
    Plain,
    /// `<!--[if IE]>...<![endif]-->` and the `<!--<![endif]-->` closer.
    Conditional,
    /// Server-side include style, e.g. `<!--#include file="x"-->`.
    ServerDirective,
}

impl CommentKind {
    pub fn classify(content: &str) -> Self {
        if is_conditional_opener(content) || starts_with_ignore_case(content, "<![endif]") {
            CommentKind::Conditional
        } else if content.starts_with('#') {
            CommentKind::ServerDirective
        } else {
            CommentKind::Plain
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommentKind::Plain => "plain",
            CommentKind::Conditional => "conditional",
            CommentKind::ServerDirective => "server-directive",
        }
    }
}

impl fmt::Display for CommentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[if` followed by a word boundary, so `[iframe ...]` stays plain.
fn is_conditional_opener(content: &str) -> bool {
    starts_with_ignore_case(content, "[if")
        && content[3..]
            .chars()
            .next()
            .map_or(false, |c| c.is_whitespace() || matches!(c, ']' | '!' | '('))
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Byte range `start..end` of one comment, markers included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSpan {
    pub start: usize,
    pub end: usize,
    pub kind: CommentKind,
}

impl CommentSpan {
    pub fn as_str<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    /// Text between the markers.
    pub fn content<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start + OPEN_MARKER.len()..self.end - CLOSE_MARKER.len()]
    }
}

/// Lazy left-to-right scan over the comments of a text. Clone it to restart.
#[derive(Debug, Clone)]
pub struct CommentSpans<'a> {
    text: &'a str,
    pos: usize,
}

pub fn comment_spans(text: &str) -> CommentSpans<'_> {
    CommentSpans { text, pos: 0 }
}

impl Iterator for CommentSpans<'_> {
    type Item = CommentSpan;

    fn next(&mut self) -> Option<CommentSpan> {
        let open = self.text.get(self.pos..)?.find(OPEN_MARKER)?;
        let start = self.pos + open;
        let body = start + OPEN_MARKER.len();

        // An unterminated opener can't be closed by anything later either.
        let Some(close) = self.text[body..].find(CLOSE_MARKER) else {
            self.pos = self.text.len();
            return None;
        };

        let end = body + close + CLOSE_MARKER.len();
        self.pos = end;
        Some(CommentSpan {
            start,
            end,
            kind: CommentKind::classify(&self.text[body..body + close]),
        })
    }
}

impl std::iter::FusedIterator for CommentSpans<'_> {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Only(BTreeSet<CommentKind>),
}

/// Which comments get deleted. Fixed for a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalPolicy {
    scope: Scope,
    contains: Option<String>,
}

impl Default for RemovalPolicy {
    fn default() -> Self {
        RemovalPolicy::all()
    }
}

impl RemovalPolicy {
    pub fn all() -> Self {
        RemovalPolicy {
            scope: Scope::All,
            contains: None,
        }
    }

    pub fn only(kinds: impl IntoIterator<Item = CommentKind>) -> Self {
        RemovalPolicy {
            scope: Scope::Only(kinds.into_iter().collect()),
            contains: None,
        }
    }

    /// Further restrict removal to comments whose content contains `needle`.
    pub fn with_contains(mut self, needle: impl Into<String>) -> Self {
        self.contains = Some(needle.into());
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn selects(&self, span: &CommentSpan, text: &str) -> bool {
        let in_scope = match &self.scope {
            Scope::All => true,
            Scope::Only(kinds) => kinds.contains(&span.kind),
        };
        in_scope
            && self
                .contains
                .as_deref()
                .map_or(true, |needle| span.content(text).contains(needle))
    }
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Scope::All => f.write_str("all")?,
            Scope::Only(kinds) => {
                let names: Vec<_> = kinds.iter().map(CommentKind::as_str).collect();
                f.write_str(&names.join(","))?;
            }
        }
        if let Some(needle) = &self.contains {
            write!(f, " containing {needle:?}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripped {
    pub text: String,
    pub removed: usize,
    pub kept: usize,
}

impl Stripped {
    pub fn changed(&self) -> bool {
        self.removed > 0
    }
}

/// Deletes every comment the policy selects, leaving all other bytes as they were.
pub fn strip_comments(text: &str, policy: &RemovalPolicy) -> Stripped {
    let mut output = String::with_capacity(text.len());
    let mut copied_to = 0;
    let mut removed = 0;
    let mut kept = 0;

    for span in comment_spans(text) {
        if policy.selects(&span, text) {
            output.push_str(&text[copied_to..span.start]);
            copied_to = span.end;
            removed += 1;
        } else {
            kept += 1;
        }
    }
    output.push_str(&text[copied_to..]);

    Stripped {
        text: output,
        removed,
        kept,
    }
}
