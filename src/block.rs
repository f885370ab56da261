//! Locating paired block directives in template text.
//!
//! Only the first opener of a kind is considered. Its closer is found by
//! counting same-kind openers and closers; other kinds of tags are plain
//! text to the scan.

use regex::Regex;
use std::sync::LazyLock;

static IF_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{@if\s(.*?)\}\}").expect("valid @if opener pattern"));

static EACH_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{#each\s+([^}]+?)\s*\}\}").expect("valid #each opener pattern"));

const ELSE: &str = "{{else}}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    If,
    Each,
}

impl BlockKind {
    pub fn opener(self) -> &'static str {
        match self {
            BlockKind::If => "{{@if ",
            BlockKind::Each => "{{#each ",
        }
    }

    pub fn closer(self) -> &'static str {
        match self {
            BlockKind::If => "{{/if}}",
            BlockKind::Each => "{{/each}}",
        }
    }

    pub fn directive(self) -> &'static str {
        match self {
            BlockKind::If => "@if",
            BlockKind::Each => "#each",
        }
    }

    fn opener_pattern(self) -> &'static Regex {
        match self {
            BlockKind::If => &*IF_OPENER,
            BlockKind::Each => &*EACH_OPENER,
        }
    }
}

/// A matched block. Offsets are byte positions into the scanned template;
/// `start..end` covers the opener through the closer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'t> {
    pub expr: &'t str,
    pub body: &'t str,
    pub else_body: Option<&'t str>,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan<'t> {
    /// No opener of this kind anywhere.
    Absent,
    /// The first opener has no closer, or its tag never closes.
    Unmatched { start: usize },
    Found(Block<'t>),
}

/// First block of `kind` in `template`, if it is complete.
pub fn find_block(template: &str, kind: BlockKind) -> Option<Block<'_>> {
    match scan(template, kind) {
        Scan::Found(block) => Some(block),
        Scan::Absent | Scan::Unmatched { .. } => None,
    }
}

pub fn scan(template: &str, kind: BlockKind) -> Scan<'_> {
    let Some(start) = template.find(kind.opener()) else {
        return Scan::Absent;
    };
    let Some(caps) = kind.opener_pattern().captures(&template[start..]) else {
        return Scan::Unmatched { start };
    };
    let (Some(tag), Some(expr)) = (caps.get(0), caps.get(1)) else {
        return Scan::Unmatched { start };
    };
    let body_start = start + tag.end();

    let (opener, closer) = (kind.opener(), kind.closer());
    let mut depth = 1usize;
    let mut cursor = body_start;
    let mut else_span: Option<(usize, usize)> = None;

    loop {
        let rest = &template[cursor..];
        let next_open = rest.find(opener).map(|i| (i, Tag::Open));
        let next_close = rest.find(closer).map(|i| (i, Tag::Close));
        let next_else = match kind {
            BlockKind::If => rest.find(ELSE).map(|i| (i, Tag::Else)),
            BlockKind::Each => None,
        };
        let Some((offset, tag)) = next_open
            .into_iter()
            .chain(next_close)
            .chain(next_else)
            .min_by_key(|(i, _)| *i)
        else {
            return Scan::Unmatched { start };
        };

        let at = cursor + offset;
        match tag {
            Tag::Open => {
                depth += 1;
                cursor = at + opener.len();
            }
            Tag::Else => {
                if depth == 1 && else_span.is_none() {
                    else_span = Some((at, at + ELSE.len()));
                }
                cursor = at + ELSE.len();
            }
            Tag::Close => {
                depth -= 1;
                if depth == 0 {
                    let (body, else_body) = match else_span {
                        Some((else_start, else_end)) => (
                            &template[body_start..else_start],
                            Some(&template[else_end..at]),
                        ),
                        None => (&template[body_start..at], None),
                    };
                    return Scan::Found(Block {
                        expr: expr.as_str().trim(),
                        body,
                        else_body,
                        start,
                        end: at + closer.len(),
                    });
                }
                cursor = at + closer.len();
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tag {
    Open,
    Close,
    Else,
}
