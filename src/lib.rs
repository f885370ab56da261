//! placard: a small directive template engine for live previews.
//!
//! Give it a template string and a JSON-like context and it returns the
//! rendered text. It exists for author-edited templates (registration
//! confirmations, badges, summaries) that are re-rendered on every keystroke,
//! so it never fails: anything it cannot make sense of degrades to empty
//! text or is left in the output as written.
//!
//! Supported directives:
//! - `{{path.to.value}}` variable tags.
//! - `{{@if expr}} ... {{else}} ... {{/if}}`, with `expr` either a bare path
//!   (truthiness) or `<path> <op> <operand>` where `op` is one of
//!   `== != > >= < <=`.
//! - `{{#each path}} ... {{/each}}` over arrays, with `{{@index}}`,
//!   `{{@first}}` and `{{@last}}` inside the body.
//!
//! Not supported:
//! - Variables, helpers, filters or arithmetic.
//! - `and` / `or` in conditions.
//! - HTML escaping; values are written as plain text.
//!
//! Scoping:
//! - Inside an `#each` body only the current element's properties and the
//!   `@` metadata are visible. Paths from the enclosing context do not
//!   resolve there.
//! - Every `@if` is resolved before any `#each`, so a condition written
//!   inside an `#each` body is evaluated against the enclosing scope, not
//!   against the element. Variable tags in the chosen branch are substituted
//!   against that enclosing scope too.
//!
//! Context values may contain host-owned cells ([`Value::Ref`]); they are
//! read through [`Cell::deref`] wherever a path walks through them.

pub mod ast;
pub mod block;
pub mod condition;
pub mod engine;
pub mod error;
pub mod options;
pub mod path;
pub mod scope;
pub mod value;

pub use ast::{CompareOp, Condition, Operand};
pub use block::{find_block, Block, BlockKind};
pub use condition::{evaluate, parse_condition};
pub use engine::TemplateEngine;
pub use error::{Error, RenderIssue, Rendered, Result};
pub use options::{OperatorDetection, RenderOptions};
pub use path::{resolve, resolve_array};
pub use scope::build_item_scope;
pub use value::{Cell, Object, Ref, Value};

/// Render `template` against `context` with default options.
pub fn render(template: &str, context: &Value) -> String {
    TemplateEngine::default().render(template, context)
}

/// Render against JSON data with default options; a top-level array is
/// reachable as `items`.
pub fn render_json(template: &str, data: &serde_json::Value) -> String {
    TemplateEngine::default().render_json(template, data)
}
