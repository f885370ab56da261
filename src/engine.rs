//! The rendering orchestrator.
//!
//! A render runs three phases over the whole template and restarts from the
//! first phase after every block it resolves:
//!
//! 1. the first complete `{{@if}}` block is replaced by its rendered branch;
//! 2. otherwise the first complete `{{#each}}` block is replaced by its body
//!    rendered once per array element;
//! 3. otherwise every `{{path}}` tag is substituted and the result returned.
//!
//! Each restart consumes one block, so the number of passes is bounded by the
//! directives in the template (plus any that context values inject, which
//! [`RenderOptions::max_passes`] caps).

use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::ast::Condition;
use crate::block::{self, BlockKind};
use crate::condition::parse_condition;
use crate::error::{RenderIssue, Rendered};
use crate::options::RenderOptions;
use crate::path;
use crate::scope::build_item_scope;
use crate::value::{Object, Value};

static VARIABLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid variable tag pattern"));

/// Stateless template renderer. Cheap to clone and safe to share.
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    options: RenderOptions,
}

impl TemplateEngine {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `template` against `context`. Never fails; problems degrade to
    /// empty text or to the offending directive left in place.
    pub fn render(&self, template: &str, context: &Value) -> String {
        self.render_with_diagnostics(template, context).output
    }

    /// Like [`render`](Self::render), also reporting every degradation.
    pub fn render_with_diagnostics(&self, template: &str, context: &Value) -> Rendered {
        let mut pass = Pass::new(&self.options);
        let output = pass.render(template, context);
        debug!(
            expansions = pass.expansions,
            issues = pass.issues.len(),
            "rendered template"
        );
        Rendered {
            output,
            issues: pass.issues,
        }
    }

    /// Render against JSON data. A top-level array is stored under
    /// [`RenderOptions::array_root_key`] so it can be reached by path.
    pub fn render_json(&self, template: &str, data: &serde_json::Value) -> String {
        self.render(template, &self.json_context(data))
    }

    pub fn json_context(&self, data: &serde_json::Value) -> Value {
        match data {
            serde_json::Value::Array(_) => {
                let mut root = Object::new();
                root.insert(self.options.array_root_key.clone(), Value::from(data));
                Value::Object(root)
            }
            other => Value::from(other),
        }
    }
}

/// State carried through one top-level render, nested bodies included.
struct Pass<'o> {
    options: &'o RenderOptions,
    issues: Vec<RenderIssue>,
    expansions: usize,
    exhausted: bool,
}

impl<'o> Pass<'o> {
    fn new(options: &'o RenderOptions) -> Self {
        Self {
            options,
            issues: Vec::new(),
            expansions: 0,
            exhausted: false,
        }
    }

    fn render(&mut self, template: &str, scope: &Value) -> String {
        let mut current = template.to_string();
        while !self.exhausted {
            let next = match self.expand_if(&current, scope) {
                Some(next) => next,
                None => match self.expand_each(&current, scope) {
                    Some(next) => next,
                    None => break,
                },
            };
            current = next;
        }
        self.substitute(&current, scope)
    }

    // Count one block expansion against the limit.
    fn spend(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        if self.expansions >= self.options.max_passes {
            warn!(max_passes = self.options.max_passes, "block expansion limit reached");
            self.issues
                .push(RenderIssue::PassLimitReached(self.options.max_passes));
            self.exhausted = true;
            return false;
        }
        self.expansions += 1;
        true
    }

    fn expand_if(&mut self, template: &str, scope: &Value) -> Option<String> {
        let block = block::find_block(template, BlockKind::If)?;
        if !self.spend() {
            return None;
        }
        let condition = parse_condition(block.expr, self.options.operator_detection);
        if let Condition::Malformed(raw) = &condition {
            self.issues.push(RenderIssue::MalformedCondition(raw.clone()));
        }

        let taken = condition.evaluate(scope);
        debug!(expr = block.expr, taken, "resolved @if block");
        let branch = if taken { Some(block.body) } else { block.else_body };
        let replacement = match branch {
            Some(body) => self.render(body, scope),
            None => String::new(),
        };
        Some(splice(template, block.start, block.end, &replacement))
    }

    fn expand_each(&mut self, template: &str, scope: &Value) -> Option<String> {
        let block = block::find_block(template, BlockKind::Each)?;
        if !self.spend() {
            return None;
        }
        let mut replacement = String::new();
        match path::resolve_array(scope, block.expr) {
            Some(items) => {
                debug!(path = block.expr, items = items.len(), "resolved #each block");
                let length = items.len();
                for (index, item) in items.iter().enumerate() {
                    let item_scope = build_item_scope(item, index, length);
                    replacement.push_str(&self.render(block.body, &item_scope));
                }
            }
            None => {
                debug!(path = block.expr, "#each path is not an array");
                self.issues
                    .push(RenderIssue::UnresolvedArray(block.expr.to_string()));
            }
        }
        Some(splice(template, block.start, block.end, &replacement))
    }

    // Text from the first leftover opener onward belongs to a block that never
    // closed and is emitted untouched.
    fn substitute(&mut self, template: &str, scope: &Value) -> String {
        let (head, tail) = match leftover_opener(template) {
            Some((offset, kind)) => {
                if !self.exhausted {
                    self.issues.push(RenderIssue::UnmatchedBlock {
                        directive: kind.directive(),
                        offset,
                    });
                }
                template.split_at(offset)
            }
            None => (template, ""),
        };

        let issues = &mut self.issues;
        let mut output = VARIABLE_TAG
            .replace_all(head, |caps: &Captures<'_>| {
                let raw = &caps[1];
                // Never substitute anything that still names an #each.
                if raw.contains("#each") {
                    return caps[0].to_string();
                }
                let key = raw.trim();
                match path::resolve(scope, key) {
                    Some(value) => value.to_display(),
                    None => {
                        issues.push(RenderIssue::UnresolvedPath(key.to_string()));
                        String::new()
                    }
                }
            })
            .into_owned();
        output.push_str(tail);
        output
    }
}

fn leftover_opener(template: &str) -> Option<(usize, BlockKind)> {
    [BlockKind::If, BlockKind::Each]
        .into_iter()
        .filter_map(|kind| template.find(kind.opener()).map(|at| (at, kind)))
        .min_by_key(|(at, _)| *at)
}

fn splice(template: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(template.len() - (end - start) + replacement.len());
    out.push_str(&template[..start]);
    out.push_str(replacement);
    out.push_str(&template[end..]);
    out
}
