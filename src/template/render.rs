//! Template evaluator
//!
//! Walks the scanner's tokens, resolves names against the local and root
//! scopes and recurses into block bodies.

use super::scanner::{BlockKind, Scanner, Token, DELIM};
use super::value::{stringify, truthy, Map, Value};
use crate::{Error, Result};

/// Maximum block nesting evaluated by [`Renderer::default`]
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Resolve `key`, checking the local scope before the root scope.
///
/// The empty key never resolves.
pub fn resolve<'a>(local: Option<&'a Map>, root: &'a Map, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return None;
    }
    local
        .and_then(|scope| scope.get(key))
        .or_else(|| root.get(key))
}

#[derive(Clone, Copy)]
struct Scope<'a> {
    root: &'a Map,
    local: Option<&'a Map>,
}

impl<'a> Scope<'a> {
    fn resolve(&self, key: &str) -> Option<&'a Value> {
        resolve(self.local, self.root, key)
    }

    fn with_local(self, local: &'a Map) -> Self {
        Self {
            local: Some(local),
            ..self
        }
    }
}

/// Renders templates against a context with a bounded block nesting depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    max_depth: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum number of nested blocks evaluated
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Render `template` against `context`.
    ///
    /// Never fails. Blocks nested deeper than the configured ceiling
    /// contribute no output.
    pub fn render(&self, template: &str, context: &Map) -> String {
        self.evaluate(template, context).0
    }

    /// Like [`Renderer::render`], but reports a template that hit the
    /// nesting ceiling instead of returning the truncated text
    pub fn render_checked(&self, template: &str, context: &Map) -> Result<String> {
        match self.evaluate(template, context) {
            (out, false) => Ok(out),
            (_, true) => Err(Error::TemplateTooDeep {
                limit: self.max_depth,
            }),
        }
    }

    fn evaluate(&self, template: &str, context: &Map) -> (String, bool) {
        let mut out = String::with_capacity(template.len());
        let mut overflow = false;
        let scope = Scope {
            root: context,
            local: None,
        };
        self.render_block(template, scope, 0, &mut out, &mut overflow);
        (out, overflow)
    }

    fn render_block(
        &self,
        template: &str,
        scope: Scope<'_>,
        depth: usize,
        out: &mut String,
        overflow: &mut bool,
    ) {
        for (_, token) in Scanner::new(template) {
            match token {
                Token::Text(text) => out.push_str(text),
                Token::Escape | Token::Stray(_) => out.push(DELIM),
                Token::Variable { key, default } => {
                    let text = stringify(scope.resolve(key));
                    if text.trim().is_empty() {
                        out.push_str(default);
                    } else {
                        out.push_str(&text);
                    }
                }
                Token::Block { kind, name, body, .. } => {
                    if depth >= self.max_depth {
                        *overflow = true;
                        continue;
                    }
                    match kind {
                        BlockKind::Each => {
                            let items = scope.resolve(name).and_then(Value::as_seq);
                            // Elements without named fields have nothing to iterate over
                            for item in items.unwrap_or_default().iter().filter_map(Value::as_map) {
                                self.render_block(
                                    body,
                                    scope.with_local(item),
                                    depth + 1,
                                    out,
                                    overflow,
                                );
                            }
                        }
                        BlockKind::If => {
                            if truthy(scope.resolve(name)) {
                                self.render_block(body, scope, depth + 1, out, overflow);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Render `template` against `context` with the default [`Renderer`]
pub fn render(template: &str, context: &Map) -> String {
    Renderer::default().render(template, context)
}
