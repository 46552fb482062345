//! Percent-delimited template engine
//!
//! Templates are plain text with four kinds of directive:
//!
//! | Directive | Meaning |
//! |---|---|
//! | `%%` | literal `%` |
//! | `%key%`, `%key\|default%` | value of `key`, or `default` when it is empty |
//! | `%IF key% ... %END_IF%` | body when `key` is truthy |
//! | `%EACH key% ... %END_EACH%` | body once per mapping in the `key` sequence |
//!
//! Rendering never fails. Unknown names render empty, and malformed
//! directives pass through as literal text. Use [`lint`] to catch authoring
//! mistakes before a template is deployed.
//!
//! Block close tokens are matched textually, so a block body must not open
//! another block of the same kind.

mod lint;
mod record;
mod render;
mod scanner;
mod value;

pub use lint::{lint, LintIssue, LintKind};
pub use record::{serialized_fields, Record};
pub use render::{render, resolve, Renderer, DEFAULT_MAX_DEPTH};
pub use scanner::{BlockKind, Scanner, Stray, Token};
pub use value::{stringify, truthy, Map, Number, Value};
