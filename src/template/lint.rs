//! Strict template validation
//!
//! The renderer degrades silently on malformed input. This pass walks the
//! same grammar and reports every construct the renderer would pass through
//! as literal text or evaluate in a way the author probably did not intend.

use super::scanner::{BlockKind, Scanner, Stray, Token};
use std::fmt;

/// A problem found in a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintKind {
    /// `%` without a closing delimiter; a literal percent must be written `%%`
    UnclosedDelimiter,
    /// Block open directive without its close token
    UnterminatedBlock(BlockKind),
    /// A block body opens another block of the same kind, which the first
    /// close token ends early
    NestedSameKind(BlockKind),
    /// Close token with no open block
    StrayClose(BlockKind),
    /// Block directive with no name
    EmptyBlockName(BlockKind),
    /// Variable reference with no key
    EmptyVariable,
}

impl fmt::Display for LintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintKind::UnclosedDelimiter => {
                write!(f, "unclosed '%' (write '%%' for a literal percent)")
            }
            LintKind::UnterminatedBlock(kind) => {
                write!(f, "%{} block is missing {}", kind.name(), kind.close())
            }
            LintKind::NestedSameKind(kind) => write!(
                f,
                "nested %{} inside a %{} body is closed by the first {}",
                kind.name(),
                kind.name(),
                kind.close()
            ),
            LintKind::StrayClose(kind) => {
                write!(f, "{} without a matching %{}", kind.close(), kind.name())
            }
            LintKind::EmptyBlockName(kind) => write!(f, "%{} block has no name", kind.name()),
            LintKind::EmptyVariable => write!(f, "variable reference has no key"),
        }
    }
}

/// A lint finding at a byte offset of the linted template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintIssue {
    pub offset: usize,
    pub kind: LintKind,
}

impl LintIssue {
    /// 1-based line and column of the issue within `template`
    pub fn position(&self, template: &str) -> (usize, usize) {
        let before = &template[..self.offset.min(template.len())];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset {}: {}", self.offset, self.kind)
    }
}

/// Report every issue in `template`, ordered by offset
pub fn lint(template: &str) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    lint_block(template, 0, &mut issues);
    issues.sort_by_key(|issue| issue.offset);
    issues
}

fn lint_block(text: &str, base: usize, issues: &mut Vec<LintIssue>) {
    for (offset, token) in Scanner::new(text) {
        let offset = base + offset;
        match token {
            Token::Text(_) | Token::Escape => {}
            Token::Stray(Stray::Unclosed) => issues.push(LintIssue {
                offset,
                kind: LintKind::UnclosedDelimiter,
            }),
            Token::Stray(Stray::UnterminatedBlock(kind)) => {
                issues.push(LintIssue {
                    offset,
                    kind: LintKind::UnterminatedBlock(kind),
                });
                // The rest of the text is still rendered, keep scanning it
            }
            Token::Variable { key, .. } => {
                let kind = if key.is_empty() {
                    Some(LintKind::EmptyVariable)
                } else {
                    BlockKind::ALL
                        .into_iter()
                        .find(|kind| key == kind.close_key())
                        .map(LintKind::StrayClose)
                };
                if let Some(kind) = kind {
                    issues.push(LintIssue { offset, kind });
                }
            }
            Token::Block {
                kind,
                name,
                body,
                body_offset,
            } => {
                if name.is_empty() {
                    issues.push(LintIssue {
                        offset,
                        kind: LintKind::EmptyBlockName(kind),
                    });
                }
                if let Some(inner) = find_same_kind(body, kind) {
                    issues.push(LintIssue {
                        offset: base + body_offset + inner,
                        kind: LintKind::NestedSameKind(kind),
                    });
                }
                lint_block(body, base + body_offset, issues);
            }
        }
    }
}

/// Offset of the first `kind` directive inside `body`, looking through
/// blocks of other kinds. Escaped delimiters are not directives.
fn find_same_kind(body: &str, kind: BlockKind) -> Option<usize> {
    Scanner::new(body).find_map(|(offset, token)| match token {
        Token::Stray(Stray::UnterminatedBlock(found)) if found == kind => Some(offset),
        Token::Block { kind: found, .. } if found == kind => Some(offset),
        Token::Block {
            body, body_offset, ..
        } => find_same_kind(body, kind).map(|inner| body_offset + inner),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(template: &str) -> Vec<LintKind> {
        lint(template).into_iter().map(|issue| issue.kind).collect()
    }

    #[test]
    fn test_clean_template() {
        let template = "Top %top_n% (%convert|USD%) 100%%\n%EACH coins%• %name%\n%END_EACH%%IF exited%x%END_IF%";
        assert!(lint(template).is_empty());
    }

    #[test]
    fn test_unclosed_delimiter() {
        let issues = lint("50% done");
        assert_eq!(
            issues,
            vec![LintIssue {
                offset: 2,
                kind: LintKind::UnclosedDelimiter
            }]
        );
    }

    #[test]
    fn test_unterminated_block() {
        let found = kinds("%EACH coins%%name%");
        assert_eq!(found[0], LintKind::UnterminatedBlock(BlockKind::Each));
        // The open directive's own closing '%' is left unpaired
        assert_eq!(found.last(), Some(&LintKind::UnclosedDelimiter));
    }

    #[test]
    fn test_nested_same_kind() {
        let template = "%IF a%%IF b%x%END_IF%%END_IF%";
        let issues = lint(template);
        assert_eq!(
            issues[0],
            LintIssue {
                offset: 6,
                kind: LintKind::NestedSameKind(BlockKind::If)
            }
        );
        // The outer close token is left over once the inner one ends the block
        assert!(issues.contains(&LintIssue {
            offset: 21,
            kind: LintKind::StrayClose(BlockKind::If)
        }));
    }

    #[test]
    fn test_escaped_open_token_is_not_nested() {
        let template = "%IF a%50%%IF you like%END_IF%";
        assert!(lint(template).is_empty());

        let mut context = crate::template::Map::new();
        context.insert("a".to_string(), true.into());
        assert_eq!(crate::template::render(template, &context), "50%IF you like");
    }

    #[test]
    fn test_nested_same_kind_inside_other_block() {
        let template = "%EACH xs%%IF a%%EACH ys%%END_IF%%END_EACH%";
        let issues = lint(template);
        assert_eq!(
            issues[0],
            LintIssue {
                offset: 15,
                kind: LintKind::NestedSameKind(BlockKind::Each)
            }
        );
    }

    #[test]
    fn test_issues_inside_bodies_use_template_offsets() {
        let template = "ab%IF x%cd% %END_IF%";
        let issues = lint(template);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].offset, 10);
    }

    #[test]
    fn test_empty_names() {
        assert_eq!(
            kinds("%IF %x%END_IF%%|d%"),
            vec![
                LintKind::EmptyBlockName(BlockKind::If),
                LintKind::EmptyVariable
            ]
        );
    }

    #[test]
    fn test_position() {
        let template = "line one\n• %EACH x%";
        let issue = lint(template)[0];
        assert_eq!(issue.position(template), (2, 3));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            LintKind::UnterminatedBlock(BlockKind::Each).to_string(),
            "%EACH block is missing %END_EACH%"
        );
        assert_eq!(
            LintKind::StrayClose(BlockKind::If).to_string(),
            "%END_IF% without a matching %IF"
        );
    }
}
