//! Directive scanner
//!
//! Splits template text into literal runs and `%`-delimited directives.
//! Block close tokens are located with a plain textual search for the first
//! occurrence after the opening directive. Nesting is not tracked, so a block
//! body containing another block of the same kind is closed by the inner
//! block's close token.

/// Directive delimiter
pub const DELIM: char = '%';
/// Escaped delimiter, rendered as a single `%`
pub const ESCAPE: &str = "%%";

/// Kind of block directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `%EACH name% ... %END_EACH%`
    Each,
    /// `%IF name% ... %END_IF%`
    If,
}

impl BlockKind {
    pub const ALL: [BlockKind; 2] = [BlockKind::Each, BlockKind::If];

    pub fn open(&self) -> &'static str {
        match self {
            BlockKind::Each => "%EACH ",
            BlockKind::If => "%IF ",
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            BlockKind::Each => "%END_EACH%",
            BlockKind::If => "%END_IF%",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Each => "EACH",
            BlockKind::If => "IF",
        }
    }

    /// Close token name as it would appear if parsed as a variable key
    pub(crate) fn close_key(&self) -> &'static str {
        match self {
            BlockKind::Each => "END_EACH",
            BlockKind::If => "END_IF",
        }
    }

    fn opening(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| text.starts_with(kind.open()))
    }
}

/// Why a delimiter was passed through as literal text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stray {
    /// No second delimiter before the end of the template
    Unclosed,
    /// Block open directive or its close token is missing
    UnterminatedBlock(BlockKind),
}

/// A scanned piece of template text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text, free of delimiters
    Text(&'a str),
    /// `%%`
    Escape,
    /// `%key%` or `%key|default%`; `key` is trimmed, `default` is raw
    Variable { key: &'a str, default: &'a str },
    /// A complete block directive
    Block {
        kind: BlockKind,
        name: &'a str,
        body: &'a str,
        /// Byte offset of `body` within the scanned text
        body_offset: usize,
    },
    /// A lone delimiter emitted literally
    Stray(Stray),
}

/// Iterator over `(byte offset, token)` pairs of a template
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn block(&self, kind: BlockKind) -> Option<(Token<'a>, usize)> {
        let text = self.text;
        let name_start = self.pos + kind.open().len();
        let name_len = text[name_start..].find(DELIM)?;
        let body_start = name_start + name_len + 1;
        let body_len = text[body_start..].find(kind.close())?;

        let token = Token::Block {
            kind,
            name: text[name_start..name_start + name_len].trim(),
            body: &text[body_start..body_start + body_len],
            body_offset: body_start,
        };
        Some((token, body_start + body_len + kind.close().len()))
    }

    fn variable(&self) -> Option<(Token<'a>, usize)> {
        let text = self.text;
        let token_start = self.pos + DELIM.len_utf8();
        let token_len = text[token_start..].find(DELIM)?;
        let raw = &text[token_start..token_start + token_len];
        let (key, default) = raw.split_once('|').unwrap_or((raw, ""));

        let token = Token::Variable {
            key: key.trim(),
            default,
        };
        Some((token, token_start + token_len + DELIM.len_utf8()))
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = (usize, Token<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;
        let start = self.pos;
        let rest = &text[start..];
        if rest.is_empty() {
            return None;
        }

        let (token, next) = if rest.starts_with(ESCAPE) {
            (Token::Escape, start + ESCAPE.len())
        } else if let Some(kind) = BlockKind::opening(rest) {
            self.block(kind).unwrap_or((
                Token::Stray(Stray::UnterminatedBlock(kind)),
                start + DELIM.len_utf8(),
            ))
        } else if rest.starts_with(DELIM) {
            self.variable()
                .unwrap_or((Token::Stray(Stray::Unclosed), start + DELIM.len_utf8()))
        } else {
            let len = rest.find(DELIM).unwrap_or(rest.len());
            (Token::Text(&rest[..len]), start + len)
        };

        self.pos = next;
        Some((start, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token<'_>> {
        Scanner::new(text).map(|(_, token)| token).collect()
    }

    #[test]
    fn test_text_and_escape() {
        assert_eq!(
            tokens("a %% b"),
            vec![Token::Text("a "), Token::Escape, Token::Text(" b")]
        );
    }

    #[test]
    fn test_variable_with_default() {
        assert_eq!(
            tokens("% name |Anon %"),
            vec![Token::Variable {
                key: "name",
                default: "Anon "
            }]
        );
        assert_eq!(
            tokens("%a|b|c%"),
            vec![Token::Variable {
                key: "a",
                default: "b|c"
            }]
        );
    }

    #[test]
    fn test_block_name_is_trimmed() {
        let scanned: Vec<_> = Scanner::new("x%EACH  items %[%name%]%END_EACH%y").collect();
        assert_eq!(scanned.len(), 3);
        assert_eq!(
            scanned[1],
            (
                1,
                Token::Block {
                    kind: BlockKind::Each,
                    name: "items",
                    body: "[%name%]",
                    body_offset: 15,
                }
            )
        );
        assert_eq!(scanned[2], (33, Token::Text("y")));
    }

    #[test]
    fn test_first_close_token_wins() {
        let scanned = tokens("%IF a%1%IF b%2%END_IF%3%END_IF%");
        assert_eq!(
            scanned[0],
            Token::Block {
                kind: BlockKind::If,
                name: "a",
                body: "1%IF b%2",
                body_offset: 6,
            }
        );
        assert_eq!(scanned[1], Token::Text("3"));
    }

    #[test]
    fn test_unterminated_block_is_stray() {
        let scanned = tokens("%IF a%body");
        assert_eq!(
            scanned[0],
            Token::Stray(Stray::UnterminatedBlock(BlockKind::If))
        );
        assert_eq!(scanned[1], Token::Text("IF a"));
    }

    #[test]
    fn test_lone_delimiter_is_stray() {
        assert_eq!(
            tokens("50% done"),
            vec![
                Token::Text("50"),
                Token::Stray(Stray::Unclosed),
                Token::Text(" done")
            ]
        );
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            tokens("• %sym%"),
            vec![
                Token::Text("• "),
                Token::Variable {
                    key: "sym",
                    default: ""
                }
            ]
        );
    }
}
