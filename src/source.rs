//! Template sources
//!
//! Templates are read from disk when present so they can be edited without a
//! rebuild. The binary embeds defaults for both templates it uses.

use crate::{Error, Result};
use std::path::Path;

/// Fallback notification template, rendered when no AI text is available
pub const DEFAULT_FALLBACK_TEMPLATE: &str =
    include_str!("../templates/telegram_post_fallback.template.md");

/// Prompt template sent to the text generation model
pub const DEFAULT_PROMPT: &str = include_str!("../prompts/newcoins.prompts.md");

/// Read a template, failing if the file cannot be read
pub fn load(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a template, using `fallback` when the file cannot be read
pub fn load_or_default(path: &Path, fallback: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            tracing::debug!(path = %path.display(), bytes = content.len(), "Loaded template");
            content
        }
        Err(e) => {
            tracing::debug!(
                path = %path.display(),
                error = %e,
                "Template not readable, using embedded default"
            );
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::lint;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_templates_lint_clean() {
        assert!(lint(DEFAULT_FALLBACK_TEMPLATE).is_empty());
        assert!(lint(DEFAULT_PROMPT).is_empty());
    }

    #[test]
    fn test_load_prefers_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "from disk %x%").unwrap();

        assert_eq!(load(file.path()).unwrap(), "from disk %x%");
        assert_eq!(load_or_default(file.path(), "embedded"), "from disk %x%");
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/nonexistent/template.md");
        assert_eq!(load_or_default(path, "embedded"), "embedded");
        assert!(matches!(load(path), Err(Error::Io { .. })));
    }
}
