//! Message composition
//!
//! Chooses between model-written text and the rendered fallback template,
//! the same policy the notifier applies before delivering a post.

use crate::format::{format_telegram_html, sanitize_ai_text};
use crate::template::{Map, Renderer};
use tracing::{debug, info, warn};

/// Where the composed message text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    Ai,
    Fallback,
}

/// A composed message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub source: MessageSource,
}

/// Renders prompts and composes outgoing messages
#[derive(Debug, Clone, Default)]
pub struct Composer {
    renderer: Renderer,
    telegram_html: bool,
}

impl Composer {
    pub fn new(renderer: Renderer) -> Self {
        Self {
            renderer,
            telegram_html: false,
        }
    }

    /// Format composed text for Telegram's HTML parse mode
    pub fn with_telegram_html(mut self, enabled: bool) -> Self {
        self.telegram_html = enabled;
        self
    }

    /// Render the prompt sent to the text generation model
    pub fn prompt(&self, template: &str, context: &Map) -> String {
        let prompt = self.renderer.render(template, context);
        debug!(bytes = prompt.len(), "Rendered prompt");
        prompt
    }

    /// Compose the outgoing message.
    ///
    /// Model text wins when it is non-empty after sanitizing, otherwise the
    /// fallback template is rendered against `context`.
    pub fn compose(
        &self,
        fallback_template: &str,
        ai_response: Option<&str>,
        context: &Map,
    ) -> Message {
        let ai_text = ai_response.map(sanitize_ai_text);
        let (text, source) = match ai_text {
            Some(text) if !text.is_empty() => {
                info!(bytes = text.len(), "Using model-written message");
                (text, MessageSource::Ai)
            }
            Some(_) => {
                warn!("Model output empty, using fallback template");
                self.fallback(fallback_template, context)
            }
            None => self.fallback(fallback_template, context),
        };

        let text = if self.telegram_html {
            format_telegram_html(&text)
        } else {
            text
        };
        Message { text, source }
    }

    fn fallback(&self, template: &str, context: &Map) -> (String, MessageSource) {
        (
            self.renderer.render(template, context),
            MessageSource::Fallback,
        )
    }
}
