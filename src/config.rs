//! Prompt and quick-search configuration.
//!
//! Every field has a default, so a config file only lists what it changes.
//! Keys accept both snake_case and the camelCase spelling.
//!
//! ```toml
//! trigger = "/"
//!
//! [quick_search]
//! case_sensitive = false
//! limit = 5
//!
//! [[commands]]
//! label = "save"
//! value = "save"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PromptError, Result};
use crate::types::Item;

const DEFAULT_TRIGGER: char = '/';
const DEFAULT_PROMPT: &str = "> ";
const CTRL_U: &str = "\u{15}";
const CTRL_W: &str = "\u{17}";

/// Behavior of a quick search, fixed for the lifetime of the widget.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuickSearchConfig {
    #[serde(alias = "caseSensitive")]
    pub case_sensitive: bool,
    /// Maximum visible rows; 0 shows every match.
    pub limit: usize,
    /// Refuse keystrokes that would leave no item matching.
    #[serde(alias = "forceMatchingQuery")]
    pub force_matching_query: bool,
    /// Raw key sequences that clear the query.
    #[serde(alias = "clearQueryChars")]
    pub clear_query_chars: Vec<String>,
}

impl Default for QuickSearchConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            limit: 0,
            force_matching_query: true,
            clear_query_chars: vec![CTRL_U.to_string(), CTRL_W.to_string()],
        }
    }
}

/// Configuration of the whole prompt: mode trigger, glyph and commands.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Leading character that switches the prompt into quick search.
    pub trigger: String,
    /// Text drawn before the input in both modes.
    pub prompt: String,
    /// Mark a pasted span with the cursor highlight.
    #[serde(alias = "highlightPastedText")]
    pub highlight_pasted_text: bool,
    #[serde(alias = "quickSearch")]
    pub quick_search: QuickSearchConfig,
    pub commands: Vec<Item>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            highlight_pasted_text: true,
            quick_search: QuickSearchConfig::default(),
            commands: Vec::new(),
        }
    }
}

impl PromptConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: PromptConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.trigger.chars().count() != 1 {
            return Err(PromptError::InvalidConfig(format!(
                "trigger must be a single character, got {:?}",
                self.trigger
            )));
        }
        if self
            .quick_search
            .clear_query_chars
            .iter()
            .any(|seq| seq.is_empty())
        {
            return Err(PromptError::InvalidConfig(
                "clear_query_chars entries must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The trigger as a character. Falls back to `/` on an invalid trigger.
    pub fn trigger_char(&self) -> char {
        self.trigger.chars().next().unwrap_or(DEFAULT_TRIGGER)
    }
}
