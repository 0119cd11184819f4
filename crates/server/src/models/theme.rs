//! Storefront theme model.
//!
//! A theme is a named set of design tokens. Applying a theme is a pure
//! function from the record to a CSS-variable map; the server never touches
//! rendering.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stitchpress_core::ThemeId;

/// A named set of design tokens, at most one active at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: ThemeId,
    pub name: String,
    /// Token name -> value, e.g. `"primary" -> "#1a1a2e"`.
    pub tokens: BTreeMap<String, String>,
    pub is_active: bool,
}

impl Theme {
    /// Map this theme to the CSS custom-property form clients inject at
    /// render time: every token keyed as `--<name>`.
    #[must_use]
    pub fn style_tokens(&self) -> BTreeMap<String, String> {
        self.tokens
            .iter()
            .map(|(name, value)| (format!("--{name}"), value.clone()))
            .collect()
    }
}

/// Fields for creating or fully replacing a theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTheme {
    pub name: String,
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
    #[serde(default)]
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_tokens_prefixes_names() {
        let theme = Theme {
            id: ThemeId::new(1),
            name: "midnight".to_owned(),
            tokens: BTreeMap::from([
                ("primary".to_owned(), "#1a1a2e".to_owned()),
                ("accent".to_owned(), "#e94560".to_owned()),
            ]),
            is_active: true,
        };

        let styles = theme.style_tokens();
        assert_eq!(styles.get("--primary").map(String::as_str), Some("#1a1a2e"));
        assert_eq!(styles.get("--accent").map(String::as_str), Some("#e94560"));
        assert_eq!(styles.len(), 2);
    }

    #[test]
    fn test_style_tokens_empty_theme() {
        let theme = Theme {
            id: ThemeId::new(2),
            name: "bare".to_owned(),
            tokens: BTreeMap::new(),
            is_active: false,
        };
        assert!(theme.style_tokens().is_empty());
    }
}
