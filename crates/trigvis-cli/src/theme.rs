//! Renderer theme configuration.
//!
//! Colors and shapes are the renderer's business, not the engine's — the
//! engine only promises the relation-type vocabulary. The CLI loads an
//! optional TOML theme (explicit flag, then the user config directory)
//! over the built-in dark palette and embeds it verbatim in the graph
//! document for the renderer to consume.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use trigvis_graph::RelationKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub ui: UiTheme,
    /// Edge color per relation type. Must cover the whole taxonomy.
    pub edges: BTreeMap<String, String>,
    pub nodes: NodeStyles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiTheme {
    pub background: String,
    pub font: String,
}

impl Default for UiTheme {
    fn default() -> Self {
        Self {
            background: "#0f172a".into(),
            font: "#e5e7eb".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStyles {
    pub trigger: NodeStyle,
    pub local_var: NodeStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub shape: String,
    pub color: String,
}

impl Default for NodeStyles {
    fn default() -> Self {
        Self {
            trigger: NodeStyle {
                shape: "dot".into(),
                color: "#7aa2f7".into(),
            },
            local_var: NodeStyle {
                shape: "diamond".into(),
                color: "#f6c177".into(),
            },
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        let edges = [
            (RelationKind::Enable, "#43ff5c"),
            (RelationKind::Disable, "#ff4444"),
            (RelationKind::Destroy, "#a0aec0"),
            (RelationKind::Force, "#64a0ff"),
            (RelationKind::Linked, "#ff7fc3"),
            (RelationKind::EnableLocal, "#43ff5c"),
            (RelationKind::DisableLocal, "#ff4444"),
            (RelationKind::DependsOnTrue, "#b3b9c5"),
            (RelationKind::DependsOnFalse, "#b3b9c5"),
            (RelationKind::DependsOn, "#b3b9c5"),
        ]
        .into_iter()
        .map(|(kind, color)| (kind.as_str().to_string(), color.to_string()))
        .collect();

        Self {
            ui: UiTheme::default(),
            edges,
            nodes: NodeStyles::default(),
        }
    }
}

impl Theme {
    /// Load the theme: `explicit` flag first, then
    /// `<config dir>/trigvis/theme.toml`, else the built-in palette.
    /// Missing keys in a loaded file fall back field by field.
    ///
    /// # Errors
    ///
    /// Returns an error only when an explicitly named file cannot be read
    /// or parsed; a broken user-config theme falls back to the default.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            return toml::from_str(&content)
                .with_context(|| format!("failed to parse {}", path.display()));
        }

        let Some(config_dir) = dirs::config_dir() else {
            return Ok(Self::default());
        };
        let path = config_dir.join("trigvis/theme.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        match std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
        {
            Some(theme) => Ok(theme),
            None => {
                tracing::warn!(path = %path.display(), "ignoring unreadable user theme");
                Ok(Self::default())
            }
        }
    }

    /// The theme as a JSON value for embedding in the graph document.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_covers_the_whole_taxonomy() {
        let theme = Theme::default();
        for kind in RelationKind::ALL {
            assert!(
                theme.edges.contains_key(kind.as_str()),
                "no color for relation type {kind}"
            );
        }
    }

    #[test]
    fn partial_theme_files_keep_defaults_for_missing_sections() {
        let theme: Theme = toml::from_str("[ui]\nbackground = \"#000000\"\n").expect("parse");
        assert_eq!(theme.ui.background, "#000000");
        assert_eq!(theme.ui.font, UiTheme::default().font);
        assert_eq!(theme.nodes, NodeStyles::default());
        assert!(!theme.edges.is_empty());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Theme::load(Some(Path::new("/nonexistent/theme.toml")));
        assert!(err.is_err());
    }
}
