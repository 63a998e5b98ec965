use crate::error::Result;
use crate::layout::Anchor;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Stroke color when the link has no `stroke` mapping result.
    pub default_stroke: String,
    pub default_opacity: f64,
    /// Display floor used when the width mapping has no positive output floor.
    pub default_min_width: f64,
    pub default_anchor: Anchor,
    pub dashed_token: String,
    pub dotted_token: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_stroke: Theme::classic().link_color,
            default_opacity: 1.0,
            default_min_width: 1.0,
            default_anchor: Anchor::Top,
            dashed_token: "- ".to_string(),
            dotted_token: ". ".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    /// Node bar width drawn by the SVG output; 0 hides nodes.
    pub node_width: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            node_width: 10.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Config {
    pub fn with_theme(theme: Theme) -> Self {
        let layout = LayoutConfig {
            default_stroke: theme.link_color.clone(),
            ..LayoutConfig::default()
        };
        Self {
            theme,
            layout,
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    background: Option<String>,
    link_color: Option<String>,
    node_fill: Option<String>,
    node_stroke: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlowConfigFile {
    default_stroke: Option<String>,
    default_opacity: Option<f64>,
    default_min_width: Option<f64>,
    default_anchor: Option<Anchor>,
    dashed_token: Option<String>,
    dotted_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f64>,
    height: Option<f64>,
    node_width: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    sankey: Option<FlowConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    let mut config = match parsed.theme.as_deref() {
        Some("modern") => Config::with_theme(Theme::modern()),
        _ => Config::default(),
    };

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.link_color {
            config.layout.default_stroke = v.clone();
            config.theme.link_color = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_stroke {
            config.theme.node_stroke = v;
        }
    }

    if let Some(sankey) = parsed.sankey {
        if let Some(v) = sankey.default_stroke {
            config.layout.default_stroke = v;
        }
        if let Some(v) = sankey.default_opacity {
            config.layout.default_opacity = v;
        }
        if let Some(v) = sankey.default_min_width {
            config.layout.default_min_width = v;
        }
        if let Some(v) = sankey.default_anchor {
            config.layout.default_anchor = v;
        }
        if let Some(v) = sankey.dashed_token {
            config.layout.dashed_token = v;
        }
        if let Some(v) = sankey.dotted_token {
            config.layout.dotted_token = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.node_width {
            config.render.node_width = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).expect("defaults");
        assert_eq!(config, Config::default());
        assert_eq!(config.layout.default_stroke, "#999999");
        assert_eq!(config.layout.default_anchor, Anchor::Top);
    }

    #[test]
    fn modern_theme_carries_link_color_into_layout() {
        let config = parse_config(r#"{ "theme": "modern" }"#).expect("config");
        assert_eq!(config.theme, Theme::modern());
        assert_eq!(config.layout.default_stroke, Theme::modern().link_color);
    }

    #[test]
    fn sankey_section_overrides_layout_defaults() {
        let config = parse_config(
            r##"{
                "themeVariables": { "linkColor": "#123456" },
                "sankey": { "defaultAnchor": "middle", "dashedToken": "--", "defaultMinWidth": 2 },
                "render": { "width": 320 }
            }"##,
        )
        .expect("config");
        assert_eq!(config.layout.default_stroke, "#123456");
        assert_eq!(config.layout.default_anchor, Anchor::Middle);
        assert_eq!(config.layout.dashed_token, "--");
        assert_eq!(config.layout.default_min_width, 2.0);
        assert_eq!(config.render.width, 320.0);
        assert_eq!(config.render.height, 600.0);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            parse_config("{ not json"),
            Err(crate::error::Error::Json(_))
        ));
    }
}
