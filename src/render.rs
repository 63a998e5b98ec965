use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::ir::Transition;
use crate::layout::{FlowLayout, PathAttributes};
use crate::surface::DrawingSurface;
use crate::theme::Theme;
use std::collections::BTreeMap;
use std::path::Path;

/// A live path in the retained scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgPath {
    pub attrs: PathAttributes,
    /// Transition of the most recent update, if it was animated.
    pub transition: Option<Transition>,
    /// Number of updates applied since creation.
    pub revision: u32,
}

/// In-memory retained drawing surface that serializes to an SVG document.
/// Handles are slot indices; removed slots are never reused.
#[derive(Debug, Default)]
pub struct SvgSurface {
    paths: Vec<Option<SvgPath>>,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: usize) -> Option<&SvgPath> {
        self.paths.get(handle).and_then(Option::as_ref)
    }

    pub fn remove(&mut self, handle: usize) -> Result<SvgPath> {
        self.paths
            .get_mut(handle)
            .and_then(Option::take)
            .ok_or(Error::UnknownHandle(handle))
    }

    pub fn live(&self) -> impl Iterator<Item = &SvgPath> {
        self.paths.iter().flatten()
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    /// Total paths ever created, including removed ones.
    pub fn created_count(&self) -> usize {
        self.paths.len()
    }

    fn slot_mut(&mut self, handle: usize) -> Result<&mut SvgPath> {
        self.paths
            .get_mut(handle)
            .and_then(Option::as_mut)
            .ok_or(Error::UnknownHandle(handle))
    }
}

impl DrawingSurface for SvgSurface {
    type Handle = usize;

    fn path(&mut self, d: &str) -> Result<usize> {
        validate_path(d)?;
        self.paths.push(Some(SvgPath {
            attrs: PathAttributes {
                path: d.to_string(),
                stroke: String::new(),
                stroke_width: 1.0,
                opacity: 1.0,
                stroke_dasharray: String::new(),
            },
            transition: None,
            revision: 0,
        }));
        Ok(self.paths.len() - 1)
    }

    fn attr(&mut self, handle: &usize, attrs: &PathAttributes) -> Result<()> {
        validate_path(&attrs.path)?;
        self.slot_mut(*handle)?.attrs = attrs.clone();
        Ok(())
    }

    fn update(&mut self, handle: &usize, attrs: &PathAttributes, transition: Option<&Transition>) -> Result<()> {
        validate_path(&attrs.path)?;
        let slot = self.slot_mut(*handle)?;
        slot.attrs = attrs.clone();
        slot.transition = transition.cloned();
        slot.revision += 1;
        Ok(())
    }
}

/// Accepts a move followed by any number of commands whose numbers are all finite.
fn validate_path(d: &str) -> Result<()> {
    let malformed = || Error::MalformedPath(d.to_string());
    if !d.starts_with('M') {
        return Err(malformed());
    }
    // Letters other than commands and exponents are words such as `NaN` or `Infinity`.
    if d.chars()
        .any(|c| c.is_alphabetic() && !is_path_command(c) && !matches!(c, 'e' | 'E'))
    {
        return Err(malformed());
    }
    let numbers = d
        .split(|c: char| is_path_command(c) || c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty());
    for token in numbers {
        let value: f64 = token.parse().map_err(|_| malformed())?;
        if !value.is_finite() {
            return Err(malformed());
        }
    }
    Ok(())
}

fn is_path_command(c: char) -> bool {
    matches!(
        c.to_ascii_uppercase(),
        'M' | 'L' | 'H' | 'V' | 'C' | 'S' | 'Q' | 'T' | 'A' | 'Z'
    )
}

/// Expands symbolic dash tokens to an SVG dash array scaled by stroke width.
/// Anything that is not a known token is used as a literal dash array.
pub fn dasharray_for(token: &str, stroke_width: f64) -> String {
    let pattern: &[f64] = match token {
        "" => return String::new(),
        "-" => &[3.0, 1.0],
        "." => &[1.0, 1.0],
        "-." => &[3.0, 1.0, 1.0, 1.0],
        "-.." => &[3.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        ". " => &[1.0, 3.0],
        "- " => &[4.0, 3.0],
        "--" => &[8.0, 3.0],
        "- ." => &[4.0, 3.0, 1.0, 3.0],
        "--." => &[8.0, 3.0, 1.0, 3.0],
        "--.." => &[8.0, 3.0, 1.0, 3.0, 1.0, 3.0],
        custom => return custom.to_string(),
    };
    let width = stroke_width.max(1.0);
    pattern
        .iter()
        .map(|step| format!("{:.2}", step * width))
        .collect::<Vec<_>>()
        .join(",")
}

/// Vertical extent a node occupies, taken as the union of its flow bands.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBar {
    pub id: String,
    pub x: f64,
    pub top: f64,
    pub bottom: f64,
}

pub fn node_bars(layout: &FlowLayout) -> Vec<NodeBar> {
    let mut bars: BTreeMap<&str, NodeBar> = BTreeMap::new();
    for flow in &layout.flows {
        let half = flow.attrs.stroke_width / 2.0;
        let ends = [
            (&flow.source, flow.source_pt.y),
            (&flow.target, flow.target_pt.y),
        ];
        for (node, y) in ends {
            let bar = bars.entry(node.id.as_str()).or_insert_with(|| NodeBar {
                id: node.id.clone(),
                x: node.x,
                top: y - half,
                bottom: y + half,
            });
            bar.top = bar.top.min(y - half);
            bar.bottom = bar.bottom.max(y + half);
        }
    }
    bars.into_values().collect()
}

pub fn render_svg(surface: &SvgSurface, layout: Option<&FlowLayout>, theme: &Theme, config: &RenderConfig) -> String {
    let width = config.width.max(1.0);
    let height = config.height.max(1.0);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&theme.background)
    ));

    svg.push_str("<g class=\"flows\">");
    for path in surface.live() {
        let attrs = &path.attrs;
        let mut element = format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" opacity=\"{}\"",
            escape_xml(&attrs.path),
            escape_xml(&attrs.stroke),
            attrs.stroke_width,
            attrs.opacity
        );
        let dasharray = dasharray_for(&attrs.stroke_dasharray, attrs.stroke_width);
        if !dasharray.is_empty() {
            element.push_str(&format!(" stroke-dasharray=\"{}\"", escape_xml(&dasharray)));
        }
        element.push_str("/>");
        svg.push_str(&element);
    }
    svg.push_str("</g>");

    if let Some(layout) = layout.filter(|_| config.node_width > 0.0) {
        svg.push_str("<g class=\"nodes\">");
        for bar in node_bars(layout) {
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\"><title>{}</title></rect>",
                bar.x - config.node_width / 2.0,
                bar.top,
                config.node_width,
                (bar.bottom - bar.top).max(0.0),
                escape_xml(&theme.node_fill),
                escape_xml(&theme.node_stroke),
                escape_xml(&bar.id)
            ));
        }
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> anyhow::Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width as f32, render_cfg.height as f32) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(path: &str) -> PathAttributes {
        PathAttributes {
            path: path.to_string(),
            stroke: "#999999".to_string(),
            stroke_width: 2.0,
            opacity: 1.0,
            stroke_dasharray: String::new(),
        }
    }

    #[test]
    fn creates_updates_and_removes_paths() {
        let mut surface = SvgSurface::new();
        let handle = surface.path("M0,0C5,0,5,10,10,10").expect("path");
        surface.attr(&handle, &attrs("M0,0C5,0,5,10,10,10")).expect("attr");
        let transition = Transition {
            duration_ms: 250,
            easing: None,
        };
        surface
            .update(&handle, &attrs("M0,1C5,1,5,11,10,11"), Some(&transition))
            .expect("update");

        let path = surface.get(handle).expect("live path");
        assert_eq!(path.revision, 1);
        assert_eq!(path.attrs.path, "M0,1C5,1,5,11,10,11");
        assert_eq!(path.transition, Some(transition));

        surface.remove(handle).expect("remove");
        assert_eq!(surface.live_count(), 0);
        assert_eq!(surface.created_count(), 1);
        assert!(matches!(surface.remove(handle), Err(Error::UnknownHandle(0))));
    }

    #[test]
    fn rejects_malformed_paths() {
        let mut surface = SvgSurface::new();
        assert!(matches!(surface.path("C1,2"), Err(Error::MalformedPath(_))));
        assert!(matches!(surface.path("MNaN,0C0,0,0,0,1,1"), Err(Error::MalformedPath(_))));
        assert!(matches!(surface.path("M0,Infinity"), Err(Error::MalformedPath(_))));
        assert!(matches!(surface.path("M0,-Infinity"), Err(Error::MalformedPath(_))));
        assert!(matches!(surface.path("M0,0L1,x"), Err(Error::MalformedPath(_))));
        assert!(matches!(surface.path("M0,e"), Err(Error::MalformedPath(_))));
        assert!(surface.path("M1e-7,0L2E3,4").is_ok());
        assert!(surface.path("M1e+21,-2.5C0.5,1,2,3,4,5").is_ok());
    }

    #[test]
    fn update_of_unknown_handle_fails() {
        let mut surface = SvgSurface::new();
        assert!(matches!(
            surface.update(&7, &attrs("M0,0"), None),
            Err(Error::UnknownHandle(7))
        ));
    }

    #[test]
    fn dash_tokens_scale_with_width() {
        assert_eq!(dasharray_for("- ", 2.0), "8.00,6.00");
        assert_eq!(dasharray_for(". ", 0.5), "1.00,3.00");
        assert_eq!(dasharray_for("5,3", 4.0), "5,3");
        assert_eq!(dasharray_for("", 4.0), "");
    }

    #[test]
    fn render_svg_emits_live_paths() {
        let mut surface = SvgSurface::new();
        let mut dashed = attrs("M0,0C5,0,5,10,10,10");
        dashed.stroke_dasharray = "- ".to_string();
        let handle = surface.path(&dashed.path).expect("path");
        surface.attr(&handle, &dashed).expect("attr");

        let svg = render_svg(&surface, None, &Theme::classic(), &RenderConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("d=\"M0,0C5,0,5,10,10,10\""));
        assert!(svg.contains("stroke-dasharray=\"8.00,6.00\""));
    }
}
