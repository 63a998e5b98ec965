use crate::config::LayoutConfig;
use crate::mapping::{MappingResolver, props};

use super::{FlowWithBothAnchors, LaidOutFlow, PathAttributes, Point};

/// Cubic from source to target with both control points on the horizontal midpoint,
/// each at its own endpoint's height, so the curve leaves and enters horizontally.
pub fn flow_path(source: Point, target: Point) -> String {
    let mid_x = (source.x + target.x) / 2.0;
    let mut buf = ryu_js::Buffer::new();
    let mut d = String::with_capacity(64);
    d.push('M');
    push_coords(&mut d, &mut buf, &[source.x, source.y]);
    d.push('C');
    push_coords(
        &mut d,
        &mut buf,
        &[mid_x, source.y, mid_x, target.y, target.x, target.y],
    );
    d
}

fn push_coords(out: &mut String, buf: &mut ryu_js::Buffer, values: &[f64]) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(js_number(*value, buf));
    }
}

/// JavaScript `Number#toString` for path coordinates. Non-finite values print as
/// `NaN`/`Infinity` and are left for the drawing surface to reject.
fn js_number(value: f64, buf: &mut ryu_js::Buffer) -> &str {
    if value == 0.0 {
        return "0";
    }
    buf.format(value)
}

/// Dash pattern and opacity for a stroke style name.
pub fn resolve_stroke_style(style: &str, opacity: f64, config: &LayoutConfig) -> (String, f64) {
    match style {
        "none" => (String::new(), 0.0),
        "" | "solid" => (String::new(), opacity),
        "dashed" => (config.dashed_token.clone(), opacity),
        "dotted" => (config.dotted_token.clone(), opacity),
        custom => (custom.to_string(), opacity),
    }
}

pub fn finish_flow(
    flow: FlowWithBothAnchors<'_>,
    min_width: f64,
    resolver: &dyn MappingResolver,
    config: &LayoutConfig,
) -> LaidOutFlow {
    let link = flow.spec.link;
    let record = &link.data;
    let opacity = resolver.number_for(props::OPACITY, record, config.default_opacity, None);
    let stroke = resolver.string_for(props::STROKE, record, &config.default_stroke, None);
    let style = resolver.string_for(props::STROKE_STYLE, record, "", None);
    let (stroke_dasharray, opacity) = resolve_stroke_style(&style, opacity, config);
    let path = flow_path(flow.source_pt, flow.target_pt);
    tracing::trace!(link = %link.id, path = %path, "flow path");

    LaidOutFlow {
        link_id: link.id.clone(),
        source: flow.spec.source,
        target: flow.spec.target,
        width: flow.spec.width,
        source_pt: flow.source_pt,
        target_pt: flow.target_pt,
        attrs: PathAttributes {
            path,
            stroke,
            stroke_width: min_width.max(flow.spec.width),
            opacity,
            stroke_dasharray,
        },
    }
}
