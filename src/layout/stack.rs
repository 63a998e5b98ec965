use std::collections::BTreeMap;

use super::{Anchor, FlowSpec, FlowWithBothAnchors, FlowWithTargetAnchor, NodeGroup, Point, Side};

/// Anchor points for one node group, in the group's stacking order.
///
/// The cursor starts at 0 (`Top`), minus half the raw span (`Middle`) or minus the
/// whole raw span (`Bottom`). Each flow sits on the midline of its band, sized by the
/// floored display width, while the cursor advances by the raw width only.
pub fn stack_group<'f, 'a: 'f, I>(flows: I, anchor: Anchor, side: Side, min_width: f64) -> Vec<Point>
where
    I: IntoIterator<Item = &'f FlowSpec<'a>> + Clone,
{
    let span: f64 = flows.clone().into_iter().map(|flow| flow.width).sum();
    let mut total_offset = match anchor {
        Anchor::Top => 0.0,
        Anchor::Middle => -span / 2.0,
        Anchor::Bottom => -span,
    };

    let mut points = Vec::new();
    for flow in flows {
        let node = flow.endpoint(side);
        let display_width = min_width.max(flow.width);
        let x = match side {
            Side::Target => node.x - node.r,
            Side::Source => node.x + node.r,
        };
        points.push(Point::new(x, node.y + total_offset + display_width / 2.0));
        total_offset += flow.width;
    }
    points
}

/// Target-side pass. Every flow belongs to exactly one target group, so every flow
/// comes back with its target anchor, in the original flow order.
pub fn attach_target_anchors<'a>(
    flows: Vec<FlowSpec<'a>>,
    targets: &BTreeMap<String, NodeGroup>,
    min_width: f64,
) -> Vec<FlowWithTargetAnchor<'a>> {
    let mut target_pts: Vec<Option<Point>> = vec![None; flows.len()];
    for group in targets.values() {
        let points = stack_group(
            group.flows.iter().map(|&idx| &flows[idx]),
            group.anchor,
            Side::Target,
            min_width,
        );
        for (&idx, point) in group.flows.iter().zip(points) {
            target_pts[idx] = Some(point);
        }
    }

    flows
        .into_iter()
        .zip(target_pts)
        .filter_map(|(spec, target_pt)| target_pt.map(|target_pt| FlowWithTargetAnchor { spec, target_pt }))
        .collect()
}

/// Source-side pass over flows that already carry their target anchor.
pub fn attach_source_anchors<'a>(
    flows: Vec<FlowWithTargetAnchor<'a>>,
    sources: &BTreeMap<String, NodeGroup>,
    min_width: f64,
) -> Vec<FlowWithBothAnchors<'a>> {
    let mut source_pts: Vec<Option<Point>> = vec![None; flows.len()];
    for group in sources.values() {
        let points = stack_group(
            group.flows.iter().map(|&idx| &flows[idx].spec),
            group.anchor,
            Side::Source,
            min_width,
        );
        for (&idx, point) in group.flows.iter().zip(points) {
            source_pts[idx] = Some(point);
        }
    }

    flows
        .into_iter()
        .zip(source_pts)
        .filter_map(|(flow, source_pt)| {
            source_pt.map(|source_pt| FlowWithBothAnchors {
                spec: flow.spec,
                source_pt,
                target_pt: flow.target_pt,
            })
        })
        .collect()
}
