use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::LayoutConfig;
use crate::ir::{Link, NodeTable};
use crate::mapping::{Mapping, MappingResolver, props};

use super::{Anchor, FlowSpec, NodeGroup, NodeRef, Side};

/// Flows of one pass partitioned by source node and by target node.
#[derive(Debug, Clone)]
pub struct FlowGroups<'a> {
    pub flows: Vec<FlowSpec<'a>>,
    /// Outflows by source node id, sorted by target y.
    pub sources: BTreeMap<String, NodeGroup>,
    /// Inflows by target node id, sorted by source y.
    pub targets: BTreeMap<String, NodeGroup>,
    pub min_width: f64,
}

/// Width of a flow for stacking. `floor_override` replaces the output floor of the
/// mapping's scale without touching the mapping itself. Never negative; 0 when unmapped.
pub fn effective_width_for_stacking(
    mapping: Option<&Mapping>,
    record: &Value,
    floor_override: Option<f64>,
) -> f64 {
    mapping
        .and_then(|mapping| mapping.resolve_number_with_floor(record, None, floor_override))
        .filter(|width| width.is_finite())
        .unwrap_or(0.0)
        .max(0.0)
}

/// The configured scale floor of the width mapping, when there is a positive one.
fn positive_width_floor(mapping: Option<&Mapping>) -> Option<f64> {
    let floor = mapping?.using()?.to()[0];
    (floor > 0.0).then_some(floor)
}

pub fn group_flows<'a>(
    links: &'a [Link],
    nodes: &NodeTable,
    resolver: &dyn MappingResolver,
    config: &LayoutConfig,
) -> FlowGroups<'a> {
    let width_mapping = resolver.mapping(props::STROKE_WIDTH);
    let width_floor = positive_width_floor(width_mapping);
    let floor_override = width_floor.map(|_| 0.0);
    let min_width = width_floor.unwrap_or(config.default_min_width);

    let mut flows: Vec<FlowSpec<'a>> = Vec::with_capacity(links.len());
    let mut sources: BTreeMap<String, NodeGroup> = BTreeMap::new();
    let mut targets: BTreeMap<String, NodeGroup> = BTreeMap::new();

    for link in links {
        let source_record = nodes.record(&link.source);
        let target_record = nodes.record(&link.target);
        let source = resolve_node_ref(&link.source, source_record, Side::Source, link, resolver);
        let target = resolve_node_ref(&link.target, target_record, Side::Target, link, resolver);
        let width = effective_width_for_stacking(width_mapping, &link.data, floor_override);

        let flow_idx = flows.len();
        flows.push(FlowSpec {
            source,
            target,
            link,
            width,
        });

        let source_anchor = resolve_anchor(source_record, link, resolver, config);
        record_flow(&mut sources, &link.source, flow_idx, source_anchor);
        let target_anchor = resolve_anchor(target_record, link, resolver, config);
        record_flow(&mut targets, &link.target, flow_idx, target_anchor);
    }

    for group in sources.values_mut() {
        group
            .flows
            .sort_by(|a, b| flows[*a].target.y.total_cmp(&flows[*b].target.y));
    }
    for group in targets.values_mut() {
        group
            .flows
            .sort_by(|a, b| flows[*a].source.y.total_cmp(&flows[*b].source.y));
    }

    FlowGroups {
        flows,
        sources,
        targets,
        min_width,
    }
}

/// `r` is the stand-off on the flow's end at this node: `source-offset` where the flow
/// leaves it, `target-offset` where it arrives.
fn resolve_node_ref(
    id: &str,
    record: &Value,
    side: Side,
    link: &Link,
    resolver: &dyn MappingResolver,
) -> NodeRef {
    let context = Some(&link.data);
    let offset = match side {
        Side::Source => props::SOURCE_OFFSET,
        Side::Target => props::TARGET_OFFSET,
    };
    NodeRef {
        id: id.to_string(),
        x: resolver.number_for(props::X, record, 0.0, context),
        y: resolver.number_for(props::Y, record, 0.0, context),
        r: resolver.number_for(offset, record, 0.0, context),
    }
}

fn resolve_anchor(
    record: &Value,
    link: &Link,
    resolver: &dyn MappingResolver,
    config: &LayoutConfig,
) -> Anchor {
    let default = config.default_anchor;
    let token = resolver.string_for(props::SANKEY_ANCHOR, record, default.as_str(), Some(&link.data));
    Anchor::from_token(&token).unwrap_or_else(|| {
        tracing::warn!(link = %link.id, token = %token, "unrecognised sankey anchor, using {}", default.as_str());
        default
    })
}

fn record_flow(groups: &mut BTreeMap<String, NodeGroup>, node_id: &str, flow_idx: usize, anchor: Anchor) {
    let group = groups.entry(node_id.to_string()).or_insert_with(|| NodeGroup {
        flows: Vec::new(),
        anchor,
    });
    if group.anchor != anchor {
        tracing::warn!(
            node = %node_id,
            previous = group.anchor.as_str(),
            current = anchor.as_str(),
            "conflicting sankey anchors for one node; last one wins"
        );
    }
    group.anchor = anchor;
    group.flows.push(flow_idx);
}
