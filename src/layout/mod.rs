mod curve;
mod grouper;
mod stack;
pub(crate) mod types;
pub use curve::{flow_path, resolve_stroke_style};
pub use grouper::{FlowGroups, effective_width_for_stacking, group_flows};
pub use stack::{attach_source_anchors, attach_target_anchors, stack_group};
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::{Link, NodeTable};
use crate::mapping::MappingResolver;

/// Full layout pass: group, stack the target side, stack the source side, then emit
/// one path and attribute set per flow, in link order.
pub fn compute_flow_layout(
    links: &[Link],
    nodes: &NodeTable,
    resolver: &dyn MappingResolver,
    config: &LayoutConfig,
) -> FlowLayout {
    let FlowGroups {
        flows,
        sources,
        targets,
        min_width,
    } = group_flows(links, nodes, resolver, config);
    let flow_count = flows.len();

    let with_target = attach_target_anchors(flows, &targets, min_width);
    debug_assert_eq!(with_target.len(), flow_count);
    let with_both = attach_source_anchors(with_target, &sources, min_width);

    let flows = with_both
        .into_iter()
        .map(|flow| curve::finish_flow(flow, min_width, resolver, config))
        .collect();

    FlowLayout { flows, min_width }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Mapping, MappingSet, Scale, props};
    use serde_json::json;

    fn two_into_one() -> (Vec<Link>, NodeTable) {
        let mut nodes = NodeTable::new();
        nodes.insert("A", json!({ "x": 0, "y": 10 }));
        nodes.insert("B", json!({ "x": 0, "y": 20 }));
        nodes.insert("C", json!({ "x": 100, "y": 50 }));
        let links = vec![
            Link::new("bc", "B", "C").with_data(json!({ "value": 3 })),
            Link::new("ac", "A", "C").with_data(json!({ "value": 2 })),
        ];
        (links, nodes)
    }

    #[test]
    fn two_links_into_one_target_stack_by_source_y() {
        let (links, nodes) = two_into_one();
        let layout = compute_flow_layout(&links, &nodes, &MappingSet::standard(), &LayoutConfig::default());

        assert_eq!(layout.flows.len(), 2);
        let bc = &layout.flows[0];
        let ac = &layout.flows[1];
        assert_eq!(ac.link_id, "ac");
        assert_eq!(ac.target_pt, Point::new(100.0, 51.0));
        assert_eq!(bc.target_pt, Point::new(100.0, 53.5));
        assert_eq!(ac.source_pt, Point::new(0.0, 11.0));
        assert_eq!(bc.source_pt, Point::new(0.0, 21.5));
        assert_eq!(ac.attrs.path, "M0,11C50,11,50,51,100,51");
        assert_eq!(ac.attrs.stroke, "#999999");
        assert_eq!(ac.attrs.opacity, 1.0);
        assert_eq!(ac.attrs.stroke_width, 2.0);
    }

    #[test]
    fn display_width_is_floored_but_stacking_is_not() {
        let (links, nodes) = two_into_one();
        let mut mappings = MappingSet::standard();
        mappings.map(
            props::STROKE_WIDTH,
            Mapping::field("value").with_scale(Scale::new([0.0, 10.0], [4.0, 14.0])),
        );
        let layout = compute_flow_layout(&links, &nodes, &mappings, &LayoutConfig::default());
        assert_eq!(layout.min_width, 4.0);
        // stacking runs on the [0, 14] range, display is floored at 4
        let ac = &layout.flows[1];
        let bc = &layout.flows[0];
        assert!((ac.width - 2.8).abs() < 1e-9);
        assert!((bc.width - 4.2).abs() < 1e-9);
        assert_eq!(ac.attrs.stroke_width, 4.0);
        assert!((bc.attrs.stroke_width - 4.2).abs() < 1e-9);
        assert_eq!(ac.target_pt.y, 52.0);
        assert!((bc.target_pt.y - 54.9).abs() < 1e-9);
    }

    #[test]
    fn stroke_style_none_forces_zero_opacity() {
        let (links, nodes) = two_into_one();
        let mut mappings = MappingSet::standard();
        mappings.map(props::OPACITY, Mapping::constant(0.7));
        mappings.map(props::STROKE_STYLE, Mapping::constant("none"));
        let layout = compute_flow_layout(&links, &nodes, &mappings, &LayoutConfig::default());
        for flow in &layout.flows {
            assert_eq!(flow.attrs.opacity, 0.0);
            assert_eq!(flow.attrs.stroke_dasharray, "");
        }
    }

    #[test]
    fn empty_link_set_lays_out_nothing() {
        let layout = compute_flow_layout(&[], &NodeTable::new(), &MappingSet::standard(), &LayoutConfig::default());
        assert!(layout.flows.is_empty());
        assert_eq!(layout.min_width, 1.0);
    }
}
