use serde::Deserialize;

use crate::error::Result;
use crate::ir::{ChangeSet, Link, NodeTable, Transition};
use crate::mapping::MappingSet;

/// A self-contained render pass: node records, links and the mappings that read them.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub nodes: NodeTable,
    pub changes: ChangeSet,
    pub mappings: MappingSet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneFile {
    #[serde(default)]
    nodes: NodeTable,
    #[serde(default)]
    links: Vec<Link>,
    #[serde(default)]
    removed: Vec<Link>,
    #[serde(default)]
    mappings: MappingSet,
    transition: Option<Transition>,
}

/// Parses a JSON5 scene. Declared mappings are layered over `MappingSet::standard()`.
pub fn parse_scene(input: &str) -> Result<Scene> {
    let file: SceneFile = json5::from_str(input)?;
    let mut mappings = MappingSet::standard();
    mappings.merge(file.mappings);
    Ok(Scene {
        nodes: file.nodes,
        changes: ChangeSet {
            updates: file.links,
            removed: file.removed,
            transition: file.transition,
        },
        mappings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{MappingResolver, props};
    use serde_json::json;

    #[test]
    fn parses_json5_scene_with_comments() {
        let scene = parse_scene(
            r#"{
                // two sources feeding one sink
                nodes: { A: { x: 0, y: 10 }, B: { x: 0, y: 20 }, C: { x: 100, y: 50 } },
                links: [
                    { id: 'ac', source: 'A', target: 'C', data: { value: 2 } },
                    { id: 'bc', source: 'B', target: 'C', data: { value: 3 } },
                ],
                mappings: { stroke: { value: '#336699' } },
                transition: { durationMs: 200 },
            }"#,
        )
        .expect("scene");

        assert_eq!(scene.nodes.len(), 3);
        assert_eq!(scene.changes.updates.len(), 2);
        assert!(scene.changes.removed.is_empty());
        assert_eq!(scene.changes.transition.as_ref().map(|t| t.duration_ms), Some(200));
        assert_eq!(scene.mappings.string_for(props::STROKE, &json!({}), "", None), "#336699");
        assert!(scene.mappings.mapping(props::STROKE_WIDTH).is_some());
    }

    #[test]
    fn user_mappings_override_standard_ones() {
        let scene = parse_scene(r#"{ mappings: { "stroke-width": { from: "weight" } } }"#).expect("scene");
        let record = json!({ "value": 1, "weight": 9 });
        assert_eq!(scene.mappings.number_for(props::STROKE_WIDTH, &record, 0.0, None), 9.0);
    }

    #[test]
    fn rejects_malformed_scene() {
        assert!(matches!(parse_scene("{ links: [ }"), Err(crate::error::Error::Json5(_))));
    }
}
