use crate::error::Result;
use crate::layout::{FlowLayout, NodeRef, PathAttributes};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub min_width: f64,
    pub flows: Vec<FlowDump>,
}

#[derive(Debug, Serialize)]
pub struct FlowDump {
    pub id: String,
    pub source: NodeRef,
    pub target: NodeRef,
    pub width: f64,
    pub source_pt: [f64; 2],
    pub target_pt: [f64; 2],
    pub attrs: PathAttributes,
}

impl LayoutDump {
    pub fn from_layout(layout: &FlowLayout) -> Self {
        let flows = layout
            .flows
            .iter()
            .map(|flow| FlowDump {
                id: flow.link_id.clone(),
                source: flow.source.clone(),
                target: flow.target.clone(),
                width: flow.width,
                source_pt: [flow.source_pt.x, flow.source_pt.y],
                target_pt: [flow.target_pt.x, flow.target_pt.y],
                attrs: flow.attrs.clone(),
            })
            .collect();

        Self {
            min_width: layout.min_width,
            flows,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn write_layout_dump(path: &Path, layout: &FlowLayout) -> Result<()> {
    let dump = LayoutDump::from_layout(layout);
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
