use serde::{Deserialize, Serialize};

use crate::ir::Link;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A flow endpoint as seen from one link: node position plus the stand-off `r`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRef {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

/// Where a node's stack of flows starts relative to the node's y.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl Anchor {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "top" => Some(Self::Top),
            "middle" => Some(Self::Middle),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        }
    }
}

/// Which end of a flow a stack belongs to. Flows run left to right, so the stand-off
/// pushes a target anchor left of its node and a source anchor right of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

#[derive(Debug, Clone)]
pub struct FlowSpec<'a> {
    pub source: NodeRef,
    pub target: NodeRef,
    pub link: &'a Link,
    /// Stacking width: non-negative, never floored.
    pub width: f64,
}

impl FlowSpec<'_> {
    pub fn endpoint(&self, side: Side) -> &NodeRef {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }
}

/// Flows sharing one node on one side, in stacking order.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGroup {
    /// Indices into `FlowGroups::flows`.
    pub flows: Vec<usize>,
    pub anchor: Anchor,
}

#[derive(Debug, Clone)]
pub struct FlowWithTargetAnchor<'a> {
    pub spec: FlowSpec<'a>,
    pub target_pt: Point,
}

#[derive(Debug, Clone)]
pub struct FlowWithBothAnchors<'a> {
    pub spec: FlowSpec<'a>,
    pub source_pt: Point,
    pub target_pt: Point,
}

/// Resolved draw attributes for one flow path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PathAttributes {
    pub path: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
    pub stroke_dasharray: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutFlow {
    pub link_id: String,
    pub source: NodeRef,
    pub target: NodeRef,
    pub width: f64,
    pub source_pt: Point,
    pub target_pt: Point,
    pub attrs: PathAttributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowLayout {
    pub flows: Vec<LaidOutFlow>,
    pub min_width: f64,
}
