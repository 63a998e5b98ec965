use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub background: String,
    pub link_color: String,
    pub node_fill: String,
    pub node_stroke: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            link_color: "#999999".to_string(),
            node_fill: "#4E79A7".to_string(),
            node_stroke: "none".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            link_color: "#7A8AA6".to_string(),
            node_fill: "#1C2430".to_string(),
            node_stroke: "#C7D2E5".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
