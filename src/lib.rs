#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layer;
pub mod layout;
pub mod layout_dump;
pub mod mapping;
pub mod render;
pub mod scene;
pub mod surface;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config};
pub use error::{Error, Result};
pub use ir::{ChangeSet, Link, NodeTable, Transition};
pub use layer::{FlowLayer, RenderSummary, VisualCache};
pub use layout::{FlowLayout, compute_flow_layout};
pub use mapping::{Mapping, MappingResolver, MappingSet, Scale};
pub use render::{SvgSurface, render_svg};
pub use scene::{Scene, parse_scene};
pub use surface::DrawingSurface;
pub use theme::Theme;
