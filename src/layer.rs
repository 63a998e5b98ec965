use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::ir::{ChangeSet, NodeTable};
use crate::layout::{FlowLayout, compute_flow_layout};
use crate::mapping::MappingResolver;
use crate::surface::DrawingSurface;

/// Link id to the surface handle of the path drawn for it. At most one handle per id.
#[derive(Debug, Clone)]
pub struct VisualCache<H> {
    entries: HashMap<String, H>,
}

impl<H> Default for VisualCache<H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<H> VisualCache<H> {
    pub fn get(&self, link_id: &str) -> Option<&H> {
        self.entries.get(link_id)
    }

    pub fn contains(&self, link_id: &str) -> bool {
        self.entries.contains_key(link_id)
    }

    pub fn insert(&mut self, link_id: impl Into<String>, handle: H) -> Option<H> {
        self.entries.insert(link_id.into(), handle)
    }

    pub fn remove(&mut self, link_id: &str) -> Option<H> {
        self.entries.remove(link_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of one render pass.
#[derive(Debug)]
pub struct RenderSummary<H> {
    pub layout: FlowLayout,
    pub created: usize,
    pub updated: usize,
    /// Handles dropped from the cache for removed links; tearing them down is up to
    /// the caller.
    pub evicted: Vec<H>,
}

/// A sankey flow layer: owns its visual cache and reconciles each pass against it.
#[derive(Debug)]
pub struct FlowLayer<H> {
    config: LayoutConfig,
    cache: VisualCache<H>,
    /// Evicted handles not yet handed out; survives a failed pass.
    pending_evictions: Vec<H>,
}

impl<H: Clone> FlowLayer<H> {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            cache: VisualCache::default(),
            pending_evictions: Vec::new(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn cache(&self) -> &VisualCache<H> {
        &self.cache
    }

    /// Evicts removed links, then lays out `changes.updates` and creates or updates one
    /// path per flow. A surface error aborts the pass; handles evicted by it are
    /// reported by the next pass that succeeds.
    pub fn render<S>(
        &mut self,
        changes: &ChangeSet,
        nodes: &NodeTable,
        resolver: &dyn MappingResolver,
        surface: &mut S,
    ) -> Result<RenderSummary<H>>
    where
        S: DrawingSurface<Handle = H>,
    {
        for link in &changes.removed {
            if let Some(handle) = self.cache.remove(&link.id) {
                self.pending_evictions.push(handle);
            }
        }

        let layout = compute_flow_layout(&changes.updates, nodes, resolver, &self.config);
        let transition = changes.transition.as_ref();
        let mut created = 0;
        let mut updated = 0;

        for flow in &layout.flows {
            if let Some(handle) = self.cache.get(&flow.link_id) {
                surface.update(handle, &flow.attrs, transition).inspect_err(|err| {
                    tracing::warn!(link = %flow.link_id, error = %err, "flow update rejected");
                })?;
                updated += 1;
            } else {
                let handle = surface.path(&flow.attrs.path).inspect_err(|err| {
                    tracing::warn!(link = %flow.link_id, error = %err, "flow path rejected");
                })?;
                // Cached before styling; a path whose `attr` fails is still drawn.
                self.cache.insert(flow.link_id.clone(), handle.clone());
                created += 1;
                surface.attr(&handle, &flow.attrs).inspect_err(|err| {
                    tracing::warn!(link = %flow.link_id, error = %err, "flow attributes rejected");
                })?;
            }
        }

        let evicted = std::mem::take(&mut self.pending_evictions);
        tracing::debug!(
            flows = layout.flows.len(),
            created,
            updated,
            evicted = evicted.len(),
            cached = self.cache.len(),
            "sankey flow pass"
        );

        Ok(RenderSummary {
            layout,
            created,
            updated,
            evicted,
        })
    }
}
