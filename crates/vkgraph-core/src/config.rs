use crate::layout::GpuMemoryLayout;

/// Graph construction options
#[derive(Clone, Debug)]
pub struct GraphConfig {
    /// Force every tensor created through `add_tensor` into this layout
    pub memory_layout_override: Option<GpuMemoryLayout>,
    /// Log each node as it is appended to the graph
    pub log_node_creation: bool,
    /// Prefix used when labelling nodes, useful when several graphs share one log
    pub node_label_prefix: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            memory_layout_override: None,
            log_node_creation: false,
            node_label_prefix: "vkgraph".to_string(),
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory_layout_override(mut self, layout: GpuMemoryLayout) -> Self {
        self.memory_layout_override = Some(layout);
        self
    }

    pub fn with_node_logging(mut self, enabled: bool) -> Self {
        self.log_node_creation = enabled;
        self
    }

    pub fn with_node_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.node_label_prefix = prefix.into();
        self
    }

    /// Layout for a new tensor when the caller did not pick one explicitly
    pub fn default_memory_layout(&self) -> GpuMemoryLayout {
        self.memory_layout_override.unwrap_or_default()
    }
}
