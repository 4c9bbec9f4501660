//! Scene files: a container tree plus a script of timed input events,
//! loaded from TOML into a [`SimScene`].
//!
//! ```toml
//! [root]
//! width = 800.0
//! height = 600.0
//! content_width = 800.0
//! content_height = 4000.0
//!
//! [[containers]]
//! name = "sidebar"
//! width = 240.0
//! height = 600.0
//! content_width = 240.0
//! content_height = 1800.0
//! overflow_y = "auto"
//!
//! [[events]]
//! at_ms = 0.0
//! kind = "wheel"
//! delta_y = 120.0
//! target = "sidebar"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ScrollerConfig;
use crate::delegation::Overflow;
use crate::error::{Error, Result};
use crate::geometry::{Axis, Size};
use crate::scroll::WheelInput;
use crate::sim::{NodeSpec, SimNode, SimScene};

pub const ROOT_NAME: &str = "root";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneFile {
    /// Scroller tuning for this scene; replaces the user configuration
    /// when present, missing fields use defaults
    #[serde(default)]
    pub scroller: Option<ScrollerConfig>,
    pub root: RootSpec,
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
    #[serde(default)]
    pub events: Vec<SceneEvent>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RootSpec {
    pub width: f64,
    pub height: f64,
    pub content_width: f64,
    pub content_height: f64,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
    /// Round scroll writes to whole pixels, like engines without
    /// fractional scroll offsets
    #[serde(default)]
    pub round_writes: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContainerSpec {
    pub name: String,
    /// Parent container name (defaults to the root)
    #[serde(default)]
    pub parent: Option<String>,
    pub width: f64,
    pub height: f64,
    pub content_width: f64,
    pub content_height: f64,
    #[serde(default = "default_overflow")]
    pub overflow_x: String,
    #[serde(default = "default_overflow")]
    pub overflow_y: String,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneEvent {
    /// Time since replay start
    pub at_ms: f64,
    #[serde(flatten)]
    pub action: SceneAction,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneAction {
    /// A wheel event dispatched at `target` (the root when absent)
    Wheel {
        #[serde(default)]
        delta_y: f64,
        #[serde(default)]
        legacy_delta_y: Option<f64>,
        #[serde(default)]
        target: Option<String>,
    },
    /// A native scroll of the root, e.g. a scrollbar drag
    Scroll { axis: Axis, to: f64 },
    /// Content of a container changes size
    Resize {
        #[serde(default)]
        target: Option<String>,
        content_width: f64,
        content_height: f64,
    },
    /// A container is removed from the tree
    Detach {
        #[serde(default)]
        target: Option<String>,
    },
    /// The scroller is torn down
    Destroy,
}

impl SceneAction {
    pub fn wheel_input(&self) -> Option<WheelInput> {
        match self {
            SceneAction::Wheel {
                delta_y,
                legacy_delta_y,
                ..
            } => Some(WheelInput {
                delta_y: *delta_y,
                legacy_delta_y: *legacy_delta_y,
            }),
            _ => None,
        }
    }
}

fn default_overflow() -> String {
    "visible".to_string()
}

/// A scene file realized as a live simulated tree.
#[derive(Debug)]
pub struct BuiltScene {
    pub scene: SimScene,
    pub scroller: Option<ScrollerConfig>,
    /// Whether the host for this scene rounds scroll writes
    pub round_writes: bool,
    /// Events in replay order
    pub events: Vec<SceneEvent>,
    nodes: HashMap<String, SimNode>,
}

impl BuiltScene {
    /// Resolve an event target; `None` means the root.
    pub fn node(&self, name: Option<&str>) -> Result<SimNode> {
        let name = name.unwrap_or(ROOT_NAME);
        self.nodes
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Scene(format!("unknown container '{name}'")))
    }
}

impl SceneFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn build(&self) -> Result<BuiltScene> {
        if let Some(scroller) = &self.scroller {
            scroller.validate()?;
        }

        let root = &self.root;
        let scene = SimScene::new(
            Size::new(root.width, root.height),
            Size::new(root.content_width, root.content_height),
        );
        let root_node = scene.root();
        root_node.set_offset(Axis::X, root.scroll_x);
        root_node.set_offset(Axis::Y, root.scroll_y);

        let mut nodes = HashMap::new();
        nodes.insert(ROOT_NAME.to_string(), root_node);

        for container in &self.containers {
            if nodes.contains_key(&container.name) {
                return Err(Error::Scene(format!(
                    "duplicate container '{}'",
                    container.name
                )));
            }
            let parent_name = container.parent.as_deref().unwrap_or(ROOT_NAME);
            let parent = nodes.get(parent_name).ok_or_else(|| {
                Error::Scene(format!(
                    "container '{}' references unknown parent '{}' \
                     (parents must be declared first)",
                    container.name, parent_name
                ))
            })?;

            let spec = NodeSpec::new(
                container.name.clone(),
                Size::new(container.width, container.height),
                Size::new(container.content_width, container.content_height),
            )
            .overflow(
                container.overflow_x.parse::<Overflow>()?,
                container.overflow_y.parse::<Overflow>()?,
            );
            let node = scene.add_child(parent, spec);
            node.set_offset(Axis::X, container.scroll_x);
            node.set_offset(Axis::Y, container.scroll_y);
            nodes.insert(container.name.clone(), node);
        }

        let mut events = self.events.clone();
        for event in &events {
            if !event.at_ms.is_finite() || event.at_ms < 0.0 {
                return Err(Error::Scene(format!(
                    "event time must be a non-negative number (got {})",
                    event.at_ms
                )));
            }
        }
        // stable: events at the same instant keep file order
        events.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));

        let built = BuiltScene {
            scene,
            scroller: self.scroller.clone(),
            round_writes: root.round_writes,
            events,
            nodes,
        };
        for event in &built.events {
            match &event.action {
                SceneAction::Wheel { target, .. }
                | SceneAction::Resize { target, .. }
                | SceneAction::Detach { target } => {
                    built.node(target.as_deref())?;
                }
                SceneAction::Scroll { .. } | SceneAction::Destroy => {}
            }
        }
        Ok(built)
    }
}
