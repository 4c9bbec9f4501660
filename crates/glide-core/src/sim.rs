//! In-memory scroll containers and host.
//!
//! A [`SimScene`] is a tree of named containers with browser-like scroll
//! semantics: offsets are clamped to `[0, content - frame]` on write, and a
//! detached node reports zero geometry and ignores writes. [`SimHost`]
//! drives a [`SmoothScroller`] over the scene's root with a manual clock and
//! a counted frame queue.

use std::cell::RefCell;
use std::rc::Rc;

use crate::delegation::{Overflow, ScrollContainer};
use crate::geometry::{Axis, ScrollExtent, Size};
use crate::host::{ScrollHost, ScrollSurface};
use crate::scroller::SmoothScroller;

/// One 60 Hz display frame.
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// Construction parameters for a scene node.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub name: String,
    pub frame: Size,
    pub content: Size,
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, frame: Size, content: Size) -> Self {
        Self {
            name: name.into(),
            frame,
            content,
            overflow_x: Overflow::Visible,
            overflow_y: Overflow::Visible,
        }
    }

    pub fn overflow(mut self, x: Overflow, y: Overflow) -> Self {
        self.overflow_x = x;
        self.overflow_y = y;
        self
    }
}

#[derive(Debug)]
struct NodeState {
    spec: NodeSpec,
    parent: Option<usize>,
    offset_x: f64,
    offset_y: f64,
    attached: bool,
}

impl NodeState {
    fn max_offset(&self, axis: Axis) -> f64 {
        (self.spec.content.along(axis) - self.spec.frame.along(axis)).max(0.0)
    }
}

/// A tree of simulated containers. Cloning shares the same tree.
#[derive(Debug, Clone)]
pub struct SimScene {
    nodes: Rc<RefCell<Vec<NodeState>>>,
}

impl SimScene {
    /// A scene whose root (the managed element) has the given visible and
    /// content sizes.
    pub fn new(viewport: Size, content: Size) -> Self {
        let root = NodeState {
            spec: NodeSpec::new("root", viewport, content),
            parent: None,
            offset_x: 0.0,
            offset_y: 0.0,
            attached: true,
        };
        Self {
            nodes: Rc::new(RefCell::new(vec![root])),
        }
    }

    pub fn root(&self) -> SimNode {
        self.handle(0)
    }

    pub fn add_child(&self, parent: &SimNode, spec: NodeSpec) -> SimNode {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeState {
            spec,
            parent: Some(parent.id),
            offset_x: 0.0,
            offset_y: 0.0,
            attached: true,
        });
        let id = nodes.len() - 1;
        drop(nodes);
        self.handle(id)
    }

    /// Look a node up by name; the first match wins.
    pub fn find(&self, name: &str) -> Option<SimNode> {
        let nodes = self.nodes.borrow();
        nodes
            .iter()
            .position(|node| node.spec.name == name)
            .map(|id| self.handle(id))
    }

    fn handle(&self, id: usize) -> SimNode {
        SimNode {
            scene: self.clone(),
            id,
        }
    }
}

/// Handle to one node of a [`SimScene`].
#[derive(Debug, Clone)]
pub struct SimNode {
    scene: SimScene,
    id: usize,
}

impl SimNode {
    fn with<R>(&self, f: impl FnOnce(&NodeState) -> R) -> R {
        f(&self.scene.nodes.borrow()[self.id])
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut NodeState) -> R) -> R {
        f(&mut self.scene.nodes.borrow_mut()[self.id])
    }

    pub fn name(&self) -> String {
        self.with(|node| node.spec.name.clone())
    }

    pub fn offset(&self, axis: Axis) -> f64 {
        self.with(|node| match axis {
            Axis::X => node.offset_x,
            Axis::Y => node.offset_y,
        })
    }

    /// Native scroll write: clamped, ignored once detached.
    pub fn set_offset(&self, axis: Axis, value: f64) {
        self.with_mut(|node| {
            if !node.attached || !value.is_finite() {
                return;
            }
            let value = value.clamp(0.0, node.max_offset(axis));
            match axis {
                Axis::X => node.offset_x = value,
                Axis::Y => node.offset_y = value,
            }
        });
    }

    pub fn set_overflow(&self, x: Overflow, y: Overflow) {
        self.with_mut(|node| {
            node.spec.overflow_x = x;
            node.spec.overflow_y = y;
        });
    }

    /// Change content size, re-clamping current offsets like a relayout.
    pub fn set_content(&self, content: Size) {
        self.with_mut(|node| {
            node.spec.content = content;
            node.offset_x = node.offset_x.min(node.max_offset(Axis::X));
            node.offset_y = node.offset_y.min(node.max_offset(Axis::Y));
        });
    }

    /// Remove the node from its tree.
    pub fn detach(&self) {
        self.with_mut(|node| node.attached = false);
    }
}

impl ScrollContainer for SimNode {
    fn overflow(&self) -> (Overflow, Overflow) {
        self.with(|node| (node.spec.overflow_x, node.spec.overflow_y))
    }

    fn frame(&self) -> Size {
        self.with(|node| {
            if node.attached {
                node.spec.frame
            } else {
                Size::default()
            }
        })
    }

    fn extent(&self) -> ScrollExtent {
        self.with(|node| {
            if !node.attached {
                return ScrollExtent::default();
            }
            ScrollExtent {
                x: node.offset_x,
                y: node.offset_y,
                width: node.spec.content.width,
                height: node.spec.content.height,
            }
        })
    }

    fn parent(&self) -> Option<Self> {
        let parent = self.with(|node| node.attached.then_some(node.parent).flatten());
        parent.map(|id| self.scene.handle(id))
    }

    fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.scene.nodes, &other.scene.nodes) && self.id == other.id
    }
}

/// Host over a scene root with a manual clock.
#[derive(Debug)]
pub struct SimHost {
    root: SimNode,
    now_ms: f64,
    pending_frames: usize,
    frames_requested: usize,
    iframes_blocked: bool,
    iframe_toggles: usize,
    supported: bool,
    round_writes: bool,
}

impl SimHost {
    pub fn new(root: SimNode) -> Self {
        Self {
            root,
            now_ms: 0.0,
            pending_frames: 0,
            frames_requested: 0,
            iframes_blocked: false,
            iframe_toggles: 0,
            supported: true,
            round_writes: false,
        }
    }

    pub fn set_supported(&mut self, supported: bool) {
        self.supported = supported;
    }

    /// Round every scroll write to a whole pixel, as engines without
    /// fractional scroll offsets do.
    pub fn set_round_writes(&mut self, round: bool) {
        self.round_writes = round;
    }

    pub fn now(&self) -> f64 {
        self.now_ms
    }

    pub fn set_now(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }

    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
    }

    /// Consume one scheduled frame, if any.
    pub fn take_frame(&mut self) -> bool {
        if self.pending_frames == 0 {
            return false;
        }
        self.pending_frames -= 1;
        true
    }

    pub fn pending_frames(&self) -> usize {
        self.pending_frames
    }

    pub fn frames_requested(&self) -> usize {
        self.frames_requested
    }

    pub fn iframes_blocked(&self) -> bool {
        self.iframes_blocked
    }

    /// How many times iframe blocking changed state.
    pub fn iframe_toggles(&self) -> usize {
        self.iframe_toggles
    }
}

impl ScrollSurface for SimHost {
    fn viewport(&self) -> Size {
        self.root.frame()
    }

    fn extent(&self) -> ScrollExtent {
        ScrollContainer::extent(&self.root)
    }

    fn set_scroll(&mut self, axis: Axis, value: f64) {
        let value = if self.round_writes { value.round() } else { value };
        self.root.set_offset(axis, value);
    }
}

impl ScrollHost for SimHost {
    type Container = SimNode;

    fn root(&self) -> SimNode {
        self.root.clone()
    }

    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn request_frame(&mut self) {
        self.pending_frames += 1;
        self.frames_requested += 1;
    }

    fn set_iframes_blocked(&mut self, blocked: bool) {
        if self.iframes_blocked != blocked {
            self.iframes_blocked = blocked;
            self.iframe_toggles += 1;
        }
    }

    fn supports_smooth_scroll(&self) -> bool {
        self.supported
    }
}

/// Run scheduled frames, advancing the clock by `frame_ms` each, until no
/// frame is pending or `max_frames` ran. Returns the number of frames run.
pub fn run_until_idle(
    scroller: &mut SmoothScroller<SimHost>,
    frame_ms: f64,
    max_frames: usize,
) -> usize {
    let mut frames = 0;
    while frames < max_frames && scroller.host_mut().take_frame() {
        scroller.on_frame();
        scroller.host_mut().advance(frame_ms);
        frames += 1;
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_are_clamped() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(1000.0, 300.0));
        let root = scene.root();
        root.set_offset(Axis::X, 5000.0);
        assert_eq!(root.offset(Axis::X), 600.0);
        root.set_offset(Axis::X, -20.0);
        assert_eq!(root.offset(Axis::X), 0.0);
        root.set_offset(Axis::Y, 10.0);
        assert_eq!(root.offset(Axis::Y), 0.0);
    }

    #[test]
    fn test_detached_node_is_degenerate() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(1000.0, 300.0));
        let child = scene.add_child(
            &scene.root(),
            NodeSpec::new("child", Size::new(100.0, 100.0), Size::new(100.0, 500.0)),
        );
        child.set_offset(Axis::Y, 50.0);
        child.detach();

        child.set_offset(Axis::Y, 80.0);
        assert_eq!(child.offset(Axis::Y), 50.0);
        assert_eq!(child.frame(), Size::default());
        assert_eq!(ScrollContainer::extent(&child), ScrollExtent::default());
        assert!(child.parent().is_none());
    }

    #[test]
    fn test_relayout_reclamps() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(400.0, 3000.0));
        let root = scene.root();
        root.set_offset(Axis::Y, 2500.0);
        root.set_content(Size::new(400.0, 1000.0));
        assert_eq!(root.offset(Axis::Y), 700.0);
    }

    #[test]
    fn test_find_and_identity() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(400.0, 3000.0));
        let panel = scene.add_child(
            &scene.root(),
            NodeSpec::new("panel", Size::new(100.0, 100.0), Size::new(100.0, 100.0)),
        );
        let found = scene.find("panel").unwrap();
        assert!(found.is_same(&panel));
        assert!(!found.is_same(&scene.root()));
        assert!(found.parent().unwrap().is_same(&scene.root()));
        assert!(scene.find("missing").is_none());

        let other = SimScene::new(Size::new(400.0, 300.0), Size::new(400.0, 3000.0));
        assert!(!other.root().is_same(&scene.root()));
    }

    #[test]
    fn test_round_writes() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(400.0, 3000.0));
        let mut host = SimHost::new(scene.root());
        host.set_scroll(Axis::Y, 112.5);
        assert_eq!(scene.root().offset(Axis::Y), 112.5);

        host.set_round_writes(true);
        host.set_scroll(Axis::Y, 40.4);
        assert_eq!(scene.root().offset(Axis::Y), 40.0);
        host.set_scroll(Axis::Y, 112.5);
        assert_eq!(scene.root().offset(Axis::Y), 113.0);
    }

    #[test]
    fn test_frame_queue() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(400.0, 3000.0));
        let mut host = SimHost::new(scene.root());
        assert!(!host.take_frame());
        host.request_frame();
        assert_eq!(host.pending_frames(), 1);
        assert!(host.take_frame());
        assert!(!host.take_frame());
        assert_eq!(host.frames_requested(), 1);
    }
}
