//! Sunburst view controller.
//!
//! [`ViewState`] owns everything a chart instance mutates: the focus node,
//! the committed (`current`) and destination (`target`) extent of every
//! node, and the per-node opacity/stroke the host draws with.
//!
//! ```text
//!   Idle(F) ── focus_on(p) ──▶ Animating(F → p) ── advance(..) ──▶ Idle(p)
//!                                  │
//!                                  └─ focus_on(q) restarts from the
//!                                     mid-flight geometry ─▶ Animating(p → q)
//! ```
//!
//! Visibility is a pure function of an extent: an arc shows when it lies in
//! rings `1..=max_visible_layers` and has positive width; a label also needs
//! enough area to be legible.

use crate::config::SunburstConfig;
use crate::data::format_number;
use crate::error::Result;
use crate::hierarchy::{Hierarchy, NodeId};
use crate::render::animator::{interpolate, lerp_f32, Tween};
use crate::render::partition::{partition, ArcLayout};

/// Whether an arc with this extent is drawn.
pub fn arc_visible(layout: &ArcLayout, max_visible_layers: u32) -> bool {
    layout.y1 <= max_visible_layers as f64 + 1.0 && layout.y0 >= 1.0 && layout.x1 > layout.x0
}

/// Whether the label of an arc with this extent is drawn.
pub fn label_visible(layout: &ArcLayout, max_visible_layers: u32, area_threshold: f64) -> bool {
    layout.y1 <= max_visible_layers as f64 + 1.0 && layout.y0 >= 1.0 && layout.area() > area_threshold
}

/// Drawing attributes of one node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeVisual {
    pub fill_opacity: f32,
    pub stroke_width: f32,
    pub label_opacity: f32,
}

/// What a point in the chart lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Hub,
    Arc(NodeId),
}

/// Result of a focus change, handed back to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub previous_focus: NodeId,
    pub focus: NodeId,
    /// Root-to-focus `"key (value)"` labels.
    pub breadcrumbs: Vec<String>,
    pub center_label: String,
    /// A transition was still running and has been restarted from its current state.
    pub interrupted: bool,
}

/// One node the host should draw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderItem {
    pub id: NodeId,
    pub layout: ArcLayout,
    pub visual: NodeVisual,
    /// Clicking this arc drills down.
    pub clickable: bool,
}

struct ActiveTransition {
    tween: Tween,
    from: Vec<ArcLayout>,
    visual_from: Vec<NodeVisual>,
    /// Nodes whose attributes take part in this transition.
    participating: Vec<bool>,
}

type BreadcrumbCallback = Box<dyn FnMut(&[String])>;

pub struct ViewState {
    tree: Hierarchy,
    config: SunburstConfig,
    /// Partition of the whole tree; never changes.
    base: Vec<ArcLayout>,
    current: Vec<ArcLayout>,
    target: Vec<ArcLayout>,
    visuals: Vec<NodeVisual>,
    visual_target: Vec<NodeVisual>,
    focus: NodeId,
    breadcrumbs: Vec<String>,
    center_label: String,
    active: Option<ActiveTransition>,
    on_breadcrumbs: Option<BreadcrumbCallback>,
}

/// Build a view over `tree` and report the initial breadcrumb to `on_breadcrumbs`.
pub fn initialize_view<F>(tree: Hierarchy, config: SunburstConfig, on_breadcrumbs: F) -> Result<ViewState>
where
    F: FnMut(&[String]) + 'static,
{
    let mut view = ViewState::new(tree, config)?;
    view.on_breadcrumbs = Some(Box::new(on_breadcrumbs));
    view.emit_breadcrumbs();
    Ok(view)
}

impl ViewState {
    /// Lay out `tree`, focus the root and compute initial visibility.
    pub fn new(tree: Hierarchy, config: SunburstConfig) -> Result<Self> {
        config.validate()?;
        let base = partition(&tree);
        let focus = tree.root();

        let mut view = Self {
            current: base.clone(),
            target: base.clone(),
            visuals: Vec::new(),
            visual_target: Vec::new(),
            base,
            focus,
            breadcrumbs: Vec::new(),
            center_label: String::new(),
            active: None,
            on_breadcrumbs: None,
            tree,
            config,
        };
        view.visuals = view.visuals_for(&view.current);
        view.visual_target = view.visuals.clone();
        view.breadcrumbs = view.path_labels(focus);
        view.center_label = view.breadcrumbs.join("\n\u{21d3}\n");
        Ok(view)
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn tree(&self) -> &Hierarchy {
        &self.tree
    }

    pub fn config(&self) -> &SunburstConfig {
        &self.config
    }

    pub fn focus(&self) -> NodeId {
        self.focus
    }

    pub fn breadcrumbs(&self) -> &[String] {
        &self.breadcrumbs
    }

    /// Text shown inside the hub.
    pub fn center_label(&self) -> &str {
        &self.center_label
    }

    /// Node the hub navigates to: the focus's parent, or the root.
    pub fn hub_target(&self) -> NodeId {
        self.tree.parent(self.focus).unwrap_or_else(|| self.tree.root())
    }

    /// Partition extent (focus-independent).
    pub fn base(&self, id: NodeId) -> ArcLayout {
        self.base[id.index()]
    }

    /// Extent as currently displayed, mid-transition included.
    pub fn current(&self, id: NodeId) -> ArcLayout {
        self.current[id.index()]
    }

    /// Extent the running (or last) transition heads for.
    pub fn target(&self, id: NodeId) -> ArcLayout {
        self.target[id.index()]
    }

    pub fn visual(&self, id: NodeId) -> NodeVisual {
        self.visuals[id.index()]
    }

    pub fn is_transitioning(&self) -> bool {
        self.active.is_some()
    }

    /// Eased progress of the running transition, `None` when idle.
    pub fn transition_progress(&self) -> Option<f64> {
        self.active.as_ref().map(|a| a.tween.eased())
    }

    pub fn is_arc_visible(&self, id: NodeId) -> bool {
        arc_visible(&self.current[id.index()], self.config.max_visible_layers)
    }

    pub fn is_label_visible(&self, id: NodeId) -> bool {
        label_visible(
            &self.current[id.index()],
            self.config.max_visible_layers,
            self.config.label_area_threshold,
        )
    }

    /// Hover text: the root-to-node keys one per line, then the value.
    pub fn title(&self, id: NodeId) -> String {
        let keys: Vec<String> = self
            .tree
            .path(id)
            .into_iter()
            .map(|n| self.tree.node(n).key.to_string())
            .collect();
        format!(
            "{}\n{}",
            keys.join("\n/ "),
            format_number(self.tree.node(id).value)
        )
    }

    pub fn set_ring_radius(&mut self, radius: f32) {
        if radius.is_finite() && radius > 0.0 {
            self.config.ring_radius = radius;
        }
    }

    // ── Interaction ─────────────────────────────────────────────────────────

    /// Map a polar point (angle clockwise from 12 o'clock, radius in ring
    /// units) to what is drawn there now.
    pub fn hit_test(&self, angle: f64, radius: f64) -> Option<HitTarget> {
        if radius < 0.0 {
            return None;
        }
        if radius < 1.0 {
            return Some(HitTarget::Hub);
        }
        self.tree
            .ids()
            .skip(1)
            .find(|id| {
                self.visuals[id.index()].fill_opacity > 0.0
                    && self.is_arc_visible(*id)
                    && self.current[id.index()].contains(angle, radius)
            })
            .map(HitTarget::Arc)
    }

    /// Drill into a clicked arc. Leaves, the root and hidden arcs are ignored.
    pub fn click_arc(&mut self, id: NodeId) -> Option<Transition> {
        if !self.tree.contains(id) || id == self.tree.root() {
            return None;
        }
        if self.tree.node(id).is_leaf() {
            log::debug!("Ignoring click on leaf {}", self.tree.label(id));
            return None;
        }
        if !self.is_arc_visible(id) {
            log::debug!("Ignoring click on hidden arc {}", self.tree.label(id));
            return None;
        }
        self.focus_on(id)
    }

    /// Drill up to the focus's parent. No-op at the root.
    pub fn click_hub(&mut self) -> Option<Transition> {
        match self.tree.parent(self.focus) {
            Some(parent) => self.focus_on(parent),
            None => {
                log::debug!("Hub clicked at root; nothing to do");
                None
            }
        }
    }

    pub fn click(&mut self, target: HitTarget) -> Option<Transition> {
        match target {
            HitTarget::Hub => self.click_hub(),
            HitTarget::Arc(id) => self.click_arc(id),
        }
    }

    /// Make `p` the centre of the chart and start animating toward it.
    ///
    /// Returns `None` when `p` is already the focus, is not part of the
    /// tree, or has no angular extent to zoom into. A call while another
    /// transition runs restarts from the geometry reached so far.
    pub fn focus_on(&mut self, p: NodeId) -> Option<Transition> {
        if !self.tree.contains(p) || p == self.focus {
            return None;
        }
        let focus_layout = self.base[p.index()];
        if focus_layout.angle() <= 0.0 {
            log::debug!("Cannot focus {}: zero angular span", self.tree.label(p));
            return None;
        }

        let depth = self.tree.node(p).depth;
        self.target = self
            .base
            .iter()
            .map(|layout| layout.zoomed_to(&focus_layout, depth))
            .collect();

        let previous_focus = self.focus;
        self.focus = p;

        let visual_target = self.visuals_for(&self.target);
        let participating: Vec<bool> = self
            .visuals
            .iter()
            .zip(&visual_target)
            .map(|(now, next)| {
                now.fill_opacity > 0.0
                    || now.label_opacity > 0.0
                    || next.fill_opacity > 0.0
                    || next.label_opacity > 0.0
            })
            .collect();

        // Attributes that start from zero snap to their destination; the
        // rest fade from where they are.
        let visual_from: Vec<NodeVisual> = self
            .visuals
            .iter()
            .zip(&visual_target)
            .map(|(now, next)| NodeVisual {
                fill_opacity: if now.fill_opacity > 0.0 {
                    now.fill_opacity
                } else {
                    next.fill_opacity
                },
                stroke_width: next.stroke_width,
                label_opacity: if now.label_opacity > 0.0 {
                    now.label_opacity
                } else {
                    next.label_opacity
                },
            })
            .collect();
        for (i, from) in visual_from.iter().enumerate() {
            if participating[i] {
                self.visuals[i] = *from;
            }
        }
        self.visual_target = visual_target;

        let interrupted = self.active.is_some();
        if interrupted {
            log::debug!("Transition interrupted; restarting toward {}", self.tree.label(p));
        }
        self.active = Some(ActiveTransition {
            tween: Tween::new(self.config.transition()),
            from: self.current.clone(),
            visual_from,
            participating,
        });

        self.breadcrumbs = self.path_labels(p);
        self.center_label = self.tree.label(p);
        log::debug!("Focus -> {}", self.breadcrumbs.join(" / "));
        self.emit_breadcrumbs();

        if self.config.transition_ms == 0 {
            self.finish_transition();
        }

        Some(Transition {
            previous_focus,
            focus: p,
            breadcrumbs: self.breadcrumbs.clone(),
            center_label: self.center_label.clone(),
            interrupted,
        })
    }

    // ── Animation ───────────────────────────────────────────────────────────

    /// Step the running transition by `dt`. Returns `true` while it is still running.
    pub fn advance(&mut self, dt: std::time::Duration) -> bool {
        let finished = match self.active.as_mut() {
            None => return false,
            Some(active) => {
                active.tween.advance(dt);
                active.tween.is_finished()
            }
        };
        if finished {
            self.finish_transition();
            return false;
        }

        if let Some(active) = self.active.as_ref() {
            let t = active.tween.eased();
            for (i, cur) in self.current.iter_mut().enumerate() {
                *cur = interpolate(&active.from[i], &self.target[i], t);
            }
            let tf = t as f32;
            for (i, visual) in self.visuals.iter_mut().enumerate() {
                if !active.participating[i] {
                    continue;
                }
                let from = active.visual_from[i];
                let to = self.visual_target[i];
                visual.fill_opacity = lerp_f32(from.fill_opacity, to.fill_opacity, tf);
                visual.label_opacity = lerp_f32(from.label_opacity, to.label_opacity, tf);
                visual.stroke_width = to.stroke_width;
            }
        }
        true
    }

    /// Jump to the end of the running transition and commit its target.
    pub fn finish_transition(&mut self) {
        if let Some(active) = self.active.take() {
            self.current.clone_from(&self.target);
            for (i, visual) in self.visuals.iter_mut().enumerate() {
                if active.participating[i] {
                    *visual = self.visual_target[i];
                }
            }
        }
    }

    /// Nodes to draw this frame, breadth-first from the innermost ring.
    ///
    /// The root is never drawn as an arc. Nodes that are fully transparent
    /// and not taking part in a transition are left out.
    pub fn render_items(&self) -> Vec<RenderItem> {
        self.tree
            .descendants()
            .into_iter()
            .skip(1)
            .filter_map(|id| {
                let i = id.index();
                let visual = self.visuals[i];
                let participating = self
                    .active
                    .as_ref()
                    .map_or(false, |a| a.participating[i]);
                let shown = visual.fill_opacity > 0.0 || visual.label_opacity > 0.0;
                if !shown && !participating {
                    return None;
                }
                Some(RenderItem {
                    id,
                    layout: self.current[i],
                    visual,
                    clickable: !self.tree.node(id).is_leaf(),
                })
            })
            .collect()
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn visuals_for(&self, layouts: &[ArcLayout]) -> Vec<NodeVisual> {
        let focus_depth = self.tree.node(self.focus).depth;
        let layers = self.config.max_visible_layers;
        self.tree
            .ids()
            .map(|id| {
                let layout = &layouts[id.index()];
                let visible = arc_visible(layout, layers);
                let rings_out = self.tree.node(id).depth.saturating_sub(focus_depth) as f32;
                NodeVisual {
                    fill_opacity: if visible {
                        (1.0 - self.config.opacity_step * rings_out).max(0.0)
                    } else {
                        0.0
                    },
                    stroke_width: if visible { 1.0 } else { 0.0 },
                    label_opacity: if label_visible(layout, layers, self.config.label_area_threshold) {
                        1.0
                    } else {
                        0.0
                    },
                }
            })
            .collect()
    }

    fn path_labels(&self, id: NodeId) -> Vec<String> {
        self.tree
            .path(id)
            .into_iter()
            .map(|n| self.tree.label(n))
            .collect()
    }

    fn emit_breadcrumbs(&mut self) {
        if let Some(cb) = self.on_breadcrumbs.as_mut() {
            cb(&self.breadcrumbs);
        }
    }
}
