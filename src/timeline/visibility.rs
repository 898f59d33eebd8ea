//! Viewport visibility tracking
//!
//! Observation is behind [`VisibilityProvider`] so the derivation in
//! [`derive_visibility`] stays a pure function over intersection ratios.
//! [`LayoutObserver`] is the terminal implementation that measures the
//! rendered layout directly.

use std::collections::HashMap;

use super::layout::{Block, BlockKind, TimelineLayout, Viewport};
use super::props::MessageId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObservedTarget {
    Message(MessageId),
    /// The at-bottom detector
    BottomSentinel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub target: ObservedTarget,
    /// Fraction of the target inside the viewport, 0.0..=1.0
    pub ratio: f32,
}

/// Layout and viewport as seen after the latest update
#[derive(Debug, Clone, Copy)]
pub struct Geometry<'a> {
    pub layout: &'a TimelineLayout,
    pub viewport: &'a Viewport,
}

/// Something that can report how much of each observed target is on screen
pub trait VisibilityProvider {
    /// Start observing `targets`, in layout order
    fn observe(&mut self, targets: Vec<ObservedTarget>);

    /// Entries whose intersection changed since the previous call.
    /// The first call after `observe` reports every target.
    fn take_records(&mut self, geometry: &Geometry<'_>) -> Vec<IntersectionEntry>;

    /// Stop observing. No records are produced afterwards.
    fn disconnect(&mut self);
}

/// Builds a fresh provider each time the observer is re-initialized
pub type ProviderFactory = Box<dyn Fn() -> Box<dyn VisibilityProvider>>;

/// Targets to observe for a layout: every message block, then the sentinel
pub fn observed_targets(layout: &TimelineLayout) -> Vec<ObservedTarget> {
    layout
        .blocks()
        .iter()
        .filter_map(|block| match &block.kind {
            BlockKind::Message { id, .. } => Some(ObservedTarget::Message(id.clone())),
            BlockKind::BottomSentinel => Some(ObservedTarget::BottomSentinel),
            _ => None,
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
pub fn intersection_ratio(block: &Block, viewport: &Viewport) -> f32 {
    let view_top = viewport.offset;
    let view_bottom = view_top + viewport.height;

    if block.height == 0 {
        let inside = block.top >= view_top && block.top <= view_bottom;
        return if inside { 1.0 } else { 0.0 };
    }

    let visible = block
        .bottom()
        .min(view_bottom)
        .saturating_sub(block.top.max(view_top));
    visible as f32 / block.height as f32
}

/// Geometric observer over a [`TimelineLayout`]
#[derive(Debug, Default)]
pub struct LayoutObserver {
    targets: Vec<ObservedTarget>,
    reported: HashMap<ObservedTarget, f32>,
    connected: bool,
}

impl VisibilityProvider for LayoutObserver {
    fn observe(&mut self, targets: Vec<ObservedTarget>) {
        self.targets = targets;
        self.reported.clear();
        self.connected = true;
    }

    fn take_records(&mut self, geometry: &Geometry<'_>) -> Vec<IntersectionEntry> {
        if !self.connected {
            return Vec::new();
        }

        let by_target: HashMap<ObservedTarget, &Block> = geometry
            .layout
            .blocks()
            .iter()
            .filter_map(|block| match &block.kind {
                BlockKind::Message { id, .. } => {
                    Some((ObservedTarget::Message(id.clone()), block))
                }
                BlockKind::BottomSentinel => Some((ObservedTarget::BottomSentinel, block)),
                _ => None,
            })
            .collect();

        let mut records = Vec::new();
        for target in &self.targets {
            // Targets that left the layout read as fully hidden
            let ratio = by_target
                .get(target)
                .map_or(0.0, |block| intersection_ratio(block, geometry.viewport));

            if self.reported.get(target) != Some(&ratio) {
                self.reported.insert(target.clone(), ratio);
                records.push(IntersectionEntry {
                    target: target.clone(),
                    ratio,
                });
            }
        }
        records
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.targets.clear();
        self.reported.clear();
    }
}

/// Visibility facts derived from one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityState {
    pub is_near_bottom: bool,
    pub oldest_partially_visible: Option<MessageId>,
    pub newest_partially_visible: Option<MessageId>,
    /// Newest message whose bottom edge is known to be on screen
    pub newest_bottom_visible: Option<MessageId>,
}

/// Derive visibility from ratios listed in layout order
pub fn derive_visibility(ratios: &[(ObservedTarget, f32)]) -> VisibilityState {
    let mut is_near_bottom = false;
    let mut oldest_partial: Option<&MessageId> = None;
    let mut newest_partial: Option<&MessageId> = None;
    let mut newest_full: Option<&MessageId> = None;

    for (target, ratio) in ratios {
        match target {
            ObservedTarget::BottomSentinel => is_near_bottom = *ratio > 0.0,
            ObservedTarget::Message(id) => {
                if *ratio <= 0.0 {
                    continue;
                }
                if oldest_partial.is_none() {
                    oldest_partial = Some(id);
                }
                newest_partial = Some(id);
                if *ratio >= 1.0 {
                    newest_full = Some(id);
                }
            }
        }
    }

    // A partially visible message's bottom only counts as seen when something
    // below it is visible too, or the viewport is at the bottom.
    let newest_bottom_visible = newest_full.or_else(|| {
        (is_near_bottom || newest_partial != oldest_partial)
            .then_some(oldest_partial)
            .flatten()
    });

    VisibilityState {
        is_near_bottom,
        oldest_partially_visible: oldest_partial.cloned(),
        newest_partially_visible: newest_partial.cloned(),
        newest_bottom_visible: newest_bottom_visible.cloned(),
    }
}

/// Ratio map of one observer instance, kept in first-seen order
#[derive(Debug, Default)]
pub struct VisibilityTracker {
    ratios: Vec<(ObservedTarget, f32)>,
    positions: HashMap<ObservedTarget, usize>,
}

impl VisibilityTracker {
    /// Fold a batch into the map and derive the new state.
    /// Entries are never removed, so partial batches keep the original order.
    pub fn apply(&mut self, entries: Vec<IntersectionEntry>) -> VisibilityState {
        for entry in entries {
            match self.positions.get(&entry.target) {
                Some(&pos) => self.ratios[pos].1 = entry.ratio,
                None => {
                    self.positions.insert(entry.target.clone(), self.ratios.len());
                    self.ratios.push((entry.target, entry.ratio));
                }
            }
        }
        derive_visibility(&self.ratios)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.ratios.len()
    }
}
