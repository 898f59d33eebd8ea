//! Conversation timeline view state
//!
//! [`Timeline`] owns everything between the store's props and the pixels:
//! the rendered layout, the viewport, the visibility observer, timers and
//! warning state. The host drives it with `mount`, `update`, input events and
//! `tick`, and draws whatever `visible_lines` returns.

pub mod command;
pub mod error;
pub mod layout;
pub mod navigator;
pub mod props;
pub mod render;
pub mod scroll;
pub mod throttle;
pub mod timers;
pub mod visibility;
pub mod warning;

use std::time::Instant;

use ratatui::text::Line;

use crate::config::TimelineConfig;

pub use command::{CommandSink, TimelineCommand};
pub use layout::{LayoutOptions, TimelineLayout, Viewport};
pub use navigator::{FocusTarget, KeyOutcome, KeyPress, NavIntent, NavKey};
pub use props::{ConversationKind, MessageId, MessageLoadingState, TimelineProps};
pub use render::{ItemActions, ItemContext, ItemRenderer};
pub use visibility::{LayoutObserver, ProviderFactory, VisibilityProvider, VisibilityState};
pub use warning::{BannerAction, ContactSpoofingWarning, ReviewRequest};

use error::report_consistency;
use scroll::{ScrollContext, ScrollSnapshot, apply_snapshot, compute_snapshot, discard_target};
use throttle::TrailingThrottle;
use timers::{TimerKind, TimerSet};
use visibility::{Geometry, VisibilityTracker, observed_targets};
use warning::WarningPresenter;

/// State of the floating "jump to newest" button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollDownButton {
    pub unread_count: usize,
}

pub struct Timeline<R: ItemRenderer> {
    config: TimelineConfig,
    renderer: R,
    props: TimelineProps,
    layout: TimelineLayout,
    viewport: Viewport,
    sink: CommandSink,
    actions: ItemActions,
    provider_factory: ProviderFactory,
    observer: Option<Box<dyn VisibilityProvider>>,
    tracker: VisibilityTracker,
    visibility: VisibilityState,
    mark_read: TrailingThrottle,
    timers: TimerSet,
    presenter: WarningPresenter,
    focus: FocusTarget,
    has_recently_scrolled: bool,
    mounted: bool,
}

impl<R: ItemRenderer> Timeline<R> {
    pub fn new(
        config: TimelineConfig,
        renderer: R,
        sink: CommandSink,
        provider_factory: ProviderFactory,
        viewport: Viewport,
    ) -> Self {
        let mark_read = TrailingThrottle::new(config.mark_read_throttle());
        Self {
            config,
            renderer,
            props: TimelineProps::default(),
            layout: TimelineLayout::default(),
            viewport,
            actions: ItemActions::new(String::new(), sink.clone()),
            sink,
            provider_factory,
            observer: None,
            tracker: VisibilityTracker::default(),
            visibility: VisibilityState::default(),
            mark_read,
            timers: TimerSet::default(),
            presenter: WarningPresenter::default(),
            focus: FocusTarget::Timeline,
            has_recently_scrolled: false,
            mounted: false,
        }
    }

    /// A timeline observing its own layout geometry
    pub fn with_layout_observer(
        config: TimelineConfig,
        renderer: R,
        sink: CommandSink,
        viewport: Viewport,
    ) -> Self {
        Self::new(
            config,
            renderer,
            sink,
            Box::new(|| Box::new(LayoutObserver::default()) as Box<dyn VisibilityProvider>),
            viewport,
        )
    }

    // === Lifecycle ===

    pub fn mount(&mut self, props: TimelineProps, now: Instant) {
        tracing::debug!(
            "mounting timeline for {} with {} items",
            props.conversation_id,
            props.items.len()
        );
        self.mounted = true;
        self.actions = ItemActions::new(props.conversation_id.clone(), self.sink.clone());
        self.presenter.sync(props.warning.as_ref());

        // Data that is already loaded at mount is treated as a finished initial load
        let snapshot = if props.is_doing_initial_load() {
            None
        } else {
            let before = TimelineProps {
                loading_state: Some(MessageLoadingState::DoingInitialLoad),
                ..props.clone()
            };
            let ctx = ScrollContext::capture(&self.layout, &self.viewport, self.config.at_bottom_threshold);
            compute_snapshot(&before, &props, &ctx)
        };

        self.props = props;
        self.relayout();
        self.apply(snapshot);

        if self.props.conversation_kind == ConversationKind::Group {
            self.timers
                .arm(TimerKind::CallPeek, now, self.config.call_peek_delay());
        }

        self.rebuild_observer();
        self.observe(now);
    }

    /// Apply new props from the store: snapshot, relayout, restore scroll, observe
    pub fn update(&mut self, next: TimelineProps, now: Instant) {
        if !self.mounted {
            self.mount(next, now);
            return;
        }

        let ctx = ScrollContext::capture(&self.layout, &self.viewport, self.config.at_bottom_threshold);
        let snapshot = compute_snapshot(&self.props, &next, &ctx);
        tracing::trace!("scroll snapshot {:?} (ctx {:?})", snapshot, ctx);

        if next.conversation_id != self.props.conversation_id {
            self.actions = ItemActions::new(next.conversation_id.clone(), self.sink.clone());
        }
        self.presenter.sync(next.warning.as_ref());

        let prev = std::mem::replace(&mut self.props, next);
        self.relayout();

        let selection_changed = prev.selected_message_id != self.props.selected_message_id;
        if snapshot.is_none() && selection_changed {
            self.reveal_selected();
        }
        self.apply(snapshot);

        // Targets are keyed by id, so a replaced window of the same length
        // needs fresh targets too
        if prev.items != self.props.items {
            self.rebuild_observer();
        }
        if prev.items.len() != self.props.items.len() {
            self.maybe_discard();
        }

        self.observe(now);
    }

    /// Cancel every timer and release the observer
    pub fn unmount(&mut self) {
        tracing::debug!("unmounting timeline for {}", self.props.conversation_id);
        self.timers.clear();
        self.mark_read.cancel();
        if let Some(mut observer) = self.observer.take() {
            observer.disconnect();
        }
        self.tracker = VisibilityTracker::default();
        self.mounted = false;
    }

    /// Fire due timers. Returns true if the view changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        let mut dirty = false;

        if self.mark_read.poll(now) {
            // Read whatever is visible now, not what was visible when the burst began
            if let Some(message_id) = self.visibility.newest_bottom_visible.clone() {
                self.sink.send(TimelineCommand::MarkMessageRead {
                    conversation_id: self.props.conversation_id.clone(),
                    message_id,
                });
            }
        }

        for kind in self.timers.take_due(now) {
            match kind {
                TimerKind::ScrollActivity => {
                    self.has_recently_scrolled = false;
                    self.relayout();
                    dirty = true;
                }
                TimerKind::CallPeek => {
                    self.sink.send(TimelineCommand::PeekGroupCallForTheFirstTime {
                        conversation_id: self.props.conversation_id.clone(),
                    });
                }
                TimerKind::BlurCheck => {
                    if !self.focus.keeps_selection() && self.props.selected_message_id.is_some() {
                        self.sink.send(TimelineCommand::ClearSelectedMessage);
                    }
                }
            }
        }

        dirty
    }

    /// Earliest pending deadline, for the host's poll timeout
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.timers.next_deadline(), self.mark_read.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // === Input ===

    /// User scroll by `delta` rows (negative = towards older messages)
    pub fn scroll_by(&mut self, delta: isize, now: Instant) {
        self.viewport.scroll_by(delta, self.layout.content_height());
        self.timers
            .arm(TimerKind::ScrollActivity, now, self.config.scroll_activity());
        if !self.has_recently_scrolled {
            self.has_recently_scrolled = true;
            self.relayout();
        }
        self.observe(now);
    }

    pub fn page(&mut self, pages: isize, now: Instant) {
        let rows = self.viewport.height.saturating_sub(1).max(1);
        let rows = isize::try_from(rows).unwrap_or(isize::MAX);
        self.scroll_by(pages.saturating_mul(rows), now);
    }

    pub fn resize(&mut self, width: u16, height: usize, now: Instant) {
        if width == self.viewport.width && height == self.viewport.height {
            return;
        }
        let was_at_bottom = self.is_at_bottom();
        let width_changed = width != self.viewport.width;
        self.viewport.width = width;
        self.viewport.height = height;
        if width_changed {
            self.relayout();
        }
        if was_at_bottom {
            self.viewport.scroll_to_bottom(self.layout.content_height());
        } else {
            let offset = self.viewport.offset;
            self.viewport.set_offset(offset, self.layout.content_height());
        }
        self.observe(now);
    }

    pub fn handle_key(&mut self, press: KeyPress, now: Instant) -> KeyOutcome {
        let (outcome, intent) = navigator::navigate(
            &self.props.items,
            self.props.selected_message_id.as_ref(),
            press,
        );
        match intent {
            NavIntent::Stay => {}
            NavIntent::Select(index) => {
                if let Some(id) = self.props.items.get(index) {
                    self.actions.select_message(id);
                }
            }
            NavIntent::ScrollToBottom { select_last } => self.scroll_to_bottom(select_last, now),
        }
        outcome
    }

    /// Jump to the newest message, loading it first if it isn't in the list yet
    pub fn scroll_to_bottom(&mut self, select_last: bool, now: Instant) {
        if !self.props.have_newest {
            self.sink.send(TimelineCommand::LoadNewestMessages {
                conversation_id: self.props.conversation_id.clone(),
                newest_message_id: self.props.last_item().cloned(),
                set_focus: select_last,
            });
            return;
        }

        if select_last && let Some(last) = self.props.last_item() {
            self.actions.select_message(last);
        }
        self.viewport.scroll_to_bottom(self.layout.content_height());
        self.observe(now);
    }

    pub fn set_focus(&mut self, focus: FocusTarget) {
        self.focus = focus;
    }

    /// Focus left the timeline. The selection check runs on a later tick so
    /// a newly opened overlay can claim focus first.
    pub fn blur(&mut self, focus: FocusTarget, now: Instant) {
        self.focus = focus;
        self.timers
            .arm(TimerKind::BlurCheck, now, self.config.blur_check_delay());
    }

    pub fn handle_banner(&mut self, action: BannerAction) {
        let Some(warning) = self.presenter.active(self.props.warning.as_ref()).cloned() else {
            return;
        };
        if let Some(cmd) = self
            .presenter
            .handle(action, &self.props.conversation_id, &warning)
        {
            self.sink.send(cmd);
        }
    }

    pub fn close_review(&mut self) {
        self.sink.send(TimelineCommand::CloseContactSpoofingReview);
    }

    pub fn item_actions(&self) -> &ItemActions {
        &self.actions
    }

    // === Queries ===

    pub fn props(&self) -> &TimelineProps {
        &self.props
    }

    pub fn layout(&self) -> &TimelineLayout {
        &self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn visibility(&self) -> &VisibilityState {
        &self.visibility
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access for feeding the renderer new content. The next
    /// [`Timeline::update`] relayouts with it.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_at_bottom(&self) -> bool {
        self.viewport
            .is_at_bottom(self.layout.content_height(), self.config.at_bottom_threshold)
    }

    pub fn visible_lines(&self) -> Vec<Line<'static>> {
        self.layout.visible_lines(&self.viewport)
    }

    pub fn active_warning(&self) -> Option<&ContactSpoofingWarning> {
        self.presenter.active(self.props.warning.as_ref())
    }

    pub fn review_request(&self) -> Option<&ReviewRequest> {
        self.props.review_request.as_ref()
    }

    pub fn scroll_down_button(&self) -> Option<ScrollDownButton> {
        let visible = !self.props.have_newest || !self.is_at_bottom();
        visible.then_some(ScrollDownButton {
            unread_count: self.props.total_unread,
        })
    }

    // === Internals ===

    fn relayout(&mut self) {
        self.layout = TimelineLayout::build(
            &self.props,
            &self.renderer,
            &self.actions,
            LayoutOptions {
                width: self.viewport.width,
                sentinel_height: self.config.sentinel_height,
                has_recently_scrolled: self.has_recently_scrolled,
            },
        );
    }

    fn apply(&mut self, snapshot: Option<ScrollSnapshot>) {
        let content_height = self.layout.content_height();
        match snapshot {
            Some(snapshot) => {
                if let Err(e) = apply_snapshot(snapshot, &self.layout, &mut self.viewport) {
                    report_consistency(&e);
                }
            }
            None => {
                let offset = self.viewport.offset;
                self.viewport.set_offset(offset, content_height);
            }
        }
    }

    /// Scroll just enough to show the selected message
    fn reveal_selected(&mut self) {
        let Some(index) = self
            .props
            .selected_message_id
            .as_ref()
            .and_then(|id| self.props.index_of(id))
        else {
            return;
        };
        let Some(block) = self.layout.message_block(index) else {
            return;
        };
        let (top, bottom) = (block.top, block.bottom());
        let content_height = self.layout.content_height();
        let view_bottom = self.viewport.offset + self.viewport.height;

        if top < self.viewport.offset || block.height > self.viewport.height {
            self.viewport.set_offset(top, content_height);
        } else if bottom > view_bottom {
            self.viewport
                .set_offset(bottom - self.viewport.height, content_height);
        }
    }

    fn rebuild_observer(&mut self) {
        if let Some(mut old) = self.observer.take() {
            old.disconnect();
        }
        let mut observer = (self.provider_factory)();
        observer.observe(observed_targets(&self.layout));
        self.observer = Some(observer);
        self.tracker = VisibilityTracker::default();
    }

    fn maybe_discard(&mut self) {
        let target = discard_target(
            self.props.items.len(),
            self.viewport.height,
            self.is_at_bottom(),
            self.config.min_row_height,
            self.config.discard_factor,
        );
        if let Some(number_to_keep_at_bottom) = target {
            tracing::debug!(
                "discarding down to {} of {} items",
                number_to_keep_at_bottom,
                self.props.items.len()
            );
            self.sink.send(TimelineCommand::DiscardMessages {
                conversation_id: self.props.conversation_id.clone(),
                number_to_keep_at_bottom,
            });
        }
    }

    /// Pull an intersection batch and act on it
    fn observe(&mut self, now: Instant) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        let records = observer.take_records(&Geometry {
            layout: &self.layout,
            viewport: &self.viewport,
        });
        if records.is_empty() {
            return;
        }

        let state = self.tracker.apply(records);
        let props = &self.props;

        self.sink.send(TimelineCommand::SetIsNearBottom {
            conversation_id: props.conversation_id.clone(),
            is_near_bottom: state.is_near_bottom,
        });

        if let Some(newest) = &state.newest_bottom_visible {
            self.mark_read.trigger(now);

            if !props.is_loading() && !props.have_newest && props.last_item() == Some(newest) {
                self.sink.send(TimelineCommand::LoadNewerMessages {
                    conversation_id: props.conversation_id.clone(),
                    newest_message_id: newest.clone(),
                });
            }
        }

        if let Some(oldest) = &state.oldest_partially_visible
            && props.first_item() == Some(oldest)
            && !props.is_loading()
            && !props.have_oldest
        {
            self.sink.send(TimelineCommand::LoadOlderMessages {
                conversation_id: props.conversation_id.clone(),
                oldest_message_id: oldest.clone(),
            });
        }

        self.visibility = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::layout::tests::FixedHeightRenderer;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use visibility::{IntersectionEntry, ObservedTarget};

    fn ids(range: std::ops::Range<usize>) -> Vec<MessageId> {
        range.map(|i| MessageId::new(format!("m{i}"))).collect()
    }

    fn props(range: std::ops::Range<usize>) -> TimelineProps {
        TimelineProps {
            conversation_id: "c1".to_string(),
            items: ids(range),
            have_newest: true,
            ..Default::default()
        }
    }

    fn timeline(height: usize) -> (Timeline<FixedHeightRenderer>, mpsc::Receiver<TimelineCommand>) {
        let (tx, rx) = mpsc::channel(256);
        let timeline = Timeline::with_layout_observer(
            TimelineConfig::default(),
            FixedHeightRenderer { height: 2 },
            CommandSink::new(tx),
            Viewport::new(40, height),
        );
        (timeline, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<TimelineCommand>) -> Vec<TimelineCommand> {
        let mut out = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            out.push(cmd);
        }
        out
    }

    fn marked_read(cmds: &[TimelineCommand]) -> Vec<String> {
        cmds.iter()
            .filter_map(|cmd| match cmd {
                TimelineCommand::MarkMessageRead { message_id, .. } => {
                    Some(message_id.to_string())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_mount_scrolls_to_bottom_and_reports_near_bottom() {
        let (mut tl, mut rx) = timeline(10);
        let now = Instant::now();
        tl.mount(props(0..30), now);

        assert!(tl.is_at_bottom());
        assert_eq!(tl.viewport().offset, 50);
        assert_eq!(tl.visibility().newest_bottom_visible, Some("m29".into()));

        let cmds = drain(&mut rx);
        assert!(cmds.contains(&TimelineCommand::SetIsNearBottom {
            conversation_id: "c1".to_string(),
            is_near_bottom: true,
        }));
        // Direct conversation: no call peek, and no mark-read before the window closes
        assert!(marked_read(&cmds).is_empty());
    }

    #[test]
    fn test_mount_with_unread_scrolls_to_marker() {
        let (mut tl, _rx) = timeline(10);
        let p = TimelineProps {
            oldest_unread_index: Some(20),
            total_unread: 10,
            ..props(0..30)
        };
        tl.mount(p, Instant::now());
        let marker = tl.layout().unread_marker().unwrap().top;
        assert_eq!(tl.viewport().offset, marker);
    }

    #[test]
    fn test_read_marking_targets_latest_visible() {
        let (mut tl, mut rx) = timeline(10);
        let start = Instant::now();
        tl.mount(props(0..30), start);

        // A (m29) -> B (m24) -> C (m19) inside one window
        tl.scroll_by(-10, start + Duration::from_millis(100));
        tl.scroll_by(-10, start + Duration::from_millis(200));
        assert_eq!(tl.visibility().newest_bottom_visible, Some("m19".into()));

        tl.tick(start + Duration::from_millis(499));
        assert!(marked_read(&drain(&mut rx)).is_empty());

        tl.tick(start + Duration::from_millis(500));
        tl.tick(start + Duration::from_millis(900));
        assert_eq!(marked_read(&drain(&mut rx)), vec!["m19"]);
    }

    #[test]
    fn test_top_visible_requests_older() {
        let (mut tl, mut rx) = timeline(10);
        let now = Instant::now();
        tl.mount(props(10..20), now);
        drain(&mut rx);

        tl.scroll_by(-100, now);
        let cmds = drain(&mut rx);
        assert!(cmds.contains(&TimelineCommand::LoadOlderMessages {
            conversation_id: "c1".to_string(),
            oldest_message_id: "m10".into(),
        }));
    }

    #[test]
    fn test_no_older_request_while_loading_or_complete() {
        let (mut tl, mut rx) = timeline(10);
        let now = Instant::now();
        let loading = TimelineProps {
            loading_state: Some(MessageLoadingState::LoadingOlderMessages),
            ..props(10..20)
        };
        tl.mount(loading, now);
        tl.scroll_by(-100, now);

        let complete = TimelineProps {
            have_oldest: true,
            ..props(10..20)
        };
        tl.update(complete, now);
        tl.scroll_by(1, now);
        tl.scroll_by(-100, now);

        assert!(!drain(&mut rx)
            .iter()
            .any(|cmd| matches!(cmd, TimelineCommand::LoadOlderMessages { .. })));
    }

    #[test]
    fn test_bottom_visible_without_newest_requests_newer() {
        let (mut tl, mut rx) = timeline(10);
        let p = TimelineProps {
            have_newest: false,
            ..props(0..10)
        };
        tl.mount(p, Instant::now());
        let cmds = drain(&mut rx);
        assert!(cmds.contains(&TimelineCommand::LoadNewerMessages {
            conversation_id: "c1".to_string(),
            newest_message_id: "m9".into(),
        }));
    }

    #[test]
    fn test_replaced_window_of_same_length_is_observed() {
        let (mut tl, mut rx) = timeline(10);
        let start = Instant::now();
        let older = TimelineProps {
            have_newest: false,
            ..props(0..10)
        };
        tl.mount(older.clone(), start);
        tl.update(
            TimelineProps {
                loading_state: Some(MessageLoadingState::LoadingNewerMessages),
                ..older
            },
            start,
        );
        drain(&mut rx);

        // Jump to newest swaps in a different page of the same size
        tl.update(
            TimelineProps {
                scroll_to_index: Some(9),
                scroll_to_index_counter: 1,
                ..props(30..40)
            },
            start,
        );
        tl.scroll_by(-1, start);
        tl.scroll_by(1, start);

        let newest = tl.visibility().newest_bottom_visible.clone();
        assert!(newest.as_ref().is_some_and(|id| id.to_string().starts_with("m3")));

        tl.tick(start + Duration::from_secs(2));
        let marks = marked_read(&drain(&mut rx));
        assert!(!marks.is_empty());
        assert!(marks.iter().all(|id| id.starts_with("m3")));
    }

    #[test]
    fn test_zero_height_viewport_never_discards() {
        let (mut tl, mut rx) = timeline(0);
        let now = Instant::now();
        tl.mount(props(0..0), now);
        tl.update(props(0..3), now);

        assert!(!drain(&mut rx)
            .iter()
            .any(|cmd| matches!(cmd, TimelineCommand::DiscardMessages { .. })));
    }

    #[test]
    fn test_growth_at_bottom_requests_discard() {
        // 10 rows, min row height 2 -> capacity 5, discard beyond 7.5 items
        let (mut tl, mut rx) = timeline(10);
        let now = Instant::now();
        tl.mount(props(0..6), now);
        tl.update(props(0..7), now);
        assert!(!drain(&mut rx)
            .iter()
            .any(|cmd| matches!(cmd, TimelineCommand::DiscardMessages { .. })));

        tl.update(props(0..8), now);
        assert!(drain(&mut rx).contains(&TimelineCommand::DiscardMessages {
            conversation_id: "c1".to_string(),
            number_to_keep_at_bottom: 5,
        }));
        // Still pinned to the bottom after the append
        assert!(tl.is_at_bottom());
    }

    #[test]
    fn test_prepend_keeps_content_steady() {
        let (mut tl, _rx) = timeline(10);
        let now = Instant::now();
        tl.mount(props(10..30), now);
        tl.scroll_by(-20, now);
        let first_visible = tl.visible_lines()[0].to_string();

        let loading = TimelineProps {
            loading_state: Some(MessageLoadingState::LoadingOlderMessages),
            ..props(10..30)
        };
        tl.update(loading, now);
        tl.update(props(0..30), now);

        assert_eq!(tl.visible_lines()[0].to_string(), first_visible);
    }

    #[test]
    fn test_blur_clears_selection_unless_overlay_has_focus() {
        let (mut tl, mut rx) = timeline(10);
        let now = Instant::now();
        let p = TimelineProps {
            selected_message_id: Some("m3".into()),
            ..props(0..5)
        };
        tl.mount(p, now);
        drain(&mut rx);

        tl.blur(FocusTarget::Overlay, now);
        tl.tick(now);
        assert!(!drain(&mut rx).contains(&TimelineCommand::ClearSelectedMessage));

        tl.blur(FocusTarget::Elsewhere, now);
        // Focus returns before the deferred check runs
        tl.set_focus(FocusTarget::Timeline);
        tl.tick(now);
        assert!(!drain(&mut rx).contains(&TimelineCommand::ClearSelectedMessage));

        tl.blur(FocusTarget::Elsewhere, now);
        tl.tick(now);
        assert!(drain(&mut rx).contains(&TimelineCommand::ClearSelectedMessage));
    }

    #[test]
    fn test_group_call_peek_once_after_delay() {
        let (mut tl, mut rx) = timeline(10);
        let start = Instant::now();
        let p = TimelineProps {
            conversation_kind: ConversationKind::Group,
            ..props(0..3)
        };
        tl.mount(p, start);

        tl.tick(start + Duration::from_millis(100));
        let peek = TimelineCommand::PeekGroupCallForTheFirstTime {
            conversation_id: "c1".to_string(),
        };
        assert!(!drain(&mut rx).contains(&peek));

        tl.tick(start + Duration::from_millis(500));
        tl.tick(start + Duration::from_millis(1500));
        let peeks = drain(&mut rx).into_iter().filter(|cmd| *cmd == peek).count();
        assert_eq!(peeks, 1);
    }

    #[test]
    fn test_unmount_cancels_pending_work() {
        let (mut tl, mut rx) = timeline(10);
        let start = Instant::now();
        let p = TimelineProps {
            conversation_kind: ConversationKind::Group,
            ..props(0..30)
        };
        tl.mount(p, start);
        tl.scroll_by(-5, start);
        drain(&mut rx);

        tl.unmount();
        assert_eq!(tl.next_deadline(), None);
        assert!(!tl.tick(start + Duration::from_secs(10)));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_arrow_keys_select_through_store() {
        let (mut tl, mut rx) = timeline(10);
        let now = Instant::now();
        let p = TimelineProps {
            selected_message_id: Some("m0".into()),
            ..props(0..3)
        };
        tl.mount(p, now);
        drain(&mut rx);

        assert_eq!(
            tl.handle_key(KeyPress::plain(NavKey::Up), now),
            KeyOutcome::Handled
        );
        assert!(drain(&mut rx).is_empty());

        tl.handle_key(KeyPress::plain(NavKey::Down), now);
        assert_eq!(
            drain(&mut rx),
            vec![TimelineCommand::SelectMessage {
                conversation_id: "c1".to_string(),
                message_id: "m1".into(),
            }]
        );
    }

    #[test]
    fn test_modifier_down_without_newest_loads_newest() {
        let (mut tl, mut rx) = timeline(10);
        let now = Instant::now();
        let p = TimelineProps {
            have_newest: false,
            ..props(0..3)
        };
        tl.mount(p, now);
        drain(&mut rx);

        tl.handle_key(KeyPress::with_modifier(NavKey::Down), now);
        assert_eq!(
            drain(&mut rx),
            vec![TimelineCommand::LoadNewestMessages {
                conversation_id: "c1".to_string(),
                newest_message_id: Some("m2".into()),
                set_focus: true,
            }]
        );
    }

    #[test]
    fn test_typing_indicator_keeps_bottom_in_view() {
        let (mut tl, _rx) = timeline(10);
        let now = Instant::now();
        tl.mount(props(0..30), now);
        let typing = TimelineProps {
            is_someone_typing: true,
            ..props(0..30)
        };
        tl.update(typing, now);
        assert!(tl.is_at_bottom());
        assert_eq!(tl.visible_lines().last().unwrap().to_string(), "typing");
    }

    #[test]
    fn test_scroll_down_button() {
        let (mut tl, _rx) = timeline(10);
        let now = Instant::now();
        tl.mount(
            TimelineProps {
                total_unread: 4,
                ..props(0..30)
            },
            now,
        );
        assert_eq!(tl.scroll_down_button(), None);

        tl.scroll_by(-20, now);
        assert_eq!(
            tl.scroll_down_button(),
            Some(ScrollDownButton { unread_count: 4 })
        );

        tl.scroll_to_bottom(false, now);
        assert_eq!(tl.scroll_down_button(), None);
    }

    /// Scripted provider that records its lifecycle
    struct ScriptedProvider {
        log: Rc<RefCell<Vec<String>>>,
        batches: Vec<Vec<IntersectionEntry>>,
    }

    impl VisibilityProvider for ScriptedProvider {
        fn observe(&mut self, targets: Vec<ObservedTarget>) {
            self.log.borrow_mut().push(format!("observe {}", targets.len()));
        }

        fn take_records(&mut self, _geometry: &Geometry<'_>) -> Vec<IntersectionEntry> {
            self.batches.pop().unwrap_or_default()
        }

        fn disconnect(&mut self) {
            self.log.borrow_mut().push("disconnect".to_string());
        }
    }

    #[test]
    fn test_observer_rebuilt_when_items_change() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let factory_log = Rc::clone(&log);
        let (tx, _rx) = mpsc::channel(256);
        let mut tl = Timeline::new(
            TimelineConfig::default(),
            FixedHeightRenderer { height: 2 },
            CommandSink::new(tx),
            Box::new(move || {
                Box::new(ScriptedProvider {
                    log: Rc::clone(&factory_log),
                    batches: Vec::new(),
                }) as Box<dyn VisibilityProvider>
            }),
            Viewport::new(40, 10),
        );
        let now = Instant::now();

        tl.mount(props(0..3), now);
        tl.update(
            TimelineProps {
                total_unread: 1,
                ..props(0..3)
            },
            now,
        );
        tl.update(props(0..4), now);
        tl.update(props(10..14), now);
        tl.unmount();

        assert_eq!(
            *log.borrow(),
            vec![
                "observe 4".to_string(),
                "disconnect".to_string(),
                "observe 5".to_string(),
                "disconnect".to_string(),
                "observe 5".to_string(),
                "disconnect".to_string(),
            ]
        );
    }
}
