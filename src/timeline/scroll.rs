//! Scroll anchoring across props updates
//!
//! Before the layout is rebuilt, [`compute_snapshot`] decides how the view
//! should be repositioned; right after the rebuild, [`apply_snapshot`] carries
//! it out. A snapshot is used exactly once.

use super::error::ConsistencyError;
use super::layout::{TimelineLayout, Viewport};
use super::props::{MessageLoadingState, TimelineProps, loading_state_that_just_finished};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollSnapshot {
    ScrollToUnreadMarker,
    ScrollToIndex(usize),
    /// Keep the offset measured from the content top
    PreserveTop { scroll_top: usize },
    /// Keep the offset measured from the content end (`content_height - offset`)
    PreserveBottom { scroll_bottom: usize },
}

impl ScrollSnapshot {
    pub const TOP: Self = Self::PreserveTop { scroll_top: 0 };
    pub const BOTTOM: Self = Self::PreserveBottom { scroll_bottom: 0 };
}

/// Geometry captured before the layout changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollContext {
    pub scroll_top: usize,
    pub content_height: usize,
    pub is_at_bottom: bool,
}

impl ScrollContext {
    pub fn capture(layout: &TimelineLayout, viewport: &Viewport, at_bottom_threshold: usize) -> Self {
        let content_height = layout.content_height();
        Self {
            scroll_top: viewport.offset,
            content_height,
            is_at_bottom: viewport.is_at_bottom(content_height, at_bottom_threshold),
        }
    }

    fn preserve_top(&self) -> ScrollSnapshot {
        ScrollSnapshot::PreserveTop {
            scroll_top: self.scroll_top,
        }
    }

    fn preserve_bottom(&self) -> ScrollSnapshot {
        ScrollSnapshot::PreserveBottom {
            scroll_bottom: self.content_height.saturating_sub(self.scroll_top),
        }
    }
}

/// Decide how to reposition the view for the `prev` -> `next` transition
pub fn compute_snapshot(
    prev: &TimelineProps,
    next: &TimelineProps,
    ctx: &ScrollContext,
) -> Option<ScrollSnapshot> {
    if next.is_doing_initial_load() {
        return None;
    }

    let just_finished = loading_state_that_just_finished(prev, next);
    let finished_initial_load = just_finished == Some(MessageLoadingState::DoingInitialLoad);

    if let Some(index) = next.scroll_to_index
        && (next.scroll_to_index_counter != prev.scroll_to_index_counter || finished_initial_load)
    {
        return Some(ScrollSnapshot::ScrollToIndex(index));
    }

    if finished_initial_load {
        if next.is_incoming_message_request {
            return Some(ScrollSnapshot::TOP);
        }
        if next.valid_oldest_unread_index().is_some() {
            return Some(ScrollSnapshot::ScrollToUnreadMarker);
        }
        return Some(ScrollSnapshot::BOTTOM);
    }

    if next.is_someone_typing != prev.is_someone_typing && ctx.is_at_bottom {
        return Some(ScrollSnapshot::BOTTOM);
    }

    if next.items.len() == prev.items.len() {
        return None;
    }

    let just_loaded_a_page = matches!(
        just_finished,
        Some(MessageLoadingState::LoadingOlderMessages | MessageLoadingState::LoadingNewerMessages)
    );

    if ctx.is_at_bottom {
        return Some(if just_loaded_a_page {
            ctx.preserve_top()
        } else {
            ctx.preserve_bottom()
        });
    }

    Some(if next.last_item() != prev.last_item() {
        ctx.preserve_top()
    } else {
        ctx.preserve_bottom()
    })
}

/// Reposition `viewport` over the freshly built `layout`.
///
/// A missing unread marker still scrolls to the bottom before the error is
/// returned for reporting.
pub fn apply_snapshot(
    snapshot: ScrollSnapshot,
    layout: &TimelineLayout,
    viewport: &mut Viewport,
) -> Result<(), ConsistencyError> {
    let content_height = layout.content_height();
    match snapshot {
        ScrollSnapshot::ScrollToUnreadMarker => match layout.unread_marker() {
            Some(marker) => viewport.scroll_into_view(marker, content_height),
            None => {
                viewport.scroll_to_bottom(content_height);
                return Err(ConsistencyError::MissingUnreadMarker);
            }
        },
        ScrollSnapshot::ScrollToIndex(index) => match layout.message_block(index) {
            Some(block) => viewport.scroll_into_view(block, content_height),
            None => return Err(ConsistencyError::MissingIndex(index)),
        },
        ScrollSnapshot::PreserveTop { scroll_top } => {
            viewport.set_offset(scroll_top, content_height);
        }
        ScrollSnapshot::PreserveBottom { scroll_bottom } => {
            viewport.set_offset(content_height.saturating_sub(scroll_bottom), content_height);
        }
    }
    Ok(())
}

/// Number of minimum-height rows that fit the viewport
pub fn max_rows(viewport_height: usize, min_row_height: usize) -> usize {
    viewport_height.div_ceil(min_row_height.max(1))
}

/// How many items to keep when the list has grown past the discard threshold
pub fn discard_target(
    item_count: usize,
    viewport_height: usize,
    is_at_bottom: bool,
    min_row_height: usize,
    discard_factor: f64,
) -> Option<usize> {
    if !is_at_bottom {
        return None;
    }
    let max_rows = max_rows(viewport_height, min_row_height);
    // Nothing is on screen to size the window by
    if max_rows == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let threshold = max_rows as f64 * discard_factor;
    #[allow(clippy::cast_precision_loss)]
    let over = item_count as f64 > threshold;
    over.then_some(max_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::layout::LayoutOptions;
    use crate::timeline::layout::tests::{FixedHeightRenderer, test_actions};
    use crate::timeline::props::MessageId;

    fn ids(range: std::ops::Range<usize>) -> Vec<MessageId> {
        range.map(|i| MessageId::new(format!("m{i}"))).collect()
    }

    fn props(range: std::ops::Range<usize>) -> TimelineProps {
        TimelineProps {
            items: ids(range),
            have_newest: true,
            ..Default::default()
        }
    }

    fn at_bottom() -> ScrollContext {
        ScrollContext {
            scroll_top: 80,
            content_height: 100,
            is_at_bottom: true,
        }
    }

    fn scrolled_up() -> ScrollContext {
        ScrollContext {
            scroll_top: 30,
            content_height: 100,
            is_at_bottom: false,
        }
    }

    #[test]
    fn test_initial_load_in_progress_changes_nothing() {
        let prev = TimelineProps::default();
        let next = TimelineProps {
            loading_state: Some(MessageLoadingState::DoingInitialLoad),
            scroll_to_index: Some(3),
            scroll_to_index_counter: 1,
            ..Default::default()
        };
        assert_eq!(compute_snapshot(&prev, &next, &at_bottom()), None);
    }

    #[test]
    fn test_initial_load_targets() {
        let prev = TimelineProps {
            loading_state: Some(MessageLoadingState::DoingInitialLoad),
            ..Default::default()
        };

        let plain = props(0..10);
        assert_eq!(
            compute_snapshot(&prev, &plain, &at_bottom()),
            Some(ScrollSnapshot::BOTTOM)
        );

        let unread = TimelineProps {
            oldest_unread_index: Some(4),
            ..props(0..10)
        };
        assert_eq!(
            compute_snapshot(&prev, &unread, &at_bottom()),
            Some(ScrollSnapshot::ScrollToUnreadMarker)
        );

        let request = TimelineProps {
            is_incoming_message_request: true,
            oldest_unread_index: Some(4),
            ..props(0..10)
        };
        assert_eq!(
            compute_snapshot(&prev, &request, &at_bottom()),
            Some(ScrollSnapshot::TOP)
        );

        // An explicit index wins even without a counter change
        let explicit = TimelineProps {
            scroll_to_index: Some(2),
            oldest_unread_index: Some(4),
            ..props(0..10)
        };
        assert_eq!(
            compute_snapshot(&prev, &explicit, &at_bottom()),
            Some(ScrollSnapshot::ScrollToIndex(2))
        );
    }

    #[test]
    fn test_repeated_scroll_request_same_index() {
        let prev = TimelineProps {
            scroll_to_index: Some(5),
            scroll_to_index_counter: 1,
            ..props(0..10)
        };
        let same = prev.clone();
        assert_eq!(compute_snapshot(&prev, &same, &scrolled_up()), None);

        let again = TimelineProps {
            scroll_to_index_counter: 2,
            ..prev.clone()
        };
        assert_eq!(
            compute_snapshot(&prev, &again, &scrolled_up()),
            Some(ScrollSnapshot::ScrollToIndex(5))
        );
    }

    #[test]
    fn test_typing_indicator_reanchors_only_at_bottom() {
        let prev = props(0..10);
        let next = TimelineProps {
            is_someone_typing: true,
            ..props(0..10)
        };
        assert_eq!(
            compute_snapshot(&prev, &next, &at_bottom()),
            Some(ScrollSnapshot::BOTTOM)
        );
        assert_eq!(compute_snapshot(&prev, &next, &scrolled_up()), None);
    }

    #[test]
    fn test_append_at_bottom_preserves_bottom() {
        let prev = props(0..10);
        let next = props(0..11);
        assert_eq!(
            compute_snapshot(&prev, &next, &at_bottom()),
            Some(ScrollSnapshot::PreserveBottom { scroll_bottom: 20 })
        );
    }

    #[test]
    fn test_append_at_bottom_after_page_load_preserves_top() {
        let prev = TimelineProps {
            loading_state: Some(MessageLoadingState::LoadingNewerMessages),
            ..props(0..10)
        };
        let next = props(0..20);
        assert_eq!(
            compute_snapshot(&prev, &next, &at_bottom()),
            Some(ScrollSnapshot::PreserveTop { scroll_top: 80 })
        );
    }

    #[test]
    fn test_scrolled_up_anchor_follows_changed_edge() {
        // Newer content appended below: keep the top steady
        let prev = props(10..20);
        let appended = props(10..25);
        assert_eq!(
            compute_snapshot(&prev, &appended, &scrolled_up()),
            Some(ScrollSnapshot::PreserveTop { scroll_top: 30 })
        );

        // Older content prepended above: keep the distance from the end
        let prepended = props(0..20);
        assert_eq!(
            compute_snapshot(&prev, &prepended, &scrolled_up()),
            Some(ScrollSnapshot::PreserveBottom { scroll_bottom: 70 })
        );
    }

    #[test]
    fn test_unchanged_count_changes_nothing() {
        let prev = props(0..10);
        let next = TimelineProps {
            total_unread: 3,
            ..props(0..10)
        };
        assert_eq!(compute_snapshot(&prev, &next, &scrolled_up()), None);
    }

    fn layout(p: &TimelineProps) -> TimelineLayout {
        TimelineLayout::build(
            p,
            &FixedHeightRenderer { height: 2 },
            &test_actions(),
            LayoutOptions {
                width: 40,
                sentinel_height: 0,
                has_recently_scrolled: false,
            },
        )
    }

    #[test]
    fn test_apply_preserve_bottom_compensates_prepend() {
        let before = layout(&props(10..20));
        let mut viewport = Viewport::new(40, 6);
        viewport.set_offset(8, before.content_height());
        let ctx = ScrollContext::capture(&before, &viewport, 1);

        let next = props(0..20);
        let snapshot = compute_snapshot(&props(10..20), &next, &ctx).unwrap();
        let after = layout(&next);
        apply_snapshot(snapshot, &after, &mut viewport).unwrap();

        // Ten prepended messages of two rows each push the same content down by 20
        assert_eq!(viewport.offset, 28);
    }

    #[test]
    fn test_apply_missing_marker_falls_back_to_bottom() {
        let l = layout(&props(0..10));
        let mut viewport = Viewport::new(40, 5);
        let result = apply_snapshot(ScrollSnapshot::ScrollToUnreadMarker, &l, &mut viewport);
        assert_eq!(result, Err(ConsistencyError::MissingUnreadMarker));
        assert_eq!(viewport.offset, l.content_height() - 5);
    }

    #[test]
    fn test_apply_scroll_to_index() {
        let l = layout(&props(0..10));
        let mut viewport = Viewport::new(40, 5);
        apply_snapshot(ScrollSnapshot::ScrollToIndex(3), &l, &mut viewport).unwrap();
        assert_eq!(viewport.offset, 6);

        assert_eq!(
            apply_snapshot(ScrollSnapshot::ScrollToIndex(99), &l, &mut viewport),
            Err(ConsistencyError::MissingIndex(99))
        );
        assert_eq!(viewport.offset, 6);
    }

    #[test]
    fn test_discard_threshold() {
        // 10 rows / min height 2 -> 5 rows of capacity, threshold 7.5
        assert_eq!(max_rows(10, 2), 5);
        assert_eq!(max_rows(11, 2), 6);
        assert_eq!(discard_target(7, 10, true, 2, 1.5), None);
        assert_eq!(discard_target(8, 10, true, 2, 1.5), Some(5));
        assert_eq!(discard_target(80, 10, false, 2, 1.5), None);
        assert_eq!(discard_target(3, 0, true, 2, 1.5), None);
    }
}
