//! Rendered timeline geometry
//!
//! A [`TimelineLayout`] is the terminal counterpart of the mutated DOM: an
//! ordered stack of tagged blocks with known heights. Scroll snapshots are
//! applied against it and the visibility observer measures it.

use std::collections::HashSet;

use ratatui::text::Line;

use super::error::{ConsistencyError, report_consistency};
use super::props::{MessageId, TimelineProps};
use super::render::{ItemActions, ItemContext, ItemRenderer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Hero,
    UnreadMarker,
    Message { id: MessageId, index: usize },
    Typing,
    /// Zero-height at-bottom detector pinned to the content end
    BottomSentinel,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub kind: BlockKind,
    pub top: usize,
    pub height: usize,
    pub lines: Vec<Line<'static>>,
}

impl Block {
    pub fn bottom(&self) -> usize {
        self.top + self.height
    }
}

/// Visible window into the layout, measured in rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub height: usize,
    pub width: u16,
    /// Index of the first visible row
    pub offset: usize,
}

impl Viewport {
    pub fn new(width: u16, height: usize) -> Self {
        Self {
            height,
            width,
            offset: 0,
        }
    }

    pub fn max_offset(&self, content_height: usize) -> usize {
        content_height.saturating_sub(self.height)
    }

    pub fn set_offset(&mut self, offset: usize, content_height: usize) {
        self.offset = offset.min(self.max_offset(content_height));
    }

    /// Rows of content below the viewport
    pub fn distance_from_bottom(&self, content_height: usize) -> usize {
        content_height.saturating_sub(self.offset + self.height)
    }

    pub fn is_at_bottom(&self, content_height: usize, threshold: usize) -> bool {
        self.distance_from_bottom(content_height) <= threshold
    }

    pub fn scroll_to_bottom(&mut self, content_height: usize) {
        self.offset = self.max_offset(content_height);
    }

    /// Align the block's top with the viewport top, as far as the content allows
    pub fn scroll_into_view(&mut self, block: &Block, content_height: usize) {
        self.set_offset(block.top, content_height);
    }

    pub fn scroll_by(&mut self, delta: isize, content_height: usize) {
        let offset = self.offset.saturating_add_signed(delta);
        self.set_offset(offset, content_height);
    }
}

/// Inputs for a layout pass besides the props themselves
#[derive(Debug, Clone, Copy)]
pub struct LayoutOptions {
    pub width: u16,
    pub sentinel_height: usize,
    pub has_recently_scrolled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TimelineLayout {
    blocks: Vec<Block>,
    content_height: usize,
}

impl TimelineLayout {
    pub fn build(
        props: &TimelineProps,
        renderer: &dyn ItemRenderer,
        actions: &ItemActions,
        options: LayoutOptions,
    ) -> Self {
        let mut layout = Self::default();

        if props.have_oldest {
            layout.push(BlockKind::Hero, renderer.render_hero(options.width));
        }

        let unread_index = match props.oldest_unread_index {
            Some(index) if index >= props.items.len() => {
                report_consistency(&ConsistencyError::StaleUnreadIndex {
                    index,
                    len: props.items.len(),
                });
                None
            }
            other => other,
        };

        let mut seen = HashSet::with_capacity(props.items.len());
        for (index, id) in props.items.iter().enumerate() {
            if id.is_empty() {
                report_consistency(&ConsistencyError::EmptyMessageId(index));
                continue;
            }
            if !seen.insert(id) {
                report_consistency(&ConsistencyError::DuplicateMessageId {
                    id: id.clone(),
                    index,
                });
                continue;
            }

            let is_oldest_unread = unread_index == Some(index);
            if is_oldest_unread {
                layout.push(
                    BlockKind::UnreadMarker,
                    renderer.render_unread_marker(props.total_unread, options.width),
                );
            }

            let ctx = ItemContext {
                id,
                index,
                previous_id: index.checked_sub(1).and_then(|i| props.items.get(i)),
                next_id: props.items.get(index + 1),
                is_selected: props.selected_message_id.as_ref() == Some(id),
                is_oldest_unread,
                has_recently_scrolled: options.has_recently_scrolled,
                width: options.width,
                actions,
            };
            layout.push(
                BlockKind::Message {
                    id: id.clone(),
                    index,
                },
                renderer.render_item(&ctx),
            );
        }

        if props.is_someone_typing && props.have_newest {
            layout.push(BlockKind::Typing, renderer.render_typing(options.width));
        }

        // The detector overlays the last rows instead of adding height
        let sentinel_height = options.sentinel_height.min(layout.content_height);
        layout.blocks.push(Block {
            kind: BlockKind::BottomSentinel,
            top: layout.content_height - sentinel_height,
            height: sentinel_height,
            lines: Vec::new(),
        });

        layout
    }

    fn push(&mut self, kind: BlockKind, lines: Vec<Line<'static>>) {
        let height = lines.len();
        self.blocks.push(Block {
            kind,
            top: self.content_height,
            height,
            lines,
        });
        self.content_height += height;
    }

    pub fn content_height(&self) -> usize {
        self.content_height
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn message_block(&self, item_index: usize) -> Option<&Block> {
        self.blocks.iter().find(
            |b| matches!(b.kind, BlockKind::Message { index, .. } if index == item_index),
        )
    }

    pub fn unread_marker(&self) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|b| b.kind == BlockKind::UnreadMarker)
    }

    #[cfg(test)]
    pub fn message_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b.kind, BlockKind::Message { .. }))
            .count()
    }

    /// Lines inside the viewport, top to bottom
    pub fn visible_lines(&self, viewport: &Viewport) -> Vec<Line<'static>> {
        let start = viewport.offset;
        let end = start + viewport.height;
        self.blocks
            .iter()
            .filter(|b| b.bottom() > start && b.top < end)
            .flat_map(|b| {
                b.lines.iter().enumerate().filter_map(move |(i, line)| {
                    let row = b.top + i;
                    (row >= start && row < end).then(|| line.clone())
                })
            })
            .collect()
    }
}
