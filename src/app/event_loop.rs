//! Main event loop

use anyhow::Result;
use crossterm::event;
use std::time::{Duration, Instant};

use crate::constants::{FAST_POLL_MS, IDLE_POLL_MS};
use crate::input::{InputResult, handle_input};
use crate::ui::screen_layout;

use super::App;
use super::render_thread::RenderThread;
use super::state::TimelineView;

impl App {
    pub(crate) async fn event_loop(&mut self, render_thread: &RenderThread) -> Result<()> {
        loop {
            let now = Instant::now();

            // Store events FIRST (non-blocking) - prioritize responsiveness
            if self.process_store_events(now) {
                self.dirty = true;
            }

            if self.process_timeline_commands(now) {
                self.dirty = true;
            }

            if self.timeline.tick(now) {
                self.dirty = true;
            }

            if self.state.clear_error_if_expired() {
                self.dirty = true;
            }

            // The banner takes a row, so the timeline height follows the warning
            if self.sync_viewport(now) {
                self.dirty = true;
            }

            // Keep the spinner moving
            if self.state.timeline.loading.is_some() {
                self.dirty = true;
            }

            // Render only when dirty (non-blocking - sends to render thread)
            if self.dirty {
                self.state.timeline = TimelineView::capture(&self.timeline);
                if render_thread.render(self.state.clone()) {
                    self.dirty = false;
                }
            }

            if event::poll(self.poll_timeout(now))? {
                let evt = event::read()?;
                let now = Instant::now();
                // Any input event (including resize) requires re-render
                self.dirty = true;
                match handle_input(evt, &self.state, &self.bindings) {
                    InputResult::Quit => break,
                    InputResult::Action(action) => {
                        self.state.acknowledge_error();
                        self.handle_action(action, now);
                    }
                    InputResult::Confirm(confirmed) => self.handle_confirm(confirmed),
                    InputResult::CloseReview => {
                        self.timeline.close_review();
                        self.timeline.set_focus(self.state.focus);
                    }
                    InputResult::Scroll(delta) => self.timeline.scroll_by(delta, now),
                    InputResult::Resize(width, height) => {
                        self.screen = ratatui::layout::Rect::new(0, 0, width, height);
                    }
                    // The terminal lost focus but the timeline is still the
                    // focused element inside it, so the selection survives
                    InputResult::FocusLost => self.timeline.blur(self.state.focus, now),
                    InputResult::FocusGained | InputResult::Continue => {}
                }
            }
        }

        Ok(())
    }

    /// Resize the timeline to its screen area. Returns true if it changed.
    pub(crate) fn sync_viewport(&mut self, now: Instant) -> bool {
        let layout = screen_layout(self.screen, self.timeline.active_warning().is_some());
        let width = layout.timeline.width;
        let height = usize::from(layout.timeline.height);

        let viewport = self.timeline.viewport();
        if viewport.width == width && viewport.height == height {
            return false;
        }
        tracing::debug!("Timeline viewport {}x{}", width, height);
        self.timeline.resize(width, height, now);
        true
    }

    /// Wake up for the next timer, polling faster while a load is pending
    fn poll_timeout(&self, now: Instant) -> Duration {
        let base = if self.state.status.loading {
            Duration::from_millis(FAST_POLL_MS)
        } else {
            Duration::from_millis(IDLE_POLL_MS)
        };
        match self.timeline.next_deadline() {
            Some(deadline) => deadline.saturating_duration_since(now).min(base),
            None => base,
        }
    }
}
