//! Action handlers for user input

use std::time::Instant;

use crate::constants::LINE_SCROLL_ROWS;
use crate::input::Action;
use crate::store::StoreCommand;
use crate::timeline::{BannerAction, FocusTarget, KeyOutcome, KeyPress, NavKey};

use super::App;
use super::state::ModalState;

impl App {
    pub(crate) fn handle_action(&mut self, action: Action, now: Instant) {
        let line = isize::try_from(LINE_SCROLL_ROWS).unwrap_or(1);
        match action {
            // Selection; an unhandled arrow falls back to scrolling
            Action::SelectPrev => {
                if self.timeline.handle_key(KeyPress::plain(NavKey::Up), now) == KeyOutcome::Ignored {
                    self.timeline.scroll_by(-line, now);
                }
            }
            Action::SelectNext => {
                if self.timeline.handle_key(KeyPress::plain(NavKey::Down), now) == KeyOutcome::Ignored {
                    self.timeline.scroll_by(line, now);
                }
            }
            Action::SelectOldest => {
                self.timeline
                    .handle_key(KeyPress::with_modifier(NavKey::Up), now);
            }
            Action::SelectNewest => {
                self.timeline
                    .handle_key(KeyPress::with_modifier(NavKey::Down), now);
            }
            Action::ClearSelection => {
                if self.timeline.props().selected_message_id.is_some() {
                    self.timeline.item_actions().clear_selected_message();
                }
            }

            // Scrolling
            Action::ScrollUp => self.timeline.scroll_by(-line, now),
            Action::ScrollDown => self.timeline.scroll_by(line, now),
            Action::PageUp => self.timeline.page(-1, now),
            Action::PageDown => self.timeline.page(1, now),
            Action::JumpToNewest => self.timeline.scroll_to_bottom(false, now),

            // Warning banner
            Action::ReviewWarning => {
                if self.timeline.active_warning().is_some() {
                    self.timeline.handle_banner(BannerAction::Review);
                    self.timeline.blur(FocusTarget::Overlay, now);
                }
            }
            Action::DismissWarning => self.timeline.handle_banner(BannerAction::Close),

            // Conversation; destructive ones come back as dialog commands
            Action::Block => self.timeline.item_actions().show_block_dialog(),
            Action::Unblock => {
                if self.timeline.props().is_blocked {
                    self.timeline.item_actions().show_unblock_dialog();
                } else {
                    self.state.set_status("Conversation is not blocked");
                }
            }
            Action::Delete => self.timeline.item_actions().show_delete_dialog(),
            Action::AcceptRequest => {
                if self.timeline.props().is_incoming_message_request {
                    self.send_to_store(StoreCommand::AcceptRequest);
                    self.state.set_status("Message request accepted");
                } else {
                    self.state.set_status("No pending message request");
                }
            }

            Action::ToggleComposer => self.toggle_composer(now),
            Action::Help => self.toggle_help(now),
            Action::Quit => {} // Handled in event loop
        }
    }

    fn toggle_composer(&mut self, now: Instant) {
        if self.state.focus == FocusTarget::Timeline {
            self.state.focus = FocusTarget::Elsewhere;
            self.timeline.blur(FocusTarget::Elsewhere, now);
        } else {
            self.state.focus = FocusTarget::Timeline;
            self.timeline.set_focus(FocusTarget::Timeline);
        }
    }

    fn toggle_help(&mut self, now: Instant) {
        if self.state.modal.is_help() {
            self.state.modal = ModalState::None;
            self.timeline.set_focus(self.state.focus);
        } else {
            self.state.modal = ModalState::Help {
                keybindings: self.bindings.all_bindings(),
            };
            self.timeline.blur(FocusTarget::Overlay, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::{Config, DemoConfig};
    use crate::timeline::TimelineCommand;

    async fn loaded_app() -> App {
        let config = Config {
            demo: DemoConfig {
                page_size: 6,
                history_len: 20,
                load_latency_ms: 0,
                incoming_interval_secs: 0,
                unread: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut app = App::new(config).unwrap();
        for _ in 0..200 {
            app.process_store_events(Instant::now());
            if !app.timeline.props().items.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        // Drop whatever the mount emitted
        while app.commands_rx.try_recv().is_ok() {}
        app
    }

    #[tokio::test]
    async fn test_select_oldest_selects_first_message() {
        let mut app = loaded_app().await;
        let first = app.timeline.props().first_item().cloned();

        app.handle_action(Action::SelectOldest, Instant::now());

        let cmd = app.commands_rx.try_recv().unwrap();
        match cmd {
            TimelineCommand::SelectMessage { message_id, .. } => {
                assert_eq!(Some(message_id), first);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_composer_focus_clears_selection_on_tick() {
        let mut app = loaded_app().await;
        app.handle_action(Action::SelectOldest, Instant::now());
        app.process_timeline_commands(Instant::now());
        for _ in 0..200 {
            app.process_store_events(Instant::now());
            if app.timeline.props().selected_message_id.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(app.timeline.props().selected_message_id.is_some());

        let now = Instant::now();
        app.handle_action(Action::ToggleComposer, now);
        assert_eq!(app.state.focus, FocusTarget::Elsewhere);
        app.timeline.tick(now);

        let mut cleared = false;
        while let Ok(cmd) = app.commands_rx.try_recv() {
            cleared |= matches!(cmd, TimelineCommand::ClearSelectedMessage);
        }
        assert!(cleared);
    }

    #[tokio::test]
    async fn test_help_overlay_toggles() {
        let mut app = loaded_app().await;
        let now = Instant::now();

        app.handle_action(Action::Help, now);
        assert!(app.state.modal.is_help());
        app.timeline.tick(now);
        while let Ok(cmd) = app.commands_rx.try_recv() {
            assert!(!matches!(cmd, TimelineCommand::ClearSelectedMessage));
        }

        app.handle_action(Action::Help, now);
        assert!(!app.state.modal.is_open());
    }
}
