//! Store event processing and timeline command routing

use std::time::Instant;

use tokio::sync::mpsc::error::TryRecvError;

use crate::store::{StoreCommand, StoreEvent};
use crate::timeline::{FocusTarget, TimelineCommand};

use super::App;
use super::state::{ConfirmDialog, ModalState};

impl App {
    /// Drain store events. Returns true if any were processed.
    pub(crate) fn process_store_events(&mut self, now: Instant) -> bool {
        let mut processed = false;
        loop {
            let event = match self.store.event_rx.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.state.status.has_unacknowledged_error {
                        tracing::error!("Store actor disconnected");
                        self.state.set_error("Conversation store stopped");
                        processed = true;
                    }
                    break;
                }
            };
            processed = true;

            match event {
                StoreEvent::Opened { title, kind } => {
                    tracing::info!("Opened conversation {} ({:?})", title, kind);
                    self.state.title = title.clone();
                    self.timeline.renderer_mut().set_conversation(title, kind);
                }
                StoreEvent::Updated { props, messages } => {
                    self.state.status.loading = props.is_loading();
                    // Content first so the relayout measures the new messages
                    self.timeline.renderer_mut().set_messages(messages);
                    self.timeline.update(props, now);
                }
                StoreEvent::Notice(text) => self.state.set_status(text),
            }
        }
        processed
    }

    /// Route commands emitted by the timeline. Dialog requests open a
    /// confirmation here; everything else belongs to the store.
    pub(crate) fn process_timeline_commands(&mut self, now: Instant) -> bool {
        let mut changed = false;
        while let Ok(cmd) = self.commands_rx.try_recv() {
            match cmd {
                TimelineCommand::ShowBlockDialog { .. } => {
                    self.open_confirm(ConfirmDialog::Block, now);
                    changed = true;
                }
                TimelineCommand::ShowUnblockDialog { .. } => {
                    self.open_confirm(ConfirmDialog::Unblock, now);
                    changed = true;
                }
                TimelineCommand::ShowDeleteDialog { .. } => {
                    self.open_confirm(ConfirmDialog::Delete, now);
                    changed = true;
                }
                other => self.send_to_store(StoreCommand::Timeline(other)),
            }
        }
        changed
    }

    pub(crate) fn send_to_store(&self, cmd: StoreCommand) {
        if let Err(e) = self.store.cmd_tx.try_send(cmd) {
            tracing::warn!("Store command dropped: {}", e);
        }
    }

    fn open_confirm(&mut self, dialog: ConfirmDialog, now: Instant) {
        self.state.modal = ModalState::Confirm(dialog);
        self.timeline.blur(FocusTarget::Overlay, now);
    }

    pub(crate) fn handle_confirm(&mut self, confirmed: bool) {
        let Some(dialog) = self.state.modal.confirm() else {
            return;
        };
        self.state.modal = ModalState::None;
        self.timeline.set_focus(self.state.focus);

        if !confirmed {
            return;
        }
        let (cmd, status) = match dialog {
            ConfirmDialog::Block => (StoreCommand::Block, "Conversation blocked"),
            ConfirmDialog::Unblock => (StoreCommand::Unblock, "Conversation unblocked"),
            ConfirmDialog::Delete => (StoreCommand::Delete, "Conversation deleted"),
        };
        self.send_to_store(cmd);
        self.state.set_status(status);
    }
}
