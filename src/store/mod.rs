//! In-memory conversation store driving the timeline
//!
//! This module is split into:
//! - `mod.rs` - Types, commands, events and the actor handle
//! - `history.rs` - Generated demo conversation
//! - `state.rs` - Paging, read state and warnings, independent of any runtime
//! - `actor.rs` - Actor loop with simulated latency and incoming messages

mod actor;
mod history;
mod state;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;

use crate::timeline::{ConversationKind, MessageId, TimelineCommand, TimelineProps};

pub use actor::spawn_store_actor;
pub use state::{ConversationStore, Effect, PendingLoad};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub author: String,
    pub body: String,
    pub sent_at: DateTime<Local>,
    pub outgoing: bool,
}

/// Commands sent TO the store actor
#[derive(Debug)]
pub enum StoreCommand {
    Timeline(TimelineCommand),
    Block,
    Unblock,
    Delete,
    AcceptRequest,
    Shutdown,
}

/// Events sent FROM the store actor
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// Sent once before the first update
    Opened {
        title: String,
        kind: ConversationKind,
    },
    /// Fresh props plus the messages currently in the loaded window
    Updated {
        props: TimelineProps,
        messages: Vec<Message>,
    },
    /// Something worth surfacing in the status bar
    Notice(String),
}

/// Handle for controlling the store actor
pub struct StoreHandle {
    pub cmd_tx: mpsc::Sender<StoreCommand>,
    pub event_rx: mpsc::Receiver<StoreEvent>,
}
