//! Store actor: owns the conversation, answers timeline commands, simulates traffic.

use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::DemoConfig;
use crate::constants::TYPING_LEAD_SECS;

use super::state::{ConversationStore, Effect, PendingLoad};
use super::{StoreCommand, StoreEvent, StoreHandle};

/// Spawn the store actor and return a handle to control it.
/// The initial load starts immediately.
pub fn spawn_store_actor(config: DemoConfig) -> StoreHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(128);
    let (event_tx, event_rx) = mpsc::channel(64);

    tokio::spawn(store_actor(config, cmd_rx, event_tx));

    StoreHandle { cmd_tx, event_rx }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn publish(store: &ConversationStore, event_tx: &mpsc::Sender<StoreEvent>) -> bool {
    let event = StoreEvent::Updated {
        props: store.props(),
        messages: store.loaded_messages().to_vec(),
    };
    if event_tx.send(event).await.is_err() {
        tracing::warn!("Store actor: event receiver dropped");
        return false;
    }
    true
}

async fn store_actor(
    config: DemoConfig,
    mut cmd_rx: mpsc::Receiver<StoreCommand>,
    event_tx: mpsc::Sender<StoreEvent>,
) {
    let latency = Duration::from_millis(config.load_latency_ms);
    let incoming_every =
        (config.incoming_interval_secs > 0).then(|| Duration::from_secs(config.incoming_interval_secs));
    let typing_lead = incoming_every
        .map(|every| Duration::from_secs(TYPING_LEAD_SECS).min(every))
        .unwrap_or_default();

    let mut store = ConversationStore::new(&config, Local::now());
    let mut pending = Some((PendingLoad::Initial, Instant::now() + latency));
    let mut typing_at = incoming_every.map(|every| Instant::now() + every - typing_lead);
    let mut arrival_at: Option<Instant> = None;

    tracing::info!(
        "Store actor started: {} {} ({:?})",
        store.id(),
        store.title(),
        store.kind()
    );

    let opened = StoreEvent::Opened {
        title: store.title().to_string(),
        kind: store.kind(),
    };
    if event_tx.send(opened).await.is_err() || !publish(&store, &event_tx).await {
        return;
    }

    loop {
        let load_at = pending.map(|(_, at)| at);

        let changed = tokio::select! {
            cmd = cmd_rx.recv() => {
                let effect = match cmd {
                    None | Some(StoreCommand::Shutdown) => break,
                    Some(StoreCommand::Timeline(cmd)) => store.apply(cmd),
                    Some(StoreCommand::Block) => store.block(),
                    Some(StoreCommand::Unblock) => store.unblock(),
                    Some(StoreCommand::Delete) => store.delete(),
                    Some(StoreCommand::AcceptRequest) => store.accept_request(),
                };
                match effect {
                    Effect::None => false,
                    Effect::Changed => true,
                    Effect::Load(load) => {
                        tracing::debug!("Store: {:?} accepted", load);
                        pending = Some((load, Instant::now() + latency));
                        true
                    }
                    Effect::Notice(text) => {
                        if event_tx.send(StoreEvent::Notice(text)).await.is_err() {
                            tracing::warn!("Store actor: event receiver dropped");
                            break;
                        }
                        false
                    }
                }
            }

            () = sleep_until(load_at) => {
                if let Some((load, _)) = pending.take() {
                    store.finish(load);
                    tracing::debug!("Store: {:?} finished, {} loaded", load, store.loaded_messages().len());
                }
                true
            }

            () = sleep_until(typing_at) => {
                typing_at = None;
                arrival_at = Some(Instant::now() + typing_lead);
                store.set_typing(true)
            }

            () = sleep_until(arrival_at) => {
                arrival_at = None;
                let id = store.receive(Local::now());
                tracing::debug!("Store: incoming {} (near bottom: {})", id, store.is_near_bottom());
                typing_at = incoming_every.map(|every| Instant::now() + every - typing_lead);
                true
            }
        };

        if changed && !publish(&store, &event_tx).await {
            break;
        }
    }

    tracing::info!("Store actor stopped");
}
