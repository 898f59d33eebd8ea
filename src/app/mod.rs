//! Application core - owns the timeline and coordinates it with the store

mod actions;
mod event_loop;
mod handlers;
pub mod render_thread;
pub mod state;

use anyhow::Result;
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use render_thread::RenderThread;

use crate::config::Config;
use crate::constants::TIMELINE_COMMAND_CAPACITY;
use crate::input::KeyBindings;
use crate::store::{StoreCommand, StoreHandle, spawn_store_actor};
use crate::timeline::{CommandSink, Timeline, TimelineCommand, Viewport};
use crate::ui::{ConversationRenderer, screen_layout};
use state::{AppState, StatusState};

pub struct App {
    pub(crate) state: AppState,
    pub(crate) bindings: KeyBindings,
    pub(crate) timeline: Timeline<ConversationRenderer>,
    pub(crate) store: StoreHandle,
    /// Commands emitted by the timeline, routed by the host
    pub(crate) commands_rx: mpsc::Receiver<TimelineCommand>,
    /// Last known terminal size
    pub(crate) screen: Rect,
    /// Dirty flag: when true, UI needs re-render. Skips renders when nothing changed.
    pub(crate) dirty: bool,
}

impl App {
    /// Must be called inside a tokio runtime; spawns the store actor.
    pub fn new(config: Config) -> Result<Self> {
        let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
        let screen = Rect::new(0, 0, width, height);
        let area = screen_layout(screen, false).timeline;

        let (cmd_tx, commands_rx) = mpsc::channel(TIMELINE_COMMAND_CAPACITY);
        let renderer = ConversationRenderer::new(config.ui.date_format.clone());
        let timeline = Timeline::with_layout_observer(
            config.timeline.clone(),
            renderer,
            CommandSink::new(cmd_tx),
            Viewport::new(area.width, usize::from(area.height)),
        );

        let store = spawn_store_actor(config.demo.clone());
        let bindings = KeyBindings::new(&config.ui.keybinding_mode);

        let state = AppState {
            status: StatusState {
                loading: true,
                ..Default::default()
            },
            keybinding_mode: config.ui.keybinding_mode,
            ..Default::default()
        };

        Ok(Self {
            state,
            bindings,
            timeline,
            store,
            commands_rx,
            screen,
            dirty: true, // Start dirty for initial render
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Spawn background render thread (owns terminal setup/teardown)
        let render_thread = RenderThread::spawn()?;

        self.state.set_status("Opening conversation...");

        let result = self.event_loop(&render_thread).await;

        self.timeline.unmount();
        render_thread.shutdown();

        if self.store.cmd_tx.send(StoreCommand::Shutdown).await.is_err() {
            tracing::debug!("Store actor already stopped");
        }

        result
    }
}
