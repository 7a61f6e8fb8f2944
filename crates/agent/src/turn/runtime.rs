//! Event loop for the turn coordinator
//!
//! Single task: engine callbacks, user controls and timers all arrive on one
//! channel and are applied to the coordinator in order. A watchdog reports
//! the synthesizer's real speaking flag on a fixed interval.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use jinny_config::TurnConfig;

use super::coordinator::{Coordinator, TurnTimings};
use super::engines::{StatusView, Synthesizer, ViewUpdate};
use super::runner::{EffectRunner, Engines};
use super::state::TurnEvent;
use super::TurnError;
use crate::preferences::{PreferenceStore, Preferences};

/// Cheap handle for feeding events into a running coordinator
#[derive(Clone)]
pub struct TurnHandle {
    events: mpsc::UnboundedSender<TurnEvent>,
    preferences: Arc<RwLock<Preferences>>,
    store: Option<Arc<dyn PreferenceStore>>,
}

impl TurnHandle {
    pub fn send(&self, event: TurnEvent) -> Result<(), TurnError> {
        self.events.send(event).map_err(|_| TurnError::Closed)
    }

    /// Replace the preferences used for subsequent effects and persist them
    pub fn set_preferences(&self, preferences: Preferences) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&preferences) {
                tracing::warn!(error = %e, "Failed to persist preferences");
            }
        }
        *self.preferences.write() = preferences;
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences.read().clone()
    }
}

/// Owns the coordinator and its event loop
pub struct TurnRuntime {
    coordinator: Coordinator,
    runner: EffectRunner,
    synthesizer: Arc<dyn Synthesizer>,
    view: Arc<dyn StatusView>,
    events: mpsc::UnboundedReceiver<TurnEvent>,
    watchdog_interval: Duration,
}

impl TurnRuntime {
    /// Build a runtime; fails once, up front, when recognition is unavailable
    pub fn new(
        engines: Engines,
        timings: TurnTimings,
        preferences: Preferences,
    ) -> Result<(Self, TurnHandle), TurnError> {
        Self::build(engines, timings, preferences, None)
    }

    /// Build from configured timings, restoring saved preferences from `store`
    ///
    /// Without saved preferences (or when they cannot be read) the configured
    /// recognition language is used. Later `set_preferences` calls are saved back.
    pub fn from_config(
        engines: Engines,
        config: &TurnConfig,
        store: Arc<dyn PreferenceStore>,
    ) -> Result<(Self, TurnHandle), TurnError> {
        let preferences = match store.load() {
            Ok(Some(preferences)) => preferences,
            Ok(None) => Preferences::for_language(config.language.as_str()),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable preferences");
                Preferences::for_language(config.language.as_str())
            },
        };
        Self::build(engines, TurnTimings::from(config), preferences, Some(store))
    }

    fn build(
        engines: Engines,
        timings: TurnTimings,
        preferences: Preferences,
        store: Option<Arc<dyn PreferenceStore>>,
    ) -> Result<(Self, TurnHandle), TurnError> {
        if !engines.recognizer.is_supported() {
            return Err(TurnError::RecognizerUnsupported);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let preferences = Arc::new(RwLock::new(preferences));

        let runtime = Self {
            coordinator: Coordinator::new(timings),
            synthesizer: Arc::clone(&engines.synthesizer),
            view: Arc::clone(&engines.view),
            runner: EffectRunner::new(engines, tx.clone(), Arc::clone(&preferences)),
            events: rx,
            watchdog_interval: timings.watchdog_interval,
        };
        let handle = TurnHandle {
            events: tx,
            preferences,
            store,
        };

        Ok((runtime, handle))
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Apply one event and run its effects
    pub async fn dispatch(&mut self, event: TurnEvent) {
        let before = self.coordinator.display_state();
        let name = event.name();
        let effects = self.coordinator.handle(event);

        if !effects.is_empty() {
            tracing::trace!(event = name, effects = effects.len(), "Turn event");
        }
        for effect in effects {
            self.runner.run(effect).await;
        }

        let after = self.coordinator.display_state();
        if before != after {
            tracing::debug!(from = %before, to = %after, event = name, "Turn state changed");
            self.view.render(ViewUpdate::State(after));
        }
    }

    /// Run until shutdown; the page is treated as unloaded on exit
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Coordinator {
        let mut watchdog = tokio::time::interval(self.watchdog_interval);
        watchdog.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.dispatch(event).await,
                    None => break,
                },
                _ = watchdog.tick() => {
                    let engine_speaking = self.synthesizer.is_speaking();
                    self.dispatch(TurnEvent::WatchdogTick { engine_speaking }).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Turn runtime shutting down");
                        self.dispatch(TurnEvent::Unload).await;
                        break;
                    }
                }
            }
        }

        self.coordinator
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<Coordinator> {
        tokio::spawn(self.run(shutdown))
    }
}
