use std::{future, time::Duration};

use anyhow::Result;
use tokio::{sync::mpsc, time::Instant};
use tracing::{debug, error};

use crate::{session_api::SessionSignals, utils::clock::Clock};

use super::{
    display::TallyDisplay,
    storage::{tally::DailyTally, tally_store::TallyStore},
};

/// The heart of the daemon. Receives visibility and focus transitions from
/// [SignalModule](super::signals::SignalModule) and, while the session is
/// active, burns one second per tick into the persisted tally.
///
/// Storage failures are logged and swallowed. A tick that fails to load reads
/// the day as fresh, a tick that fails to save still renders the value it
/// attempted to write, and the next tick retries naturally.
pub struct TrackerModule<S, D> {
    receiver: mpsc::Receiver<SessionSignals>,
    store: S,
    display: D,
    time_provider: Box<dyn Clock>,
    tick_interval: Duration,
    signals: SessionSignals,
}

enum LoopEvent {
    Signals(Option<SessionSignals>),
    Tick,
}

impl<S: TallyStore, D: TallyDisplay> TrackerModule<S, D> {
    pub fn new(
        receiver: mpsc::Receiver<SessionSignals>,
        store: S,
        display: D,
        time_provider: Box<dyn Clock>,
        tick_interval: Duration,
        initial_signals: SessionSignals,
    ) -> Self {
        Self {
            receiver,
            store,
            display,
            time_provider,
            tick_interval,
            signals: initial_signals,
        }
    }

    /// Executes the tracker event loop.
    pub async fn run(mut self) -> Result<()> {
        self.initialize().await;

        let mut next_tick = self.reschedule(None);
        loop {
            let event = {
                let time_provider = &self.time_provider;
                let tick_sleep = async move {
                    match next_tick {
                        Some(deadline) => time_provider.sleep_until(deadline).await,
                        None => future::pending::<()>().await,
                    }
                };

                tokio::select! {
                    message = self.receiver.recv() => LoopEvent::Signals(message),
                    _ = tick_sleep => LoopEvent::Tick,
                }
            };

            match event {
                // A closed channel means the signal module shut down, and so do we.
                LoopEvent::Signals(None) => return Ok(()),
                LoopEvent::Signals(Some(signals)) => {
                    debug!("Received session transition {:?}", signals);
                    self.signals = signals;
                    next_tick = self.reschedule(next_tick);
                }
                LoopEvent::Tick => {
                    self.tick().await;
                    next_tick = next_tick.map(|deadline| deadline + self.tick_interval);
                }
            }
        }
    }

    /// Applies the activity predicate to the tick schedule. Idempotent:
    /// reaffirming an already running schedule keeps its deadline, stopping a
    /// stopped one stays stopped.
    fn reschedule(&self, current: Option<Instant>) -> Option<Instant> {
        match (current, self.signals.active()) {
            (None, true) => Some(self.time_provider.instant() + self.tick_interval),
            (deadline @ Some(_), true) => deadline,
            (_, false) => None,
        }
    }

    /// Shows the stored total for today, resetting it first if it belongs to
    /// a previous date. Runs once before the loop so the counter is visible
    /// even while inactive.
    async fn initialize(&mut self) {
        let today = self.time_provider.now().date_naive();
        let stored = self.load_or_default(today).await;

        let shown = if stored.date == today {
            stored
        } else {
            let fresh = DailyTally::fresh(today);
            if let Err(e) = self.store.save(&fresh).await {
                error!("Failed to persist day reset {:?}: {e:?}", fresh);
            }
            fresh
        };

        self.render(shown.seconds);
    }

    async fn tick(&mut self) {
        let today = self.time_provider.now().date_naive();
        let next = self.load_or_default(today).await.advanced(today);

        if let Err(e) = self.store.save(&next).await {
            error!("Failed to persist tally {:?}: {e:?}", next);
        }

        // Rendered even when the save failed, from the value we attempted to
        // write.
        self.render(next.seconds);
    }

    async fn load_or_default(&mut self, today: chrono::NaiveDate) -> DailyTally {
        match self.store.load().await {
            Ok(Some(v)) => v,
            Ok(None) => DailyTally::fresh(today),
            Err(e) => {
                error!("Failed to read tally, treating the day as fresh: {e:?}");
                DailyTally::fresh(today)
            }
        }
    }

    fn render(&mut self, seconds: u64) {
        if let Err(e) = self.display.render(seconds) {
            error!("Failed to render tally: {e:?}");
        }
    }
}
