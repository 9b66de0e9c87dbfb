use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

use crate::{
    session_api::{SessionMonitor, SessionSignals},
    utils::clock::Clock,
};

use self::focus::FocusEvaluator;

pub mod focus;

/// Polls the platform session state and forwards it to the tracker. Only
/// changed snapshots are sent, so downstream sees the poll loop as a stream
/// of visibility and focus transitions.
pub struct SignalModule {
    next: mpsc::Sender<SessionSignals>,
    producer: Box<dyn SessionMonitor>,
    shutdown: CancellationToken,
    focus_evaluator: FocusEvaluator,
    poll_frequency: Duration,
    time_provider: Box<dyn Clock>,
    last_sent: Option<SessionSignals>,
}

impl SignalModule {
    pub fn new(
        next: mpsc::Sender<SessionSignals>,
        producer: Box<dyn SessionMonitor>,
        shutdown: CancellationToken,
        focus_evaluator: FocusEvaluator,
        poll_frequency: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            next,
            producer,
            poll_frequency,
            focus_evaluator,
            time_provider,
            shutdown,
            last_sent: None,
        }
    }

    fn probe(&mut self) -> Result<SessionSignals> {
        let screen_visible = self.producer.screen_visible()?;
        let idle_ms = self.producer.get_idle_time()?;

        Ok(SessionSignals {
            screen_visible,
            session_focused: self.focus_evaluator.is_focused(idle_ms),
        })
    }

    /// Executes the polling event loop.
    pub async fn run(mut self) -> Result<()> {
        let mut poll_point = self.time_provider.instant();
        loop {
            poll_point += self.poll_frequency;

            match self.probe() {
                Ok(signals) if self.last_sent != Some(signals) => {
                    let span = info_span!("Forwarding session transition");
                    debug!("Sending signals {:?}", signals);
                    self.next
                        .send(signals)
                        .instrument(span)
                        .await
                        .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                    self.last_sent = Some(signals);
                    info!("Successfully sent signals")
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Encountered an error during session probing {:?}", e)
                }
            }

            tokio::select! {
                // Cancelation means we stop execution of the event loop. Which means we also drop
                // the sender channel and consequently stop the tracker module.
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.time_provider.sleep_until(poll_point) => ()
            }
        }
    }
}
