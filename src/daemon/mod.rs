use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use display::{StatusLineDisplay, TallyDisplay};
use signals::{focus::FocusEvaluator, SignalModule};
use storage::tally_store::{TallyStore, TallyStoreImpl};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracker::TrackerModule;

use crate::{
    session_api::{GenericSessionMonitor, SessionMonitor, SessionSignals},
    utils::clock::{Clock, DefaultClock},
};

pub mod args;
pub mod display;
pub mod shutdown;
pub mod signals;
pub mod storage;
pub mod tracker;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// User is treated as blurred after this much time without input.
const FOCUS_THRESHOLD_SECONDS: u32 = 60 * 2;

pub const TALLY_FILE_NAME: &str = "tally.json";

/// Represents the starting point for the daemon
pub async fn start_daemon(dir: PathBuf) -> Result<()> {
    std::env::set_current_dir("/")?;

    let (sender, receiver) = mpsc::channel::<SessionSignals>(10);
    let monitor = GenericSessionMonitor::new()?;

    let shutdown_token = CancellationToken::new();

    let signals = create_signal_module(sender, monitor, &shutdown_token, DefaultClock);

    let tracker = create_tracker(
        TallyStoreImpl::new(dir.join(TALLY_FILE_NAME))?,
        receiver,
        StatusLineDisplay::new(),
        DefaultClock,
    );

    let (_, signal_result, tracker_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token),
        signals.run(),
        tracker.run(),
    );

    if let Err(signal_result) = signal_result {
        error!("Signal module got an error {:?}", signal_result);
    }

    if let Err(tracker_result) = tracker_result {
        error!("Tracker module got an error {:?}", tracker_result);
    }

    Ok(())
}

fn create_signal_module(
    sender: mpsc::Sender<SessionSignals>,
    monitor: impl SessionMonitor + 'static,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
) -> SignalModule {
    SignalModule::new(
        sender,
        Box::new(monitor),
        shutdown_token.clone(),
        FocusEvaluator::from_seconds(FOCUS_THRESHOLD_SECONDS),
        DEFAULT_POLL_INTERVAL,
        Box::new(clock),
    )
}

fn create_tracker<S: TallyStore, D: TallyDisplay>(
    store: S,
    receiver: mpsc::Receiver<SessionSignals>,
    display: D,
    clock: impl Clock,
) -> TrackerModule<S, D> {
    TrackerModule::new(
        receiver,
        store,
        display,
        Box::new(clock),
        DEFAULT_TICK_INTERVAL,
        // Assume an engaged session until the first probe says otherwise.
        SessionSignals {
            screen_visible: true,
            session_focused: true,
        },
    )
}

#[cfg(test)]
mod daemon_tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
    use tempfile::tempdir;
    use tokio::{sync::mpsc, time::Instant};
    use tokio_util::sync::CancellationToken;

    use crate::{
        daemon::{
            create_signal_module, create_tracker,
            display::TallyDisplay,
            storage::tally_store::{TallyStore, TallyStoreImpl},
            TALLY_FILE_NAME,
        },
        session_api::{MockSessionMonitor, SessionSignals},
        utils::{clock::Clock, logging::TEST_LOGGING},
    };

    const TEST_START_DATE: NaiveDateTime = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(),
        NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
    );

    #[derive(Clone)]
    struct TestClock {
        start_time: DateTime<Local>,
        reference: Instant,
    }

    #[async_trait]
    impl Clock for TestClock {
        fn now(&self) -> DateTime<Local> {
            self.start_time + self.reference.elapsed()
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep(&self, duration: Duration) {
            tokio::time::sleep(duration).await;
        }

        async fn sleep_until(&self, instant: tokio::time::Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    #[derive(Clone, Default)]
    struct RecordingDisplay {
        rendered: Arc<Mutex<Vec<u64>>>,
    }

    impl TallyDisplay for RecordingDisplay {
        fn render(&mut self, seconds: u64) -> Result<()> {
            self.rendered.lock().unwrap().push(seconds);
            Ok(())
        }
    }

    /// Very simple smoke test to check if the application is working
    /// properly: an engaged session accumulates seconds on disk, a blur in
    /// the middle pauses the count.
    #[tokio::test(start_paused = true)]
    async fn smoke_test_daemon() -> Result<()> {
        *TEST_LOGGING;
        let mut monitor = MockSessionMonitor::new();
        monitor.expect_screen_visible().returning(|| Ok(true));
        // Engaged for 3 polls, idle for 2, engaged again.
        let mut idle_times = [0u32, 0, 0, 600_000, 600_000].into_iter().chain([0].into_iter().cycle());
        monitor
            .expect_get_idle_time()
            .returning(move || Ok(idle_times.next().unwrap()));

        let shutdown_token = CancellationToken::new();

        let (sender, receiver) = mpsc::channel::<SessionSignals>(10);
        let test_clock = TestClock {
            start_time: Local
                .from_local_datetime(&TEST_START_DATE)
                .single()
                .unwrap(),
            reference: Instant::now(),
        };
        let signals =
            create_signal_module(sender, monitor, &shutdown_token, test_clock.clone());

        let dir = tempdir()?;
        let display = RecordingDisplay::default();

        let tracker = create_tracker(
            TallyStoreImpl::new(dir.path().join(TALLY_FILE_NAME))?,
            receiver,
            display.clone(),
            test_clock.clone(),
        );

        let (_, signal_result, tracker_result) = tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(6500)).await;
                shutdown_token.cancel()
            },
            signals.run(),
            tracker.run(),
        );

        signal_result?;
        tracker_result?;

        let storage = TallyStoreImpl::new(dir.path().join(TALLY_FILE_NAME))?;
        let stored = storage.load().await?;

        let Some(stored) = stored else {
            panic!("Expected a persisted tally");
        };
        assert_eq!(stored.date, TEST_START_DATE.date());
        // Two seconds of the blur window never got counted.
        assert!(stored.seconds >= 3);
        assert!(stored.seconds <= 5);
        assert_eq!(
            display.rendered.lock().unwrap().first(),
            Some(&0),
            "counter is shown before the first tick"
        );

        Ok(())
    }
}
