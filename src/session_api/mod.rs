//! Contains logic for probing session state in different environments.
//! [GenericSessionMonitor] is the main artifact of this module that abstracts
//! the operations.

#[cfg(feature = "win")]
pub mod win;
#[cfg(feature = "x11")]
pub mod x11;

#[cfg(feature = "win")]
extern crate windows;

#[cfg(feature = "x11")]
extern crate xcb;

use anyhow::Result;

/// The pair of signals the tracker derives activity from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSignals {
    /// The screen is actually showing the session. False while a screensaver
    /// or lock screen is up.
    pub screen_visible: bool,
    /// The user is engaged with the session, judged from recent input.
    pub session_focused: bool,
}

impl SessionSignals {
    /// Seconds only count while both signals hold.
    pub fn active(&self) -> bool {
        self.screen_visible && self.session_focused
    }
}

/// Intended to serve as a contract windows and linux systems must implement.
#[cfg_attr(test, mockall::automock)]
pub trait SessionMonitor {
    /// Whether the screen currently shows the session.
    fn screen_visible(&mut self) -> Result<bool>;

    /// Retrieve amount of time user has been inactive in milliseconds
    fn get_idle_time(&mut self) -> Result<u32>;
}

/// Serves as a cross-compatible SessionMonitor implementation.
pub struct GenericSessionMonitor {
    inner: Box<dyn SessionMonitor>,
}

impl GenericSessionMonitor {
    pub fn new() -> Result<Self> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "win")] {
                use win::WindowsSessionMonitor;
                Ok(Self {
                    inner: Box::new(WindowsSessionMonitor::new()),
                })
            }
            else if #[cfg(feature = "x11")] {
                use x11::LinuxSessionMonitor;
                Ok(Self {
                    inner: Box::new(LinuxSessionMonitor::new()?),
                })
            }
            else {
                // This runtime error is needed to allow the project to be compiled for during testing.
                unimplemented!("No session monitor was specified")
            }
        }
    }
}

impl SessionMonitor for GenericSessionMonitor {
    fn screen_visible(&mut self) -> Result<bool> {
        self.inner.screen_visible()
    }

    fn get_idle_time(&mut self) -> Result<u32> {
        self.inner.get_idle_time()
    }
}
