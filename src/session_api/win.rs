use anyhow::{anyhow, Result};
use tracing::error;
use windows::Win32::{
    System::SystemInformation::GetTickCount64,
    UI::{
        Input::KeyboardAndMouse::{GetLastInputInfo, LASTINPUTINFO},
        WindowsAndMessaging::GetForegroundWindow,
    },
};

use super::SessionMonitor;

/// The secure desktop (lock screen, UAC prompt) has no foreground window
/// visible to this process, so an invalid handle doubles as "screen off".
pub fn screen_visible() -> Result<bool> {
    let window = unsafe { GetForegroundWindow() };
    Ok(!window.is_invalid())
}

pub fn get_idle_time() -> Result<u32> {
    let mut last: LASTINPUTINFO = LASTINPUTINFO {
        cbSize: size_of::<LASTINPUTINFO>() as u32,
        dwTime: 0,
    };
    let is_success = unsafe { GetLastInputInfo(&mut last) };
    if !is_success.as_bool() {
        error!("Failed to retrieve user idle time");
        return Err(anyhow!("Failed to retrieve user idle time"));
    }

    let tick_count = unsafe { GetTickCount64() };
    let duration = tick_count - last.dwTime as u64;
    if duration > u32::MAX as u64 {
        Ok(u32::MAX)
    } else {
        Ok(duration as u32)
    }
}

pub struct WindowsSessionMonitor {}

impl WindowsSessionMonitor {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for WindowsSessionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMonitor for WindowsSessionMonitor {
    fn screen_visible(&mut self) -> Result<bool> {
        screen_visible().inspect_err(|e| error!("Failed to query foreground window {e:?}"))
    }

    fn get_idle_time(&mut self) -> Result<u32> {
        get_idle_time().inspect_err(|e| error!("Failed to get idle time {e:?}"))
    }
}
