use anyhow::Result;
use tracing::instrument;
use xcb::{
    screensaver::{QueryInfo, QueryInfoReply, State},
    x::Drawable,
    Connection,
};

use super::SessionMonitor;

pub struct LinuxSessionMonitor {
    connection: Connection,
    preferred_screen: i32,
}

impl LinuxSessionMonitor {
    pub fn new() -> Result<Self> {
        let (connection, preferred_screen) = xcb::Connection::connect(None)?;
        Ok(Self {
            connection,
            preferred_screen,
        })
    }

    /// Both signals come from a single screensaver query on the root window.
    fn query_info(&self) -> Result<QueryInfoReply> {
        let setup = self.connection.get_setup();

        // Currently the application only supports 1 x11 screen.
        let root = setup
            .roots()
            .nth(self.preferred_screen.max(0) as usize)
            .unwrap()
            .root();

        let cookie = self.connection.send_request(&QueryInfo {
            drawable: Drawable::Window(root),
        });
        Ok(self.connection.wait_for_reply(cookie)?)
    }
}

impl SessionMonitor for LinuxSessionMonitor {
    #[instrument(skip(self))]
    fn screen_visible(&mut self) -> Result<bool> {
        let reply = self.query_info()?;
        Ok(reply.state() != State::On as u8)
    }

    #[instrument(skip(self))]
    fn get_idle_time(&mut self) -> Result<u32> {
        let reply = self.query_info()?;
        Ok(reply.ms_since_user_input())
    }
}
