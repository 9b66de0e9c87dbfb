use std::io::Write;

use ansi_term::{Colour, Style};
use anyhow::Result;

use crate::utils::time::format_hms;

/// Rendering surface for the live counter.
pub trait TallyDisplay {
    fn render(&mut self, seconds: u64) -> Result<()>;
}

/// Rewrites a single console line in place: one piece of text, replaced
/// wholesale on every tick.
pub struct StatusLineDisplay {
    style: Style,
}

impl StatusLineDisplay {
    pub fn new() -> Self {
        Self {
            style: Style::new().fg(Colour::White).on(Colour::Black),
        }
    }
}

impl Default for StatusLineDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TallyDisplay for StatusLineDisplay {
    fn render(&mut self, seconds: u64) -> Result<()> {
        let mut out = std::io::stdout().lock();
        write!(
            out,
            "\r{}",
            self.style
                .paint(format!("Time at screen: {}", format_hms(seconds)))
        )?;
        out.flush()?;
        Ok(())
    }
}
