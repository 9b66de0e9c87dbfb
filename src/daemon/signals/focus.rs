/// Turns raw input-idle time into the focus half of [SessionSignals]. A user
/// who stopped giving input a while ago has effectively blurred the session
/// even if nothing covers the screen.
///
/// [SessionSignals]: crate::session_api::SessionSignals
pub struct FocusEvaluator {
    threshold_ms: u32,
}

impl FocusEvaluator {
    pub fn from_seconds(threshold_s: u32) -> Self {
        Self {
            threshold_ms: threshold_s * 1000,
        }
    }

    pub fn is_focused(&self, idle_time: u32) -> bool {
        idle_time <= self.threshold_ms
    }
}

#[cfg(test)]
mod tests {
    use super::FocusEvaluator;

    #[test]
    fn test_focus_threshold() {
        let evaluator = FocusEvaluator::from_seconds(2);
        assert!(evaluator.is_focused(0));
        assert!(evaluator.is_focused(2000));
        assert!(!evaluator.is_focused(2001));
    }
}
