use sentinel_core::Host;
use tracing::info;

/// Host for the terminal: confirmations are answered by the next typed line,
/// reloads are picked up by the main loop.
#[derive(Debug, Default)]
pub struct TerminalHost {
    answer: Option<bool>,
    reload_requested: bool,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer for the next confirmation prompt
    pub fn answer_next(&mut self, answer: bool) {
        self.answer = Some(answer);
    }

    pub fn take_reload(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }
}

impl Host for TerminalHost {
    fn confirm(&mut self, message: &str) -> bool {
        let answer = self.answer.take().unwrap_or(false);
        info!(target: "node_console", prompt = %message, answer, "Confirmation");
        answer
    }

    fn reload(&mut self) {
        self.reload_requested = true;
    }
}
