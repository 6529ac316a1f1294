// Host chrome the console depends on

/// Browser-level facilities outside the page itself
pub trait Host {
    /// Blocking yes/no prompt
    fn confirm(&mut self, message: &str) -> bool;

    /// Reload the whole page so server-rendered lists reflect the latest state
    fn reload(&mut self);
}
