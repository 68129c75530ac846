//! Step-by-step progress reporting
//!
//! The observer is a plain synchronous callback invoked at fixed points of
//! the connection pipeline and the sync protocol. It only receives messages;
//! it never influences control flow. Every message is logged as well.

use tracing::{info, warn};

/// Callback receiving human-readable progress messages
pub type StepObserver<'a> = Option<&'a mut (dyn FnMut(&str) + Send)>;

pub(crate) struct Progress<'a> {
    observer: StepObserver<'a>,
}

impl<'a> Progress<'a> {
    pub(crate) fn new(observer: StepObserver<'a>) -> Self {
        Self { observer }
    }

    pub(crate) fn step(&mut self, message: &str) {
        info!(target: "core_sync::progress", "{}", message);
        self.emit(message);
    }

    pub(crate) fn failure(&mut self, message: &str) {
        warn!(target: "core_sync::progress", "{}", message);
        self.emit(message);
    }

    fn emit(&mut self, message: &str) {
        if let Some(observer) = self.observer.as_deref_mut() {
            observer(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_reach_observer_in_order() {
        let mut seen = Vec::new();
        let mut observer = |message: &str| seen.push(message.to_string());
        let mut progress = Progress::new(Some(&mut observer));

        progress.step("connecting");
        progress.failure("refused");
        drop(progress);

        assert_eq!(seen, vec!["connecting", "refused"]);
    }

    #[test]
    fn test_missing_observer_is_fine() {
        let mut progress = Progress::new(None);
        progress.step("nobody listens");
    }
}
