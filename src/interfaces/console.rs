use crate::domain::ports::{PhaseUpdate, ProgressObserver};

/// Prints payment phases to stderr as they happen.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress;

impl ProgressObserver for ConsoleProgress {
    fn on_phase(&self, update: &PhaseUpdate) {
        eprintln!("[{:>3}%] {}", update.percent(), update.label);
    }
}
