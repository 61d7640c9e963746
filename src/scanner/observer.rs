use crate::error::ProbeError;
use crate::models::ProbeResult;

/// Receives scan events. Calls may arrive from any task in any order.
pub trait ScanObserver: Send + Sync {
    fn on_progress(&self, _current: usize, _total: usize) {}

    fn on_result(&self, _result: &ProbeResult) {}

    fn on_error(&self, _error: &ProbeError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {}
