mod frontier;
mod observer;
mod scheduler;
mod session;

pub use frontier::{Scanner, parse_target, scan};
pub use observer::{NoopObserver, ScanObserver};
pub use scheduler::{ProbeScheduler, SchedulerParts, parent_dir};
pub use session::{CapturedBody, ScanSession};
pub use tokio_util::sync::CancellationToken;
