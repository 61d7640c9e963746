mod console;
mod progress;

pub use console::ConsoleReporter;
pub use progress::ProgressObserver;
