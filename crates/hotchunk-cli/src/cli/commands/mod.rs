mod check;
mod fetch;
mod watch;

pub use check::run_check;
pub use fetch::run_fetch;
pub use watch::run_watch;
