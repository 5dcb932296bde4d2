//! Job status polling and history auto-refresh.
//!
//! Every watcher is an explicit subscription: it fetches once immediately,
//! then on a fixed interval, and stops on its own once the watched state is
//! settled. Stopping or dropping the subscription cancels the timer.

mod feed;
mod poller;

pub use feed::StatusFeed;
pub use poller::{watch_history, watch_job, PollEvent, PollSubscription};
