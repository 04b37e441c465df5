use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Minimum spacing between consecutive requests to one site.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Pacer { interval, last: None }
    }

    /// Waits until `interval` has passed since the previous call returned.
    /// The first call never waits.
    pub async fn ready(&mut self) {
        if let Some(last) = self.last {
            sleep_until(last + self.interval).await;
        }
        self.last = Some(Instant::now());
    }
}
