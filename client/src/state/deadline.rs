use embassy_time::{Instant, Timer};
use futures::future::pending;

/// Earliest of the deadlines offered to it.
#[derive(Default)]
pub(crate) struct Deadline {
    earliest: Option<Instant>,
}

impl Deadline {
    pub(crate) fn offer(&mut self, deadline: Option<Instant>) {
        match (self.earliest, deadline) {
            (Some(a), Some(b)) if b < a => {
                self.earliest.replace(b);
            }
            (None, Some(b)) => {
                self.earliest.replace(b);
            }
            _ => {
                // earliest deadline already set
            }
        }
    }

    pub(crate) fn earliest(&self) -> Option<Instant> {
        self.earliest
    }

    /// Wait for the earliest deadline.
    ///
    /// With no deadline offered this stays pending until the future is
    /// dropped.
    pub(crate) async fn expired(&self) {
        if let Some(earliest) = self.earliest {
            Timer::at(earliest).await
        } else {
            pending().await
        }
    }
}

impl FromIterator<Option<Instant>> for Deadline {
    fn from_iter<I: IntoIterator<Item = Option<Instant>>>(iter: I) -> Self {
        let mut deadline = Deadline::default();
        for candidate in iter {
            deadline.offer(candidate);
        }
        deadline
    }
}
