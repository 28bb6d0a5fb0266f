//! [`RequestCounter`] definitions.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use axum::{
    extract::Request, middleware::Next, response::Response, Extension,
};

/// Process-wide counter of inbound HTTP requests.
///
/// Starts at zero and never persists across restarts.
#[derive(Debug, Default)]
pub struct RequestCounter(AtomicU64);

impl RequestCounter {
    /// Increments this [`RequestCounter`] by one.
    pub fn increment(&self) {
        _ = self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the current value of this [`RequestCounter`].
    #[must_use]
    pub fn read(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Resets this [`RequestCounter`] back to zero.
    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// Middleware counting every inbound HTTP request, including failed and
/// unauthorized ones.
pub async fn track(
    Extension(counter): Extension<Arc<RequestCounter>>,
    req: Request,
    next: Next,
) -> Response {
    counter.increment();
    next.run(req).await
}

#[cfg(test)]
mod request_counter_spec {
    use std::thread;

    use super::RequestCounter;

    #[test]
    fn concurrent_increments_are_not_lost() {
        for n in [1, 10, 100] {
            let counter = RequestCounter::default();

            thread::scope(|s| {
                for _ in 0..n {
                    _ = s.spawn(|| counter.increment());
                }
            });

            assert_eq!(counter.read(), n);
        }
    }

    #[test]
    fn reset_returns_to_zero() {
        let counter = RequestCounter::default();
        counter.increment();
        counter.increment();

        counter.reset();

        assert_eq!(counter.read(), 0);
    }
}
