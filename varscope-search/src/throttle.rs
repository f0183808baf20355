//! Rate-limited cross-index release-date check.
//!
//! The two genome-build indices are rebuilt by an external job and may be
//! briefly out of step. [`ThrottledMetadataRefresher`] reads both release
//! dates at most once per window, reports a mismatch as a data-quality
//! warning, and treats the first index's date as authoritative.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::backend::SearchBackend;
use crate::clock::Clock;
use crate::error::SearchError;

/// The last computed value and when it was computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleState {
    pub last_computed_at: Instant,
    pub last_value: String,
}

/// Serves the release date, refreshing it at most once per window.
pub struct ThrottledMetadataRefresher<B> {
    backend: Arc<B>,
    primary_index: String,
    secondary_index: String,
    window: Duration,
    clock: Arc<dyn Clock>,
    // Held across a refresh so concurrent callers wait for it instead of
    // starting a second one.
    state: Mutex<Option<ThrottleState>>,
}

impl<B: SearchBackend> ThrottledMetadataRefresher<B> {
    /// `primary_index` is authoritative when the two dates disagree.
    pub fn new(
        backend: Arc<B>,
        primary_index: impl Into<String>,
        secondary_index: impl Into<String>,
        window: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            primary_index: primary_index.into(),
            secondary_index: secondary_index.into(),
            window,
            clock,
            state: Mutex::new(None),
        }
    }

    /// The current release date, fetched from the backend only if the last
    /// fetch is older than the window.
    ///
    /// # Errors
    ///
    /// Returns the backend error if either index's metadata cannot be
    /// read. The previously cached value is kept for the next caller.
    pub async fn release_date(&self) -> Result<String, SearchError> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        if let Some(cached) = state.as_ref() {
            if now.duration_since(cached.last_computed_at) < self.window {
                return Ok(cached.last_value.clone());
            }
        }

        let value = self.fetch_release_date().await?;
        tracing::info!(release_date = %value, "refreshed index release date");
        *state = Some(ThrottleState {
            last_computed_at: self.clock.now(),
            last_value: value.clone(),
        });
        Ok(value)
    }

    /// Snapshot of the throttle state.
    pub async fn state(&self) -> Option<ThrottleState> {
        self.state.lock().await.clone()
    }

    async fn fetch_release_date(&self) -> Result<String, SearchError> {
        let (primary, secondary) = futures::future::try_join(
            self.backend.index_metadata(&self.primary_index),
            self.backend.index_metadata(&self.secondary_index),
        )
        .await?;

        if primary.release_date != secondary.release_date {
            tracing::warn!(
                primary_index = %self.primary_index,
                primary_release_date = %primary.release_date,
                secondary_index = %self.secondary_index,
                secondary_release_date = %secondary.release_date,
                "release dates differ between genome builds"
            );
        }
        Ok(primary.release_date)
    }
}
