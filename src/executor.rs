//! # Executor — Where a segment's work actually runs
//!
//! The coordinator plans segments and joins results; it does not care where
//! the sieving happens. [`SegmentExecutor`] is that seam: one method taking
//! the small-prime base and a segment, returning the primes found inside it.
//!
//! Two implementations ship:
//!
//! - [`LocalExecutor`] runs [`crate::sieve::sieve_segment`] on the calling
//!   thread. Combined with the coordinator's thread pool this is the
//!   in-process parallel engine.
//! - [`RemoteExecutor`] POSTs the same inputs as JSON to a sieving service
//!   and reads the primes back. One segment per request, no retries; a
//!   failed or malformed response fails the segment, and the coordinator
//!   fails the whole calculation.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::segment::Segment;
use crate::sieve;

/// A strategy for sieving one segment against a small-prime base.
///
/// Implementations must be callable from the coordinator's worker threads,
/// hence `Send + Sync`. Returned primes must be exactly those in the
/// segment's range, ascending.
pub trait SegmentExecutor: Send + Sync {
    /// Short label for logs ("local", "remote").
    fn name(&self) -> &'static str;

    /// Sieve `segment` using `small_primes` and return the primes found.
    fn run_segment(&self, small_primes: &[u64], segment: Segment) -> Result<Vec<u64>>;
}

/// In-process execution: sieve the segment right here.
pub struct LocalExecutor;

impl SegmentExecutor for LocalExecutor {
    fn name(&self) -> &'static str {
        "local"
    }

    fn run_segment(&self, small_primes: &[u64], segment: Segment) -> Result<Vec<u64>> {
        Ok(sieve::sieve_segment(small_primes, segment))
    }
}

#[derive(Serialize)]
struct SegmentRequest<'a> {
    small_primes: &'a [u64],
    segment: Segment,
}

#[derive(Deserialize)]
struct SegmentResponse {
    primes: Vec<u64>,
}

/// Execution over HTTP: POST the base and segment to a sieving endpoint.
///
/// The wire format is JSON both ways: `{"small_primes": [...], "segment":
/// {"lower_bound": n, "size": n}}` out, `{"primes": [...]}` back. Non-2xx
/// statuses surface as errors from `send_json`, so a failing service fails
/// the segment without any inspection here.
pub struct RemoteExecutor {
    agent: ureq::Agent,
    endpoint: String,
}

impl RemoteExecutor {
    /// Client for `endpoint` with the given connect and whole-request
    /// timeouts. The global timeout covers send plus response body; segment
    /// responses can be large, so it should be generous.
    pub fn new(endpoint: &str, connect_timeout: Duration, request_timeout: Duration) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::config::Config::builder()
                .timeout_connect(Some(connect_timeout))
                .timeout_global(Some(request_timeout))
                .build(),
        );
        RemoteExecutor {
            agent,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SegmentExecutor for RemoteExecutor {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn run_segment(&self, small_primes: &[u64], segment: Segment) -> Result<Vec<u64>> {
        debug!(
            lower_bound = segment.lower_bound,
            size = segment.size,
            "dispatching segment to {}",
            self.endpoint
        );
        let request = SegmentRequest {
            small_primes,
            segment,
        };
        let response: SegmentResponse = self
            .agent
            .post(&self.endpoint)
            .send_json(&request)
            .with_context(|| {
                format!(
                    "segment [{}, {}] request to {} failed",
                    segment.lower_bound,
                    segment.upper_bound(),
                    self.endpoint
                )
            })?
            .body_mut()
            .read_json()
            .with_context(|| format!("invalid segment response from {}", self.endpoint))?;
        Ok(response.primes)
    }
}
