//! Bounded retry for picking a random usable subject

use super::{LookupError, PokemonLookup, Subject};

use rand::Rng;
use std::time::Duration;

/// How hard to try before giving up on a round's subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt following failed attempt number `failed`
    /// (1-based): the initial backoff, doubled each time, capped.
    pub fn backoff(&self, failed: u32) -> Duration {
        let factor = 2u32.saturating_pow(failed.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Fetch a random subject with ids drawn from `1..=roster_size`.
///
/// Every failed attempt draws a fresh id. Records without artwork are
/// skipped quietly; transport errors are retried too. After
/// `policy.max_attempts` failures the last error is returned wrapped in
/// [`LookupError::Exhausted`].
pub fn fetch_random_subject<L, R>(
    lookup: &L,
    roster_size: u32,
    policy: RetryPolicy,
    rng: &mut R,
    mut sleep: impl FnMut(Duration),
) -> Result<Subject, LookupError>
where
    L: PokemonLookup + ?Sized,
    R: Rng + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let id = rng.random_range(1..=roster_size.max(1));

        match lookup.fetch_by_id(id) {
            Ok(subject) => break Ok(subject),
            Err(error) => {
                let left = max_attempts - attempt;
                if left == 0 {
                    break Err(LookupError::Exhausted {
                        attempts: attempt,
                        last: Box::new(error),
                    });
                }

                if error.is_soft() {
                    tracing::debug!("{error}, trying another ({left} left)");
                } else {
                    tracing::warn!(
                        "{error} ({left} {} left)",
                        if left == 1 { "retry" } else { "retries" }
                    );
                    sleep(policy.backoff(attempt));
                }
            }
        }
    }
}
