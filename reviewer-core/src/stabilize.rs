//! Stabilizer - Bounded polling until an eventually consistent resource settles
//!
//! Each operation supplies a closure that evaluates one attempt. The closure
//! answers [`Attempt::Stabilized`] or [`Attempt::Pending`], or fails with a
//! [`ProviderError`] when the resource reached a terminal failure state. The
//! loop stops after `max_attempts` evaluations and reports
//! [`Stabilization::AttemptsExhausted`], leaving the caller to ask the host
//! for a continuation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::provider::{BoxFuture, ProviderResult};

/// Default number of describe calls per invocation
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default pause between attempts.
///
/// Five attempts seven seconds apart fit inside a one minute handler timeout
/// with room left for the create/delete call and the final read.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(7000);

/// Configuration for a stabilization loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizeConfig {
    /// Maximum number of evaluations per invocation (at least one is always made)
    pub max_attempts: u32,
    /// Fixed pause between two evaluations
    pub delay: Duration,
}

impl Default for StabilizeConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

impl StabilizeConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of evaluations actually performed
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Result of evaluating one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Stabilized,
    Pending,
}

/// Non-failing terminal outcome of a stabilization loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stabilization {
    Stabilized { attempts: u32 },
    /// Budget spent without reaching a terminal state; not an error
    AttemptsExhausted { attempts: u32 },
}

impl Stabilization {
    pub fn is_stabilized(&self) -> bool {
        matches!(self, Stabilization::Stabilized { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Stabilization::Stabilized { attempts } | Stabilization::AttemptsExhausted { attempts } => {
                *attempts
            }
        }
    }
}

/// Pause between attempts, injectable so tests can run without waiting
pub trait Delay: Send + Sync {
    fn delay(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

/// Delay backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
    fn delay(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Delay that returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay(&self, _duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }
}

impl<D: Delay + ?Sized> Delay for Arc<D> {
    fn delay(&self, duration: Duration) -> BoxFuture<'_, ()> {
        (**self).delay(duration)
    }
}

/// Polling loop shared by every handler that waits on the service
#[derive(Debug, Clone)]
pub struct Stabilizer<D = TokioDelay> {
    config: StabilizeConfig,
    delay: D,
}

impl Stabilizer<TokioDelay> {
    pub fn new(config: StabilizeConfig) -> Self {
        Self {
            config,
            delay: TokioDelay,
        }
    }
}

impl Default for Stabilizer<TokioDelay> {
    fn default() -> Self {
        Self::new(StabilizeConfig::default())
    }
}

impl<D: Delay> Stabilizer<D> {
    pub fn with_delay(config: StabilizeConfig, delay: D) -> Self {
        Self { config, delay }
    }

    pub fn config(&self) -> &StabilizeConfig {
        &self.config
    }

    /// Pause for `duration` using this stabilizer's delay
    pub async fn pause(&self, duration: Duration) {
        self.delay.delay(duration).await;
    }

    /// Evaluate attempts until one settles or the budget runs out
    ///
    /// `evaluate` receives the 1-based attempt number. An error from it ends
    /// the loop immediately and is returned unchanged.
    pub async fn run<F, Fut>(&self, label: &str, mut evaluate: F) -> ProviderResult<Stabilization>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ProviderResult<Attempt>>,
    {
        let max_attempts = self.config.effective_attempts();
        let mut attempts = 0;

        while attempts < max_attempts {
            let outcome = evaluate(attempts + 1).await;
            attempts += 1;

            match outcome {
                Ok(Attempt::Stabilized) => {
                    log::info!("{} stabilized after {} attempt(s)", label, attempts);
                    return Ok(Stabilization::Stabilized { attempts });
                }
                Ok(Attempt::Pending) => {
                    log::debug!(
                        "{} not stabilized (attempt {}/{})",
                        label,
                        attempts,
                        max_attempts
                    );
                    if attempts < max_attempts {
                        self.delay.delay(self.config.delay).await;
                    }
                }
                Err(e) => {
                    log::warn!("{} failed to stabilize on attempt {}: {}", label, attempts, e);
                    return Err(e);
                }
            }
        }

        log::info!(
            "{} still not stabilized after {} attempts, requesting continuation",
            label,
            attempts
        );
        Ok(Stabilization::AttemptsExhausted { attempts })
    }
}
