//! Lifecycle - Stabilization checks and retry shared by both resource types

use std::time::Duration;

use reviewer_core::{
    Attempt, Delay, HandlerErrorCode, ProviderError, ProviderResult, Stabilization, Stabilizer,
};

use crate::client::ReviewerApi;
use crate::invoker::Invoker;
use crate::service::{
    AssociationState, DescribeRepositoryAssociationRequest, DisassociateRepositoryRequest,
    DisassociateRepositoryResponse,
};

/// Fixed backoff applied when a disassociate call is throttled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Retries after the first throttled call
    pub retries: u32,
    pub delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            retries: 2,
            delay: Duration::from_millis(1000),
        }
    }
}

impl BackoffConfig {
    /// No retries; the first throttling error is returned
    pub fn none() -> Self {
        Self {
            retries: 0,
            delay: Duration::ZERO,
        }
    }
}

/// Wait for a freshly associated repository to reach `Associated`
///
/// `Failed` ends the loop with NotStabilized; any error from describe is
/// returned as is.
pub async fn stabilize_on_create<C, D>(
    invoker: &Invoker<'_, C>,
    stabilizer: &Stabilizer<D>,
    arn: &str,
) -> ProviderResult<Stabilization>
where
    C: ReviewerApi + ?Sized,
    D: Delay,
{
    let type_name = invoker.type_name();
    let request = DescribeRepositoryAssociationRequest {
        association_arn: arn.to_string(),
    };
    let request = &request;
    let label = format!("{} [{}] creation", type_name, arn);

    stabilizer
        .run(&label, move |attempt| async move {
            let response = invoker.describe(request).await?;
            match response.state() {
                Some(AssociationState::Associated) => Ok(Attempt::Stabilized),
                Some(AssociationState::Failed) => {
                    let reason = response
                        .repository_association
                        .as_ref()
                        .and_then(|a| a.state_reason.as_deref())
                        .unwrap_or("no reason given");
                    log::error!("{} [{}] association failed: {}", type_name, arn, reason);
                    Err(ProviderError::not_stabilized(type_name, Some(arn)))
                }
                state => {
                    log::debug!(
                        "{} [{}] is {} (attempt {})",
                        type_name,
                        arn,
                        state.map(|s| s.as_str()).unwrap_or("in an unknown state"),
                        attempt
                    );
                    Ok(Attempt::Pending)
                }
            }
        })
        .await
}

/// Wait until describe stops finding the association
///
/// Only NotFound settles the loop. Other errors are logged and the attempt
/// counts as pending.
pub async fn stabilize_on_delete<C, D>(
    invoker: &Invoker<'_, C>,
    stabilizer: &Stabilizer<D>,
    arn: &str,
) -> ProviderResult<Stabilization>
where
    C: ReviewerApi + ?Sized,
    D: Delay,
{
    let type_name = invoker.type_name();
    let request = DescribeRepositoryAssociationRequest {
        association_arn: arn.to_string(),
    };
    let request = &request;
    let label = format!("{} [{}] deletion", type_name, arn);

    stabilizer
        .run(&label, move |attempt| async move {
            match invoker.describe(request).await {
                Err(e) if e.is_not_found() => Ok(Attempt::Stabilized),
                Err(e) => {
                    log::warn!(
                        "{} [{}] could not be verified as deleted (attempt {}): {}",
                        type_name,
                        arn,
                        attempt,
                        e
                    );
                    Ok(Attempt::Pending)
                }
                Ok(response) => {
                    log::debug!(
                        "{} [{}] still present as {} (attempt {})",
                        type_name,
                        arn,
                        response.state().map(|s| s.as_str()).unwrap_or("unknown"),
                        attempt
                    );
                    Ok(Attempt::Pending)
                }
            }
        })
        .await
}

/// Disassociate, retrying throttled calls with a fixed backoff
pub async fn disassociate_with_backoff<C, D>(
    invoker: &Invoker<'_, C>,
    stabilizer: &Stabilizer<D>,
    backoff: &BackoffConfig,
    request: &DisassociateRepositoryRequest,
) -> ProviderResult<DisassociateRepositoryResponse>
where
    C: ReviewerApi + ?Sized,
    D: Delay,
{
    let mut retries = 0;
    loop {
        match invoker.disassociate(request).await {
            Err(e) if e.code == HandlerErrorCode::Throttling && retries < backoff.retries => {
                retries += 1;
                log::warn!(
                    "{} [{}] disassociate throttled, retry {}/{} in {:?}",
                    invoker.type_name(),
                    request.association_arn,
                    retries,
                    backoff.retries,
                    backoff.delay
                );
                stabilizer.pause(backoff.delay).await;
            }
            result => return result,
        }
    }
}
