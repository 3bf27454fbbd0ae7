//! Reviewer Core
//!
//! Host contract for CloudFormation resource handlers: requests, progress
//! events, the error taxonomy, and the bounded stabilization loop shared by
//! the create and delete handlers.

pub mod progress;
pub mod provider;
pub mod resource;
pub mod stabilize;

pub use progress::{HandlerResponse, OperationStatus, ProgressEvent};
pub use provider::{
    Action, BoxFuture, HandlerErrorCode, ProviderError, ProviderResult, ResourceProvider,
    ResourceType, dispatch,
};
pub use resource::{CallbackContext, HandlerRequest};
pub use stabilize::{Attempt, Delay, NoDelay, Stabilization, StabilizeConfig, Stabilizer, TokioDelay};
