//! Progress events returned to the host and their wire representation

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::provider::{HandlerErrorCode, ProviderError};
use crate::resource::CallbackContext;

/// Status field of the host wire response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    InProgress,
    Success,
    Failed,
}

/// Outcome of a single handler invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent<M> {
    /// The operation finished; the model is the canonical view of the resource
    Success(M),
    /// A page of list results
    Listed {
        models: Vec<M>,
        next_token: Option<String>,
    },
    /// The operation needs another invocation; the host re-invokes with `context`
    InProgress {
        model: M,
        context: CallbackContext,
        callback_delay_seconds: u32,
    },
    Failed {
        error_code: HandlerErrorCode,
        message: String,
    },
}

impl<M> ProgressEvent<M> {
    pub fn success(model: M) -> Self {
        ProgressEvent::Success(model)
    }

    pub fn listed(models: Vec<M>, next_token: Option<String>) -> Self {
        ProgressEvent::Listed { models, next_token }
    }

    pub fn in_progress(model: M, context: CallbackContext, callback_delay: Duration) -> Self {
        ProgressEvent::InProgress {
            model,
            context,
            callback_delay_seconds: u32::try_from(callback_delay.as_secs()).unwrap_or(u32::MAX),
        }
    }

    pub fn failed(error: &ProviderError) -> Self {
        ProgressEvent::Failed {
            error_code: error.code,
            message: error.message.clone(),
        }
    }

    pub fn status(&self) -> OperationStatus {
        match self {
            ProgressEvent::Success(_) | ProgressEvent::Listed { .. } => OperationStatus::Success,
            ProgressEvent::InProgress { .. } => OperationStatus::InProgress,
            ProgressEvent::Failed { .. } => OperationStatus::Failed,
        }
    }

    pub fn model(&self) -> Option<&M> {
        match self {
            ProgressEvent::Success(model) | ProgressEvent::InProgress { model, .. } => Some(model),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<CallbackContext> {
        match self {
            ProgressEvent::InProgress { context, .. } => Some(*context),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<HandlerErrorCode> {
        match self {
            ProgressEvent::Failed { error_code, .. } => Some(*error_code),
            _ => None,
        }
    }
}

/// Handler response as serialized for the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse<M> {
    pub status: OperationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_model: Option<M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_models: Option<Vec<M>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_context: Option<CallbackContext>,
    #[serde(default)]
    pub callback_delay_seconds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<HandlerErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<M> From<ProgressEvent<M>> for HandlerResponse<M> {
    fn from(event: ProgressEvent<M>) -> Self {
        let status = event.status();
        let mut response = HandlerResponse {
            status,
            resource_model: None,
            resource_models: None,
            next_token: None,
            callback_context: None,
            callback_delay_seconds: 0,
            error_code: None,
            message: None,
        };

        match event {
            ProgressEvent::Success(model) => response.resource_model = Some(model),
            ProgressEvent::Listed { models, next_token } => {
                response.resource_models = Some(models);
                response.next_token = next_token;
            }
            ProgressEvent::InProgress {
                model,
                context,
                callback_delay_seconds,
            } => {
                response.resource_model = Some(model);
                response.callback_context = Some(context);
                response.callback_delay_seconds = callback_delay_seconds;
            }
            ProgressEvent::Failed {
                error_code,
                message,
            } => {
                response.error_code = Some(error_code);
                response.message = Some(message);
            }
        }

        response
    }
}
