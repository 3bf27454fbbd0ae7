//! Resource - Handler requests and the continuation context round-tripped by the host

use serde::{Deserialize, Serialize};

use crate::provider::{ProviderError, ProviderResult};

/// Continuation state carried between handler invocations
///
/// The host persists this value verbatim and hands it back on the next
/// invocation of the same operation. Handlers never mutate a context they
/// received; they return a new one alongside an in-progress event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackContext {
    /// The create call was issued; resume at stabilization
    #[serde(default)]
    pub create_workflow: bool,
    /// The delete call was issued; resume at stabilization
    #[serde(default)]
    pub delete_workflow: bool,
}

impl CallbackContext {
    pub fn with_create_workflow(mut self) -> Self {
        self.create_workflow = true;
        self
    }

    pub fn with_delete_workflow(mut self) -> Self {
        self.delete_workflow = true;
        self
    }
}

/// A single handler invocation as received from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRequest<M> {
    pub desired_resource_state: Option<M>,
    pub previous_resource_state: Option<M>,
    pub logical_resource_identifier: Option<String>,
    /// Idempotency token for the operation, stable across continuations
    pub client_request_token: Option<String>,
    /// Pagination token for list requests
    pub next_token: Option<String>,
    pub callback_context: Option<CallbackContext>,
}

impl<M> Default for HandlerRequest<M> {
    fn default() -> Self {
        Self {
            desired_resource_state: None,
            previous_resource_state: None,
            logical_resource_identifier: None,
            client_request_token: None,
            next_token: None,
            callback_context: None,
        }
    }
}

impl<M> HandlerRequest<M> {
    pub fn new(desired: M) -> Self {
        Self {
            desired_resource_state: Some(desired),
            ..Self::default()
        }
    }

    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    pub fn with_client_request_token(mut self, token: impl Into<String>) -> Self {
        self.client_request_token = Some(token.into());
        self
    }

    pub fn with_callback_context(mut self, context: CallbackContext) -> Self {
        self.callback_context = Some(context);
        self
    }

    /// Context from a previous invocation, or an empty one on the first call
    pub fn context(&self) -> CallbackContext {
        self.callback_context.unwrap_or_default()
    }
}

impl<M: Clone> HandlerRequest<M> {
    /// Desired model, required by every handler except list
    pub fn desired_model(&self) -> ProviderResult<M> {
        self.desired_resource_state
            .clone()
            .ok_or_else(|| ProviderError::invalid_request("desiredResourceState is required"))
    }
}
