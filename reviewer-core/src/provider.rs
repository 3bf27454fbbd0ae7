//! Provider - Handler contract between the provider host and a resource type
//!
//! A provider implements the lifecycle handlers of one CloudFormation resource
//! type. Handlers report classified failures through [`ProviderError`], which
//! [`dispatch`] folds into a failed [`ProgressEvent`] before it reaches the host.

use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::progress::ProgressEvent;
use crate::resource::HandlerRequest;

/// Error codes reported back to the provider host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlerErrorCode {
    /// The downstream service reported an internal error
    ServiceInternalError,
    /// The request was rejected as malformed or incomplete
    InvalidRequest,
    AccessDenied,
    /// A conflicting resource already exists
    AlreadyExists,
    Throttling,
    NotFound,
    /// The resource reached a terminal failure state while stabilizing
    NotStabilized,
    GeneralServiceException,
    /// Anything unclassified
    InternalFailure,
}

impl HandlerErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerErrorCode::ServiceInternalError => "ServiceInternalError",
            HandlerErrorCode::InvalidRequest => "InvalidRequest",
            HandlerErrorCode::AccessDenied => "AccessDenied",
            HandlerErrorCode::AlreadyExists => "AlreadyExists",
            HandlerErrorCode::Throttling => "Throttling",
            HandlerErrorCode::NotFound => "NotFound",
            HandlerErrorCode::NotStabilized => "NotStabilized",
            HandlerErrorCode::GeneralServiceException => "GeneralServiceException",
            HandlerErrorCode::InternalFailure => "InternalFailure",
        }
    }
}

impl std::fmt::Display for HandlerErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for handler operations
///
/// `message` is the text handed to the host verbatim.
#[derive(Debug)]
pub struct ProviderError {
    pub code: HandlerErrorCode,
    pub message: String,
    /// CloudFormation type name of the resource involved
    pub type_name: Option<&'static str>,
    /// Primary identifier (or name) of the resource involved
    pub identifier: Option<String>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(code: HandlerErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            type_name: None,
            identifier: None,
            cause: None,
        }
    }

    pub fn not_found(type_name: &'static str, identifier: Option<&str>) -> Self {
        Self::new(
            HandlerErrorCode::NotFound,
            format!(
                "Resource of type '{}' with identifier '{}' was not found.",
                type_name,
                identifier.unwrap_or_default()
            ),
        )
        .for_resource(type_name, identifier)
    }

    pub fn already_exists(type_name: &'static str, identifier: Option<&str>) -> Self {
        Self::new(
            HandlerErrorCode::AlreadyExists,
            format!(
                "Resource of type '{}' with identifier '{}' already exists.",
                type_name,
                identifier.unwrap_or_default()
            ),
        )
        .for_resource(type_name, identifier)
    }

    pub fn not_stabilized(type_name: &'static str, identifier: Option<&str>) -> Self {
        Self::new(
            HandlerErrorCode::NotStabilized,
            format!(
                "Resource of type '{}' with identifier '{}' did not stabilize.",
                type_name,
                identifier.unwrap_or_default()
            ),
        )
        .for_resource(type_name, identifier)
    }

    pub fn invalid_request(detail: impl AsRef<str>) -> Self {
        Self::new(
            HandlerErrorCode::InvalidRequest,
            format!("Invalid request provided: {}", detail.as_ref()),
        )
    }

    pub fn service_internal_error(operation: &str) -> Self {
        Self::new(
            HandlerErrorCode::ServiceInternalError,
            format!(
                "Internal error reported from downstream service during operation '{}'.",
                operation
            ),
        )
    }

    pub fn access_denied(operation: &str) -> Self {
        Self::new(
            HandlerErrorCode::AccessDenied,
            format!("Access denied for operation '{}'.", operation),
        )
    }

    pub fn throttling(operation: &str) -> Self {
        Self::new(
            HandlerErrorCode::Throttling,
            format!("Rate exceeded for operation '{}'.", operation),
        )
    }

    pub fn general_service(operation: &str, detail: impl AsRef<str>) -> Self {
        Self::new(
            HandlerErrorCode::GeneralServiceException,
            format!(
                "Error occurred during operation '{}': {}",
                operation,
                detail.as_ref()
            ),
        )
    }

    pub fn internal_failure(detail: impl AsRef<str>) -> Self {
        Self::new(
            HandlerErrorCode::InternalFailure,
            format!("Internal error occurred: {}", detail.as_ref()),
        )
    }

    pub fn for_resource(mut self, type_name: &'static str, identifier: Option<&str>) -> Self {
        self.type_name = Some(type_name);
        self.identifier = identifier.map(|s| s.to_string());
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.code == HandlerErrorCode::NotFound
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Definition of a resource type served by a provider
pub trait ResourceType: Send + Sync {
    /// CloudFormation type name (e.g., "AWS::CodeGuruReviewer::RepositoryAssociation")
    fn name(&self) -> &'static str;

    /// JSON pointer to the primary identifier property
    fn primary_identifier(&self) -> &'static str;

    /// Whether the type supports the list handler
    fn supports_list(&self) -> bool {
        true
    }
}

/// Lifecycle actions a host may invoke
///
/// There is no update action. Changing any property replaces the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Create,
    Read,
    Delete,
    List,
}

impl FromStr for Action {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "read" => Ok(Action::Read),
            "delete" => Ok(Action::Delete),
            "list" => Ok(Action::List),
            "update" => Err(ProviderError::invalid_request(
                "Update is not supported; resources of this type are replaced instead",
            )),
            other => Err(ProviderError::invalid_request(format!(
                "Unknown action {}",
                other
            ))),
        }
    }
}

/// Main handler trait
///
/// Each resource type implements this trait once. All handlers are async and
/// perform at most one bounded stabilization loop per invocation; anything
/// longer is expressed as an in-progress event carrying a callback context.
pub trait ResourceProvider: Send + Sync {
    type Model: Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// CloudFormation type name served by this provider
    fn type_name(&self) -> &'static str;

    fn create(
        &self,
        request: HandlerRequest<Self::Model>,
    ) -> BoxFuture<'_, ProviderResult<ProgressEvent<Self::Model>>>;

    fn read(
        &self,
        request: HandlerRequest<Self::Model>,
    ) -> BoxFuture<'_, ProviderResult<ProgressEvent<Self::Model>>>;

    fn delete(
        &self,
        request: HandlerRequest<Self::Model>,
    ) -> BoxFuture<'_, ProviderResult<ProgressEvent<Self::Model>>>;

    fn list(
        &self,
        _request: HandlerRequest<Self::Model>,
    ) -> BoxFuture<'_, ProviderResult<ProgressEvent<Self::Model>>> {
        let type_name = self.type_name();
        Box::pin(async move {
            Err(ProviderError::invalid_request(format!(
                "List is not supported for {}",
                type_name
            )))
        })
    }
}

/// Run one handler action and fold a classified failure into a failed event
pub async fn dispatch<P>(
    provider: &P,
    action: Action,
    request: HandlerRequest<P::Model>,
) -> ProgressEvent<P::Model>
where
    P: ResourceProvider + ?Sized,
{
    let result = match action {
        Action::Create => provider.create(request).await,
        Action::Read => provider.read(request).await,
        Action::Delete => provider.delete(request).await,
        Action::List => provider.list(request).await,
    };

    match result {
        Ok(event) => event,
        Err(e) => {
            log::error!(
                "{} {:?} failed with {}: {}",
                provider.type_name(),
                action,
                e.code,
                e.message
            );
            ProgressEvent::failed(&e)
        }
    }
}
