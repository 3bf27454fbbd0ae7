//! Service error classification
//!
//! Every error raised by the association API is classified once, by error
//! code, into [`ServiceError`]; [`ServiceError::into_provider_error`] is the
//! only place that maps it onto the host taxonomy.

use reviewer_core::{HandlerErrorCode, ProviderError};
use thiserror::Error;

/// Operations of the association API, used in error messages and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AssociateRepository,
    DescribeRepositoryAssociation,
    DisassociateRepository,
    ListRepositoryAssociations,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::AssociateRepository => "AssociateRepository",
            Operation::DescribeRepositoryAssociation => "DescribeRepositoryAssociation",
            Operation::DisassociateRepository => "DisassociateRepository",
            Operation::ListRepositoryAssociations => "ListRepositoryAssociations",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the association API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("InternalServerException: {0}")]
    InternalServer(String),

    #[error("ValidationException: {0}")]
    Validation(String),

    #[error("AccessDeniedException: {0}")]
    AccessDenied(String),

    /// The association already exists or is mid-transition
    #[error("ConflictException: {0}")]
    Conflict(String),

    #[error("ThrottlingException: {0}")]
    Throttling(String),

    #[error("NotFoundException: {0}")]
    NotFound(String),

    /// A service error with a code outside the known vocabulary
    #[error("{code}: {message}")]
    Unclassified { code: String, message: String },

    /// The request never produced a service response (dispatch, timeout, parse)
    #[error("Transport error: {0}")]
    Transport(String),
}

const INTERNAL_SERVER_CODES: &[&str] = &["InternalServerException", "InternalServerError"];
const VALIDATION_CODES: &[&str] = &["ValidationException", "ValidationError"];
const ACCESS_DENIED_CODES: &[&str] = &["AccessDeniedException", "AccessDenied"];
const CONFLICT_CODES: &[&str] = &["ConflictException", "Conflict"];
const THROTTLING_CODES: &[&str] = &["ThrottlingException", "Throttling"];
const NOT_FOUND_CODES: &[&str] = &["NotFoundException", "NotFound"];

/// Classify a service error by its error code
pub fn classify_service_error(code: Option<&str>, message: Option<&str>) -> ServiceError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if INTERNAL_SERVER_CODES.contains(&c) => ServiceError::InternalServer(message),
        Some(c) if VALIDATION_CODES.contains(&c) => ServiceError::Validation(message),
        Some(c) if ACCESS_DENIED_CODES.contains(&c) => ServiceError::AccessDenied(message),
        Some(c) if CONFLICT_CODES.contains(&c) => ServiceError::Conflict(message),
        Some(c) if THROTTLING_CODES.contains(&c) => ServiceError::Throttling(message),
        Some(c) if NOT_FOUND_CODES.contains(&c) => ServiceError::NotFound(message),
        Some(c) => ServiceError::Unclassified {
            code: c.to_string(),
            message,
        },
        None => ServiceError::Unclassified {
            code: "Unknown".to_string(),
            message,
        },
    }
}

impl ServiceError {
    /// Host error code this service error maps to
    pub fn handler_error_code(&self) -> HandlerErrorCode {
        match self {
            ServiceError::InternalServer(_) => HandlerErrorCode::ServiceInternalError,
            ServiceError::Validation(_) => HandlerErrorCode::InvalidRequest,
            ServiceError::AccessDenied(_) => HandlerErrorCode::AccessDenied,
            ServiceError::Conflict(_) => HandlerErrorCode::AlreadyExists,
            ServiceError::Throttling(_) => HandlerErrorCode::Throttling,
            ServiceError::NotFound(_) => HandlerErrorCode::NotFound,
            ServiceError::Unclassified { .. } | ServiceError::Transport(_) => {
                HandlerErrorCode::InternalFailure
            }
        }
    }

    /// Convert into the host-facing error for `operation` on a resource
    pub fn into_provider_error(
        self,
        operation: Operation,
        type_name: &'static str,
        identifier: Option<&str>,
    ) -> ProviderError {
        let op = operation.as_str();
        let error = match &self {
            ServiceError::InternalServer(_) => ProviderError::service_internal_error(op),
            ServiceError::Validation(message) => ProviderError::invalid_request(message),
            ServiceError::AccessDenied(_) => ProviderError::access_denied(op),
            ServiceError::Conflict(_) => ProviderError::already_exists(type_name, identifier),
            ServiceError::Throttling(_) => ProviderError::throttling(op),
            ServiceError::NotFound(_) => ProviderError::not_found(type_name, identifier),
            ServiceError::Unclassified { .. } | ServiceError::Transport(_) => {
                ProviderError::internal_failure(self.to_string())
            }
        };
        debug_assert_eq!(error.code, self.handler_error_code());

        error.for_resource(type_name, identifier).with_cause(self)
    }
}
