//! CodeGuru Reviewer resource provider
//!
//! CloudFormation handlers for `AWS::CodeGuruReviewer::RepositoryAssociation`
//! and `AWS::CodeGuruReviewer::Repository`.
//!
//! ## Module Structure
//!
//! - `client` - `ReviewerApi` seam and the SDK-backed client
//! - `service` - Request/response shapes of the association API
//! - `error` - Service error classification
//! - `invoker` - Single service calls with classified failures
//! - `lifecycle` - Create/delete stabilization and disassociate backoff
//! - `repository_association`, `repository` - Models, translators and handlers
//! - `resources` - Resource type registry

pub mod client;
pub mod error;
pub mod invoker;
pub mod lifecycle;
pub mod repository;
pub mod repository_association;
pub mod resources;
pub mod service;

#[cfg(test)]
mod testing;

// Re-export main types
pub use client::{CodeGuruReviewerClient, ReviewerApi};
pub use error::{Operation, ServiceError, classify_service_error};
pub use lifecycle::BackoffConfig;
pub use repository::RepositoryProvider;
pub use repository_association::RepositoryAssociationProvider;
pub use resources::{find_resource_type, resource_types};
