//! `AWS::CodeGuruReviewer::RepositoryAssociation`
//!
//! Associates a CodeCommit, Bitbucket, GitHub Enterprise Server or S3
//! repository with CodeGuru Reviewer. Supports tags and listing.

mod handlers;
mod model;
pub mod translator;

pub use handlers::RepositoryAssociationProvider;
pub use model::{ResourceModel, TYPE_NAME, Tag};
