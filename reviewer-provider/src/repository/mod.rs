//! `AWS::CodeGuruReviewer::Repository`
//!
//! The narrower predecessor of the association type: CodeCommit and
//! Bitbucket only, no tags, no listing, and a read model that exposes the
//! association state.

mod handlers;
mod model;
pub mod translator;

pub use handlers::RepositoryProvider;
pub use model::{ResourceModel, TYPE_NAME};
