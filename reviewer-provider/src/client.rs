//! CodeGuru Reviewer client
//!
//! [`ReviewerApi`] is the seam between the handlers and the association API.
//! [`CodeGuruReviewerClient`] implements it on top of the AWS SDK, converting
//! the crate's service shapes to and from SDK types and classifying every
//! SDK error into a [`ServiceError`].

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_codegurureviewer::Client as ReviewerSdkClient;
use aws_sdk_codegurureviewer::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_codegurureviewer::types as sdk;

use crate::error::{ServiceError, classify_service_error};
use crate::service::{
    AssociateRepositoryRequest, AssociateRepositoryResponse, DescribeRepositoryAssociationRequest,
    DescribeRepositoryAssociationResponse, DisassociateRepositoryRequest,
    DisassociateRepositoryResponse, ListRepositoryAssociationsRequest,
    ListRepositoryAssociationsResponse, Repository, RepositoryAssociation,
    RepositoryAssociationSummary, S3RepositoryDetails, ThirdPartySourceRepository,
};

/// Operations of the association API used by the handlers
#[async_trait]
pub trait ReviewerApi: Send + Sync {
    async fn associate_repository(
        &self,
        request: &AssociateRepositoryRequest,
    ) -> Result<AssociateRepositoryResponse, ServiceError>;

    async fn describe_repository_association(
        &self,
        request: &DescribeRepositoryAssociationRequest,
    ) -> Result<DescribeRepositoryAssociationResponse, ServiceError>;

    async fn disassociate_repository(
        &self,
        request: &DisassociateRepositoryRequest,
    ) -> Result<DisassociateRepositoryResponse, ServiceError>;

    async fn list_repository_associations(
        &self,
        request: &ListRepositoryAssociationsRequest,
    ) -> Result<ListRepositoryAssociationsResponse, ServiceError>;
}

#[async_trait]
impl<C: ReviewerApi + ?Sized> ReviewerApi for Arc<C> {
    async fn associate_repository(
        &self,
        request: &AssociateRepositoryRequest,
    ) -> Result<AssociateRepositoryResponse, ServiceError> {
        (**self).associate_repository(request).await
    }

    async fn describe_repository_association(
        &self,
        request: &DescribeRepositoryAssociationRequest,
    ) -> Result<DescribeRepositoryAssociationResponse, ServiceError> {
        (**self).describe_repository_association(request).await
    }

    async fn disassociate_repository(
        &self,
        request: &DisassociateRepositoryRequest,
    ) -> Result<DisassociateRepositoryResponse, ServiceError> {
        (**self).disassociate_repository(request).await
    }

    async fn list_repository_associations(
        &self,
        request: &ListRepositoryAssociationsRequest,
    ) -> Result<ListRepositoryAssociationsResponse, ServiceError> {
        (**self).list_repository_associations(request).await
    }
}

/// SDK-backed association API client
#[derive(Debug, Clone)]
pub struct CodeGuruReviewerClient {
    client: ReviewerSdkClient,
}

impl CodeGuruReviewerClient {
    /// Create a client from the default credential chain
    ///
    /// Without an explicit region the SDK resolves one from the environment.
    pub async fn new(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let config = loader.load().await;

        Self {
            client: ReviewerSdkClient::new(&config),
        }
    }

    pub fn from_client(client: ReviewerSdkClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReviewerApi for CodeGuruReviewerClient {
    async fn associate_repository(
        &self,
        request: &AssociateRepositoryRequest,
    ) -> Result<AssociateRepositoryResponse, ServiceError> {
        let repository = to_sdk_repository(&request.repository)?;

        let output = self
            .client
            .associate_repository()
            .repository(repository)
            .set_client_request_token(request.client_request_token.clone())
            .set_tags(request.tags.clone())
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(AssociateRepositoryResponse {
            repository_association: output.repository_association().map(from_sdk_association),
            tags: output.tags().cloned().unwrap_or_default(),
        })
    }

    async fn describe_repository_association(
        &self,
        request: &DescribeRepositoryAssociationRequest,
    ) -> Result<DescribeRepositoryAssociationResponse, ServiceError> {
        let output = self
            .client
            .describe_repository_association()
            .association_arn(&request.association_arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(DescribeRepositoryAssociationResponse {
            repository_association: output.repository_association().map(from_sdk_association),
            tags: output.tags().cloned().unwrap_or_default(),
        })
    }

    async fn disassociate_repository(
        &self,
        request: &DisassociateRepositoryRequest,
    ) -> Result<DisassociateRepositoryResponse, ServiceError> {
        let output = self
            .client
            .disassociate_repository()
            .association_arn(&request.association_arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(DisassociateRepositoryResponse {
            repository_association: output.repository_association().map(from_sdk_association),
        })
    }

    async fn list_repository_associations(
        &self,
        request: &ListRepositoryAssociationsRequest,
    ) -> Result<ListRepositoryAssociationsResponse, ServiceError> {
        let output = self
            .client
            .list_repository_associations()
            .set_next_token(request.next_token.clone())
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(ListRepositoryAssociationsResponse {
            repository_association_summaries: output
                .repository_association_summaries()
                .iter()
                .map(from_sdk_summary)
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }
}

// =============================================================================
// SDK conversions
// =============================================================================

fn classify_sdk_error<E, R>(err: &SdkError<E, R>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service_err) => classify_service_error(service_err.code(), service_err.message()),
        None => ServiceError::Transport(DisplayErrorContext(err).to_string()),
    }
}

/// A member missing a required field is rejected before any call is made
fn build_error(err: aws_sdk_codegurureviewer::error::BuildError) -> ServiceError {
    ServiceError::Validation(err.to_string())
}

fn to_sdk_third_party(
    repository: &ThirdPartySourceRepository,
) -> Result<sdk::ThirdPartySourceRepository, ServiceError> {
    sdk::ThirdPartySourceRepository::builder()
        .name(&repository.name)
        .connection_arn(&repository.connection_arn)
        .owner(&repository.owner)
        .build()
        .map_err(build_error)
}

fn to_sdk_repository(repository: &Repository) -> Result<sdk::Repository, ServiceError> {
    let mut builder = sdk::Repository::builder();

    if let Some(code_commit) = &repository.code_commit {
        let member = sdk::CodeCommitRepository::builder()
            .name(&code_commit.name)
            .build()
            .map_err(build_error)?;
        builder = builder.code_commit(member);
    }
    if let Some(bitbucket) = &repository.bitbucket {
        builder = builder.bitbucket(to_sdk_third_party(bitbucket)?);
    }
    if let Some(server) = &repository.git_hub_enterprise_server {
        builder = builder.git_hub_enterprise_server(to_sdk_third_party(server)?);
    }
    if let Some(s3) = &repository.s3_bucket {
        let member = sdk::S3Repository::builder()
            .name(&s3.name)
            .bucket_name(&s3.bucket_name)
            .build()
            .map_err(build_error)?;
        builder = builder.s3_bucket(member);
    }

    Ok(builder.build())
}

fn from_sdk_association(association: &sdk::RepositoryAssociation) -> RepositoryAssociation {
    RepositoryAssociation {
        association_arn: association.association_arn().map(str::to_string),
        association_id: association.association_id().map(str::to_string),
        name: association.name().map(str::to_string),
        owner: association.owner().map(str::to_string),
        provider_type: association
            .provider_type()
            .and_then(|p| p.as_str().parse().ok()),
        connection_arn: association.connection_arn().map(str::to_string),
        state: association.state().and_then(|s| s.as_str().parse().ok()),
        state_reason: association.state_reason().map(str::to_string),
        s3_repository_details: association.s3_repository_details().map(|details| {
            S3RepositoryDetails {
                bucket_name: details.bucket_name().map(str::to_string),
            }
        }),
    }
}

fn from_sdk_summary(summary: &sdk::RepositoryAssociationSummary) -> RepositoryAssociationSummary {
    RepositoryAssociationSummary {
        association_arn: summary.association_arn().map(str::to_string),
        name: summary.name().map(str::to_string),
        owner: summary.owner().map(str::to_string),
        provider_type: summary.provider_type().and_then(|p| p.as_str().parse().ok()),
        connection_arn: summary.connection_arn().map(str::to_string),
        state: summary.state().and_then(|s| s.as_str().parse().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{AssociationState, CodeCommitRepository, ProviderType, S3Repository};

    #[test]
    fn converts_code_commit_repository() {
        let repository = Repository {
            code_commit: Some(CodeCommitRepository {
                name: "my-repo".into(),
            }),
            ..Default::default()
        };
        let converted = to_sdk_repository(&repository).unwrap();

        assert_eq!(converted.code_commit().map(|c| c.name()), Some("my-repo"));
        assert!(converted.bitbucket().is_none());
        assert!(converted.s3_bucket().is_none());
    }

    #[test]
    fn converts_s3_and_third_party_repositories() {
        let repository = Repository {
            s3_bucket: Some(S3Repository {
                name: "my-repo".into(),
                bucket_name: "codeguru-reviewer-bucket".into(),
            }),
            ..Default::default()
        };
        let converted = to_sdk_repository(&repository).unwrap();
        assert_eq!(
            converted.s3_bucket().map(|s| s.bucket_name()),
            Some("codeguru-reviewer-bucket")
        );

        let repository = Repository {
            bitbucket: Some(ThirdPartySourceRepository {
                name: "my-repo".into(),
                connection_arn: "arn:aws:codestar-connections:us-east-1:123:connection/abc".into(),
                owner: "team".into(),
            }),
            ..Default::default()
        };
        let converted = to_sdk_repository(&repository).unwrap();
        assert_eq!(converted.bitbucket().map(|b| b.owner()), Some("team"));
    }

    #[test]
    fn reads_sdk_association() {
        let association = sdk::RepositoryAssociation::builder()
            .association_arn("arn:aws:codeguru-reviewer:us-east-1:123:association:abc")
            .name("my-repo")
            .provider_type(sdk::ProviderType::S3Bucket)
            .state(sdk::RepositoryAssociationState::Associated)
            .s3_repository_details(
                sdk::S3RepositoryDetails::builder()
                    .bucket_name("codeguru-reviewer-bucket")
                    .build(),
            )
            .build();

        let converted = from_sdk_association(&association);
        assert_eq!(converted.provider_type, Some(ProviderType::S3Bucket));
        assert_eq!(converted.state, Some(AssociationState::Associated));
        assert_eq!(
            converted
                .s3_repository_details
                .and_then(|d| d.bucket_name)
                .as_deref(),
            Some("codeguru-reviewer-bucket")
        );
    }
}
