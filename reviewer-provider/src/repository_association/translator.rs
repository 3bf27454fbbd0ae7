//! Translation between the RepositoryAssociation model and service shapes

use std::collections::HashMap;

use reviewer_core::{ProviderError, ProviderResult};

use super::model::{ResourceModel, Tag};
use crate::service::{
    AssociateRepositoryRequest, CodeCommitRepository, DescribeRepositoryAssociationRequest,
    DescribeRepositoryAssociationResponse, DisassociateRepositoryRequest,
    ListRepositoryAssociationsRequest, ProviderType, Repository, RepositoryAssociationSummary,
    S3Repository, ThirdPartySourceRepository,
};

fn unknown_type(provider_type: &str) -> ProviderError {
    ProviderError::invalid_request(format!("Unknown Type of {}", provider_type))
}

fn third_party(model: &ResourceModel) -> ThirdPartySourceRepository {
    ThirdPartySourceRepository {
        name: model.name.clone().unwrap_or_default(),
        connection_arn: model.connection_arn.clone().unwrap_or_default(),
        owner: model.owner.clone().unwrap_or_default(),
    }
}

/// Request to associate the repository described by `model`
///
/// Exactly one provider member is populated, chosen by the model's type.
pub fn build_create_request(model: &ResourceModel) -> ProviderResult<AssociateRepositoryRequest> {
    let raw_type = model.provider_type.as_deref().unwrap_or_default();
    let provider_type: ProviderType = raw_type.parse().map_err(|_| unknown_type(raw_type))?;
    let name = model.name.clone().unwrap_or_default();

    let repository = match provider_type {
        ProviderType::CodeCommit => Repository {
            code_commit: Some(CodeCommitRepository { name }),
            ..Default::default()
        },
        ProviderType::Bitbucket => Repository {
            bitbucket: Some(third_party(model)),
            ..Default::default()
        },
        ProviderType::GitHubEnterpriseServer => Repository {
            git_hub_enterprise_server: Some(third_party(model)),
            ..Default::default()
        },
        ProviderType::S3Bucket => {
            let bucket_name = model
                .bucket_name
                .clone()
                .filter(|b| !b.is_empty())
                .ok_or_else(|| {
                    ProviderError::invalid_request("BucketName is required for S3Bucket repository.")
                })?;
            Repository {
                s3_bucket: Some(S3Repository { name, bucket_name }),
                ..Default::default()
            }
        }
        // Readable and listable, but associated through the console only
        ProviderType::GitHub => return Err(unknown_type(raw_type)),
    };

    let tags = match model.tags.as_deref() {
        Some(tags) if !tags.is_empty() => {
            let mut map = HashMap::with_capacity(tags.len());
            for tag in tags {
                if map.insert(tag.key.clone(), tag.value.clone()).is_some() {
                    return Err(ProviderError::invalid_request(format!(
                        "Duplicate tag key {}",
                        tag.key
                    )));
                }
            }
            Some(map)
        }
        _ => None,
    };

    Ok(AssociateRepositoryRequest {
        repository,
        client_request_token: None,
        tags,
    })
}

pub fn build_describe_request(association_arn: &str) -> DescribeRepositoryAssociationRequest {
    DescribeRepositoryAssociationRequest {
        association_arn: association_arn.to_string(),
    }
}

pub fn build_delete_request(model: &ResourceModel) -> DisassociateRepositoryRequest {
    DisassociateRepositoryRequest {
        association_arn: model.association_arn.clone().unwrap_or_default(),
    }
}

pub fn build_list_request(next_token: Option<&str>) -> ListRepositoryAssociationsRequest {
    ListRepositoryAssociationsRequest {
        next_token: next_token.map(str::to_string),
    }
}

fn sorted_tags(tags: &HashMap<String, String>) -> Vec<Tag> {
    let mut tags: Vec<Tag> = tags.iter().map(|(k, v)| Tag::new(k, v)).collect();
    tags.sort_by(|a, b| a.key.cmp(&b.key));
    tags
}

pub fn from_describe_response(
    response: &DescribeRepositoryAssociationResponse,
) -> ProviderResult<ResourceModel> {
    let association = response.repository_association.as_ref().ok_or_else(|| {
        ProviderError::internal_failure("DescribeRepositoryAssociation returned no association")
    })?;
    let provider_type = association.provider_type;

    let mut model = ResourceModel {
        name: association.name.clone(),
        provider_type: provider_type.map(|p| p.to_string()),
        connection_arn: association.connection_arn.clone(),
        association_arn: association.association_arn.clone(),
        ..Default::default()
    };

    // CodeCommit and S3 owners are the account itself, not a model property
    if !matches!(
        provider_type,
        Some(ProviderType::CodeCommit) | Some(ProviderType::S3Bucket)
    ) {
        model.owner = association.owner.clone();
    }
    if provider_type == Some(ProviderType::S3Bucket)
        && let Some(details) = &association.s3_repository_details
    {
        model.bucket_name = details.bucket_name.clone();
    }
    if !response.tags.is_empty() {
        model.tags = Some(sorted_tags(&response.tags));
    }

    Ok(model)
}

pub fn from_list_response(summaries: &[RepositoryAssociationSummary]) -> Vec<ResourceModel> {
    summaries
        .iter()
        .map(|summary| ResourceModel {
            name: summary.name.clone(),
            provider_type: summary.provider_type.map(|p| p.to_string()),
            owner: summary.owner.clone(),
            connection_arn: summary.connection_arn.clone(),
            association_arn: summary.association_arn.clone(),
            ..Default::default()
        })
        .collect()
}
