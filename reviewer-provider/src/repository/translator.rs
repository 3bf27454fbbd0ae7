use reviewer_core::{ProviderError, ProviderResult};

use super::model::ResourceModel;
use crate::service::{
    AssociateRepositoryRequest, CodeCommitRepository, DescribeRepositoryAssociationRequest,
    DescribeRepositoryAssociationResponse, DisassociateRepositoryRequest, ProviderType, Repository,
    ThirdPartySourceRepository,
};

/// Request to associate a CodeCommit or Bitbucket repository
pub fn build_create_request(model: &ResourceModel) -> ProviderResult<AssociateRepositoryRequest> {
    let raw_type = model.provider_type.as_deref().unwrap_or_default();
    let name = model.name.clone().unwrap_or_default();

    let repository = match raw_type.parse::<ProviderType>() {
        Ok(ProviderType::CodeCommit) => Repository {
            code_commit: Some(CodeCommitRepository { name }),
            ..Default::default()
        },
        Ok(ProviderType::Bitbucket) => Repository {
            bitbucket: Some(ThirdPartySourceRepository {
                name,
                connection_arn: model.connection_arn.clone().unwrap_or_default(),
                owner: model.owner.clone().unwrap_or_default(),
            }),
            ..Default::default()
        },
        _ => {
            return Err(ProviderError::invalid_request(format!(
                "Unknown ProviderType of {}",
                raw_type
            )));
        }
    };

    Ok(AssociateRepositoryRequest {
        repository,
        ..Default::default()
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

pub fn from_describe_response(
    response: &DescribeRepositoryAssociationResponse,
) -> ProviderResult<ResourceModel> {
    let association = response.repository_association.as_ref().ok_or_else(|| {
        ProviderError::internal_failure("DescribeRepositoryAssociation returned no association")
    })?;

    Ok(ResourceModel {
        name: association.name.clone(),
        provider_type: association.provider_type.map(|p| p.to_string()),
        owner: association.owner.clone(),
        connection_arn: association.connection_arn.clone(),
        association_arn: association.association_arn.clone(),
        state: association.state.map(|s| s.to_string()),
    })
}
