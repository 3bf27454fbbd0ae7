//! Invoker - Issues one service call and classifies its failure
//!
//! Handlers never call [`ReviewerApi`] directly; every call goes through an
//! [`Invoker`] so failures reach the host already mapped to a
//! [`reviewer_core::HandlerErrorCode`] and named after the operation and
//! resource involved.

use reviewer_core::ProviderResult;

use crate::client::ReviewerApi;
use crate::error::Operation;
use crate::service::{
    AssociateRepositoryRequest, AssociateRepositoryResponse, DescribeRepositoryAssociationRequest,
    DescribeRepositoryAssociationResponse, DisassociateRepositoryRequest,
    DisassociateRepositoryResponse, ListRepositoryAssociationsRequest,
    ListRepositoryAssociationsResponse,
};

pub struct Invoker<'a, C: ?Sized> {
    client: &'a C,
    type_name: &'static str,
}

impl<'a, C: ReviewerApi + ?Sized> Invoker<'a, C> {
    pub fn new(client: &'a C, type_name: &'static str) -> Self {
        Self { client, type_name }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// `name` identifies the repository in an AlreadyExists error
    pub async fn associate(
        &self,
        request: &AssociateRepositoryRequest,
        name: Option<&str>,
    ) -> ProviderResult<AssociateRepositoryResponse> {
        log::debug!("{} {}", Operation::AssociateRepository, name.unwrap_or_default());
        self.client
            .associate_repository(request)
            .await
            .map_err(|e| e.into_provider_error(Operation::AssociateRepository, self.type_name, name))
    }

    pub async fn describe(
        &self,
        request: &DescribeRepositoryAssociationRequest,
    ) -> ProviderResult<DescribeRepositoryAssociationResponse> {
        log::debug!(
            "{} {}",
            Operation::DescribeRepositoryAssociation,
            request.association_arn
        );
        self.client
            .describe_repository_association(request)
            .await
            .map_err(|e| {
                e.into_provider_error(
                    Operation::DescribeRepositoryAssociation,
                    self.type_name,
                    Some(&request.association_arn),
                )
            })
    }

    pub async fn disassociate(
        &self,
        request: &DisassociateRepositoryRequest,
    ) -> ProviderResult<DisassociateRepositoryResponse> {
        log::debug!("{} {}", Operation::DisassociateRepository, request.association_arn);
        self.client
            .disassociate_repository(request)
            .await
            .map_err(|e| {
                e.into_provider_error(
                    Operation::DisassociateRepository,
                    self.type_name,
                    Some(&request.association_arn),
                )
            })
    }

    pub async fn list(
        &self,
        request: &ListRepositoryAssociationsRequest,
    ) -> ProviderResult<ListRepositoryAssociationsResponse> {
        log::debug!(
            "{} (next token: {})",
            Operation::ListRepositoryAssociations,
            request.next_token.as_deref().unwrap_or("none")
        );
        self.client
            .list_repository_associations(request)
            .await
            .map_err(|e| {
                e.into_provider_error(Operation::ListRepositoryAssociations, self.type_name, None)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::testing::MockClient;
    use reviewer_core::HandlerErrorCode;

    const TYPE_NAME: &str = "Test::Type";

    #[tokio::test]
    async fn describe_not_found_names_the_arn() {
        let client = MockClient::new().on_describe(Err(ServiceError::NotFound("gone".into())));
        let invoker = Invoker::new(&client, TYPE_NAME);

        let err = invoker
            .describe(&DescribeRepositoryAssociationRequest {
                association_arn: "arn:test".into(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, HandlerErrorCode::NotFound);
        assert_eq!(
            err.message,
            "Resource of type 'Test::Type' with identifier 'arn:test' was not found."
        );
    }

    #[tokio::test]
    async fn associate_conflict_is_already_exists() {
        let client = MockClient::new().on_associate(Err(ServiceError::Conflict("dup".into())));
        let invoker = Invoker::new(&client, TYPE_NAME);

        let err = invoker
            .associate(&AssociateRepositoryRequest::default(), Some("my-repo"))
            .await
            .unwrap_err();

        assert_eq!(err.code, HandlerErrorCode::AlreadyExists);
        assert_eq!(err.identifier.as_deref(), Some("my-repo"));
    }

    #[tokio::test]
    async fn list_throttling_names_the_operation() {
        let client = MockClient::new().on_list(Err(ServiceError::Throttling("slow".into())));
        let invoker = Invoker::new(&client, TYPE_NAME);

        let err = invoker
            .list(&ListRepositoryAssociationsRequest::default())
            .await
            .unwrap_err();

        assert_eq!(err.code, HandlerErrorCode::Throttling);
        assert!(err.message.contains("ListRepositoryAssociations"));
    }

    #[tokio::test]
    async fn unclassified_errors_are_internal_failures() {
        let client = MockClient::new().on_disassociate(Err(ServiceError::Transport(
            "connection reset".into(),
        )));
        let invoker = Invoker::new(&client, TYPE_NAME);

        let err = invoker
            .disassociate(&DisassociateRepositoryRequest {
                association_arn: "arn:test".into(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, HandlerErrorCode::InternalFailure);
    }
}
