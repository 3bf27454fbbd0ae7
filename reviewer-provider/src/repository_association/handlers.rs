//! Lifecycle handlers of `AWS::CodeGuruReviewer::RepositoryAssociation`

use reviewer_core::{
    BoxFuture, Delay, HandlerRequest, ProgressEvent, ProviderError, ProviderResult,
    ResourceProvider, Stabilization, Stabilizer, TokioDelay,
};

use super::model::{ResourceModel, TYPE_NAME};
use super::translator;
use crate::client::ReviewerApi;
use crate::invoker::Invoker;
use crate::lifecycle::{self, BackoffConfig};

/// Provider for `AWS::CodeGuruReviewer::RepositoryAssociation`
pub struct RepositoryAssociationProvider<C, D = TokioDelay> {
    client: C,
    stabilizer: Stabilizer<D>,
    backoff: BackoffConfig,
}

impl<C: ReviewerApi> RepositoryAssociationProvider<C> {
    pub fn new(client: C) -> Self {
        Self::with_stabilizer(client, Stabilizer::default())
    }
}

impl<C: ReviewerApi, D: Delay> RepositoryAssociationProvider<C, D> {
    pub fn with_stabilizer(client: C, stabilizer: Stabilizer<D>) -> Self {
        Self {
            client,
            stabilizer,
            backoff: BackoffConfig::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    fn invoker(&self) -> Invoker<'_, C> {
        Invoker::new(&self.client, TYPE_NAME)
    }

    fn association_arn(model: &ResourceModel) -> ProviderResult<String> {
        model
            .association_arn
            .clone()
            .filter(|arn| !arn.is_empty())
            .ok_or_else(|| ProviderError::not_found(TYPE_NAME, None))
    }

    /// Describe the association and translate it into a model
    pub async fn read_model(&self, model: &ResourceModel) -> ProviderResult<ResourceModel> {
        let arn = Self::association_arn(model)?;
        let response = self
            .invoker()
            .describe(&translator::build_describe_request(&arn))
            .await?;
        let read = translator::from_describe_response(&response)
            .map_err(|e| e.for_resource(TYPE_NAME, Some(&arn)))?;
        log::info!("{} [{}] has successfully been read.", TYPE_NAME, arn);
        Ok(read)
    }

    pub async fn create_resource(
        &self,
        request: HandlerRequest<ResourceModel>,
    ) -> ProviderResult<ProgressEvent<ResourceModel>> {
        let mut model = request.desired_model()?;
        let context = request.context();
        let invoker = self.invoker();

        let arn = match model.association_arn.clone() {
            Some(arn) if context.create_workflow => {
                log::info!("{} [{}] resuming stabilization", TYPE_NAME, arn);
                arn
            }
            _ => {
                let mut create_request = translator::build_create_request(&model)?;
                create_request.client_request_token = request.client_request_token.clone();

                let response = invoker
                    .associate(&create_request, model.name.as_deref())
                    .await?;
                let arn = response
                    .repository_association
                    .and_then(|a| a.association_arn)
                    .ok_or_else(|| {
                        ProviderError::internal_failure("AssociateRepository returned no association ARN")
                            .for_resource(TYPE_NAME, model.name.as_deref())
                    })?;
                log::info!("{} [{}] successfully created.", TYPE_NAME, arn);
                model.association_arn = Some(arn.clone());
                arn
            }
        };

        match lifecycle::stabilize_on_create(&invoker, &self.stabilizer, &arn).await? {
            Stabilization::Stabilized { .. } => Ok(ProgressEvent::success(self.read_model(&model).await?)),
            Stabilization::AttemptsExhausted { .. } => Ok(ProgressEvent::in_progress(
                model,
                context.with_create_workflow(),
                self.stabilizer.config().delay,
            )),
        }
    }

    pub async fn read_resource(
        &self,
        request: HandlerRequest<ResourceModel>,
    ) -> ProviderResult<ProgressEvent<ResourceModel>> {
        let model = request.desired_model()?;
        Ok(ProgressEvent::success(self.read_model(&model).await?))
    }

    pub async fn delete_resource(
        &self,
        request: HandlerRequest<ResourceModel>,
    ) -> ProviderResult<ProgressEvent<ResourceModel>> {
        let model = request.desired_model()?;
        let context = request.context();
        let invoker = self.invoker();
        let arn = Self::association_arn(&model)?;

        match invoker.describe(&translator::build_describe_request(&arn)).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() && context.delete_workflow => {
                log::info!("{} [{}] already gone, verifying deletion", TYPE_NAME, arn);
            }
            Err(e) => return Err(e),
        }

        if !context.delete_workflow {
            lifecycle::disassociate_with_backoff(
                &invoker,
                &self.stabilizer,
                &self.backoff,
                &translator::build_delete_request(&model),
            )
            .await?;
            log::info!("{} [{}] successfully deleted.", TYPE_NAME, arn);
        }

        match lifecycle::stabilize_on_delete(&invoker, &self.stabilizer, &arn).await? {
            Stabilization::Stabilized { .. } => Ok(ProgressEvent::success(model)),
            Stabilization::AttemptsExhausted { .. } => Ok(ProgressEvent::in_progress(
                model,
                context.with_delete_workflow(),
                self.stabilizer.config().delay,
            )),
        }
    }

    pub async fn list_resources(
        &self,
        request: HandlerRequest<ResourceModel>,
    ) -> ProviderResult<ProgressEvent<ResourceModel>> {
        let response = self
            .invoker()
            .list(&translator::build_list_request(request.next_token.as_deref()))
            .await?;
        let models = translator::from_list_response(&response.repository_association_summaries);
        log::info!("{} listed {} association(s)", TYPE_NAME, models.len());
        Ok(ProgressEvent::listed(models, response.next_token))
    }
}

impl<C: ReviewerApi, D: Delay> ResourceProvider for RepositoryAssociationProvider<C, D> {
    type Model = ResourceModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn create(
        &self,
        request: HandlerRequest<ResourceModel>,
    ) -> BoxFuture<'_, ProviderResult<ProgressEvent<ResourceModel>>> {
        Box::pin(self.create_resource(request))
    }

    fn read(
        &self,
        request: HandlerRequest<ResourceModel>,
    ) -> BoxFuture<'_, ProviderResult<ProgressEvent<ResourceModel>>> {
        Box::pin(self.read_resource(request))
    }

    fn delete(
        &self,
        request: HandlerRequest<ResourceModel>,
    ) -> BoxFuture<'_, ProviderResult<ProgressEvent<ResourceModel>>> {
        Box::pin(self.delete_resource(request))
    }

    fn list(
        &self,
        request: HandlerRequest<ResourceModel>,
    ) -> BoxFuture<'_, ProviderResult<ProgressEvent<ResourceModel>>> {
        Box::pin(self.list_resources(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::repository_association::model::Tag;
    use crate::service::{
        AssociationState, DescribeRepositoryAssociationResponse, ListRepositoryAssociationsResponse,
        ProviderType, RepositoryAssociationSummary,
    };
    use crate::testing::{
        ASSOCIATION_ARN, Call, MockClient, RecordingDelay, associated, described, disassociated,
        not_found,
    };
    use reviewer_core::{
        Action, CallbackContext, HandlerErrorCode, OperationStatus, StabilizeConfig, dispatch,
    };
    use std::sync::Arc;
    use std::time::Duration;

    type TestProvider = RepositoryAssociationProvider<Arc<MockClient>, Arc<RecordingDelay>>;

    fn provider(client: MockClient) -> (TestProvider, Arc<MockClient>, Arc<RecordingDelay>) {
        let client = Arc::new(client);
        let delay = Arc::new(RecordingDelay::default());
        let provider = RepositoryAssociationProvider::with_stabilizer(
            client.clone(),
            Stabilizer::with_delay(StabilizeConfig::default(), delay.clone()),
        );
        (provider, client, delay)
    }

    fn code_commit_model() -> ResourceModel {
        ResourceModel::new("my-repo", "CodeCommit")
    }

    fn existing_model() -> ResourceModel {
        code_commit_model().with_association_arn(ASSOCIATION_ARN)
    }

    #[tokio::test]
    async fn create_succeeds_and_reads_back() {
        let client = MockClient::new()
            .on_associate(Ok(associated(ProviderType::CodeCommit)))
            .on_describe(Ok(described(ProviderType::CodeCommit, AssociationState::Associating)))
            .on_describe(Ok(described(ProviderType::CodeCommit, AssociationState::Associated)))
            .on_describe(Ok(described(ProviderType::CodeCommit, AssociationState::Associated)));
        let (provider, client, delay) = provider(client);

        let request = HandlerRequest::new(code_commit_model()).with_client_request_token("token-1");
        let event = dispatch(&provider, Action::Create, request).await;

        assert_eq!(event.status(), OperationStatus::Success);
        assert_eq!(event.model(), Some(&existing_model()));
        assert_eq!(client.associate_calls(), 1);
        assert_eq!(client.describe_calls(), 3);
        assert_eq!(delay.calls(), vec![Duration::from_millis(7000)]);

        match &client.calls()[0] {
            Call::Associate(request) => {
                assert_eq!(request.client_request_token.as_deref(), Some("token-1"));
                assert!(request.repository.code_commit.is_some());
            }
            other => panic!("unexpected first call {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_failed_association_is_not_stabilized() {
        let client = MockClient::new()
            .on_associate(Ok(associated(ProviderType::CodeCommit)))
            .on_describe(Ok(described(ProviderType::CodeCommit, AssociationState::Failed)));
        let (provider, _, _) = provider(client);

        let event = dispatch(&provider, Action::Create, HandlerRequest::new(code_commit_model())).await;

        assert_eq!(event.error_code(), Some(HandlerErrorCode::NotStabilized));
    }

    #[tokio::test]
    async fn create_requests_continuation_when_attempts_run_out() {
        let mut client = MockClient::new().on_associate(Ok(associated(ProviderType::CodeCommit)));
        for _ in 0..5 {
            client = client.on_describe(Ok(described(
                ProviderType::CodeCommit,
                AssociationState::Associating,
            )));
        }
        let (provider, client, delay) = provider(client);

        let event = dispatch(&provider, Action::Create, HandlerRequest::new(code_commit_model())).await;

        assert_eq!(event.status(), OperationStatus::InProgress);
        assert_eq!(event.context(), Some(CallbackContext::default().with_create_workflow()));
        assert_eq!(
            event.model().and_then(|m| m.association_arn.as_deref()),
            Some(ASSOCIATION_ARN)
        );
        assert_eq!(client.describe_calls(), 5);
        assert_eq!(delay.calls().len(), 4);
    }

    #[tokio::test]
    async fn create_continuation_skips_associate() {
        let client = MockClient::new()
            .on_describe(Ok(described(ProviderType::CodeCommit, AssociationState::Associated)))
            .on_describe(Ok(described(ProviderType::CodeCommit, AssociationState::Associated)));
        let (provider, client, _) = provider(client);

        let request = HandlerRequest::new(existing_model())
            .with_callback_context(CallbackContext::default().with_create_workflow());
        let event = dispatch(&provider, Action::Create, request).await;

        assert_eq!(event.status(), OperationStatus::Success);
        assert_eq!(client.associate_calls(), 0);
    }

    #[tokio::test]
    async fn create_rejects_s3_without_bucket_before_calling_service() {
        let (provider, client, _) = provider(MockClient::new());

        let event = dispatch(
            &provider,
            Action::Create,
            HandlerRequest::new(ResourceModel::new("my-repo", "S3Bucket")),
        )
        .await;

        assert_eq!(event.error_code(), Some(HandlerErrorCode::InvalidRequest));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn create_classifies_associate_errors() {
        let cases = [
            (ServiceError::InternalServer("x".into()), HandlerErrorCode::ServiceInternalError),
            (ServiceError::Validation("x".into()), HandlerErrorCode::InvalidRequest),
            (ServiceError::AccessDenied("x".into()), HandlerErrorCode::AccessDenied),
            (ServiceError::Conflict("x".into()), HandlerErrorCode::AlreadyExists),
            (ServiceError::Throttling("x".into()), HandlerErrorCode::Throttling),
            (ServiceError::NotFound("x".into()), HandlerErrorCode::NotFound),
            (ServiceError::Transport("x".into()), HandlerErrorCode::InternalFailure),
        ];

        for (error, code) in cases {
            let (provider, _, _) = provider(MockClient::new().on_associate(Err(error)));
            let event =
                dispatch(&provider, Action::Create, HandlerRequest::new(code_commit_model())).await;
            assert_eq!(event.error_code(), Some(code));
        }
    }

    #[tokio::test]
    async fn read_without_arn_is_not_found() {
        let (provider, client, _) = provider(MockClient::new());

        let event = dispatch(&provider, Action::Read, HandlerRequest::new(code_commit_model())).await;

        assert_eq!(event.error_code(), Some(HandlerErrorCode::NotFound));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn read_returns_described_model() {
        let mut response = described(ProviderType::CodeCommit, AssociationState::Associated);
        response.tags.insert("team".into(), "platform".into());
        let (provider, _, _) = provider(MockClient::new().on_describe(Ok(response)));

        let event = dispatch(&provider, Action::Read, HandlerRequest::new(existing_model())).await;

        let expected = existing_model().with_tags(vec![Tag::new("team", "platform")]);
        assert_eq!(event.model(), Some(&expected));
    }

    #[tokio::test]
    async fn read_without_association_is_internal_failure() {
        let client =
            MockClient::new().on_describe(Ok(DescribeRepositoryAssociationResponse::default()));
        let (provider, _, _) = provider(client);

        let event = dispatch(&provider, Action::Read, HandlerRequest::new(existing_model())).await;

        assert_eq!(event.status(), OperationStatus::Failed);
        assert_eq!(event.error_code(), Some(HandlerErrorCode::InternalFailure));
        assert!(event.model().is_none());
    }

    #[tokio::test]
    async fn create_fails_when_final_read_has_no_association() {
        let client = MockClient::new()
            .on_associate(Ok(associated(ProviderType::CodeCommit)))
            .on_describe(Ok(described(ProviderType::CodeCommit, AssociationState::Associated)))
            .on_describe(Ok(DescribeRepositoryAssociationResponse::default()));
        let (provider, _, _) = provider(client);

        let event = dispatch(&provider, Action::Create, HandlerRequest::new(code_commit_model())).await;

        assert_eq!(event.error_code(), Some(HandlerErrorCode::InternalFailure));
    }

    #[tokio::test]
    async fn read_propagates_not_found() {
        let (provider, _, _) = provider(MockClient::new().on_describe(Err(not_found())));

        let event = dispatch(&provider, Action::Read, HandlerRequest::new(existing_model())).await;

        assert_eq!(event.error_code(), Some(HandlerErrorCode::NotFound));
    }

    #[tokio::test]
    async fn delete_succeeds_once_gone() {
        let client = MockClient::new()
            .on_describe(Ok(described(ProviderType::CodeCommit, AssociationState::Associated)))
            .on_disassociate(Ok(disassociated()))
            .on_describe(Err(not_found()));
        let (provider, client, _) = provider(client);

        let event = dispatch(&provider, Action::Delete, HandlerRequest::new(existing_model())).await;

        assert_eq!(event.status(), OperationStatus::Success);
        assert_eq!(event.model(), Some(&existing_model()));
        assert_eq!(client.disassociate_calls(), 1);
    }

    #[tokio::test]
    async fn delete_of_missing_association_is_not_found() {
        let (provider, client, _) = provider(MockClient::new().on_describe(Err(not_found())));

        let event = dispatch(&provider, Action::Delete, HandlerRequest::new(existing_model())).await;

        assert_eq!(event.error_code(), Some(HandlerErrorCode::NotFound));
        assert_eq!(client.disassociate_calls(), 0);
    }

    #[tokio::test]
    async fn delete_continuation_tolerates_missing_association() {
        let client = MockClient::new()
            .on_describe(Err(not_found()))
            .on_describe(Err(not_found()));
        let (provider, client, _) = provider(client);

        let request = HandlerRequest::new(existing_model())
            .with_callback_context(CallbackContext::default().with_delete_workflow());
        let event = dispatch(&provider, Action::Delete, request).await;

        assert_eq!(event.status(), OperationStatus::Success);
        assert_eq!(client.disassociate_calls(), 0);
    }

    #[tokio::test]
    async fn delete_ignores_errors_while_waiting() {
        let client = MockClient::new()
            .on_describe(Ok(described(ProviderType::CodeCommit, AssociationState::Associated)))
            .on_disassociate(Ok(disassociated()))
            .on_describe(Err(ServiceError::AccessDenied("flaky".into())))
            .on_describe(Err(ServiceError::InternalServer("flaky".into())))
            .on_describe(Err(not_found()));
        let (provider, _, _) = provider(client);

        let event = dispatch(&provider, Action::Delete, HandlerRequest::new(existing_model())).await;

        assert_eq!(event.status(), OperationStatus::Success);
    }

    #[tokio::test]
    async fn delete_requests_continuation_while_disassociating() {
        let mut client = MockClient::new()
            .on_describe(Ok(described(ProviderType::CodeCommit, AssociationState::Associated)))
            .on_disassociate(Ok(disassociated()));
        for _ in 0..5 {
            client = client.on_describe(Ok(described(
                ProviderType::CodeCommit,
                AssociationState::Disassociating,
            )));
        }
        let (provider, _, _) = provider(client);

        let event = dispatch(&provider, Action::Delete, HandlerRequest::new(existing_model())).await;

        assert_eq!(event.status(), OperationStatus::InProgress);
        assert_eq!(event.context(), Some(CallbackContext::default().with_delete_workflow()));
    }

    #[tokio::test]
    async fn delete_surfaces_persistent_throttling() {
        let client = MockClient::new()
            .on_describe(Ok(described(ProviderType::CodeCommit, AssociationState::Associated)))
            .on_disassociate(Err(ServiceError::Throttling("1".into())))
            .on_disassociate(Err(ServiceError::Throttling("2".into())))
            .on_disassociate(Err(ServiceError::Throttling("3".into())));
        let (provider, client, delay) = provider(client);

        let event = dispatch(&provider, Action::Delete, HandlerRequest::new(existing_model())).await;

        assert_eq!(event.error_code(), Some(HandlerErrorCode::Throttling));
        assert_eq!(client.disassociate_calls(), 3);
        assert_eq!(delay.calls(), vec![Duration::from_millis(1000); 2]);
    }

    #[tokio::test]
    async fn list_passes_token_through() {
        let client = MockClient::new().on_list(Ok(ListRepositoryAssociationsResponse {
            repository_association_summaries: vec![RepositoryAssociationSummary {
                association_arn: Some(ASSOCIATION_ARN.into()),
                name: Some("my-repo".into()),
                provider_type: Some(ProviderType::CodeCommit),
                state: Some(AssociationState::Associated),
                ..Default::default()
            }],
            next_token: Some("page-3".into()),
        }));
        let (provider, client, _) = provider(client);

        let request = HandlerRequest::default().with_next_token("page-2");
        let event = dispatch(&provider, Action::List, request).await;

        match event {
            ProgressEvent::Listed { models, next_token } => {
                assert_eq!(models, vec![existing_model()]);
                assert_eq!(next_token.as_deref(), Some("page-3"));
            }
            other => panic!("expected a listing, got {:?}", other),
        }
        assert_eq!(client.calls(), vec![Call::List(Some("page-2".into()))]);
    }

    #[tokio::test]
    async fn list_of_nothing_is_empty() {
        let client = MockClient::new().on_list(Ok(ListRepositoryAssociationsResponse::default()));
        let (provider, _, _) = provider(client);

        let event = dispatch(&provider, Action::List, HandlerRequest::default()).await;

        assert_eq!(event, ProgressEvent::listed(vec![], None));
    }
}
