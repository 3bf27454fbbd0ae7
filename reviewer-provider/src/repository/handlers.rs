use reviewer_core::{
    BoxFuture, Delay, HandlerRequest, ProgressEvent, ProviderError, ProviderResult,
    ResourceProvider, Stabilization, Stabilizer, TokioDelay,
};

use super::model::{ResourceModel, TYPE_NAME};
use super::translator;
use crate::client::ReviewerApi;
use crate::error::Operation;
use crate::invoker::Invoker;
use crate::lifecycle::{self, BackoffConfig};
use crate::service::AssociationState;

/// Provider for `AWS::CodeGuruReviewer::Repository`
///
/// Only create, read and delete are supported.
pub struct RepositoryProvider<C, D = TokioDelay> {
    client: C,
    stabilizer: Stabilizer<D>,
    backoff: BackoffConfig,
}

impl<C: ReviewerApi> RepositoryProvider<C> {
    pub fn new(client: C) -> Self {
        Self::with_stabilizer(client, Stabilizer::default())
    }
}

impl<C: ReviewerApi, D: Delay> RepositoryProvider<C, D> {
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
            .ok_or_else(|| ProviderError::not_found(TYPE_NAME, model.name.as_deref()))
    }

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
            Some(arn) if context.create_workflow => arn,
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

    /// Only an `Associated` repository can be disassociated
    pub async fn delete_resource(
        &self,
        request: HandlerRequest<ResourceModel>,
    ) -> ProviderResult<ProgressEvent<ResourceModel>> {
        let model = request.desired_model()?;
        let context = request.context();
        let invoker = self.invoker();
        let arn = Self::association_arn(&model)?;

        match invoker.describe(&translator::build_describe_request(&arn)).await {
            Ok(response) if !context.delete_workflow => {
                let state = response.state();
                if state != Some(AssociationState::Associated) {
                    return Err(ProviderError::general_service(
                        Operation::DisassociateRepository.as_str(),
                        format!(
                            "repository association {} is {}, expected Associated",
                            arn,
                            state.map(|s| s.as_str()).unwrap_or("in an unknown state")
                        ),
                    )
                    .for_resource(TYPE_NAME, Some(&arn)));
                }
            }
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
}

impl<C: ReviewerApi, D: Delay> ResourceProvider for RepositoryProvider<C, D> {
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
}
