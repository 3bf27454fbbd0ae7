//! Scripted association API and delay recorder for handler tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reviewer_core::{BoxFuture, Delay};

use crate::client::ReviewerApi;
use crate::error::ServiceError;
use crate::service::{
    AssociateRepositoryRequest, AssociateRepositoryResponse, AssociationState,
    DescribeRepositoryAssociationRequest, DescribeRepositoryAssociationResponse,
    DisassociateRepositoryRequest, DisassociateRepositoryResponse,
    ListRepositoryAssociationsRequest, ListRepositoryAssociationsResponse, ProviderType,
    RepositoryAssociation,
};

pub const ASSOCIATION_ARN: &str =
    "arn:aws:codeguru-reviewer:us-east-1:123456789012:association:a1b2c3d4";

type Script<T> = Mutex<VecDeque<Result<T, ServiceError>>>;

/// A recorded call to the association API
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Associate(AssociateRepositoryRequest),
    Describe(String),
    Disassociate(String),
    List(Option<String>),
}

/// Association API that replays scripted responses in order
///
/// A call with nothing left in its script fails with an unclassified error,
/// which surfaces as InternalFailure.
#[derive(Default)]
pub struct MockClient {
    associate: Script<AssociateRepositoryResponse>,
    describe: Script<DescribeRepositoryAssociationResponse>,
    disassociate: Script<DisassociateRepositoryResponse>,
    list: Script<ListRepositoryAssociationsResponse>,
    calls: Mutex<Vec<Call>>,
}

fn next<T>(script: &Script<T>, operation: &str) -> Result<T, ServiceError> {
    script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| {
            Err(ServiceError::Unclassified {
                code: "Unscripted".into(),
                message: format!("no scripted response for {}", operation),
            })
        })
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_associate(self, result: Result<AssociateRepositoryResponse, ServiceError>) -> Self {
        self.associate.lock().unwrap().push_back(result);
        self
    }

    pub fn on_describe(
        self,
        result: Result<DescribeRepositoryAssociationResponse, ServiceError>,
    ) -> Self {
        self.describe.lock().unwrap().push_back(result);
        self
    }

    pub fn on_disassociate(
        self,
        result: Result<DisassociateRepositoryResponse, ServiceError>,
    ) -> Self {
        self.disassociate.lock().unwrap().push_back(result);
        self
    }

    pub fn on_list(self, result: Result<ListRepositoryAssociationsResponse, ServiceError>) -> Self {
        self.list.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub fn associate_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Associate(_)))
    }

    pub fn describe_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Describe(_)))
    }

    pub fn disassociate_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Disassociate(_)))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ReviewerApi for MockClient {
    async fn associate_repository(
        &self,
        request: &AssociateRepositoryRequest,
    ) -> Result<AssociateRepositoryResponse, ServiceError> {
        self.record(Call::Associate(request.clone()));
        next(&self.associate, "AssociateRepository")
    }

    async fn describe_repository_association(
        &self,
        request: &DescribeRepositoryAssociationRequest,
    ) -> Result<DescribeRepositoryAssociationResponse, ServiceError> {
        self.record(Call::Describe(request.association_arn.clone()));
        next(&self.describe, "DescribeRepositoryAssociation")
    }

    async fn disassociate_repository(
        &self,
        request: &DisassociateRepositoryRequest,
    ) -> Result<DisassociateRepositoryResponse, ServiceError> {
        self.record(Call::Disassociate(request.association_arn.clone()));
        next(&self.disassociate, "DisassociateRepository")
    }

    async fn list_repository_associations(
        &self,
        request: &ListRepositoryAssociationsRequest,
    ) -> Result<ListRepositoryAssociationsResponse, ServiceError> {
        self.record(Call::List(request.next_token.clone()));
        next(&self.list, "ListRepositoryAssociations")
    }
}

/// Delay that records requested pauses and returns immediately
#[derive(Default)]
pub struct RecordingDelay {
    calls: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

impl Delay for RecordingDelay {
    fn delay(&self, duration: Duration) -> BoxFuture<'_, ()> {
        self.calls.lock().unwrap().push(duration);
        Box::pin(async {})
    }
}

pub fn association(provider_type: ProviderType, state: AssociationState) -> RepositoryAssociation {
    RepositoryAssociation {
        association_arn: Some(ASSOCIATION_ARN.to_string()),
        association_id: Some("a1b2c3d4".to_string()),
        name: Some("my-repo".to_string()),
        owner: Some("123456789012".to_string()),
        provider_type: Some(provider_type),
        connection_arn: None,
        state: Some(state),
        state_reason: None,
        s3_repository_details: None,
    }
}

pub fn associated(provider_type: ProviderType) -> AssociateRepositoryResponse {
    AssociateRepositoryResponse {
        repository_association: Some(association(provider_type, AssociationState::Associating)),
        tags: HashMap::new(),
    }
}

pub fn described(
    provider_type: ProviderType,
    state: AssociationState,
) -> DescribeRepositoryAssociationResponse {
    DescribeRepositoryAssociationResponse {
        repository_association: Some(association(provider_type, state)),
        tags: HashMap::new(),
    }
}

pub fn disassociated() -> DisassociateRepositoryResponse {
    DisassociateRepositoryResponse {
        repository_association: Some(association(
            ProviderType::CodeCommit,
            AssociationState::Disassociating,
        )),
    }
}

pub fn not_found() -> ServiceError {
    ServiceError::NotFound("Repository association not found".to_string())
}
