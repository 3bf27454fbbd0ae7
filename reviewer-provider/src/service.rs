//! Request and response shapes of the CodeGuru Reviewer association API
//!
//! These mirror the service vocabulary so the translators stay pure; the
//! SDK-backed client converts them to and from `aws_sdk_codegurureviewer`
//! types at the edge.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Source-control system backing an association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    CodeCommit,
    Bitbucket,
    GitHubEnterpriseServer,
    S3Bucket,
    GitHub,
}

impl ProviderType {
    pub const ALL: [ProviderType; 5] = [
        ProviderType::CodeCommit,
        ProviderType::Bitbucket,
        ProviderType::GitHubEnterpriseServer,
        ProviderType::S3Bucket,
        ProviderType::GitHub,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::CodeCommit => "CodeCommit",
            ProviderType::Bitbucket => "Bitbucket",
            ProviderType::GitHubEnterpriseServer => "GitHubEnterpriseServer",
            ProviderType::S3Bucket => "S3Bucket",
            ProviderType::GitHub => "GitHub",
        }
    }

    /// Providers whose repositories live outside AWS and need a connection
    pub fn is_third_party(&self) -> bool {
        matches!(
            self,
            ProviderType::Bitbucket | ProviderType::GitHubEnterpriseServer | ProviderType::GitHub
        )
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderType::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Lifecycle state reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationState {
    Pending,
    Associating,
    Associated,
    Failed,
    Disassociating,
    Disassociated,
}

impl AssociationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssociationState::Pending => "Pending",
            AssociationState::Associating => "Associating",
            AssociationState::Associated => "Associated",
            AssociationState::Failed => "Failed",
            AssociationState::Disassociating => "Disassociating",
            AssociationState::Disassociated => "Disassociated",
        }
    }
}

impl fmt::Display for AssociationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssociationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(AssociationState::Pending),
            "Associating" => Ok(AssociationState::Associating),
            "Associated" => Ok(AssociationState::Associated),
            "Failed" => Ok(AssociationState::Failed),
            "Disassociating" => Ok(AssociationState::Disassociating),
            "Disassociated" => Ok(AssociationState::Disassociated),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeCommitRepository {
    pub name: String,
}

/// Bitbucket or GitHub Enterprise Server repository reached through a connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThirdPartySourceRepository {
    pub name: String,
    pub connection_arn: String,
    pub owner: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3Repository {
    pub name: String,
    pub bucket_name: String,
}

/// Repository descriptor; exactly one member is populated in a valid request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    pub code_commit: Option<CodeCommitRepository>,
    pub bitbucket: Option<ThirdPartySourceRepository>,
    pub git_hub_enterprise_server: Option<ThirdPartySourceRepository>,
    pub s3_bucket: Option<S3Repository>,
}

impl Repository {
    /// Number of populated provider members
    pub fn populated(&self) -> usize {
        [
            self.code_commit.is_some(),
            self.bitbucket.is_some(),
            self.git_hub_enterprise_server.is_some(),
            self.s3_bucket.is_some(),
        ]
        .into_iter()
        .filter(|p| *p)
        .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociateRepositoryRequest {
    pub repository: Repository,
    pub client_request_token: Option<String>,
    /// Omitted entirely when the model carries no tags
    pub tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeRepositoryAssociationRequest {
    pub association_arn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisassociateRepositoryRequest {
    pub association_arn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRepositoryAssociationsRequest {
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3RepositoryDetails {
    pub bucket_name: Option<String>,
}

/// Association record as described by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryAssociation {
    pub association_arn: Option<String>,
    pub association_id: Option<String>,
    pub name: Option<String>,
    pub owner: Option<String>,
    pub provider_type: Option<ProviderType>,
    pub connection_arn: Option<String>,
    pub state: Option<AssociationState>,
    pub state_reason: Option<String>,
    pub s3_repository_details: Option<S3RepositoryDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociateRepositoryResponse {
    pub repository_association: Option<RepositoryAssociation>,
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeRepositoryAssociationResponse {
    pub repository_association: Option<RepositoryAssociation>,
    pub tags: HashMap<String, String>,
}

impl DescribeRepositoryAssociationResponse {
    pub fn state(&self) -> Option<AssociationState> {
        self.repository_association.as_ref().and_then(|a| a.state)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisassociateRepositoryResponse {
    pub repository_association: Option<RepositoryAssociation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryAssociationSummary {
    pub association_arn: Option<String>,
    pub name: Option<String>,
    pub owner: Option<String>,
    pub provider_type: Option<ProviderType>,
    pub connection_arn: Option<String>,
    pub state: Option<AssociationState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRepositoryAssociationsResponse {
    pub repository_association_summaries: Vec<RepositoryAssociationSummary>,
    pub next_token: Option<String>,
}
