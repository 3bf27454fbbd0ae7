use serde::{Deserialize, Serialize};

pub const TYPE_NAME: &str = "AWS::CodeGuruReviewer::Repository";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// CodeCommit or Bitbucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association_arn: Option<String>,
    /// Read-only association state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl ResourceModel {
    pub fn new(name: impl Into<String>, provider_type: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            provider_type: Some(provider_type.into()),
            ..Self::default()
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_connection_arn(mut self, connection_arn: impl Into<String>) -> Self {
        self.connection_arn = Some(connection_arn.into());
        self
    }

    pub fn with_association_arn(mut self, association_arn: impl Into<String>) -> Self {
        self.association_arn = Some(association_arn.into());
        self
    }
}
