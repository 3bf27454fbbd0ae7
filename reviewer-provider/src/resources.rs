//! Resource types served by this provider

use reviewer_core::ResourceType;

use crate::{repository, repository_association};

/// Both types are identified by the association ARN
pub const PRIMARY_IDENTIFIER: &str = "/properties/AssociationArn";

// =============================================================================
// Resource Type Definitions
// =============================================================================

macro_rules! define_resource_type {
    ($name:ident, $type_name:expr, $supports_list:expr) => {
        pub struct $name;
        impl ResourceType for $name {
            fn name(&self) -> &'static str {
                $type_name
            }
            fn primary_identifier(&self) -> &'static str {
                PRIMARY_IDENTIFIER
            }
            fn supports_list(&self) -> bool {
                $supports_list
            }
        }
    };
}

define_resource_type!(RepositoryAssociationType, repository_association::TYPE_NAME, true);
define_resource_type!(RepositoryType, repository::TYPE_NAME, false);

/// Returns all resource types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    vec![Box::new(RepositoryAssociationType), Box::new(RepositoryType)]
}

/// Look up a resource type by its CloudFormation type name
pub fn find_resource_type(type_name: &str) -> Option<Box<dyn ResourceType>> {
    resource_types().into_iter().find(|t| t.name() == type_name)
}
