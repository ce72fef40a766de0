use serde::Deserialize;

use super::repo_types::OrganizationType;

#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact_info: String,
    pub organization_type: OrganizationType,
}

#[derive(Debug, Deserialize)]
pub struct PatchOrganizationRequest {
    pub name: Option<String>,
    pub unique_url: Option<String>,
    pub address: Option<String>,
    pub contact_info: Option<String>,
    pub organization_type: Option<OrganizationType>,
}
