use serde::Deserialize;

/// Body of `PATCH /user/me`. Omitted or empty fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct PatchUserRequest {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}
