use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
}
