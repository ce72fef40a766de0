use serde::{Deserialize, Serialize};

/// Registered JWT claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // user ID
    pub iss: String, // issuer
    pub iat: usize,  // issued at (unix timestamp)
    pub nbf: usize,  // not before (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
}
