use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateBusinessRequest {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to the owner's account email when omitted.
    pub contact_email: Option<String>,
}
