use serde::Serialize;

/// Body of a submission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPayload<'a> {
    pub text: &'a str,
    pub is_final: bool,
}
