use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("malformed payload field `{field}`: {detail}")]
    MalformedPayload { field: String, detail: String },
}

impl PayloadError {
    pub fn malformed(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedPayload {
            field: field.into(),
            detail: detail.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::MalformedPayload { field, .. } => field,
        }
    }
}
