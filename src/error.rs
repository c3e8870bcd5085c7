use crate::db::dao::DaoLayerError;

/// One offending field in a rejected payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFault {
    pub field: String,
    pub reason: String,
}

impl FieldFault {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FieldFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn join_faults(faults: &[FieldFault]) -> String {
    faults
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The single error kind surfaced by this crate. Malformed payloads, invalid
/// field values, and storage failures during mutation all land here; absence
/// (`find` returning nothing) does not.
#[derive(Debug, thiserror::Error)]
pub enum DataValidationError {
    #[error("invalid payload: {}", join_faults(.0))]
    Payload(Vec<FieldFault>),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DataValidationError {
    pub fn field(field: &str, reason: &str) -> Self {
        Self::Payload(vec![FieldFault::new(field, reason)])
    }

    pub fn faults(&self) -> &[FieldFault] {
        match self {
            Self::Payload(faults) => faults,
            Self::Storage(_) => &[],
        }
    }
}

impl From<sea_orm::DbErr> for DataValidationError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<DaoLayerError> for DataValidationError {
    fn from(err: DaoLayerError) -> Self {
        Self::Storage(err.to_string())
    }
}
