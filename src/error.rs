use crate::models::Role;
use thiserror::Error;

/// Errors raised before any matching begins
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("Unknown seniority level '{level}' for {role} '{id}'")]
    UnknownSeniorityLevel { role: Role, id: String, level: String },

    #[error("Invalid profile field list: {0}")]
    InvalidProfileFields(String),

    #[error("Malformed time zone '{value}' for {role} '{id}'")]
    MalformedTimezone { role: Role, id: String, value: String },

    #[error("Duplicate {role} identifier '{id}'")]
    DuplicateIdentifier { role: Role, id: String },
}

impl MatchError {
    /// Errors caused by the ladder, the field lists or the table keys
    pub fn is_configuration(&self) -> bool {
        !matches!(self, MatchError::MalformedTimezone { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MatchError::UnknownSeniorityLevel { .. } => "unknown_seniority_level",
            MatchError::InvalidProfileFields(_) => "invalid_profile_fields",
            MatchError::MalformedTimezone { .. } => "malformed_timezone",
            MatchError::DuplicateIdentifier { .. } => "duplicate_identifier",
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
