//! Error types for the BMKG client
//!
//! Normalization never returns a partially built record: every failure is
//! surfaced as one of these variants naming the field or block that broke.

use thiserror::Error;

/// Main error type for the BMKG client
#[derive(Error, Debug)]
pub enum BmkgError {
    /// A timestamp or numeric field does not match its fixed layout
    #[error("Format error in {field}: {value:?}")]
    Format { field: String, value: String },

    /// An expected block, entry or sub-field is missing or miscounted
    #[error("Structural error: {message}")]
    Structural { message: String },

    /// A coded field carries a code the table does not know
    #[error("Unknown {table} code: {code:?}")]
    Lookup { table: &'static str, code: String },

    /// The document is not well-formed XML or does not fit the expected tree
    #[error("XML error: {message}")]
    Xml { message: String },

    /// Network fetch failures reported by the transport
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl BmkgError {
    /// Create a new format error for `field`
    pub fn format<F: Into<String>, V: Into<String>>(field: F, value: V) -> Self {
        Self::Format {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a new structural error
    pub fn structural<S: Into<String>>(message: S) -> Self {
        Self::Structural {
            message: message.into(),
        }
    }

    /// Create a new lookup error
    pub fn lookup<S: Into<String>>(table: &'static str, code: S) -> Self {
        Self::Lookup {
            table,
            code: code.into(),
        }
    }

    pub fn xml<S: Into<String>>(message: S) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            BmkgError::Format { field, .. } => {
                format!("The bulletin contains a malformed value in '{field}'.")
            }
            BmkgError::Structural { message } => {
                format!("The bulletin has an unexpected layout: {message}")
            }
            BmkgError::Lookup { table, code } => {
                format!(
                    "The bulletin uses an unknown {table} code '{code}'. \
                     The code tables may be out of date."
                )
            }
            BmkgError::Xml { .. } => "The bulletin could not be read as XML.".to_string(),
            BmkgError::Transport { .. } => {
                "Unable to reach BMKG. Please check your internet connection.".to_string()
            }
            BmkgError::Config { message } => format!("Configuration error: {message}"),
        }
    }
}

impl From<quick_xml::DeError> for BmkgError {
    fn from(err: quick_xml::DeError) -> Self {
        BmkgError::xml(err.to_string())
    }
}

impl From<reqwest::Error> for BmkgError {
    fn from(err: reqwest::Error) -> Self {
        BmkgError::transport(err.to_string())
    }
}
