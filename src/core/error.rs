use thiserror::Error;

use crate::backend::StoreError;

#[derive(Debug, Error)]
pub enum AssetError {
    /// Occurs when an operation targets an ID whose stored value
    /// is absent or empty.
    #[error("The asset {0} does not exist")]
    NotFound(String),
    /// Occurs when a payload that has to be parsed is not a JSON
    /// object of the expected shape.
    #[error("cannot decode {subject}: {source}")]
    Decode {
        subject: String,
        #[source]
        source: serde_json::Error
    },
    #[error("cannot encode asset {id}: {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error
    },
    /// Any failure reported by the world state, passed through untouched.
    #[error(transparent)]
    Store(#[from] StoreError)
}

impl AssetError {
    pub(crate) fn decode(subject: impl Into<String>, source: serde_json::Error) -> AssetError {
        AssetError::Decode { subject: subject.into(), source }
    }

    /// Decode failure for JSON that parsed but has the wrong shape.
    pub(crate) fn malformed(subject: impl Into<String>, reason: &str) -> AssetError {
        AssetError::decode(subject, serde::de::Error::custom(reason))
    }
}

pub type AssetResult<T> = Result<T, AssetError>;
