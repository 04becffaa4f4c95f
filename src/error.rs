use thiserror::Error;

/// Errors surfaced by the stats layer.
///
/// Only [`StatsError::Config`] is fatal. Everything that can go wrong for a
/// single chain is contained at the chain boundary and turned into an absent
/// value by the aggregator and reducer.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("failed to parse payload for chain {chain}: {source}")]
    Parse {
        chain: String,
        #[source]
        source: ParseError,
    },

    #[error("chain {chain} has no {dataset} query endpoint")]
    UnsupportedChain { chain: String, dataset: String },

    #[error("query failed: {0}")]
    Query(String),
}

/// Transport-level failure for a single request.
///
/// `Clone` because one result is handed to every caller sharing an
/// in-flight request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// A payload was received but does not carry a usable metric value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not an integer: {value}")]
    NotAnInteger { field: &'static str, value: String },
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            NetworkError::Decode(e.to_string())
        } else {
            NetworkError::Request(e.to_string())
        }
    }
}

pub type Result<T, E = StatsError> = std::result::Result<T, E>;
