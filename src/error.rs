use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid server address {address:?}")]
    InvalidAddress {
        address: String,
        #[source]
        source: http::uri::InvalidUri,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Renders `err` followed by each of its sources, separated by `": "`.
pub fn chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut cur = err.source();
    while let Some(source) = cur {
        out.push_str(": ");
        out.push_str(&source.to_string());
        cur = source.source();
    }
    out
}

/// Innermost error in the source chain (`err` itself if it has no source).
pub fn root_cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    let mut cur = err;
    while let Some(source) = cur.source() {
        cur = source;
    }
    cur
}
