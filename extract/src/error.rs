use common::xml::XmlError;
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read pbf {}", path.display())]
    Pbf {
        path: PathBuf,
        #[source]
        source: osmpbf::Error,
    },
    #[error("Way {way} references node {node}, which has no location in the input")]
    MissingLocation { way: i64, node: i64 },
    #[error("No relation is tagged {key}={value}")]
    NoMatchingRelation { key: String, value: String },
    #[error("{} relations are tagged {key}={value}, kept {first} and ignored {ignored:?}", ignored.len() + 1)]
    AmbiguousRelation {
        key: String,
        value: String,
        first: i64,
        ignored: Vec<i64>,
    },
    #[error("Failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("Failed to serialize json")]
    Json(#[from] serde_json::Error),
}
