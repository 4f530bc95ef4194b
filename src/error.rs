use thiserror::Error;

/// Errors from loading maps, dictionaries and configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid dictionary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("the map is empty")]
    EmptyMap,

    #[error("row {row} is {len} tiles wide, but the map is {width} wide")]
    RaggedRow { row: usize, len: usize, width: usize },

    #[error("unknown tile {tile:?} at row {row}, column {col}")]
    UnknownTile { tile: char, row: usize, col: usize },

    #[error("dictionary key {0:?} is not a single character")]
    DictionaryKey(String),

    #[error("invalid config: {0}")]
    Config(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
