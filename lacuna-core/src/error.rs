use thiserror::Error;

/// All errors produced by lacuna-core.
#[derive(Debug, Error)]
pub enum LacunaError {
    #[error("audio decode error: {0}")]
    Decode(String),

    #[error("no audio track found in input")]
    NoAudioTrack,

    #[error("nothing to assemble — empty phrase list or empty source buffer")]
    NothingToAssemble,

    #[error("engine is busy — a pipeline run is already in flight")]
    Busy,

    #[error("no audio loaded")]
    NotLoaded,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LacunaError>;
