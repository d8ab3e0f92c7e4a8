use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("'{0}' must be a positive number")]
    InvalidDimension(&'static str),
}

pub type Result<T> = core::result::Result<T, GameError>;
