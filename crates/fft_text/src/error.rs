use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("character {ch:?} at position {position} has no code in the character map")]
    UnrepresentableChar { ch: char, position: usize },

    #[error("token {token:?} is neither a named token nor a {{0x..}} escape")]
    UnknownToken { token: String },

    #[error("unterminated token starting at position {position}")]
    UnterminatedToken { position: usize },

    #[error("encoded text is {length:#x} bytes, exceeds maximum of {max_length:#x}")]
    CapacityExceeded { length: usize, max_length: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
