use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Bit index {0} out of range for a {1}-bit value")]
    BitIndex(usize, usize),

    #[error("Unknown register: `{0}`")]
    UnknownRegister(String),

    #[error("Memory access out of range: [{0}, {1}] (memory size {2})")]
    OutOfBounds(usize, usize, usize),

    #[error("Operand `{0}` does not hold a value")]
    Operand(String),

    #[error("Invalid architecture description: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
