use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Nom error ({err:?}) with {remaining} bytes remaining")]
    Nom {
        err: nom::error::ErrorKind,
        remaining: usize,
    },
    #[error("Unknown server command {cmd:#04x}")]
    UnknownCommand { cmd: u8 },
    #[error("Server command {command} cannot appear in a demo")]
    UnsupportedCommand { command: &'static str },
    #[error("Unknown temp entity type {kind}")]
    UnknownTempEntity { kind: u8 },
    #[error("Demo header is missing its cd track terminator")]
    UnterminatedHeader,
    #[error("Block {index} declares a negative length ({length})")]
    NegativeBlockLength { index: usize, length: i32 },
    #[error("Block {index} is truncated: expected {expected} payload bytes, found {found}")]
    TruncatedBlock {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("Failed to decode messages in block {index}")]
    Block {
        index: usize,
        #[source]
        source: Box<Error>,
    },
    #[error("Block payload of {length} bytes does not fit in a demo block")]
    BlockTooLarge { length: usize },
    #[error("Ran out of input")]
    Incomplete,
    #[error("I/O error")]
    Io {
        #[from]
        err: std::io::Error,
    },
}

impl<'a> nom::error::ParseError<&'a [u8]> for Error {
    fn from_error_kind(input: &'a [u8], kind: nom::error::ErrorKind) -> Self {
        Error::Nom {
            err: kind,
            remaining: input.len(),
        }
    }

    fn append(_input: &'a [u8], _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<Error>> for Error {
    fn from(err: nom::Err<Error>) -> Self {
        match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
            nom::Err::Incomplete(_) => Error::Incomplete,
        }
    }
}

pub type IResult<I, O> = nom::IResult<I, O, Error>;
