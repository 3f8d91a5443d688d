use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    /// Could not open an existing timestamp column file. Fatal for the partition.
    OpenFailure { path: PathBuf, errno: i32 },
    /// Could not create a partition or staging directory. Fatal for the partition.
    MkdirFailure { path: PathBuf, errno: i32 },
    /// `mmap` returned an error. Fatal for the partition.
    MapFailure { path: PathBuf, errno: i32 },
    /// Native allocation for the merge index failed. Fatal for the partition.
    AllocFailure { requested_bytes: usize },
    Io(std::io::Error),
    Corrupt(&'static str),
    Unsupported(&'static str),
    InvalidPartition(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OpenFailure { path, errno } => {
                write!(f, "could not open '{}': errno {errno}", path.display())
            }
            Error::MkdirFailure { path, errno } => {
                write!(f, "could not create directory '{}': errno {errno}", path.display())
            }
            Error::MapFailure { path, errno } => {
                write!(f, "could not mmap '{}': errno {errno}", path.display())
            }
            Error::AllocFailure { requested_bytes } => {
                write!(f, "allocation of {requested_bytes} bytes failed")
            }
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Corrupt(msg) => write!(f, "corrupt data: {msg}"),
            Error::Unsupported(msg) => write!(f, "unsupported: {msg}"),
            Error::InvalidPartition(msg) => write!(f, "invalid partition: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

impl Error {
    /// The errno carried by the error, for kinds that wrap an OS failure.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Error::OpenFailure { errno, .. }
            | Error::MkdirFailure { errno, .. }
            | Error::MapFailure { errno, .. } => Some(*errno),
            Error::Io(err) => err.raw_os_error(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
