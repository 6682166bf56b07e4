//! Image [`Storage`] implementations.

mod filesystem;
mod memory;

use derive_more::{Display, Error as StdError, From};

use crate::domain::property::ImageFormat;

pub use self::{filesystem::Filesystem, memory::Memory};

/// Storage operation.
pub use common::Handler as Storage;

/// Uploaded image file to be put into a [`Storage`].
#[derive(Clone, Debug)]
pub struct Upload {
    /// Original name of the uploaded file, if any.
    pub file_name: Option<String>,

    /// [`ImageFormat`] of the uploaded file.
    pub format: ImageFormat,

    /// Contents of the uploaded file.
    pub bytes: Vec<u8>,
}

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// I/O operation failed.
    #[display("I/O operation failed: {_0}")]
    Io(std::io::Error),

    /// Generated URL of a stored file is invalid.
    #[display("Invalid URL of a stored file: `{_0}`")]
    #[from(ignore)]
    InvalidUrl(#[error(not(source))] String),
}
