use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// True when the error signals running off the readable end of a bit
    /// stream, either by sequential reads (`EndOfStream`) or by an absolute
    /// reposition past the stream bounds (`OutOfRange`).
    pub fn is_stream_exhausted(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::EndOfStream { .. } | ErrorKind::OutOfRange { .. }
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn end_of_stream(context: impl Into<String>) -> Error {
        Error(
            ErrorKind::EndOfStream {
                context: context.into(),
            }
            .into(),
        )
    }

    pub fn out_of_range(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::OutOfRange {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("end of stream while {context}")]
    EndOfStream { context: String },

    #[error("{name} out of range: {message}")]
    OutOfRange { name: String, message: String },

    #[error("invalid filter data for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
