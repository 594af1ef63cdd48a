use std::fmt::{Display, Formatter};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure while talking to a remote collaborator
#[derive(Debug)]
pub enum RemoteError {
    /// The remote responded, but refused the request
    Rejected { status: u16, content: String },
    /// The request never got a response
    Transport(BoxError),
}

impl RemoteError {
    /// Wrap any error that prevented a response from arriving
    pub fn transport<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Transport(error.into())
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected { status, content } => {
                write!(f, "unsuccessful response ({status}): {content:?}")
            }
            Self::Transport(error) => write!(f, "request failed: {error}"),
        }
    }
}

impl std::error::Error for RemoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e.as_ref()),
            Self::Rejected { .. } => None,
        }
    }
}
