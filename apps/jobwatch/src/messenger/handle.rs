use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use super::protocol::{PullRequest, PullResponse};

#[derive(Debug, Error)]
pub enum MessengerError {
    /// No extraction session is attached to the page.
    #[error("content script is not loaded on this page")]
    Unavailable,

    /// The session stopped while the request was in flight.
    #[error("extraction session stopped before replying")]
    ChannelClosed,
}

pub struct PullEnvelope {
    pub request: PullRequest,
    pub reply: oneshot::Sender<PullResponse>,
}

/// Cloneable handle to a running session's Pull mailbox.
#[derive(Clone)]
pub struct PullClient {
    mailbox: mpsc::Sender<PullEnvelope>,
}

impl PullClient {
    pub fn new(mailbox: mpsc::Sender<PullEnvelope>) -> Self {
        Self { mailbox }
    }

    pub async fn request(&self, request: PullRequest) -> Result<PullResponse, MessengerError> {
        let (reply, response) = oneshot::channel();
        self.mailbox
            .send(PullEnvelope { request, reply })
            .await
            .map_err(|_| MessengerError::Unavailable)?;
        response.await.map_err(|_| MessengerError::ChannelClosed)
    }
}
