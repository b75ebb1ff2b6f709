//! The message-passing boundary between the two parties.
//!
//! The protocol only needs a way to send a `PsiMessage` and to block until
//! the next one arrives. Serialization and the wire are left to the
//! implementation.

use crate::error::{PsiError, Result};
use crate::messages::PsiMessage;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// A bidirectional, ordered message channel to the peer.
pub trait Transport {
    /// Send a message to the peer.
    fn send(&mut self, message: PsiMessage) -> Result<()>;

    /// Block until the next message from the peer arrives.
    ///
    /// # Errors
    /// Returns `PsiError::Exchange` if the peer is gone or the wait times out.
    fn recv(&mut self) -> Result<PsiMessage>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, message: PsiMessage) -> Result<()> {
        (**self).send(message)
    }

    fn recv(&mut self) -> Result<PsiMessage> {
        (**self).recv()
    }
}

/// In-process transport backed by `std::sync::mpsc`.
#[derive(Debug)]
pub struct MemoryTransport {
    tx: Sender<PsiMessage>,
    rx: Receiver<PsiMessage>,
    timeout: Option<Duration>,
}

impl MemoryTransport {
    /// Create two connected endpoints.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = channel();
        let (b_tx, a_rx) = channel();
        (
            Self {
                tx: a_tx,
                rx: a_rx,
                timeout: None,
            },
            Self {
                tx: b_tx,
                rx: b_rx,
                timeout: None,
            },
        )
    }

    /// Give up on `recv` after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, message: PsiMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| PsiError::Exchange("peer disconnected".to_string()))
    }

    fn recv(&mut self) -> Result<PsiMessage> {
        match self.timeout {
            Some(timeout) => self.rx.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => {
                    PsiError::Exchange(format!("no message within {:?}", timeout))
                }
                RecvTimeoutError::Disconnected => {
                    PsiError::Exchange("peer disconnected".to_string())
                }
            }),
            None => self
                .rx
                .recv()
                .map_err(|_| PsiError::Exchange("peer disconnected".to_string())),
        }
    }
}
