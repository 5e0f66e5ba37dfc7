//! The boundary between the display side and the privileged backend.
//!
//! The display side only ever holds a [`BridgeClient`]. The [`Backend`] runs on
//! its own blocking thread, owns the receiving end of the request channel, and
//! is the only code that reads or writes files.

pub mod backend;
pub mod client;
pub mod protocol;
pub mod stdio;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub use backend::Backend;
pub use client::{Bridge, BridgeClient};
pub use protocol::{Command, Reply};

/// Requests queued before the sender has to wait.
const CHANNEL_CAPACITY: usize = 64;

/// A command in flight, paired with the slot its reply goes into.
pub struct Request {
    pub command: Command,
    pub reply: oneshot::Sender<Reply>,
}

/// Start `backend` on the blocking pool and return a client connected to it.
///
/// The backend stops once every clone of the client is dropped.
pub fn spawn(backend: Backend) -> (BridgeClient, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let handle = tokio::task::spawn_blocking(move || backend.run(rx));
    (BridgeClient::new(tx), handle)
}
