//! Fire-and-forget writes.
//!
//! [`WriteRequestBuilder::enqueue`](crate::WriteRequestBuilder::enqueue)
//! hands the encoded series to a [`WriteQueue`] instead of sending them.
//! Whatever drains the queue owns delivery: the client makes no promise
//! about when, in which order, or whether a queued write reaches the server.
//!
//! [`ChannelQueue`] and [`WriteWorker`] are a ready-made pair built on a
//! tokio channel.
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

use crate::{Client, Precision, series::SeriesPayload};

/// An encoded write waiting to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWrite {
    pub payloads: Vec<SeriesPayload>,
    pub precision: Option<Precision>,
}

/// Accepts writes for later delivery
pub trait WriteQueue: std::fmt::Debug + Send + Sync {
    fn enqueue(&self, write: PendingWrite);
}

/// [`WriteQueue`] feeding an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelQueue {
    tx: mpsc::UnboundedSender<PendingWrite>,
}

impl ChannelQueue {
    /// Create a queue and the receiving end to hand to a [`WriteWorker`]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PendingWrite>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Create a queue whose writes are sent by a [`WriteWorker`] spawned on
    /// the current tokio runtime
    pub fn spawn_worker(client: Client) -> (Self, JoinHandle<()>) {
        let (queue, rx) = Self::channel();
        let handle = WriteWorker::new(client, rx).spawn();
        (queue, handle)
    }
}

impl WriteQueue for ChannelQueue {
    fn enqueue(&self, write: PendingWrite) {
        if self.tx.send(write).is_err() {
            warn!("write worker has stopped, dropping queued write");
        }
    }
}

/// Sends queued writes one at a time until every [`ChannelQueue`] handle is dropped.
///
/// A failed write is logged and skipped; it is not retried.
#[derive(Debug)]
pub struct WriteWorker {
    client: Client,
    rx: mpsc::UnboundedReceiver<PendingWrite>,
}

impl WriteWorker {
    pub fn new(client: Client, rx: mpsc::UnboundedReceiver<PendingWrite>) -> Self {
        Self { client, rx }
    }

    pub async fn run(mut self) {
        while let Some(write) = self.rx.recv().await {
            let series = write.payloads.len();
            if let Err(e) = self
                .client
                .write_payloads(&write.payloads, write.precision)
                .await
            {
                warn!(error = %e, series, "queued write failed");
            }
        }
        debug!("write queue closed, stopping write worker");
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
