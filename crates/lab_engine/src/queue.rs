use std::sync::mpsc;
use std::time::Duration;

use lab_core::QueueMessage;
use lab_logging::lab_warn;

/// Creates the mailbox between worker threads and the UI loop.
pub fn result_queue() -> (QueueSender, ResultQueue) {
    let (tx, rx) = mpsc::channel();
    (QueueSender { tx }, ResultQueue { rx })
}

/// Worker side of the result queue. Messages from one sender arrive in the
/// order they were sent.
#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: mpsc::Sender<QueueMessage>,
}

impl QueueSender {
    pub fn send(&self, message: QueueMessage) {
        if let Err(mpsc::SendError(message)) = self.tx.send(message) {
            lab_warn!("UI loop gone, dropping message {:?}", message.text);
        }
    }
}

/// UI side of the result queue.
#[derive(Debug)]
pub struct ResultQueue {
    rx: mpsc::Receiver<QueueMessage>,
}

impl ResultQueue {
    /// Takes every message queued right now without waiting for more.
    pub fn drain(&self) -> Vec<QueueMessage> {
        let mut inbox = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            inbox.push(message);
        }
        inbox
    }

    /// Blocks up to `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<QueueMessage> {
        self.rx.recv_timeout(timeout).ok()
    }
}
