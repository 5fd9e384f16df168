//! Crawl results and the stream that delivers them
//!
//! Results flow through an unbounded channel so that producing tasks never
//! wait on the consumer. The sending half is held once, by the crawl's shared
//! state, and is closed explicitly by the crawl supervisor after the
//! outstanding-task count reaches zero.

use crate::crawler::tracker::TaskTally;
use crate::FetchError;
use futures::Stream;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Outcome of visiting one claimed address
///
/// Exactly one result is produced per address whose claim succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    /// The visited address
    pub address: String,

    /// Remaining depth the address was visited with
    pub depth: u32,

    /// Content summary, or the fetch error for this address
    pub outcome: Result<String, FetchError>,
}

impl CrawlResult {
    pub fn success(address: impl Into<String>, depth: u32, content: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            depth,
            outcome: Ok(content.into()),
        }
    }

    pub fn failure(address: impl Into<String>, depth: u32, error: FetchError) -> Self {
        Self {
            address: address.into(),
            depth,
            outcome: Err(error),
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.outcome.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Final accounting of one crawl, available once the stream has closed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Addresses claimed in the visited set
    pub visited: usize,

    /// Tasks still counted when the stream closed (always zero)
    pub outstanding: usize,

    /// Tasks by terminal state
    pub tasks: TaskTally,

    /// Wall-clock time from start to stream closure
    pub elapsed: Duration,
}

/// Write side of the result stream, closable exactly once
#[derive(Debug)]
pub(crate) struct ResultChannel {
    sender: Mutex<Option<mpsc::UnboundedSender<CrawlResult>>>,
}

impl ResultChannel {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<CrawlResult>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let channel = Self {
            sender: Mutex::new(Some(sender)),
        };
        (channel, receiver)
    }

    /// Sends one result; returns false if it could not be delivered
    ///
    /// Delivery fails only when the consumer has gone away.
    pub(crate) fn emit(&self, result: CrawlResult) -> bool {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            Some(sender) => sender.send(result).is_ok(),
            None => {
                tracing::error!("Result for {} emitted after close", result.address);
                false
            }
        }
    }

    /// Drops the sender, ending the stream once buffered results are read
    pub(crate) fn close(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// Stream of results from one running crawl
///
/// Yields each [`CrawlResult`] as soon as a task produces it, in no
/// particular order, and ends once every task has finished. Consume it
/// either with [`CrawlStream::recv`] or through the [`Stream`] impl.
#[derive(Debug)]
pub struct CrawlStream {
    receiver: mpsc::UnboundedReceiver<CrawlResult>,
    supervisor: JoinHandle<CrawlStats>,
}

impl CrawlStream {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<CrawlResult>,
        supervisor: JoinHandle<CrawlStats>,
    ) -> Self {
        Self {
            receiver,
            supervisor,
        }
    }

    /// Receives the next result, or None once the crawl has completed
    pub async fn recv(&mut self) -> Option<CrawlResult> {
        self.receiver.recv().await
    }

    /// Waits for the crawl to complete and returns its statistics
    ///
    /// Results not yet received are discarded.
    pub async fn finish(self) -> crate::Result<CrawlStats> {
        drop(self.receiver);
        Ok(self.supervisor.await?)
    }

    /// Receives every remaining result, then returns them with the statistics
    pub async fn collect_all(mut self) -> crate::Result<(Vec<CrawlResult>, CrawlStats)> {
        let mut results = Vec::new();
        while let Some(result) = self.recv().await {
            results.push(result);
        }
        let stats = self.finish().await?;
        Ok((results, stats))
    }
}

impl Stream for CrawlStream {
    type Item = CrawlResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
