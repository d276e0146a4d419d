//! The background thread that drains the queue to disk.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use crate::entry::LogEntry;
use crate::error::{LogError, Result};
use crate::queue::MessageQueue;
use crate::writer::SyncWriter;

/// Name given to the consumer thread.
pub const CONSUMER_THREAD_NAME: &str = "llmrc-log-consumer";

type InFlight = Arc<Mutex<VecDeque<LogEntry>>>;

/// Handle to the single consumer thread.
pub struct Consumer {
    handle: JoinHandle<()>,
    in_flight: InFlight,
}

impl Consumer {
    /// Spawns the consumer over `queue`, persisting through `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Spawn`] if the OS refuses to create the thread.
    pub fn spawn(queue: Arc<MessageQueue>, writer: Arc<SyncWriter>) -> Result<Self> {
        let in_flight = InFlight::default();
        let batch = Arc::clone(&in_flight);
        let handle = thread::Builder::new()
            .name(CONSUMER_THREAD_NAME.to_string())
            .spawn(move || run(&queue, &writer, &batch))
            .map_err(LogError::Spawn)?;
        Ok(Self { handle, in_flight })
    }

    /// Id of the consumer thread.
    pub fn thread_id(&self) -> ThreadId {
        self.handle.thread().id()
    }

    /// Takes the entries of the current batch that the consumer has not
    /// written yet.
    ///
    /// Only meaningful on the consumer thread itself, from inside an error
    /// handler: the consumer then resumes with an empty batch.
    pub fn take_in_flight(&self) -> Vec<LogEntry> {
        lock(&self.in_flight).drain(..).collect()
    }

    /// Waits for the consumer to exit.
    ///
    /// The queue must have been stopped first, otherwise this never returns.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::ConsumerPanicked`] if the thread panicked.
    pub fn join(self) -> Result<()> {
        self.handle.join().map_err(|_| LogError::ConsumerPanicked)
    }
}

fn lock(in_flight: &InFlight) -> MutexGuard<'_, VecDeque<LogEntry>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

// Batches are taken under the queue lock and written without it, so file
// I/O never blocks a producer. The batch lock is never held across a write:
// an error handler may re-enter through `take_in_flight`.
fn run(queue: &MessageQueue, writer: &SyncWriter, in_flight: &InFlight) {
    while let Some(batch) = queue.wait_batch() {
        lock(in_flight).extend(batch);
        loop {
            let next = lock(in_flight).pop_front();
            match next {
                Some(entry) => {
                    writer.store(&entry);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::LogEntry;
    use crate::paths::PathResolver;
    use crate::severity::Severity;
    use std::fs;
    use tempfile::TempDir;

    fn setup(tmp: &TempDir) -> (Arc<MessageQueue>, Arc<SyncWriter>) {
        (
            Arc::new(MessageQueue::new()),
            Arc::new(SyncWriter::new(PathResolver::new(tmp.path()), None)),
        )
    }

    #[test]
    fn test_consumer_persists_in_order() {
        let tmp = TempDir::new().unwrap();
        let (queue, writer) = setup(&tmp);
        let consumer = Consumer::spawn(Arc::clone(&queue), writer).unwrap();

        for i in 0..50 {
            queue
                .enqueue(LogEntry::new(Severity::Debug, "ts", None, format!("m{i}")))
                .unwrap();
        }
        queue.stop();
        consumer.join().unwrap();

        let contents = fs::read_to_string(tmp.path().join("DEBUG.log")).unwrap();
        let bodies: Vec<_> = contents
            .lines()
            .map(|line| line.rsplit(" - ").next().unwrap().to_string())
            .collect();
        let expected: Vec<_> = (0..50).map(|i| format!("m{i}")).collect();
        assert_eq!(bodies, expected);
    }

    #[test]
    fn test_consumer_exits_when_idle_queue_stops() {
        let tmp = TempDir::new().unwrap();
        let (queue, writer) = setup(&tmp);
        let consumer = Consumer::spawn(Arc::clone(&queue), writer).unwrap();

        queue.stop();
        consumer.join().unwrap();

        assert!(fs::read_dir(tmp.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_consumer_thread_is_named() {
        let tmp = TempDir::new().unwrap();
        let (queue, writer) = setup(&tmp);
        let consumer = Consumer::spawn(Arc::clone(&queue), writer).unwrap();

        assert_ne!(consumer.thread_id(), thread::current().id());
        assert_eq!(
            consumer.handle.thread().name(),
            Some(CONSUMER_THREAD_NAME)
        );

        queue.stop();
        consumer.join().unwrap();
    }

    #[test]
    fn test_panicking_consumer_joins_as_error() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("INFO.log")).unwrap();
        let handler: crate::error::ErrorHandler = Arc::new(|err: &LogError| {
            panic!("handler gave up: {err}");
        });
        let queue = Arc::new(MessageQueue::new());
        let writer = Arc::new(SyncWriter::new(PathResolver::new(tmp.path()), Some(handler)));
        let consumer = Consumer::spawn(Arc::clone(&queue), writer).unwrap();

        queue
            .enqueue(LogEntry::new(Severity::Info, "ts", None, "unwritable"))
            .unwrap();
        queue.stop();

        assert!(matches!(consumer.join(), Err(LogError::ConsumerPanicked)));
    }

    #[test]
    fn test_idle_consumer_has_nothing_in_flight() {
        let tmp = TempDir::new().unwrap();
        let (queue, writer) = setup(&tmp);
        let consumer = Consumer::spawn(Arc::clone(&queue), writer).unwrap();

        assert!(consumer.take_in_flight().is_empty());

        queue.stop();
        consumer.join().unwrap();
    }
}
