//! Background registry writer.
//!
//! Message formatting must not wait on disk I/O, so its registry updates go
//! through a bounded queue drained by one worker thread. A full queue drops
//! the update instead of blocking the caller.

use crate::error::RegistryError;
use crate::registry::{RecordOutcome, RegistryStore};
use bc_common::RegistryEntry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;

enum Command {
    Record(RegistryEntry),
    Flush(mpsc::Sender<()>),
}

/// Single-consumer queue in front of a `RegistryStore`.
#[derive(Debug)]
pub struct RegistryWriter {
    tx: Option<SyncSender<Command>>,
    worker: Option<JoinHandle<()>>,
    dropped: AtomicU64,
}

impl RegistryWriter {
    /// Start the worker thread.
    pub fn spawn(store: Arc<RegistryStore>, capacity: usize) -> Result<Self, RegistryError> {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        let worker = std::thread::Builder::new()
            .name("bizcode-registry".to_string())
            .spawn(move || run(&store, rx))
            .map_err(RegistryError::Worker)?;
        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            dropped: AtomicU64::new(0),
        })
    }

    /// Queue an entry without blocking. Returns false if it was dropped.
    pub fn submit(&self, entry: RegistryEntry) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        let code = entry.business_code.clone();
        match tx.try_send(Command::Record(entry)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(code = %code, "registry queue full, entry dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("registry writer stopped, entry dropped");
                false
            }
        }
    }

    /// Block until every entry submitted before this call has been
    /// processed.
    pub fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack_tx, ack_rx) = mpsc::channel();
        if tx.send(Command::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// Entries dropped because the queue was full or the worker was gone.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for RegistryWriter {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit.
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("registry writer panicked");
            }
        }
    }
}

fn run(store: &RegistryStore, rx: Receiver<Command>) {
    for command in rx {
        match command {
            Command::Record(entry) => {
                let code = entry.business_code.clone();
                match store.record(entry) {
                    Ok(RecordOutcome::Inserted) | Ok(RecordOutcome::AlreadyPresent) => {}
                    Err(e) => {
                        tracing::warn!(code = %code, error = %e, "async registry update failed");
                    }
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bc_common::BusinessCode;
    use tempfile::TempDir;

    fn entry(line: u32) -> RegistryEntry {
        RegistryEntry::new(BusinessCode::from_parts(1, 2, line), "pkg", "f", line)
    }

    #[test]
    fn flush_waits_for_queued_entries() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RegistryStore::open(dir.path().join("r.json")).unwrap());
        let writer = RegistryWriter::spawn(Arc::clone(&store), 64).unwrap();

        for line in 0..10 {
            assert!(writer.submit(entry(line)));
        }
        writer.flush();
        assert_eq!(store.load().unwrap().len(), 10);
        assert_eq!(writer.dropped(), 0);
    }

    #[test]
    fn full_queue_drops_and_counts() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RegistryStore::open(dir.path().join("r.json")).unwrap());
        let writer = RegistryWriter::spawn(Arc::clone(&store), 1).unwrap();

        // The worker holds at most one entry while the store is locked and
        // the queue holds one more.
        let guard = store.lock();
        let accepted = (1..=3).filter(|&line| writer.submit(entry(line))).count();
        drop(guard);
        writer.flush();

        assert!(accepted <= 2);
        assert_eq!(writer.dropped(), (3 - accepted) as u64);
        assert_eq!(store.load().unwrap().len(), accepted);
    }

    #[test]
    fn drop_drains_queue() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.json");
        let store = Arc::new(RegistryStore::open(&path).unwrap());
        {
            let writer = RegistryWriter::spawn(Arc::clone(&store), 64).unwrap();
            writer.submit(entry(1));
            writer.submit(entry(2));
        }
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn write_failures_do_not_stop_worker() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.json");
        std::fs::write(&path, "garbage").unwrap();
        let store = Arc::new(RegistryStore::new(&path));
        let writer = RegistryWriter::spawn(Arc::clone(&store), 4).unwrap();

        writer.submit(entry(1));
        writer.flush();
        std::fs::write(&path, "").unwrap();
        writer.submit(entry(2));
        writer.flush();

        let map = store.load().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&BusinessCode::from_parts(1, 2, 2)));
    }
}
