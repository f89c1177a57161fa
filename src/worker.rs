use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::data::error::DataResult;
use crate::data::loader::{run_load, CancelToken, LoadOutcome, LoadRequest};
use crate::data::model::{publish, SeriesStore, SharedStore};

// ---------------------------------------------------------------------------
// Messages from the loader thread
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum LoadEventKind {
    Progress(u8),
    /// The snapshot has already been published when this arrives.
    Completed(Arc<SeriesStore>),
    Cancelled,
    Failed(String),
}

impl LoadEventKind {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadEventKind::Progress(_))
    }
}

#[derive(Debug, Clone)]
pub struct LoadEvent {
    pub job: u64,
    pub kind: LoadEventKind,
}

struct ActiveJob {
    id: u64,
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
    receiver: Receiver<LoadEvent>,
}

impl ActiveJob {
    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Loader thread for job {} panicked", self.id);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// LoadWorker – the single background lane
// ---------------------------------------------------------------------------

/// Runs at most one load at a time on a dedicated thread and hands its
/// events back through a channel the foreground polls.
pub struct LoadWorker {
    store: SharedStore,
    active: Option<ActiveJob>,
    /// Events of a superseded job that the caller has not collected yet.
    backlog: Vec<LoadEvent>,
    next_id: u64,
}

impl LoadWorker {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            active: None,
            backlog: Vec::new(),
            next_id: 1,
        }
    }

    /// Start a load. A job still running is cancelled and waited for first;
    /// its remaining events stay queued for the next poll.
    pub fn start(&mut self, request: LoadRequest) -> DataResult<u64> {
        self.stop();

        let id = self.next_id;
        self.next_id += 1;

        let (sender, receiver): (Sender<LoadEvent>, Receiver<LoadEvent>) = channel();
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let store = Arc::clone(&self.store);

        let handle = thread::Builder::new()
            .name(format!("csv-load-{id}"))
            .spawn(move || run_job(id, request, token, store, sender))?;

        self.active = Some(ActiveJob {
            id,
            cancel,
            handle: Some(handle),
            receiver,
        });
        Ok(id)
    }

    /// Ask the running job, if any, to stop. Does not wait.
    pub fn cancel(&self) {
        if let Some(active) = &self.active {
            log::info!("Cancelling load job {}", active.id);
            active.cancel.cancel();
        }
    }

    /// Cancel the running job and wait until it has finished.
    pub fn stop(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.cancel.cancel();
            active.join();
            self.backlog.extend(active.receiver.try_iter());
        }
    }

    /// A job has been started and its terminal event not yet collected.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn current_job(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.id)
    }

    /// Collect every event available right now without blocking.
    pub fn try_recv_all(&mut self) -> Vec<LoadEvent> {
        let mut events = std::mem::take(&mut self.backlog);
        let mut finished = false;
        if let Some(active) = &self.active {
            for event in active.receiver.try_iter() {
                finished |= event.kind.is_terminal();
                events.push(event);
            }
        }
        if finished {
            if let Some(mut active) = self.active.take() {
                active.join();
            }
        }
        events
    }

    /// Block until the current job ends and return all of its events.
    pub fn wait(&mut self) -> Vec<LoadEvent> {
        let mut events = std::mem::take(&mut self.backlog);
        if let Some(mut active) = self.active.take() {
            active.join();
            events.extend(active.receiver.try_iter());
        }
        events
    }
}

impl Drop for LoadWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_job(
    id: u64,
    request: LoadRequest,
    cancel: CancelToken,
    store: SharedStore,
    sender: Sender<LoadEvent>,
) {
    let progress_sender = sender.clone();
    let result = run_load(&request, &cancel, |percent| {
        let _ = progress_sender.send(LoadEvent {
            job: id,
            kind: LoadEventKind::Progress(percent),
        });
    });

    let kind = match result {
        Ok(LoadOutcome::Completed(next)) => {
            let next = Arc::new(next);
            publish(&store, Some(Arc::clone(&next)));
            LoadEventKind::Completed(next)
        }
        Ok(LoadOutcome::Cancelled) => LoadEventKind::Cancelled,
        Err(e) => {
            log::error!("Load job {id} failed: {e}");
            LoadEventKind::Failed(e.to_string())
        }
    };
    let _ = sender.send(LoadEvent { job: id, kind });
}
