//! Change events and their delivery.
//!
//! Events are handed to a fixed pool of worker threads owned by the memory.
//! Delivery is fire-and-forget: a mutation is committed before its event is
//! queued, and a listener that panics neither rolls it back nor stops the
//! worker.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc, Condvar, Mutex};
use std::thread;

use objmem_model::{Block, Entity, Header};

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TitleChanged,
    DescriptionChanged,
    TypeChanged,
    FormatChanged,
    SubjectChanged,
    /// Link or previous-block link.
    LinkChanged,
    PayloadChanged,
    NamespaceChanged,
    BlockAdded,
    BlockRemoved,
}

/// One change, with the block as it was right after the change.
#[derive(Debug, Clone)]
pub struct MemoryEvent {
    pub memory: Header,
    pub block: Block,
    pub entity: Entity,
    pub kind: EventKind,
}

pub trait MemoryListener: Send + Sync {
    fn on_event(&self, event: &MemoryEvent);
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub workers: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

impl DispatcherConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn start(&self) {
        if let Ok(mut count) = self.count.lock() {
            *count += 1;
        }
    }

    fn finish(&self) {
        if let Ok(mut count) = self.count.lock() {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.idle.notify_all();
            }
        }
    }

    fn wait_idle(&self) {
        let Ok(mut count) = self.count.lock() else {
            return;
        };
        while *count > 0 {
            count = match self.idle.wait(count) {
                Ok(count) => count,
                Err(_) => return,
            };
        }
    }
}

/// A worker pool delivering events to listeners.
pub struct EventDispatcher {
    sender: Option<mpsc::Sender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
    pending: Arc<Pending>,
}

impl EventDispatcher {
    pub fn new(config: &DispatcherConfig) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let pending = Arc::new(Pending::default());

        let workers = (0..config.workers.max(1))
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                let pending = Arc::clone(&pending);
                thread::spawn(move || worker_loop(&receiver, &pending))
            })
            .collect();

        Self {
            sender: Some(sender),
            workers,
            pending,
        }
    }

    /// Queue one delivery per listener.
    pub fn dispatch(&self, listeners: &[Arc<dyn MemoryListener>], event: MemoryEvent) {
        if listeners.is_empty() {
            return;
        }
        let Some(sender) = &self.sender else {
            log::warn!("Dropping {:?} event: dispatcher is closed", event.kind);
            return;
        };

        let event = Arc::new(event);
        for listener in listeners {
            let listener = Arc::clone(listener);
            let delivered = Arc::clone(&event);
            self.pending.start();
            let job: Job = Box::new(move || listener.on_event(&delivered));
            if sender.send(job).is_err() {
                self.pending.finish();
                log::warn!("Dropping {:?} event: no worker left", event.kind);
            }
        }
    }

    /// Block until every queued delivery has run.
    pub fn drain(&self) {
        self.pending.wait_idle();
    }

    /// Deliver what is queued, then stop the workers.
    pub fn close(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("Event worker exited abnormally");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_none()
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        self.close();
    }
}

fn worker_loop(receiver: &Mutex<mpsc::Receiver<Job>>, pending: &Pending) {
    loop {
        let job = match receiver.lock() {
            Ok(receiver) => receiver.recv(),
            Err(_) => return,
        };
        let Ok(job) = job else {
            return;
        };
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            log::error!("Memory listener panicked while handling an event");
        }
        pending.finish();
    }
}
