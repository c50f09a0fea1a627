use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};

use crate::models::error::CaptureError;
use crate::session::capture_session::CaptureSession;
use crate::traits::capture_backend::CaptureBackend;

/// Work run on the session worker with exclusive access to the session.
pub type SessionTask = Box<dyn FnOnce(&mut CaptureSession) + Send + 'static>;

enum WorkerMessage {
    Task(SessionTask),
    Shutdown,
}

#[derive(Default)]
struct QueueControl {
    suspended: usize,
    closed: bool,
}

/// Suspension and shutdown flags shared with the worker thread.
#[derive(Default)]
struct QueueGate {
    control: Mutex<QueueControl>,
    resumed: Condvar,
}

impl QueueGate {
    /// Block until the queue is not suspended (or is being shut down).
    fn wait_until_open(&self) {
        let mut control = self.control.lock();
        while control.suspended > 0 && !control.closed {
            self.resumed.wait(&mut control);
        }
    }

    fn resume(&self) {
        let mut control = self.control.lock();
        control.suspended = control.suspended.saturating_sub(1);
        if control.suspended == 0 {
            self.resumed.notify_all();
        }
    }
}

/// Holds the session queue suspended until dropped.
///
/// Tasks keep being accepted while suspended; they run, in submission
/// order, once every outstanding suspension has been dropped.
#[must_use = "the queue resumes as soon as the suspension is dropped"]
pub struct QueueSuspension {
    gate: Arc<QueueGate>,
}

impl Drop for QueueSuspension {
    fn drop(&mut self) {
        self.gate.resume();
    }
}

/// The single serial worker that owns the `CaptureSession`.
///
/// Tasks run one at a time in submission order on a dedicated thread, so
/// no two configuration brackets can interleave.
pub struct SessionWorker {
    sender: Sender<WorkerMessage>,
    gate: Arc<QueueGate>,
    thread_id: ThreadId,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl SessionWorker {
    /// Spawn the worker thread. The session is created on it and never
    /// leaves it.
    pub fn spawn(backend: Box<dyn CaptureBackend>) -> Result<Self, CaptureError> {
        let (sender, receiver) = unbounded();
        let gate = Arc::new(QueueGate::default());
        let worker_gate = Arc::clone(&gate);

        let handle = thread::Builder::new()
            .name("capture-session".into())
            .spawn(move || {
                let mut session = CaptureSession::new(backend);
                Self::run(&mut session, &receiver, &worker_gate);
                session.stop_running();
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn session worker: {}", e)))?;

        Ok(Self {
            sender,
            gate,
            thread_id: handle.thread().id(),
            handle: Mutex::new(Some(handle)),
        })
    }

    fn run(session: &mut CaptureSession, receiver: &Receiver<WorkerMessage>, gate: &QueueGate) {
        for message in receiver.iter() {
            let task = match message {
                WorkerMessage::Task(task) => task,
                WorkerMessage::Shutdown => break,
            };
            gate.wait_until_open();
            if panic::catch_unwind(AssertUnwindSafe(|| task(session))).is_err() {
                log::error!("Session task panicked; continuing with the next task");
            }
        }
        log::debug!("Session worker exiting");
    }

    /// Queue `task`. Returns `false` if the worker has shut down.
    pub fn submit<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut CaptureSession) + Send + 'static,
    {
        if self.gate.control.lock().closed {
            log::debug!("Session worker closed; dropping task");
            return false;
        }
        self.sender.send(WorkerMessage::Task(Box::new(task))).is_ok()
    }

    /// Run `f` on the worker and wait for its result.
    ///
    /// Everything submitted earlier runs first. Panics if called from the
    /// worker itself, which would deadlock.
    pub fn perform<T, F>(&self, f: F) -> Result<T, CaptureError>
    where
        T: Send + 'static,
        F: FnOnce(&mut CaptureSession) -> T + Send + 'static,
    {
        assert!(!self.is_worker_thread(), "SessionWorker::perform called from the session worker");
        let (reply, result) = crossbeam_channel::bounded(1);
        let accepted = self.submit(move |session| {
            let _ = reply.send(f(session));
        });
        if !accepted {
            return Err(CaptureError::WorkerStopped);
        }
        result.recv().map_err(|_| CaptureError::WorkerStopped)
    }

    /// Hold queued tasks back until the returned guard is dropped.
    pub fn suspend(&self) -> QueueSuspension {
        self.gate.control.lock().suspended += 1;
        QueueSuspension {
            gate: Arc::clone(&self.gate),
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.gate.control.lock().suspended > 0
    }

    pub fn is_worker_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    pub fn is_closed(&self) -> bool {
        self.gate.control.lock().closed
    }

    /// Stop accepting tasks, run the ones already queued, stop the session
    /// and join the thread. Suspensions no longer hold the queue back.
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        {
            let mut control = self.gate.control.lock();
            if control.closed {
                return;
            }
            control.closed = true;
            self.gate.resumed.notify_all();
        }
        let _ = self.sender.send(WorkerMessage::Shutdown);

        if self.is_worker_thread() {
            // The thread exits on its own once it reaches the shutdown message.
            return;
        }
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                log::error!("Session worker thread panicked");
            }
        }
    }
}

impl Drop for SessionWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
