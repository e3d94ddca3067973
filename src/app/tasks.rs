//! Background task runner
//!
//! A probe runs on its own thread and only computes a value. The value comes
//! back to the render loop as a `UiEvent::TaskFinished`, where the matching
//! callback is looked up and run. Callbacks never leave the render thread,
//! so they are free to touch views and wizard state.

use crate::app::navigation::Transition;
use crate::error::{ConsoleError, ProbeError, Result};
use crate::screens::ScreenId;
use crate::ui::Context;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{debug, info, warn};

/// Result payload of a probe, typed again by its callback
pub type TaskValue = Box<dyn Any + Send>;
pub type TaskOutcome = std::result::Result<TaskValue, ProbeError>;

type ProbeFn = Box<dyn FnOnce() -> TaskOutcome + Send>;
type SuccessFn = Box<dyn FnOnce(TaskValue, &mut Context<'_>) -> Result<Transition>>;
type FailureFn = Box<dyn FnOnce(ProbeError, &mut Context<'_>) -> Result<Transition>>;

/// Identifier of one in-flight task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Messages delivered to the render loop from other threads
pub enum UiEvent {
    /// A background probe finished
    TaskFinished { id: TaskId, outcome: TaskOutcome },
    /// New rendered status line
    Status(String),
    /// New management URL
    ManagementUrl(String),
    /// One line of installer output
    InstallOutput(String),
    /// Installer exited
    InstallFinished { success: bool, message: String },
}

impl fmt::Debug for UiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskFinished { id, outcome } => write!(
                f,
                "TaskFinished({}, {})",
                id,
                if outcome.is_ok() { "ok" } else { "failed" }
            ),
            Self::Status(s) => write!(f, "Status({:?})", s),
            Self::ManagementUrl(s) => write!(f, "ManagementUrl({:?})", s),
            Self::InstallOutput(s) => write!(f, "InstallOutput({:?})", s),
            Self::InstallFinished { success, message } => {
                write!(f, "InstallFinished({}, {:?})", success, message)
            }
        }
    }
}

/// A blocking probe plus what to do with its outcome
pub struct BackgroundTask {
    /// Screen the task was started from and returns to
    pub origin: ScreenId,
    /// Text shown in the spinner while the probe runs
    pub description: String,
    probe: ProbeFn,
    on_success: SuccessFn,
    on_failure: FailureFn,
}

impl BackgroundTask {
    pub fn new<T, P, S, F>(
        origin: ScreenId,
        description: impl Into<String>,
        probe: P,
        on_success: S,
        on_failure: F,
    ) -> Self
    where
        T: Send + 'static,
        P: FnOnce() -> std::result::Result<T, ProbeError> + Send + 'static,
        S: FnOnce(T, &mut Context<'_>) -> Result<Transition> + 'static,
        F: FnOnce(ProbeError, &mut Context<'_>) -> Result<Transition> + 'static,
    {
        Self {
            origin,
            description: description.into(),
            probe: Box::new(move || probe().map(|value| Box::new(value) as TaskValue)),
            on_success: Box::new(move |value: TaskValue, ctx: &mut Context<'_>| {
                let value = value.downcast::<T>().map_err(|_| {
                    ConsoleError::state(format!("unexpected task result for {}", origin))
                })?;
                on_success(*value, ctx)
            }),
            on_failure: Box::new(on_failure),
        }
    }
}

impl fmt::Debug for BackgroundTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundTask")
            .field("origin", &self.origin)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Callbacks of a task whose probe is still running
pub struct PendingTask {
    pub origin: ScreenId,
    pub description: String,
    on_success: SuccessFn,
    on_failure: FailureFn,
}

impl PendingTask {
    /// Run exactly one of the two callbacks
    pub fn complete(self, outcome: TaskOutcome, ctx: &mut Context<'_>) -> Result<Transition> {
        match outcome {
            Ok(value) => (self.on_success)(value, ctx),
            Err(e) => (self.on_failure)(e, ctx),
        }
    }
}

/// Tracks in-flight tasks; lives on the render thread
#[derive(Default)]
pub struct TaskRunner {
    next_id: u64,
    pending: HashMap<TaskId, PendingTask>,
}

impl TaskRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the probe on its own thread.
    ///
    /// Returns `None` when the origin screen already has a task running.
    pub fn start(&mut self, task: BackgroundTask, updates: &Sender<UiEvent>) -> Result<Option<TaskId>> {
        if self.is_running(task.origin) {
            warn!("Task for {} already running, ignoring resubmission", task.origin);
            return Ok(None);
        }

        self.next_id += 1;
        let id = TaskId(self.next_id);
        let BackgroundTask {
            origin,
            description,
            probe,
            on_success,
            on_failure,
        } = task;

        let tx = updates.clone();
        thread::Builder::new()
            .name(format!("probe-{}", origin))
            .spawn(move || {
                let outcome = probe();
                // The receiver is gone once the console shuts down
                let _ = tx.send(UiEvent::TaskFinished { id, outcome });
            })
            .map_err(|e| ConsoleError::general(format!("Failed to start probe thread: {}", e)))?;

        info!("Started task {} for {}: {}", id, origin, description);
        self.pending.insert(
            id,
            PendingTask {
                origin,
                description,
                on_success,
                on_failure,
            },
        );
        Ok(Some(id))
    }

    /// Remove a finished task's callbacks
    pub fn take(&mut self, id: TaskId) -> Option<PendingTask> {
        let pending = self.pending.remove(&id);
        if pending.is_none() {
            debug!("No pending callbacks for task {}", id);
        }
        pending
    }

    pub fn is_running(&self, origin: ScreenId) -> bool {
        self.pending.values().any(|p| p.origin == origin)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
