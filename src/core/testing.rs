//! In-crate fakes for the agent's collaborators.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::scheduler::{Job, Schedule};
use crate::error::OracleError;
use crate::process::{
    LivenessOracle, ProcessIdentity, ProcessToken, StateDispatcher, SupervisorProxy, TaskHandle,
    Terminate,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyCall {
    Rescued(ProcessToken),
    Killed(ProcessToken),
    KillCanceled(ProcessToken),
}

#[derive(Default)]
pub struct RecordingProxy {
    calls: Mutex<Vec<ProxyCall>>,
}

impl RecordingProxy {
    pub fn calls(&self) -> Vec<ProxyCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SupervisorProxy for RecordingProxy {
    async fn on_process_rescued_from_kill(&self, token: ProcessToken) {
        self.calls.lock().push(ProxyCall::Rescued(token));
    }

    async fn on_process_killed(&self, token: ProcessToken) {
        self.calls.lock().push(ProxyCall::Killed(token));
    }

    async fn on_process_kill_canceled(&self, token: ProcessToken) {
        self.calls.lock().push(ProxyCall::KillCanceled(token));
    }
}

#[derive(Default)]
pub struct FakeOracle {
    started: AtomicBool,
    foreground: AtomicBool,
    visible: AtomicBool,
    tasks: AtomicUsize,
    removed: Arc<AtomicUsize>,
    enumeration_fails: AtomicBool,
}

impl FakeOracle {
    pub fn set_started(&self, v: bool) {
        self.started.store(v, Ordering::SeqCst);
    }

    pub fn set_foreground(&self, v: bool) {
        self.foreground.store(v, Ordering::SeqCst);
    }

    pub fn set_visible(&self, v: bool) {
        self.visible.store(v, Ordering::SeqCst);
    }

    pub fn add_tasks(&self, n: usize) {
        self.tasks.fetch_add(n, Ordering::SeqCst);
    }

    pub fn fail_enumeration(&self) {
        self.enumeration_fails.store(true, Ordering::SeqCst);
    }

    pub fn removed(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }
}

struct FakeTask(Arc<AtomicUsize>);

impl TaskHandle for FakeTask {
    fn finish_and_remove_task(&self) -> Result<(), OracleError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl LivenessOracle for FakeOracle {
    fn has_active_started_state(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn has_foreground_service(&self) -> bool {
        self.foreground.load(Ordering::SeqCst)
    }

    fn has_visible_view(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn running_tasks(&self, process_name: &str) -> Result<Vec<Box<dyn TaskHandle>>, OracleError> {
        if self.enumeration_fails.load(Ordering::SeqCst) {
            return Err(OracleError::Enumerate {
                process: process_name.to_owned(),
                reason: "unavailable".into(),
            });
        }
        let n = self.tasks.load(Ordering::SeqCst);
        Ok((0..n)
            .map(|_| Box::new(FakeTask(Arc::clone(&self.removed))) as Box<dyn TaskHandle>)
            .collect())
    }
}

#[derive(Default)]
pub struct CountingTerminator {
    count: AtomicUsize,
}

impl CountingTerminator {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Terminate for CountingTerminator {
    fn terminate(&self, _identity: &ProcessIdentity) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scheduler whose jobs only run when the test says so.
#[derive(Default)]
pub struct ManualScheduler {
    jobs: Mutex<Vec<(Duration, Job)>>,
}

impl ManualScheduler {
    pub fn pending(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn last_delay(&self) -> Option<Duration> {
        self.jobs.lock().last().map(|(d, _)| *d)
    }

    pub async fn run_all(&self) {
        let jobs: Vec<_> = std::mem::take(&mut *self.jobs.lock());
        for (_, job) in jobs {
            job.await;
        }
    }
}

impl Schedule for ManualScheduler {
    fn schedule_once(&self, delay: Duration, job: Job) {
        self.jobs.lock().push((delay, job));
    }
}

#[derive(Default)]
pub struct RecordingStates {
    pub seen: Mutex<Vec<(bool, String)>>,
}

impl StateDispatcher for RecordingStates {
    fn on_state_on(&self, stateful_name: &str) {
        self.seen.lock().push((true, stateful_name.to_owned()));
    }

    fn on_state_off(&self, stateful_name: &str) {
        self.seen.lock().push((false, stateful_name.to_owned()));
    }
}
