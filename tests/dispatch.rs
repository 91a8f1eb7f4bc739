//! End-to-end behavior of several agents sharing one bus.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use procvisor::{
    AgentConfig, Bus, ChannelError, DispatchAgent, LivenessOracle, NotifyFn, OracleError,
    Permission, ProcessIdentity, ProcessRole, ProcessToken, SupervisorProxy, TaskHandle,
    Terminate, VetoFn,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Rescued,
    Killed,
    KillCanceled,
}

#[derive(Default)]
struct Proxy {
    calls: Mutex<Vec<(Call, ProcessToken)>>,
}

impl Proxy {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().iter().map(|(c, _)| *c).collect()
    }
}

#[async_trait]
impl SupervisorProxy for Proxy {
    async fn on_process_rescued_from_kill(&self, token: ProcessToken) {
        self.calls.lock().push((Call::Rescued, token));
    }

    async fn on_process_killed(&self, token: ProcessToken) {
        self.calls.lock().push((Call::Killed, token));
    }

    async fn on_process_kill_canceled(&self, token: ProcessToken) {
        self.calls.lock().push((Call::KillCanceled, token));
    }
}

#[derive(Default)]
struct Oracle {
    visible: AtomicBool,
    removed: Arc<AtomicUsize>,
}

struct Task(Arc<AtomicUsize>);

impl TaskHandle for Task {
    fn finish_and_remove_task(&self) -> Result<(), OracleError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl LivenessOracle for Oracle {
    fn has_active_started_state(&self) -> bool {
        false
    }

    fn has_foreground_service(&self) -> bool {
        false
    }

    fn has_visible_view(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn running_tasks(&self, _process_name: &str) -> Result<Vec<Box<dyn TaskHandle>>, OracleError> {
        Ok(vec![
            Box::new(Task(Arc::clone(&self.removed))),
            Box::new(Task(Arc::clone(&self.removed))),
        ])
    }
}

#[derive(Default)]
struct Exits(AtomicUsize);

impl Terminate for Exits {
    fn terminate(&self, _identity: &ProcessIdentity) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct Node {
    agent: Arc<DispatchAgent>,
    proxy: Arc<Proxy>,
    oracle: Arc<Oracle>,
    exits: Arc<Exits>,
}

fn node(bus: &Arc<Bus>, role: ProcessRole, name: &str, pid: i32) -> Node {
    let proxy = Arc::new(Proxy::default());
    let oracle = Arc::new(Oracle::default());
    let exits = Arc::new(Exits::default());
    let cfg = AgentConfig {
        role,
        ..AgentConfig::default()
    };
    let agent = DispatchAgent::builder(cfg, bus.clone(), bus.permission().clone())
        .with_identity(ProcessIdentity::new(name, pid))
        .with_proxy(proxy.clone())
        .with_oracle(oracle.clone())
        .with_terminator(exits.clone())
        .build()
        .unwrap();
    assert_eq!(agent.install(), Ok(true));
    Node {
        agent,
        proxy,
        oracle,
        exits,
    }
}

struct Cluster {
    bus: Arc<Bus>,
    coordinator: Node,
    worker: Node,
    player: Node,
}

fn cluster() -> Cluster {
    let bus = Arc::new(Bus::new(Permission::for_package("com.example"), 64));
    Cluster {
        coordinator: node(&bus, ProcessRole::Supervisor, "com.example", 1),
        worker: node(&bus, ProcessRole::Monitored, "com.example:worker", 1234),
        player: node(&bus, ProcessRole::Monitored, "com.example:player", 2000),
        bus,
    }
}

/// Lets the inbound loops drain the bus without reaching any grace deadline.
async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn death_reaches_every_listener_in_every_process_in_order() {
    let c = cluster();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for (tag, n) in [("a", &c.worker), ("b", &c.worker), ("c", &c.player)] {
        let log = Arc::clone(&seen);
        n.agent.add_death_listener(NotifyFn::arc(tag, move |name: &str, pid: i32, lru: bool| {
            log.lock().push((tag, name.to_owned(), pid, lru));
        }));
    }

    c.coordinator.agent.dispatch_death("worker", 1234, true).unwrap();
    settle().await;

    let mut got = seen.lock().clone();
    // Processes run concurrently; order is only defined within one process.
    let worker_order: Vec<_> = got.iter().filter(|e| e.0 != "c").map(|e| e.0).collect();
    assert_eq!(worker_order, ["a", "b"]);
    got.sort();
    assert_eq!(
        got,
        [
            ("a", "worker".to_owned(), 1234, true),
            ("b", "worker".to_owned(), 1234, true),
            ("c", "worker".to_owned(), 1234, true),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn death_without_listeners_is_harmless() {
    let c = cluster();
    c.worker.agent.dispatch_death("com.example:gone", 9, false).unwrap();
    settle().await;
    assert!(c.worker.proxy.calls().is_empty());
    assert_eq!(c.worker.exits.0.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn veto_rescues_only_the_addressed_process_once() {
    let c = cluster();
    let asked = Arc::new(AtomicUsize::new(0));
    let a = Arc::clone(&asked);
    c.player.agent.add_dying_listener(VetoFn::arc("keep", move |_: &str, _: i32| {
        a.fetch_add(1, Ordering::SeqCst);
        true
    }));

    c.coordinator.agent.dispatch_kill("com.example:player", 2000).unwrap();
    settle().await;
    assert!(c.player.agent.context().is_rescued());
    assert_eq!(c.player.proxy.calls(), [Call::Rescued]);
    assert_eq!(asked.load(Ordering::SeqCst), 1);

    // Second request: no re-consultation, straight to the grace wait.
    c.coordinator.agent.dispatch_kill("com.example:player", 2000).unwrap();
    settle().await;
    assert_eq!(asked.load(Ordering::SeqCst), 1);
    assert_eq!(c.player.proxy.calls(), [Call::Rescued]);

    tokio::time::sleep(Duration::from_secs(11)).await;
    settle().await;
    assert_eq!(c.player.proxy.calls(), [Call::Rescued, Call::Killed]);
    assert_eq!(c.player.exits.0.load(Ordering::SeqCst), 1);

    assert!(!c.worker.agent.context().is_rescued());
    assert!(c.worker.proxy.calls().is_empty());
    assert_eq!(c.worker.exits.0.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn kill_is_committed_only_after_the_grace_period() {
    let c = cluster();
    c.coordinator.agent.dispatch_kill("com.example:worker", 1234).unwrap();
    settle().await;

    tokio::time::sleep(Duration::from_secs(9)).await;
    settle().await;
    assert!(c.worker.proxy.calls().is_empty());
    assert_eq!(c.worker.exits.0.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;
    assert_eq!(c.worker.proxy.calls(), [Call::Killed]);
    assert_eq!(c.worker.oracle.removed.load(Ordering::SeqCst), 2);
    assert_eq!(c.worker.exits.0.load(Ordering::SeqCst), 1);
    assert_eq!(c.coordinator.exits.0.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn visible_process_gets_its_kill_canceled() {
    let c = cluster();
    c.worker.oracle.visible.store(true, Ordering::SeqCst);
    c.coordinator.agent.dispatch_kill("com.example:worker", 1234).unwrap();
    settle().await;

    tokio::time::sleep(Duration::from_secs(11)).await;
    settle().await;
    assert_eq!(c.worker.proxy.calls(), [Call::KillCanceled]);
    assert_eq!(c.worker.oracle.removed.load(Ordering::SeqCst), 0);
    assert_eq!(c.worker.exits.0.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn pid_mismatch_is_ignored_by_the_state_machine() {
    let c = cluster();
    c.coordinator.agent.dispatch_kill("com.example:worker", 4321).unwrap();
    settle().await;
    tokio::time::sleep(Duration::from_secs(11)).await;
    settle().await;
    assert!(c.worker.proxy.calls().is_empty());
    assert_eq!(c.worker.exits.0.load(Ordering::SeqCst), 0);
}

fn explode(_: &str, _: i32) -> bool {
    panic!("listener bug")
}

#[tokio::test(start_paused = true)]
async fn panicking_listener_does_not_block_the_rescue() {
    let c = cluster();
    c.worker.agent.add_dying_listener(VetoFn::arc("broken", explode));
    c.worker.agent.add_dying_listener(VetoFn::arc("keep", |_: &str, _: i32| true));

    c.coordinator.agent.dispatch_kill("com.example:worker", 1234).unwrap();
    settle().await;
    assert!(c.worker.agent.context().is_rescued());
    assert_eq!(c.worker.proxy.calls(), [Call::Rescued]);
}

#[tokio::test(start_paused = true)]
async fn foreign_permission_can_neither_send_nor_listen() {
    let c = cluster();
    let deaths = Arc::new(AtomicUsize::new(0));
    let d = Arc::clone(&deaths);
    c.worker.agent.add_death_listener(NotifyFn::arc("count", move |_: &str, _: i32, _: bool| {
        d.fetch_add(1, Ordering::SeqCst);
    }));

    let intruder = DispatchAgent::builder(
        AgentConfig::default(),
        c.bus.clone(),
        Permission::for_package("com.evil"),
    )
    .with_identity(ProcessIdentity::new("com.evil", 666))
    .with_proxy(Arc::new(Proxy::default()))
    .with_oracle(Arc::new(Oracle::default()))
    .with_terminator(Arc::new(Exits::default()))
    .build()
    .unwrap();

    assert!(matches!(
        intruder.dispatch_kill("com.example:worker", 1234),
        Err(ChannelError::PermissionDenied { .. })
    ));
    assert!(intruder.dispatch_death("com.example:player", 2000, false).is_err());
    assert!(intruder.install().is_err());
    assert!(!intruder.is_installed());
    assert_eq!(c.bus.receiver_count(), 3);

    tokio::time::sleep(Duration::from_secs(11)).await;
    settle().await;
    assert!(c.worker.proxy.calls().is_empty());
    assert_eq!(c.worker.exits.0.load(Ordering::SeqCst), 0);
    assert_eq!(deaths.load(Ordering::SeqCst), 0);

    // The shared bus still carries legitimate traffic.
    c.player.agent.dispatch_death("com.example:player", 2000, false).unwrap();
    settle().await;
    assert_eq!(deaths.load(Ordering::SeqCst), 1);
    intruder.shutdown();
}
