use super::*;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Instant,
};

use async_trait::async_trait;
use futures::future::join_all;
use tokio::{
    sync::Semaphore,
    time::{sleep, timeout},
};

use crate::{
    presentable::Presentable,
    presenter::{ModalPresenter, StructuredPresenter},
    transition::{Category, Transition},
};

/// Presenter double that records operation starts and can gate their
/// completion: `gated` ops block on a semaphore permit, `stall_shows` makes
/// `show` never complete at all.
struct GatedPresenter {
    gated: bool,
    stall_shows: bool,
    permits: Semaphore,
    started: Mutex<Vec<(String, Instant)>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    modal: Mutex<Vec<Presentable>>,
    stack: Mutex<Vec<Presentable>>,
}

impl GatedPresenter {
    fn immediate() -> Self {
        Self::build(false, false)
    }

    fn gated() -> Self {
        Self::build(true, false)
    }

    fn stalling_shows() -> Self {
        Self::build(false, true)
    }

    fn build(gated: bool, stall_shows: bool) -> Self {
        Self {
            gated,
            stall_shows,
            permits: Semaphore::new(0),
            started: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            modal: Mutex::new(Vec::new()),
            stack: Mutex::new(Vec::new()),
        }
    }

    fn release(&self, count: usize) {
        self.permits.add_permits(count);
    }

    async fn begin(&self, name: String) {
        self.started
            .lock()
            .expect("started poisoned")
            .push((name, Instant::now()));
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if self.gated {
            self.permits
                .acquire()
                .await
                .expect("semaphore closed")
                .forget();
        }
    }

    fn end(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    fn started(&self) -> Vec<(String, Instant)> {
        self.started.lock().expect("started poisoned").clone()
    }

    fn started_names(&self) -> Vec<String> {
        self.started().into_iter().map(|(name, _)| name).collect()
    }

    fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModalPresenter for GatedPresenter {
    async fn current_modal_presented(&self) -> Option<Presentable> {
        self.modal.lock().expect("modal poisoned").last().cloned()
    }

    async fn show(&self, presentable: Presentable, animated: bool) {
        let _ = animated;
        self.begin(format!("show {}", presentable.label())).await;
        if self.stall_shows {
            futures::future::pending::<()>().await;
        }
        self.modal.lock().expect("modal poisoned").push(presentable);
        self.end();
    }

    async fn hide(&self, animated: bool) {
        let _ = animated;
        self.begin("hide".to_string()).await;
        self.modal.lock().expect("modal poisoned").pop();
        self.end();
    }
}

#[async_trait]
impl StructuredPresenter for GatedPresenter {
    fn should_animate(&self) -> bool {
        false
    }

    async fn all_structured_presented(&self) -> Vec<Presentable> {
        self.stack.lock().expect("stack poisoned").clone()
    }

    async fn reset_to(&self, presentables: Vec<Presentable>, animated: bool) {
        let _ = animated;
        self.begin(format!("reset_to {}", presentables.len())).await;
        *self.stack.lock().expect("stack poisoned") = presentables;
        self.end();
    }

    async fn move_to(&self, presentable: Presentable, animated: bool) {
        let _ = animated;
        self.begin(format!("move_to {}", presentable.label())).await;
        self.stack.lock().expect("stack poisoned").push(presentable);
        self.end();
    }

    async fn drop_last(&self, animated: bool) {
        let _ = animated;
        self.begin("drop_last".to_string()).await;
        self.stack.lock().expect("stack poisoned").pop();
        self.end();
    }
}

fn quick_watchdog() -> HandlerConfig {
    HandlerConfig {
        inter_message_delay: Duration::ZERO,
        safety_restart_delay: Duration::from_millis(50),
    }
}

#[tokio::test]
async fn resolves_with_identity_equal_transition() {
    let presenter = Arc::new(GatedPresenter::immediate());
    let handler = SerialHandler::new(presenter.clone());
    let submitted = Transition::animated(Category::ModalPresent(Presentable::new("detail")));

    let completed = handler
        .handle(submitted.clone())
        .await
        .expect("transition completes");

    assert_eq!(completed, submitted);
    assert_eq!(presenter.started_names(), vec!["show detail"]);
}

#[tokio::test]
async fn executions_are_serial_and_fifo() {
    let presenter = Arc::new(GatedPresenter::gated());
    let handler = SerialHandler::new(presenter.clone());
    let first = Presentable::new("first");
    let second = Presentable::new("second");
    let third = Presentable::new("third");

    let pending = vec![
        handler.handle(Transition::non_animated(Category::MoveTo(first))),
        handler.handle(Transition::non_animated(Category::MoveTo(second))),
        handler.handle(Transition::non_animated(Category::MoveTo(third))),
    ];
    presenter.release(3);

    let resolved = timeout(Duration::from_secs(2), join_all(pending))
        .await
        .expect("all transitions complete");
    assert!(resolved.into_iter().all(|result| result.is_ok()));

    assert_eq!(
        presenter.started_names(),
        vec!["move_to first", "move_to second", "move_to third"]
    );
    assert_eq!(presenter.max_active(), 1);
}

#[tokio::test]
async fn identity_equal_submissions_share_one_execution() {
    let presenter = Arc::new(GatedPresenter::gated());
    let handler = SerialHandler::new(presenter.clone());
    let compose = Presentable::new("compose");
    let submitted = Transition::animated(Category::ModalPresent(compose));

    let first = handler.handle(submitted.clone());
    let second = handler.handle(submitted.clone());
    presenter.release(1);

    let (first, second) = tokio::join!(first, second);
    assert_eq!(first.expect("first resolves"), submitted);
    assert_eq!(second.expect("second resolves"), submitted);

    // The next distinct transition is the second execution overall, which
    // proves the duplicate inbox entry was skipped.
    presenter.release(1);
    handler
        .handle(Transition::animated(Category::Dismiss { all: false }))
        .await
        .expect("dismiss completes");
    assert_eq!(presenter.started_names(), vec!["show compose", "hide"]);
}

#[tokio::test]
async fn identity_equal_submission_after_completion_runs_again() {
    let presenter = Arc::new(GatedPresenter::immediate());
    let handler = SerialHandler::new(presenter.clone());
    let submitted = Transition::non_animated(Category::MoveTo(Presentable::new("inbox")));

    handler
        .handle(submitted.clone())
        .await
        .expect("first run completes");
    handler
        .handle(submitted.clone())
        .await
        .expect("second run completes");

    assert_eq!(presenter.started_names().len(), 2);
}

#[tokio::test]
async fn watchdog_restarts_dispatch_after_stalled_execution() {
    let presenter = Arc::new(GatedPresenter::stalling_shows());
    let handler = SerialHandler::with_config(presenter.clone(), quick_watchdog());
    let stuck = Transition::animated(Category::ModalPresent(Presentable::new("frozen")));
    let next = Transition::non_animated(Category::MoveTo(Presentable::new("settings")));

    let submitted_at = Instant::now();
    let stuck_future = handler.handle(stuck);
    let next_future = handler.handle(next.clone());

    let resolved = timeout(Duration::from_secs(2), next_future)
        .await
        .expect("watchdog unblocks the queue")
        .expect("queued transition completes");
    assert_eq!(resolved, next);
    assert!(submitted_at.elapsed() >= Duration::from_millis(50));
    assert_eq!(
        presenter.started_names(),
        vec!["show frozen", "move_to settings"]
    );

    // The stalled execution never completes, so its caller stays pending.
    assert!(timeout(Duration::from_millis(50), stuck_future)
        .await
        .is_err());
}

#[tokio::test]
async fn stalled_execution_can_still_resolve_after_watchdog() {
    let presenter = Arc::new(GatedPresenter::gated());
    let handler = SerialHandler::with_config(presenter.clone(), quick_watchdog());
    let slow = Transition::animated(Category::ModalPresent(Presentable::new("slow")));

    let slow_future = handler.handle(slow.clone());
    // Let the watchdog give up on the execution, then let it finish anyway.
    sleep(Duration::from_millis(120)).await;
    presenter.release(1);

    let resolved = timeout(Duration::from_secs(2), slow_future)
        .await
        .expect("late completion still resolves")
        .expect("transition completes");
    assert_eq!(resolved, slow);
}

#[tokio::test]
async fn inter_message_delay_spaces_dispatches() {
    let presenter = Arc::new(GatedPresenter::immediate());
    let handler = SerialHandler::with_config(
        presenter.clone(),
        HandlerConfig {
            inter_message_delay: Duration::from_millis(80),
            safety_restart_delay: Duration::from_secs(3),
        },
    );

    let (first, second) = tokio::join!(
        handler.handle(Transition::non_animated(Category::MoveTo(Presentable::new(
            "one"
        )))),
        handler.handle(Transition::non_animated(Category::MoveTo(Presentable::new(
            "two"
        )))),
    );
    first.expect("first completes");
    second.expect("second completes");

    let started = presenter.started();
    assert_eq!(started.len(), 2);
    let gap = started[1].1.duration_since(started[0].1);
    assert!(gap >= Duration::from_millis(80), "gap was {gap:?}");
}

#[tokio::test]
async fn dismiss_with_nothing_presented_resolves_without_presenter_calls() {
    let presenter = Arc::new(GatedPresenter::immediate());
    let handler = SerialHandler::new(presenter.clone());

    handler
        .handle(Transition::animated(Category::Dismiss { all: true }))
        .await
        .expect("no-op dismiss completes");

    assert!(presenter.started_names().is_empty());
}

#[tokio::test]
async fn dropping_handler_abandons_unresolved_waiters() {
    let presenter = Arc::new(GatedPresenter::stalling_shows());
    let handler = SerialHandler::with_config(presenter.clone(), quick_watchdog());
    let stuck = Transition::animated(Category::ModalPresent(Presentable::new("orphan")));

    let stuck_future = handler.handle(stuck);
    sleep(Duration::from_millis(120)).await;
    drop(handler);

    let outcome = timeout(Duration::from_secs(2), stuck_future)
        .await
        .expect("waiter is released on teardown");
    assert_eq!(outcome, Err(HandlerDropped));
}

#[tokio::test]
async fn dropped_completion_future_does_not_cancel_the_transition() {
    let presenter = Arc::new(GatedPresenter::immediate());
    let handler = SerialHandler::new(presenter.clone());

    drop(handler.handle(Transition::non_animated(Category::MoveTo(Presentable::new(
        "archive",
    )))));

    for _ in 0..50 {
        if presenter.started_names().len() == 1 {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(presenter.started_names(), vec!["move_to archive"]);
}
