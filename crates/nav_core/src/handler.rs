use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    sync::Arc,
    time::Duration,
};

use tokio::{
    sync::{mpsc, oneshot},
    time,
};
use tracing::{debug, warn};

use crate::{
    error::HandlerDropped,
    presenter::Presenter,
    transition::{Transition, TransitionIdentity},
};

/// Dispatcher timing knobs. Both are configuration, not constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Pause between one completion and the next dispatch.
    pub inter_message_delay: Duration,
    /// How long an execution may stay silent before the dispatcher forces
    /// itself back to idle and moves on.
    pub safety_restart_delay: Duration,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            inter_message_delay: Duration::ZERO,
            safety_restart_delay: Duration::from_secs(3),
        }
    }
}

struct Envelope {
    transition: Transition,
    notify: oneshot::Sender<Transition>,
}

struct Completion {
    execution: u64,
    transition: Transition,
}

/// Serial dispatcher for transitions against a single presenter context.
///
/// At most one transition executes at a time; identity-equal submissions that
/// arrive while one is pending or in flight share its completion instead of
/// producing extra executions. An execution that never reports completion is
/// abandoned by a watchdog after `safety_restart_delay` so the queue cannot
/// deadlock on one stuck command; the abandoned execution is not cancelled
/// and may still resolve its waiters later.
///
/// The handler is cheap to clone; all clones feed the same worker. Dropping
/// the last clone closes submissions: the worker finishes what already
/// reached it and exits, and anything still unresolved observes
/// [`HandlerDropped`].
#[derive(Clone)]
pub struct SerialHandler {
    submissions: mpsc::UnboundedSender<Envelope>,
}

impl SerialHandler {
    /// Spawns the worker task on the current tokio runtime.
    pub fn new(context: Arc<dyn Presenter>) -> Self {
        Self::with_config(context, HandlerConfig::default())
    }

    pub fn with_config(context: Arc<dyn Presenter>, config: HandlerConfig) -> Self {
        let (submit_tx, submit_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let worker = Worker {
            context,
            config,
            submissions: submit_rx,
            completions: done_rx,
            completion_tx: done_tx,
            inbox: VecDeque::new(),
            waiters: HashMap::new(),
            next_execution: 0,
        };
        tokio::spawn(worker.run());
        Self {
            submissions: submit_tx,
        }
    }

    /// Enqueues a transition and returns a future resolving with the
    /// identity-equal transition that actually executed.
    ///
    /// The enqueue happens before this returns; the future may be dropped
    /// without cancelling the queued work.
    pub fn handle(
        &self,
        transition: Transition,
    ) -> impl Future<Output = Result<Transition, HandlerDropped>> {
        let (notify, completed) = oneshot::channel();
        let accepted = self
            .submissions
            .send(Envelope { transition, notify })
            .is_ok();
        async move {
            if !accepted {
                return Err(HandlerDropped);
            }
            completed.await.map_err(|_| HandlerDropped)
        }
    }
}

struct Worker {
    context: Arc<dyn Presenter>,
    config: HandlerConfig,
    submissions: mpsc::UnboundedReceiver<Envelope>,
    completions: mpsc::UnboundedReceiver<Completion>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    inbox: VecDeque<Transition>,
    waiters: HashMap<TransitionIdentity, Vec<oneshot::Sender<Transition>>>,
    next_execution: u64,
}

impl Worker {
    async fn run(mut self) {
        loop {
            // Register everything already submitted before dispatching, so
            // back-to-back identity-equal submissions coalesce reliably.
            while let Ok(envelope) = self.submissions.try_recv() {
                self.accept(envelope);
            }

            let Some(transition) = self.next_runnable() else {
                tokio::select! {
                    envelope = self.submissions.recv() => match envelope {
                        Some(envelope) => self.accept(envelope),
                        None => break,
                    },
                    Some(completion) = self.completions.recv() => {
                        // Late completion from an execution the watchdog gave
                        // up on.
                        self.resolve(completion.transition);
                    }
                }
                continue;
            };

            self.execute(transition).await;
        }
    }

    fn accept(&mut self, envelope: Envelope) {
        let identity = envelope.transition.identity().clone();
        let waiters = self.waiters.entry(identity).or_default();
        if !waiters.is_empty() {
            debug!(
                transition = ?envelope.transition,
                "coalescing with a pending or in-flight identity"
            );
        }
        waiters.push(envelope.notify);
        self.inbox.push_back(envelope.transition);
    }

    /// Pops inbox entries in FIFO order, skipping any whose waiters were
    /// already resolved by an identity-equal completion.
    fn next_runnable(&mut self) -> Option<Transition> {
        while let Some(transition) = self.inbox.pop_front() {
            if self.waiters.contains_key(transition.identity()) {
                return Some(transition);
            }
            debug!(
                transition = ?transition,
                "skipping entry resolved by an earlier identity-equal completion"
            );
        }
        None
    }

    async fn execute(&mut self, transition: Transition) {
        let execution = self.next_execution;
        self.next_execution += 1;

        debug!(execution, transition = ?transition, "dispatching");

        let context = Arc::clone(&self.context);
        let completions = self.completion_tx.clone();
        let running = transition;
        tokio::spawn(async move {
            running.execute(context).await;
            let _ = completions.send(Completion {
                execution,
                transition: running,
            });
        });

        let watchdog = time::sleep(self.config.safety_restart_delay);
        tokio::pin!(watchdog);

        loop {
            tokio::select! {
                Some(envelope) = self.submissions.recv() => self.accept(envelope),
                Some(completion) = self.completions.recv() => {
                    let current = completion.execution == execution;
                    self.resolve(completion.transition);
                    if current {
                        if !self.config.inter_message_delay.is_zero() {
                            time::sleep(self.config.inter_message_delay).await;
                        }
                        return;
                    }
                }
                _ = &mut watchdog => {
                    warn!(
                        execution,
                        timeout = ?self.config.safety_restart_delay,
                        "execution did not report completion; forcing dispatcher back to idle"
                    );
                    return;
                }
            }
        }
    }

    fn resolve(&mut self, transition: Transition) {
        let identity = transition.identity().clone();
        match self.waiters.remove(&identity) {
            Some(waiters) => {
                debug!(identity = ?identity, waiters = waiters.len(), "transition completed");
                for waiter in waiters {
                    let _ = waiter.send(transition.clone());
                }
            }
            None => debug!(identity = ?identity, "completion had no registered waiters"),
        }
    }
}

#[cfg(test)]
#[path = "tests/handler_tests.rs"]
mod tests;
