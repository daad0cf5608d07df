//! Request lifecycle management.
//!
//! A [`RequestBinding`] owns one logical request: it issues the call described
//! by its current [`RequestDescriptor`], publishes `pending`/`response`/`error`
//! through a watch channel, and re-issues the call whenever the descriptor
//! changes structurally or [`RequestBinding::retrigger`] is called.
//!
//! Every issued request carries a generation number. When a request finishes
//! it only writes to the state if its generation is still the latest one and
//! the binding has not been dropped, so a slow response to an outdated
//! descriptor can never overwrite a newer result.

pub mod state;
pub mod strategy;

pub use state::{Phase, RequestState};
pub use strategy::{poll_every, BackoffPolicy, Outcome, PollStrategy, RetryStrategy};

use crate::error::Error;
use crate::request::{RequestDescriptor, ResponseBody, Transport};
use crate::transform::TransformedError;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
type FailureCallback = Arc<dyn Fn(&TransformedError) + Send + Sync>;

/// Strategies and callbacks attached to a binding.
///
/// Kept apart from the descriptor so descriptors stay plain, comparable data.
pub struct BindingOptions<T> {
    pub should_retry: Option<RetryStrategy<T>>,
    pub should_poll: Option<PollStrategy<T>>,
    pub on_success: Option<SuccessCallback<T>>,
    pub on_failure: Option<FailureCallback>,
}

impl<T> Default for BindingOptions<T> {
    fn default() -> Self {
        Self {
            should_retry: None,
            should_poll: None,
            on_success: None,
            on_failure: None,
        }
    }
}

impl<T> Clone for BindingOptions<T> {
    fn clone(&self) -> Self {
        Self {
            should_retry: self.should_retry.clone(),
            should_poll: self.should_poll.clone(),
            on_success: self.on_success.clone(),
            on_failure: self.on_failure.clone(),
        }
    }
}

impl<T> fmt::Debug for BindingOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingOptions")
            .field("should_retry", &self.should_retry.is_some())
            .field("should_poll", &self.should_poll.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

impl<T> BindingOptions<T> {
    #[must_use]
    pub fn with_retry(mut self, strategy: RetryStrategy<T>) -> Self {
        self.should_retry = Some(strategy);
        self
    }

    #[must_use]
    pub fn with_poll(mut self, strategy: PollStrategy<T>) -> Self {
        self.should_poll = Some(strategy);
        self
    }

    #[must_use]
    pub fn on_success(mut self, callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn on_failure(
        mut self,
        callback: impl Fn(&TransformedError) + Send + Sync + 'static,
    ) -> Self {
        self.on_failure = Some(Arc::new(callback));
        self
    }
}

/// How one attempt ended, before strategies are consulted
enum Attempt<T> {
    Done(Outcome<T>),
    LoginRequired(String),
}

struct Shared<T> {
    transport: Transport,
    options: BindingOptions<T>,
    state: watch::Sender<RequestState<T>>,
    generation: AtomicU64,
    mounted: AtomicBool,
}

impl<T: ResponseBody> Shared<T> {
    fn is_current(&self, generation: u64) -> bool {
        self.mounted.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }

    /// Applies `update` if `generation` is still the live request.
    ///
    /// The check runs under the channel's write lock, so it cannot interleave
    /// with the `begin` of a newer request.
    fn publish(&self, generation: u64, update: impl FnOnce(&mut RequestState<T>)) -> bool {
        self.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            update(state);
            state.generation = generation;
            true
        })
    }

    async fn attempt(&self, descriptor: &RequestDescriptor) -> Attempt<T> {
        let url = self.transport.build_url(descriptor);
        let outcome = match self.transport.execute(descriptor).await {
            Ok(payload) => T::from_payload(payload).map_err(|detail| {
                TransformedError::parse(descriptor.method, &url, None, &detail)
            }),
            Err(Error::LoginRedirect { url }) => return Attempt::LoginRequired(url),
            Err(Error::Request(error)) => Err(*error),
            Err(other) => Err(TransformedError::network(
                descriptor.method,
                &url,
                &other.to_string(),
            )),
        };
        Attempt::Done(outcome)
    }
}

async fn run_request<T: ResponseBody>(
    shared: Arc<Shared<T>>,
    descriptor: RequestDescriptor,
    generation: u64,
) {
    let mut run_count: u32 = 0;
    loop {
        if !shared.is_current(generation) {
            return;
        }
        run_count += 1;

        let outcome = match shared.attempt(&descriptor).await {
            Attempt::Done(outcome) => outcome,
            Attempt::LoginRequired(url) => {
                debug!(target: "godesk::binding", "request redirected to login: {url}");
                shared.publish(generation, |state| state.require_login(url));
                return;
            }
        };

        let retry = match (&outcome, &shared.options.should_retry) {
            (Err(_), Some(should_retry)) => should_retry(&outcome, run_count),
            _ => None,
        }
        .filter(|delay| !delay.is_zero());

        if let Some(delay) = retry {
            debug!(
                target: "godesk::binding",
                "attempt {run_count} failed, retrying in {}ms",
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            continue;
        }

        let poll = shared
            .options
            .should_poll
            .as_ref()
            .and_then(|should_poll| should_poll(&outcome))
            .filter(|delay| !delay.is_zero());

        match outcome {
            Ok(response) => {
                run_count = 0;
                if !shared.publish(generation, |state| state.succeed(response.clone())) {
                    return;
                }
                if let Some(on_success) = &shared.options.on_success {
                    on_success(&response);
                }
            }
            Err(error) => {
                if !shared.publish(generation, |state| state.fail(error.clone())) {
                    return;
                }
                if let Some(on_failure) = &shared.options.on_failure {
                    on_failure(&error);
                }
            }
        }

        let Some(delay) = poll else {
            return;
        };
        debug!(target: "godesk::binding", "polling again in {}ms", delay.as_millis());
        tokio::time::sleep(delay).await;
        shared.publish(generation, |state| state.begin(true));
    }
}

/// A live request bound to a descriptor.
///
/// Requests run on the Tokio runtime, so a binding must be created and
/// updated from within one.
pub struct RequestBinding<T: ResponseBody> {
    shared: Arc<Shared<T>>,
    descriptor: Option<RequestDescriptor>,
    task: Option<JoinHandle<()>>,
}

impl<T: ResponseBody> RequestBinding<T> {
    /// Binds `descriptor` and issues it immediately unless it is skipped.
    #[must_use]
    pub fn new(transport: Transport, descriptor: RequestDescriptor) -> Self {
        Self::with_options(transport, descriptor, BindingOptions::default())
    }

    #[must_use]
    pub fn with_options(
        transport: Transport,
        descriptor: RequestDescriptor,
        options: BindingOptions<T>,
    ) -> Self {
        let (state, _) = watch::channel(RequestState::default());
        let mut binding = Self {
            shared: Arc::new(Shared {
                transport,
                options,
                state,
                generation: AtomicU64::new(0),
                mounted: AtomicBool::new(true),
            }),
            descriptor: None,
            task: None,
        };
        binding.issue(descriptor);
        binding
    }

    /// Replaces the descriptor.
    ///
    /// Returns `true` when a new request was issued, which happens only if
    /// the descriptor differs structurally from the current one.
    pub fn update(&mut self, descriptor: RequestDescriptor) -> bool {
        if self.descriptor.as_ref() == Some(&descriptor) {
            return false;
        }
        self.issue(descriptor);
        true
    }

    /// Issues the current descriptor again, whatever state it settled in.
    pub fn retrigger(&mut self) {
        if let Some(descriptor) = self.descriptor.clone() {
            self.issue(descriptor);
        }
    }

    fn issue(&mut self, descriptor: RequestDescriptor) {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        // Detached: an outdated task finds its generation stale and stops.
        drop(self.task.take());

        if descriptor.skip {
            self.shared.publish(generation, RequestState::reset_idle);
            self.descriptor = Some(descriptor);
            return;
        }

        let preserve = descriptor.preserve_response;
        self.shared.publish(generation, |state| state.begin(preserve));
        self.descriptor = Some(descriptor.clone());
        self.task = Some(tokio::spawn(run_request(
            Arc::clone(&self.shared),
            descriptor,
            generation,
        )));
    }

    #[must_use]
    pub const fn descriptor(&self) -> Option<&RequestDescriptor> {
        self.descriptor.as_ref()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> RequestState<T> {
        self.shared.state.borrow().clone()
    }

    #[must_use]
    pub fn pending(&self) -> bool {
        self.shared.state.borrow().pending
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.shared.state.subscribe()
    }

    /// Waits until the current request is no longer pending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoginRedirect`] when the request was bounced to a
    /// login page. Ordinary failures are not errors here; they are in the
    /// returned state's `error`.
    pub async fn settled(&self) -> Result<RequestState<T>, Error> {
        let mut receiver = self.shared.state.subscribe();
        let state = receiver
            .wait_for(|state| !state.pending)
            .await
            .map_err(|_| anyhow::anyhow!("request binding closed"))?
            .clone();
        if let Phase::LoginRequired { url } = &state.phase {
            return Err(Error::LoginRedirect { url: url.clone() });
        }
        Ok(state)
    }

    /// Like [`settled`](Self::settled) but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error on login redirect or when the timeout elapses first.
    pub async fn settled_within(&self, timeout: Duration) -> Result<RequestState<T>, Error> {
        tokio::time::timeout(timeout, self.settled())
            .await
            .map_err(|_| anyhow::anyhow!("request did not settle within {}ms", timeout.as_millis()))?
    }
}

impl<T: ResponseBody> Drop for RequestBinding<T> {
    fn drop(&mut self) {
        self.shared.mounted.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<T: ResponseBody + fmt::Debug> fmt::Debug for RequestBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBinding")
            .field("descriptor", &self.descriptor)
            .field("state", &*self.shared.state.borrow())
            .finish_non_exhaustive()
    }
}
