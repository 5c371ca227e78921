//! Paginated service implementation

use super::types::{Completion, Page};
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::pagination::{LinkState, PageDirection};
use crate::parser::Parser;
use crate::request::{Request, RequestTemplate};
use crate::store::{Database, Record};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

/// Cycle currently running for a service
struct InFlight {
    cycle: u64,
    abort: AbortHandle,
}

/// Aborts the fetch and parse work when the owning cycle task is aborted
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Mutable state, guarded by one mutex per service
#[derive(Default)]
struct ServiceState {
    has_completed_original: bool,
    links: LinkState,
    in_flight: Option<InFlight>,
    next_cycle: u64,
}

impl ServiceState {
    fn is_current(&self, cycle: u64) -> bool {
        self.in_flight.as_ref().is_some_and(|f| f.cycle == cycle)
    }
}

/// Browses a paginated JSON:API collection
///
/// Each `start`/`next`/`prev`/`first`/`last` call runs one fetch, parse and
/// commit cycle as a tokio task and reports through the completion callback.
/// At most one cycle runs at a time; calls made while one is in flight are
/// ignored. Must be driven from within a Tokio runtime.
pub struct PaginatedService<R> {
    template: RequestTemplate,
    transport: Arc<dyn Transport>,
    parser: Parser<R>,
    completion: Completion<R>,
    state: Arc<Mutex<ServiceState>>,
}

impl<R: Record> PaginatedService<R> {
    /// Create a service for one request template
    pub fn new<F>(
        template: RequestTemplate,
        transport: Arc<dyn Transport>,
        parser: Parser<R>,
        completion: F,
    ) -> Self
    where
        F: Fn(Result<Page<R>>, bool) + Send + Sync + 'static,
    {
        Self {
            template,
            transport,
            parser,
            completion: Arc::new(completion),
            state: Arc::new(Mutex::new(ServiceState::default())),
        }
    }

    /// Fetch the request described by the template
    pub fn start(&self) {
        self.launch(self.template.to_request(), true);
    }

    /// Follow the `next` cursor
    pub fn next(&self) {
        self.navigate(PageDirection::Next);
    }

    /// Follow the `prev` cursor
    pub fn prev(&self) {
        self.navigate(PageDirection::Previous);
    }

    /// Follow the `first` cursor
    pub fn first(&self) {
        self.navigate(PageDirection::First);
    }

    /// Follow the `last` cursor
    pub fn last(&self) {
        self.navigate(PageDirection::Last);
    }

    /// Abort the running cycle; its result is never delivered.
    ///
    /// Links and the original-completed flag are left as they are.
    pub fn cancel(&self) {
        let mut state = lock(&self.state);
        if let Some(in_flight) = state.in_flight.take() {
            in_flight.abort.abort();
            info!(
                "Cancelled cycle {} for {}",
                in_flight.cycle,
                self.template.path()
            );
        }
    }

    /// Cursors from the last successful cycle
    pub fn links(&self) -> LinkState {
        lock(&self.state).links.clone()
    }

    /// Whether a `start` cycle has ever succeeded
    pub fn has_completed_original(&self) -> bool {
        lock(&self.state).has_completed_original
    }

    /// Whether a cycle is running
    pub fn is_in_flight(&self) -> bool {
        lock(&self.state).in_flight.is_some()
    }

    pub fn template(&self) -> &RequestTemplate {
        &self.template
    }

    pub fn parser(&self) -> &Parser<R> {
        &self.parser
    }

    /// Database the parser commits into
    pub fn database(&self) -> &Database<R> {
        self.parser.database()
    }

    fn navigate(&self, direction: PageDirection) {
        let cursor = {
            let state = lock(&self.state);
            if state.in_flight.is_some() {
                debug!("Ignoring {} while a cycle is in flight", direction);
                return;
            }
            if !state.has_completed_original {
                debug!("No original page yet; {} falls back to start", direction);
                drop(state);
                self.start();
                return;
            }
            state.links.get(direction).map(str::to_owned)
        };

        match cursor {
            Some(url) => self.launch(Request::follow(url, &self.template), false),
            None => {
                debug!("No {} link available", direction);
                (self.completion)(Err(direction.missing_error()), false);
            }
        }
    }

    fn launch(&self, request: Request, is_original: bool) {
        let mut state = lock(&self.state);
        if state.in_flight.is_some() {
            debug!("Ignoring request for {} while a cycle is in flight", request.url);
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            drop(state);
            (self.completion)(
                Err(Error::Other(
                    "paginated service used outside of a Tokio runtime".to_string(),
                )),
                is_original,
            );
            return;
        };

        let cycle = state.next_cycle;
        state.next_cycle += 1;
        debug!("Starting cycle {} for {}", cycle, request.url);

        let transport = Arc::clone(&self.transport);
        let parser = self.parser.clone();
        let completion = Arc::clone(&self.completion);
        let shared = Arc::clone(&self.state);

        let handle = runtime.spawn(async move {
            let url = request.url.clone();
            let work = tokio::spawn(async move {
                run_cycle(transport.as_ref(), &parser, &request).await
            });
            let _work_guard = AbortOnDrop(work.abort_handle());
            let outcome = match work.await {
                Ok(outcome) => outcome,
                Err(e) => Err(Error::Other(format!("cycle {cycle} for {url} failed: {e}"))),
            };

            {
                let mut state = lock(&shared);
                if !state.is_current(cycle) {
                    debug!("Discarding result of cancelled cycle {}", cycle);
                    return;
                }
                state.in_flight = None;
                if let Ok(page) = &outcome {
                    state.links = page.links.clone();
                    if is_original {
                        state.has_completed_original = true;
                    }
                }
            }

            if let Err(e) = &outcome {
                warn!("Cycle {} for {} failed: {}", cycle, url, e);
            }
            completion(outcome, is_original);
        });

        state.in_flight = Some(InFlight {
            cycle,
            abort: handle.abort_handle(),
        });
    }
}

impl<R> Drop for PaginatedService<R> {
    fn drop(&mut self) {
        if let Some(in_flight) = lock(&self.state).in_flight.take() {
            in_flight.abort.abort();
        }
    }
}

impl<R> std::fmt::Debug for PaginatedService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedService")
            .field("template", &self.template)
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}

/// Fetch, extract links, parse and commit one page
async fn run_cycle<R: Record>(
    transport: &dyn Transport,
    parser: &Parser<R>,
    request: &Request,
) -> Result<Page<R>> {
    let document = transport.execute(request).await?;
    let links = LinkState::from_document(&document);
    let parsed = parser.parse_in_background(document).await?;
    debug!(
        "Fetched {} record(s) from {} (next: {})",
        parsed.len(),
        request.url,
        links.next.is_some()
    );
    Ok(Page::new(parsed, links))
}

fn lock(state: &Mutex<ServiceState>) -> MutexGuard<'_, ServiceState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
