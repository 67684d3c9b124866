use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::{error::Error, product::ReleaseGroup, promise::Promise};

use super::client::{Catalog, SearchResults};

/// Identifies one composite search.  Later searches get larger tags.
pub type SearchTag = u64;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchRequest {
    pub query: Arc<str>,
    pub group: ReleaseGroup,
}

#[derive(Debug)]
pub struct SearchReport {
    pub tag: SearchTag,
    pub request: SearchRequest,
    pub result: Result<SearchResults, Error>,
}

/// Runs searches on worker threads and hands back only the outcome of the
/// most recently submitted one.  A slow search that finishes after a newer
/// search was submitted is dropped instead of clobbering fresher results.
pub struct SearchService<C: Catalog> {
    catalog: Arc<C>,
    latest: Arc<AtomicU64>,
    report_send: Sender<SearchReport>,
    report_recv: Receiver<SearchReport>,
}

impl<C: Catalog> SearchService<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        let (report_send, report_recv) = unbounded();
        Self {
            catalog,
            latest: Arc::new(AtomicU64::new(0)),
            report_send,
            report_recv,
        }
    }

    pub fn catalog(&self) -> &Arc<C> {
        &self.catalog
    }

    /// Starts a search and supersedes every search submitted before it.
    pub fn submit(&self, query: &str, group: ReleaseGroup) -> SearchTag {
        let tag = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let request = SearchRequest {
            query: query.into(),
            group,
        };
        log::info!("search #{} started: {:?} ({})", tag, request.query, group);

        let catalog = self.catalog.clone();
        let latest = self.latest.clone();
        let report_send = self.report_send.clone();
        thread::spawn(move || {
            // Superseded before we even started, skip the round-trips.
            if latest.load(Ordering::SeqCst) != tag {
                log::debug!("search #{} superseded before start", tag);
                return;
            }
            let result = catalog.search(&request.query, request.group);
            if let Err(err) = &result {
                log::warn!("search #{} failed: {}", tag, err);
            }
            let _ = report_send.send(SearchReport {
                tag,
                request,
                result,
            });
        });
        tag
    }

    pub fn latest_tag(&self) -> SearchTag {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, tag: SearchTag) -> bool {
        self.latest_tag() == tag
    }

    /// Blocks until the report of the latest search arrives.
    pub fn recv(&self) -> Option<SearchReport> {
        loop {
            let report = self.report_recv.recv().ok()?;
            if let Some(report) = self.filter(report) {
                return Some(report);
            }
        }
    }

    /// Like `recv`, but gives up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SearchReport> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.report_recv.recv_timeout(remaining) {
                Ok(report) => {
                    if let Some(report) = self.filter(report) {
                        return Some(report);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
    }

    /// Returns the current report if one is already waiting.
    pub fn try_recv(&self) -> Option<SearchReport> {
        while let Ok(report) = self.report_recv.try_recv() {
            if let Some(report) = self.filter(report) {
                return Some(report);
            }
        }
        None
    }

    fn filter(&self, report: SearchReport) -> Option<SearchReport> {
        if self.is_current(report.tag) {
            Some(report)
        } else {
            log::debug!(
                "discarding stale search #{} ({:?}), latest is #{}",
                report.tag,
                report.request.query,
                self.latest_tag()
            );
            None
        }
    }
}

/// What a product list screen observes: the text the shopper typed and the
/// results of the search it triggered.
#[derive(Debug, Default)]
pub struct SearchState {
    pub input: String,
    pub results: Promise<SearchResults, SearchTag>,
}

impl SearchState {
    pub fn begin<C: Catalog>(
        &mut self,
        service: &SearchService<C>,
        input: &str,
        group: ReleaseGroup,
    ) -> SearchTag {
        self.input = input.to_string();
        let tag = service.submit(input, group);
        self.results.defer(tag);
        tag
    }

    /// Applies a report if it belongs to the search this state waits for.
    pub fn apply(&mut self, report: SearchReport) -> bool {
        self.results.update((report.tag, report.result))
    }
}
