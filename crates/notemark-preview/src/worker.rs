//! Background preview rendering.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use notemark_renderer::KnownTitles;

use crate::service::PreviewService;

enum Request {
    Render { generation: u64, text: String },
    SetKnownTitles(KnownTitles),
    Shutdown,
}

/// Rendered preview for one submitted text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewResponse {
    /// Generation returned by [`PreviewWorker::submit`] for this text.
    pub generation: u64,
    /// Rendered HTML.
    pub html: String,
}

/// Renders previews on a background thread.
///
/// Each [`submit`](Self::submit) gets a strictly increasing generation.
/// When several requests are queued the worker renders only the newest one,
/// and the receiving side never returns a response older than one it
/// already returned. Dropping the worker stops and joins the thread.
#[derive(Debug)]
pub struct PreviewWorker {
    requests: Option<Sender<Request>>,
    responses: Receiver<PreviewResponse>,
    handle: Option<JoinHandle<()>>,
    submitted: u64,
    delivered: u64,
}

impl PreviewWorker {
    /// Start a worker thread that owns `service`.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(service: PreviewService) -> std::io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("notemark-preview".to_owned())
            .spawn(move || run(service, &request_rx, &response_tx))?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            handle: Some(handle),
            submitted: 0,
            delivered: 0,
        })
    }

    /// Queue text for rendering and return its generation.
    pub fn submit(&mut self, text: impl Into<String>) -> u64 {
        self.submitted += 1;
        let generation = self.submitted;
        self.send(Request::Render {
            generation,
            text: text.into(),
        });
        generation
    }

    /// Replace the known titles used by later renders.
    pub fn set_known_titles(&self, known_titles: KnownTitles) {
        self.send(Request::SetKnownTitles(known_titles));
    }

    /// Generation of the most recent submission, 0 before the first.
    #[must_use]
    pub fn latest_generation(&self) -> u64 {
        self.submitted
    }

    /// Newest response received so far, without blocking.
    ///
    /// Returns `None` if nothing newer than the last returned response has
    /// arrived.
    pub fn try_latest(&mut self) -> Option<PreviewResponse> {
        let newest = self.responses.try_iter().last()?;
        self.accept(newest)
    }

    /// Wait for the response to the most recent submission.
    ///
    /// Older responses that arrive meanwhile are skipped. On timeout, or if
    /// the worker has stopped, returns the newest response seen during the
    /// wait, if any.
    pub fn wait_latest(&mut self, timeout: Duration) -> Option<PreviewResponse> {
        if self.delivered >= self.submitted {
            return None;
        }
        let deadline = Instant::now() + timeout;
        let mut newest = None;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.responses.recv_timeout(remaining) {
                Ok(response) => {
                    let done = response.generation >= self.submitted;
                    newest = Some(response);
                    if done {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::debug!(generation = self.submitted, "Timed out waiting for preview");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("Preview worker stopped");
                    break;
                }
            }
        }

        self.accept(newest?)
    }

    /// Stop the worker thread and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn accept(&mut self, response: PreviewResponse) -> Option<PreviewResponse> {
        if response.generation <= self.delivered {
            return None;
        }
        self.delivered = response.generation;
        Some(response)
    }

    fn send(&self, request: Request) {
        let sent = self
            .requests
            .as_ref()
            .is_some_and(|requests| requests.send(request).is_ok());
        if !sent {
            tracing::debug!("Preview worker channel closed, request dropped");
        }
    }

    fn stop(&mut self) {
        if let Some(requests) = self.requests.take() {
            // Ignore send errors: the thread may already be gone.
            let _ = requests.send(Request::Shutdown);
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("Preview worker thread panicked");
        }
    }
}

impl Drop for PreviewWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker loop: drain the queue, apply title updates, render the newest text.
fn run(mut service: PreviewService, requests: &Receiver<Request>, responses: &Sender<PreviewResponse>) {
    while let Ok(first) = requests.recv() {
        let mut pending = None;
        let mut skipped = 0usize;

        for request in std::iter::once(first).chain(requests.try_iter()) {
            match request {
                Request::Render { generation, text } => {
                    if pending.replace((generation, text)).is_some() {
                        skipped += 1;
                    }
                }
                Request::SetKnownTitles(known_titles) => service.set_known_titles(known_titles),
                Request::Shutdown => return,
            }
        }

        let Some((generation, text)) = pending else {
            continue;
        };
        if skipped > 0 {
            tracing::trace!(generation, skipped, "Coalesced preview requests");
        }

        let html = service.render(&text);
        if responses.send(PreviewResponse { generation, html }).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    static_assertions::assert_impl_all!(PreviewWorker: Send);

    const WAIT: Duration = Duration::from_secs(10);

    fn worker() -> PreviewWorker {
        PreviewWorker::spawn(PreviewService::default()).unwrap()
    }

    #[test]
    fn test_generations_increase() {
        let mut worker = worker();
        assert_eq!(worker.latest_generation(), 0);
        assert_eq!(worker.submit("a"), 1);
        assert_eq!(worker.submit("b"), 2);
        assert_eq!(worker.latest_generation(), 2);
    }

    #[test]
    fn test_wait_latest_returns_render() {
        let mut worker = worker();
        let generation = worker.submit("# Hello");
        let response = worker.wait_latest(WAIT).unwrap();
        assert_eq!(
            response,
            PreviewResponse {
                generation,
                html: "<h1>Hello</h1>".to_owned(),
            }
        );
    }

    #[test]
    fn test_last_writer_wins() {
        let mut worker = worker();
        for i in 0..20 {
            worker.submit(format!("draft {i}"));
        }
        let last = worker.submit("final");

        let response = worker.wait_latest(WAIT).unwrap();
        assert_eq!(response.generation, last);
        assert_eq!(response.html, "<p>final</p>");
    }

    #[test]
    fn test_stale_responses_discarded() {
        let mut worker = worker();
        worker.submit("one");
        worker.submit("two");
        let response = worker.wait_latest(WAIT).unwrap();
        assert_eq!(response.generation, 2);

        // Anything still in flight is older than what was returned.
        assert_eq!(worker.try_latest(), None);
        assert_eq!(worker.wait_latest(Duration::from_millis(10)), None);
    }

    #[test]
    fn test_try_latest_before_submit() {
        let mut worker = worker();
        assert_eq!(worker.try_latest(), None);
    }

    #[test]
    fn test_known_titles_update() {
        let mut worker = worker();
        worker.submit("[[Foo]]");
        assert!(worker.wait_latest(WAIT).unwrap().html.contains("is-ghost"));

        worker.set_known_titles(KnownTitles::from_iter(["Foo"]));
        worker.submit("[[Foo]]");
        let html = worker.wait_latest(WAIT).unwrap().html;
        assert!(!html.contains("is-ghost"), "{html}");
    }

    #[test]
    fn test_shutdown_joins_thread() {
        let mut worker = worker();
        worker.submit("text");
        worker.shutdown();
    }

    #[test]
    fn test_drop_stops_thread() {
        let worker = worker();
        drop(worker);
    }
}
