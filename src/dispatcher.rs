//! Client-direct dispatch: one chat link opened per recipient, in batches
//! separated by a delay.

use std::{io::Write, sync::Arc};

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::domain::{ChatLink, DispatchRequest, WA_ME_BASE_URL};

/// Something that can act on a chat link, usually by opening it.
pub trait LinkOpener: Send + Sync + 'static {
    fn open(&self, link: &ChatLink) -> Result<(), OpenError>;
}

#[derive(thiserror::Error, Debug)]
pub enum OpenError {
    #[error("couldn't open the chat link, io error {0}")]
    Io(#[from] std::io::Error),
}

/// Opens links in the default system browser, each in a new tab.
pub struct BrowserOpener;

impl LinkOpener for BrowserOpener {
    fn open(&self, link: &ChatLink) -> Result<(), OpenError> {
        open::that_detached(link.as_ref())?;
        Ok(())
    }
}

/// Prints links to stdout instead of opening them.
pub struct PrintOpener;

impl LinkOpener for PrintOpener {
    fn open(&self, link: &ChatLink) -> Result<(), OpenError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", link)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub batches: usize,
    pub opened: usize,
    pub failed: usize,
}

#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("the dispatch task stopped before the last batch, {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

/// The batches still waiting to fire after `dispatch` returned.
///
/// Dropping the handle does not stop them. Await `finished` to wait for the
/// last batch.
pub struct DispatchHandle {
    task: JoinHandle<DispatchReport>,
}

impl DispatchHandle {
    pub async fn finished(self) -> Result<DispatchReport, DispatchError> {
        Ok(self.task.await?)
    }
}

pub struct BatchedDispatcher<O> {
    opener: Arc<O>,
    base_url: String,
}

impl<O: LinkOpener> BatchedDispatcher<O> {
    pub fn new(opener: O) -> Self {
        Self::with_base_url(opener, WA_ME_BASE_URL)
    }

    pub fn with_base_url(opener: O, base_url: impl Into<String>) -> Self {
        Self {
            opener: Arc::new(opener),
            base_url: base_url.into(),
        }
    }

    /// Opens the first batch right away and schedules the rest.
    ///
    /// Returns as soon as the first batch is issued. Each following batch
    /// starts `delay` after the previous one was fully issued. Must be called
    /// from within a tokio runtime.
    pub fn dispatch(&self, request: DispatchRequest) -> DispatchHandle {
        let mut batches = request
            .batches()
            .map(|batch| {
                batch
                    .iter()
                    .map(|phone| ChatLink::with_base_url(&self.base_url, phone, request.message()))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
            .into_iter();

        let span = tracing::info_span!(
            "Dispatching chat links",
            recipients = request.recipients().len(),
            batch_size = request.batch_size().get(),
            delay_ms = request.delay().as_millis() as u64,
        );

        let mut report = DispatchReport::default();
        if let Some(first) = batches.next() {
            span.in_scope(|| open_batch(self.opener.as_ref(), &first, &mut report));
        }

        let opener = Arc::clone(&self.opener);
        let delay = request.delay();
        let task = tokio::spawn(
            async move {
                for batch in batches {
                    tokio::time::sleep(delay).await;
                    open_batch(opener.as_ref(), &batch, &mut report);
                }
                tracing::info!(
                    opened = report.opened,
                    failed = report.failed,
                    "All batches issued"
                );
                report
            }
            .instrument(span),
        );

        DispatchHandle { task }
    }
}

fn open_batch<O: LinkOpener>(opener: &O, links: &[ChatLink], report: &mut DispatchReport) {
    report.batches += 1;
    for link in links {
        match opener.open(link) {
            Ok(()) => report.opened += 1,
            Err(e) => {
                tracing::error!("{} ({})", e, link);
                report.failed += 1;
            }
        }
    }
    tracing::info!(batch = report.batches, size = links.len(), "Batch issued");
}
