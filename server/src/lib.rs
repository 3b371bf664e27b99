//! Concurrent serving on top of `linesearch_core`: index rebuilds and query
//! streams run as tracked background tasks sharing one [`IndexHandle`].

pub mod cli;

use anyhow::{Context, Result};
use clap::ValueEnum;
use linesearch_core::{
    lookup_top, lossy_lines, IndexHandle, IndexLimits, InvertedIndex, RankedResult, MAX_RESULTS,
};
use parking_lot::Mutex;
use std::io::{BufRead, Write};
use tokio::task::JoinHandle;

/// How each result line is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `query: {docid: N, hitcount: H} ...`
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    pub top_k: usize,
    pub limits: IndexLimits,
    pub format: OutputFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { top_k: MAX_RESULTS, limits: IndexLimits::default(), format: OutputFormat::Text }
    }
}

/// Render one result in the line format, without the terminator.
pub fn format_result(result: &RankedResult) -> String {
    let mut line = String::with_capacity(result.query.len() + 1 + result.hits.len() * 28);
    line.push_str(&result.query);
    line.push(':');
    for hit in &result.hits {
        line.push_str(&format!(" {{docid: {}, hitcount: {}}}", hit.docid, hit.hit_count));
    }
    line
}

fn render(result: &RankedResult, format: OutputFormat) -> Result<String> {
    let mut line = match format {
        OutputFormat::Text => format_result(result),
        OutputFormat::Json => serde_json::to_string(result)?,
    };
    line.push('\n');
    Ok(line)
}

/// Owns the live index and every operation launched against it.
///
/// `rebuild_index` and `serve_queries` return immediately; the work runs on
/// tokio's blocking pool, so both must be called from inside a runtime.
/// Call [`SearchServer::drain`] to wait for everything launched so far.
pub struct SearchServer {
    index: IndexHandle,
    config: ServerConfig,
    tasks: Mutex<Vec<JoinHandle<Result<()>>>>,
}

impl Default for SearchServer {
    fn default() -> Self { Self::new(ServerConfig::default()) }
}

impl SearchServer {
    /// Server over an empty index.
    pub fn new(config: ServerConfig) -> Self {
        Self { index: IndexHandle::default(), config, tasks: Mutex::new(Vec::new()) }
    }

    /// Server whose first index is built from `documents` before returning.
    pub fn with_documents<R: BufRead>(documents: R, config: ServerConfig) -> Result<Self> {
        let index = InvertedIndex::from_reader(documents, config.limits)?;
        Ok(Self { index: IndexHandle::new(index), config, tasks: Mutex::new(Vec::new()) })
    }

    pub fn handle(&self) -> &IndexHandle { &self.index }

    pub fn config(&self) -> &ServerConfig { &self.config }

    /// Build a fresh index from `documents` in the background and install it.
    ///
    /// A failed build leaves the current index in place.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn rebuild_index<R>(&self, documents: R)
    where
        R: BufRead + Send + 'static,
    {
        let handle = self.index.clone();
        let limits = self.config.limits;
        self.track(tokio::task::spawn_blocking(move || {
            let index =
                InvertedIndex::from_reader(documents, limits).context("rebuilding index")?;
            handle.replace(index);
            Ok(())
        }));
    }

    /// Answer every line of `queries` in order, one result line each.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn serve_queries<R, W>(&self, queries: R, output: W)
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        let handle = self.index.clone();
        let config = self.config;
        self.track(tokio::task::spawn_blocking(move || serve(&handle, config, queries, output)));
    }

    /// Operations launched but not yet drained.
    pub fn pending(&self) -> usize { self.tasks.lock().len() }

    /// Wait for every launched operation, including ones launched while
    /// draining. Failures are logged; the first one is returned once all
    /// work has finished.
    pub async fn drain(&self) -> Result<()> {
        let mut first_error = None;
        loop {
            let tasks = std::mem::take(&mut *self.tasks.lock());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                let outcome = match task.await {
                    Ok(outcome) => outcome,
                    Err(join_err) => {
                        Err(anyhow::Error::new(join_err).context("search operation panicked"))
                    }
                };
                if let Err(err) = outcome {
                    tracing::warn!(error = %format!("{err:#}"), "search operation failed");
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn track(&self, task: JoinHandle<Result<()>>) {
        self.tasks.lock().push(task);
    }
}

fn serve<R: BufRead, W: Write>(
    handle: &IndexHandle,
    config: ServerConfig,
    queries: R,
    mut output: W,
) -> Result<()> {
    let mut served = 0usize;
    for (lineno, query) in lossy_lines(queries).enumerate() {
        let query = query.with_context(|| format!("reading query line {}", lineno + 1))?;
        let result = handle.read(|index| lookup_top(index, &query, config.top_k));
        // One write per line keeps concurrent streams on a shared sink whole.
        output
            .write_all(render(&result, config.format)?.as_bytes())
            .context("writing search result")?;
        served += 1;
    }
    output.flush().context("flushing search results")?;
    tracing::debug!(served, "query stream finished");
    Ok(())
}
