use crate::{OutputFormat, SearchServer, ServerConfig};
use anyhow::{Context, Result};
use clap::Parser;
use linesearch_core::IndexLimits;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "linesearch-server")]
#[command(
    about = "Rank documents for streams of queries against a line-per-document corpus",
    long_about = None
)]
pub struct Cli {
    /// Document corpus, one document per line
    #[arg(long)]
    pub docs: PathBuf,
    /// Query file, one query per line; repeat to serve several streams
    /// concurrently. Reads stdin when omitted
    #[arg(long)]
    pub queries: Vec<PathBuf>,
    /// Corpus to rebuild the index from while queries are being served; may be repeated
    #[arg(long)]
    pub rebuild: Vec<PathBuf>,
    /// Result file; with several query streams each gets `<output>.<n>`. Writes stdout when omitted
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Maximum documents reported per query
    #[arg(long, default_value_t = linesearch_core::MAX_RESULTS)]
    pub top_k: usize,
    /// Refuse to index corpora with more documents than this
    #[arg(long)]
    pub max_documents: Option<usize>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Cli {
    pub fn config(&self) -> ServerConfig {
        ServerConfig {
            top_k: self.top_k.clamp(1, 100),
            limits: IndexLimits { max_documents: self.max_documents },
            format: self.format,
        }
    }
}

type QueryStream = (Box<dyn BufRead + Send>, Box<dyn Write + Send>);

/// Build the initial index, launch every stream and rebuild, then wait.
///
/// All inputs and outputs are opened before anything is launched, so a bad
/// path fails the run without leaving operations behind.
pub async fn run(cli: Cli) -> Result<()> {
    let docs = open(&cli.docs)?;
    let rebuilds = cli.rebuild.iter().map(|path| open(path)).collect::<Result<Vec<_>>>()?;
    let streams = query_streams(&cli)?;

    let server = SearchServer::with_documents(docs, cli.config())
        .with_context(|| format!("indexing {}", cli.docs.display()))?;

    for (queries, output) in streams {
        server.serve_queries(queries, output);
    }
    for documents in rebuilds {
        server.rebuild_index(documents);
    }

    tracing::info!(pending = server.pending(), "operations launched");
    server.drain().await
}

fn query_streams(cli: &Cli) -> Result<Vec<QueryStream>> {
    if cli.queries.is_empty() {
        let stdin: Box<dyn BufRead + Send> = Box::new(BufReader::new(std::io::stdin()));
        return Ok(vec![(stdin, sink(cli.output.as_deref())?)]);
    }
    let inputs = cli.queries.iter().map(|path| open(path)).collect::<Result<Vec<_>>>()?;
    let count = inputs.len();
    let mut streams = Vec::with_capacity(count);
    for (n, queries) in inputs.into_iter().enumerate() {
        let output = cli.output.as_deref().map(|base| output_path(base, n, count));
        let queries: Box<dyn BufRead + Send> = Box::new(queries);
        streams.push((queries, sink(output.as_deref())?));
    }
    Ok(streams)
}

fn sink(path: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    let sink: Box<dyn Write + Send> = match path {
        Some(path) => Box::new(create(path)?),
        None => Box::new(std::io::stdout()),
    };
    Ok(sink)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn output_path(base: &Path, n: usize, streams: usize) -> PathBuf {
    if streams == 1 {
        return base.to_path_buf();
    }
    let mut name = OsString::from(base.as_os_str());
    name.push(format!(".{n}"));
    PathBuf::from(name)
}
