use std::time::Duration;

use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tokio::task;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::output;
use crate::pool::{self, TargetSender, WorkerPool};
use crate::probe::{ClientConfig, HeaderDirective, ProbeResult, Prober};
use crate::utils;

#[derive(Clone, Debug)]
pub enum TargetSource {
    Stdin,
    FilePath(String),
    Inline(Vec<String>),
}

#[derive(Clone, Debug)]
pub struct Options {
    pub targets: TargetSource,
    pub concurrency: usize,
    pub timeout_seconds: u64,
    pub ports: Vec<String>,
    pub insecure: bool,
    pub follow_redirects: bool,
    pub user_agent: String,
    pub headers: Vec<HeaderDirective>,
    pub output: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            targets: TargetSource::Stdin,
            concurrency: utils::default_concurrency(),
            timeout_seconds: utils::DEFAULT_TIMEOUT_SECONDS,
            ports: vec!["443".to_string(), "80".to_string()],
            insecure: true,
            follow_redirects: true,
            user_agent: utils::DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
            output: None,
        }
    }
}

impl Options {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.timeout_seconds),
            insecure: self.insecure,
            follow_redirects: self.follow_redirects,
            user_agent: self.user_agent.clone(),
            headers: self.headers.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("no ports to probe")]
    NoPorts,

    #[error("invalid concurrency {value}, expected positive integer")]
    InvalidConcurrency { value: usize },

    #[error("invalid timeout {value}, expected positive number of seconds")]
    InvalidTimeout { value: u64 },

    #[error("invalid header directive: {message}")]
    InvalidHeader { message: String },

    #[error("failed to open domain/url list: {path}: {source}")]
    InputOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read domain/url list: {source}")]
    InputRead {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open output file: {path}: {source}")]
    OutputOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("task join failed: {source}")]
    TaskJoin {
        #[source]
        source: tokio::task::JoinError,
    },
}

#[derive(Clone, Debug)]
pub struct ScanSummary {
    pub started_at: Instant,
    pub elapsed: Duration,
    pub targets: usize,
    pub probes: usize,
    pub results: usize,
}

#[derive(Clone, Debug)]
pub struct Runner {
    options: Options,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        if options.ports.is_empty() {
            return Err(RunnerError::NoPorts);
        }
        if options.concurrency == 0 {
            return Err(RunnerError::InvalidConcurrency {
                value: options.concurrency,
            });
        }
        if options.timeout_seconds == 0 {
            return Err(RunnerError::InvalidTimeout {
                value: options.timeout_seconds,
            });
        }
        for directive in options.headers.iter() {
            directive
                .validate()
                .map_err(|message| RunnerError::InvalidHeader { message })?;
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Probes every target and prints results to standard output.
    pub async fn run(&self) -> Result<ScanSummary, RunnerError> {
        self.run_with_writer(tokio::io::stdout()).await
    }

    /// Same as [`Runner::run`] with results written to `out`.
    pub async fn run_with_writer<W>(&self, out: W) -> Result<ScanSummary, RunnerError>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        // the input must open before any work starts, a bad path aborts the run
        let input = open_targets(&self.options.targets).await?;
        self.drive(input, out).await
    }

    async fn drive<W>(&self, input: TargetInput, out: W) -> Result<ScanSummary, RunnerError>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let started_at = Instant::now();

        let mirror = match self.options.output.as_deref() {
            Some(path) => Some(output::open_output_file(path).await.map_err(|e| {
                RunnerError::OutputOpen {
                    path: path.to_string(),
                    source: e,
                }
            })?),
            None => None,
        };

        let prober = Prober::new(self.options.client_config())
            .map_err(|e| RunnerError::HttpClientBuild { source: e })?;

        let worker_pool = WorkerPool::new(self.options.concurrency, self.options.ports.clone());
        debug!(
            workers = worker_pool.workers(),
            ports = ?self.options.ports,
            timeout = self.options.timeout_seconds,
            "starting probe pool"
        );

        let (target_tx, target_rx) = pool::work_stream();
        let (result_tx, result_rx) = mpsc::channel::<ProbeResult>(worker_pool.workers());

        let writer_handle =
            task::spawn(async move { output::write_results(result_rx, out, mirror).await });
        let producer_handle = task::spawn(produce_targets(input, target_tx));

        let probe = move |url: String| {
            let prober = prober.clone();
            async move { prober.probe(&url).await }
        };
        let pool_result = worker_pool.run(target_rx, probe, result_tx).await;

        let produced = producer_handle
            .await
            .map_err(|e| RunnerError::TaskJoin { source: e })?;
        let stats = pool_result.map_err(|e| RunnerError::TaskJoin { source: e })?;
        let written = writer_handle
            .await
            .map_err(|e| RunnerError::TaskJoin { source: e })?;

        // queued targets are drained before a read failure is reported
        if let Err(e) = produced {
            warn!(
                targets = stats.targets,
                results = written,
                "input failed mid-stream, aborting"
            );
            return Err(e);
        }

        let elapsed = started_at.elapsed();
        info!(
            targets = stats.targets,
            probes = stats.probes,
            results = written,
            elapsed_ms = elapsed.as_millis() as u64,
            "scan complete"
        );
        Ok(ScanSummary {
            started_at,
            elapsed,
            targets: stats.targets,
            probes: stats.probes,
            results: written,
        })
    }
}

enum TargetInput {
    Reader(Box<dyn AsyncRead + Unpin + Send>),
    Inline(Vec<String>),
}

async fn open_targets(source: &TargetSource) -> Result<TargetInput, RunnerError> {
    match source {
        TargetSource::Stdin => Ok(TargetInput::Reader(Box::new(tokio::io::stdin()))),
        TargetSource::FilePath(path) => {
            let path = crate::config::expand_tilde_string(path);
            let handle = File::open(&path)
                .await
                .map_err(|e| RunnerError::InputOpen {
                    path: path.clone(),
                    source: e,
                })?;
            Ok(TargetInput::Reader(Box::new(handle)))
        }
        TargetSource::Inline(values) => Ok(TargetInput::Inline(values.clone())),
    }
}

// Feeds targets into the work stream. Returning drops the sender, which closes
// the stream and releases every idle worker.
async fn produce_targets(input: TargetInput, tx: TargetSender) -> Result<usize, RunnerError> {
    let mut sent = 0usize;
    match input {
        TargetInput::Inline(values) => {
            for value in values {
                let Some(target) = utils::clean_target_line(&value) else {
                    continue;
                };
                if tx.send(target.to_string()).await.is_err() {
                    break;
                }
                sent += 1;
            }
        }
        TargetInput::Reader(reader) => {
            // raw lines, so one badly encoded line cannot end the stream
            let mut reader = BufReader::new(reader);
            let mut buf: Vec<u8> = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf);
                        let Some(target) = utils::clean_target_line(&line) else {
                            continue;
                        };
                        let target = target.to_string();
                        if tx.send(target).await.is_err() {
                            break;
                        }
                        sent += 1;
                    }
                    Err(e) => return Err(RunnerError::InputRead { source: e }),
                }
            }
        }
    }
    Ok(sent)
}
