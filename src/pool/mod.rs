pub mod candidates;

use std::future::Future;
use std::ops::AddAssign;
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{self, JoinError};
use tracing::{debug, trace};

use crate::probe::{ProbeError, ProbeResult};

/// Sending half of the work stream. Dropping every sender closes the stream
/// and lets idle workers return.
pub type TargetSender = mpsc::Sender<String>;
pub type TargetReceiver = mpsc::Receiver<String>;

/// Creates the shared work stream. It holds a single target so the producer
/// can never run far ahead of the workers.
pub fn work_stream() -> (TargetSender, TargetReceiver) {
    mpsc::channel::<String>(1)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub targets: usize,
    pub probes: usize,
    pub results: usize,
}

impl AddAssign for PoolStats {
    fn add_assign(&mut self, rhs: Self) {
        self.targets += rhs.targets;
        self.probes += rhs.probes;
        self.results += rhs.results;
    }
}

/// A fixed set of workers draining one shared stream of targets.
#[derive(Clone, Debug)]
pub struct WorkerPool {
    workers: usize,
    ports: Arc<Vec<String>>,
}

impl WorkerPool {
    pub fn new(workers: usize, ports: Vec<String>) -> Self {
        Self {
            workers: workers.max(1),
            ports: Arc::new(ports),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs every worker until `targets` is closed and drained, then returns
    /// the combined counters. Each target is received by exactly one worker.
    ///
    /// Failed probes are dropped here on purpose: they are logged at debug
    /// level and never forwarded to `results`.
    pub async fn run<P, F>(
        &self,
        targets: TargetReceiver,
        probe: P,
        results: mpsc::Sender<ProbeResult>,
    ) -> Result<PoolStats, JoinError>
    where
        P: Fn(String) -> F + Clone + Send + Sync + 'static,
        F: Future<Output = Result<ProbeResult, ProbeError>> + Send + 'static,
    {
        let queue = Arc::new(Mutex::new(targets));
        let workers = FuturesUnordered::new();
        for id in 0..self.workers {
            let queue = queue.clone();
            let ports = self.ports.clone();
            let probe = probe.clone();
            let results = results.clone();
            workers.push(task::spawn(async move {
                run_worker(id, queue, ports, probe, results).await
            }));
        }
        drop(results);

        let finished: Vec<_> = workers.collect().await;
        let mut stats = PoolStats::default();
        for worker in finished {
            stats += worker?;
        }
        Ok(stats)
    }
}

async fn run_worker<P, F>(
    id: usize,
    queue: Arc<Mutex<TargetReceiver>>,
    ports: Arc<Vec<String>>,
    probe: P,
    results: mpsc::Sender<ProbeResult>,
) -> PoolStats
where
    P: Fn(String) -> F,
    F: Future<Output = Result<ProbeResult, ProbeError>>,
{
    let mut stats = PoolStats::default();
    loop {
        let next = queue.lock().await.recv().await;
        let Some(target) = next else {
            break;
        };
        stats.targets += 1;
        trace!(worker = id, target = %target, "picked up target");

        for url in candidates::candidates_for(&target, &ports) {
            stats.probes += 1;
            match probe(url).await {
                Ok(result) => {
                    if results.send(result).await.is_err() {
                        debug!(worker = id, "result sink closed, stopping worker");
                        return stats;
                    }
                    stats.results += 1;
                }
                Err(e) => {
                    debug!(worker = id, timeout = e.is_timeout(), error = %e, "probe skipped");
                }
            }
        }
    }
    trace!(worker = id, "work stream closed");
    stats
}
