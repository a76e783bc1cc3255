//! Spawns virtual users, stops them, and collects the final report

use crate::error::{LoadTestError, LoadTestResult};
use crate::metrics::{LoadTestReport, MetricsCollector};
use crate::targets::Targets;
use crate::tasks::TaskTable;
use crate::user::VirtualUser;
use retrograde_config::RetrogradeConfig;
use retrograde_http::{HttpClient, HttpConfig, HttpError, ReqwestClient};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// Drives one load test run
pub struct Runner {
    config: RetrogradeConfig,
    targets: Arc<Targets>,
    tasks: Arc<TaskTable>,
    metrics: Arc<MetricsCollector>,
}

impl Runner {
    /// Validate `config` and prepare the shared, read-only run state
    pub fn new(config: RetrogradeConfig) -> LoadTestResult<Self> {
        config.validate_all()?;
        let tasks = TaskTable::new(&config.target.weights)?;
        let targets = Targets::from(&config.target);

        Ok(Self {
            config,
            targets: Arc::new(targets),
            tasks: Arc::new(tasks),
            metrics: Arc::new(MetricsCollector::new()?),
        })
    }

    pub fn config(&self) -> &RetrogradeConfig {
        &self.config
    }

    /// Live statistics, shared with every user
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.metrics)
    }

    /// Run against `target.host`, one reqwest client per user.
    ///
    /// The run ends when `users.run_time` elapses or `interrupt` completes,
    /// whichever comes first.
    pub async fn run<F>(&self, interrupt: F) -> LoadTestResult<LoadTestReport>
    where
        F: Future<Output = ()>,
    {
        let host = self
            .config
            .target
            .host
            .clone()
            .ok_or(LoadTestError::MissingHost)?;
        let http_config = HttpConfig::from(self.config.http.clone());

        // Surface a bad host before any user is spawned
        ReqwestClient::new(&host, &http_config)?;

        self.run_with(move |_| ReqwestClient::new(&host, &http_config), interrupt)
            .await
    }

    /// Run with clients produced by `make_client`, called once per user id
    pub async fn run_with<C, M, F>(&self, mut make_client: M, interrupt: F) -> LoadTestResult<LoadTestReport>
    where
        C: HttpClient + 'static,
        M: FnMut(usize) -> Result<C, HttpError>,
        F: Future<Output = ()>,
    {
        let users = &self.config.users;
        let spawn_interval = users.spawn_interval();
        let (wait_min, wait_max) = users.wait_time();

        info!(
            "Spawning {} users at {:.2}/s against board {}",
            users.count, users.spawn_rate, self.targets.board
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        // A run time past the end of the clock means no deadline
        let deadline = users
            .run_time
            .and_then(|run_time| Instant::now().checked_add(run_time));
        if users.run_time.is_some() && deadline.is_none() {
            debug!("Run time exceeds the clock range; running until interrupted");
        }
        let expired = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expired);
        tokio::pin!(interrupt);

        let mut handles: Vec<JoinHandle<VirtualUser<C, fastrand::Rng>>> =
            Vec::with_capacity(users.count);
        let mut stopped = false;

        for id in 0..users.count {
            if id > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(spawn_interval) => {}
                    _ = &mut expired => { stopped = true; }
                    _ = &mut interrupt => {
                        info!("Interrupted while spawning users");
                        stopped = true;
                    }
                }
                if stopped {
                    break;
                }
            }

            let rng = match users.seed {
                Some(seed) => fastrand::Rng::with_seed(seed.wrapping_add(id as u64)),
                None => fastrand::Rng::new(),
            };

            let client = match make_client(id) {
                Ok(client) => client,
                Err(e) => {
                    stop_tx.send_replace(true);
                    return Err(e.into());
                }
            };

            let user = VirtualUser::new(
                id,
                client,
                rng,
                Arc::clone(&self.targets),
                Arc::clone(&self.tasks),
                Arc::clone(&self.metrics),
            )
            .with_wait_time(wait_min, wait_max);

            debug!(user = id, "Spawning virtual user");
            handles.push(tokio::spawn(user.run(stop_rx.clone())));
        }

        if !stopped {
            info!("All {} users spawned", handles.len());

            if users.reset_stats {
                info!("Resetting statistics");
                self.metrics.reset().await;
            }

            tokio::select! {
                _ = &mut expired => info!("Run time elapsed"),
                _ = &mut interrupt => info!("Interrupted"),
            }
        }

        info!("Stopping {} users", handles.len());
        stop_tx.send_replace(true);

        let spawned = handles.len();
        for (user, handle) in handles.into_iter().enumerate() {
            handle
                .await
                .map_err(|source| LoadTestError::UserTask { user, source })?;
        }

        let report = self.metrics.snapshot(spawned).await;
        info!(
            "Run finished: {} requests, {} failures",
            report.aggregated.requests, report.aggregated.failures
        );
        Ok(report)
    }
}
