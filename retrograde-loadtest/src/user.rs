//! Virtual user state and its task loop

use crate::cache::KnownCards;
use crate::metrics::MetricsCollector;
use crate::random::RandomSource;
use crate::targets::Targets;
use crate::tasks::TaskTable;
use retrograde_http::HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, trace};

/// One simulated client.
///
/// Each user owns its HTTP client (and therefore its cookie jar), its random
/// source and its card cache. Tasks take `&mut self`, so a cache refresh can
/// never interleave with a delete or vote of the same user.
pub struct VirtualUser<C, R> {
    pub(crate) id: usize,
    pub(crate) client: C,
    pub(crate) rng: R,
    pub(crate) targets: Arc<Targets>,
    pub(crate) tasks: Arc<TaskTable>,
    pub(crate) metrics: Arc<MetricsCollector>,
    pub(crate) cards: KnownCards,
    wait_time: (Duration, Duration),
}

impl<C, R> VirtualUser<C, R>
where
    C: HttpClient,
    R: RandomSource,
{
    pub fn new(
        id: usize,
        client: C,
        rng: R,
        targets: Arc<Targets>,
        tasks: Arc<TaskTable>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            id,
            client,
            rng,
            targets,
            tasks,
            metrics,
            cards: KnownCards::new(),
            wait_time: (Duration::ZERO, Duration::ZERO),
        }
    }

    /// Pause between tasks, drawn uniformly from `min..=max`
    pub fn with_wait_time(mut self, min: Duration, max: Duration) -> Self {
        self.wait_time = (min, max.max(min));
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn known_cards(&self) -> &KnownCards {
        &self.cards
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run `on_start`, then pick and execute tasks until `stop` turns true.
    ///
    /// The stop flag is checked between tasks and during the wait; a request
    /// already in flight is allowed to finish.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> Self {
        debug!(user = self.id, "Virtual user started");

        if !*stop.borrow() {
            self.on_start().await;
        }

        let mut iterations: u64 = 0;
        while !*stop.borrow() {
            let (kind, outcome) = self.step().await;
            iterations += 1;
            trace!(user = self.id, task = %kind, ?outcome, "Task finished");

            if self.wait(&mut stop).await {
                break;
            }
        }

        debug!(user = self.id, iterations, "Virtual user stopped");
        self
    }

    /// Sleep for the configured think time. Returns true when stopped.
    async fn wait(&mut self, stop: &mut watch::Receiver<bool>) -> bool {
        let (min, max) = self.wait_time;
        let millis = if max.is_zero() {
            0
        } else {
            self.rng
                .between(min.as_millis() as u64, max.as_millis() as u64)
        };

        if millis == 0 {
            // Responses can be immediate; let other users and the runner progress
            tokio::task::yield_now().await;
            return *stop.borrow();
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(millis)) => *stop.borrow(),
            changed = stop.changed() => changed.is_err() || *stop.borrow(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use retrograde_http::{HttpMethod, MockClient, MockResponse};

    fn user(targets: Arc<Targets>) -> VirtualUser<MockClient, ScriptedRandom> {
        VirtualUser::new(
            0,
            MockClient::with_default(MockResponse::status(200)),
            ScriptedRandom::zeros(),
            targets,
            Arc::new(TaskTable::default()),
            Arc::new(MetricsCollector::new().unwrap()),
        )
        .with_wait_time(Duration::from_millis(10), Duration::from_millis(10))
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loads_cards_once_before_weighted_tasks() {
        let targets = Arc::new(Targets::default());
        let (stop_tx, stop_rx) = watch::channel(false);

        let handle = tokio::spawn(user(Arc::clone(&targets)).run(stop_rx));
        tokio::time::sleep(Duration::from_millis(35)).await;
        stop_tx.send_replace(true);
        let user = handle.await.unwrap();

        let requests = user.client().requests().await;
        assert!(requests.len() >= 3, "got {} requests", requests.len());

        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].name, "Load Cards");
        assert_eq!(requests[0].path, "/boards/mBDcdvqipyObonQy/cards");

        // A roll of zero always lands on Load Board
        assert!(requests[1..]
            .iter()
            .all(|request| request.path == targets.board_path()));
    }

    #[tokio::test]
    async fn test_user_stopped_before_start_issues_nothing() {
        let (_stop_tx, stop_rx) = watch::channel(true);

        let user = user(Arc::new(Targets::default())).run(stop_rx).await;

        assert_eq!(user.client().request_count().await, 0);
        assert!(user.known_cards().is_empty());
    }
}
