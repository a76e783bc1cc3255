//! The tasks a simulated Retrograde user performs

use crate::cache::KnownCard;
use crate::metrics::RequestRecord;
use crate::outcome::{classify_result, Outcome, StatusPolicy};
use crate::random::{choose, RandomSource};
use crate::tasks::TaskKind;
use crate::user::VirtualUser;
use crate::vocabulary;
use retrograde_http::{HttpClient, HttpError, HttpRequest, HttpResponse};
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::debug;

/// Name given to every card created under load
pub const CARD_NAME: &str = "Loadtest Card";

impl<C, R> VirtualUser<C, R>
where
    C: HttpClient,
    R: RandomSource,
{
    /// Runs once before the weighted rotation: seed the card cache
    pub async fn on_start(&mut self) -> Outcome {
        self.load_cards().await
    }

    /// Execute one task. `None` means the task had nothing to do and issued
    /// no request.
    pub async fn run_task(&mut self, kind: TaskKind) -> Option<Outcome> {
        match kind {
            TaskKind::LoadBoard => Some(self.load_board().await),
            TaskKind::LoadRanks => Some(self.load_ranks().await),
            TaskKind::LoadCards => Some(self.load_cards().await),
            TaskKind::CreateCard => Some(self.create_card().await),
            TaskKind::DeleteCard => self.delete_card().await,
            TaskKind::VoteCard => self.vote_card().await,
        }
    }

    /// Pick a task by weight and run it
    pub async fn step(&mut self) -> (TaskKind, Option<Outcome>) {
        let kind = self.tasks.pick(&mut self.rng);
        let outcome = self.run_task(kind).await;
        (kind, outcome)
    }

    pub async fn load_board(&mut self) -> Outcome {
        let request = HttpRequest::get(TaskKind::LoadBoard.name(), self.targets.board_path());
        self.issue(request, StatusPolicy::Default).await
    }

    pub async fn load_ranks(&mut self) -> Outcome {
        let request = HttpRequest::get(TaskKind::LoadRanks.name(), self.targets.ranks_path());
        self.issue(request, StatusPolicy::Default).await
    }

    /// List the board's cards and replace the cache with them.
    ///
    /// The cache is only touched when the listing both succeeds and parses;
    /// on any failure the previous contents stay in place.
    pub async fn load_cards(&mut self) -> Outcome {
        let request = HttpRequest::get(TaskKind::LoadCards.name(), self.targets.cards_path());
        let method = request.method;
        let name = request.name.clone();

        let (result, elapsed) = self.send_timed(request).await;
        let mut outcome = classify_result(&result, StatusPolicy::Default);

        if let (true, Ok(response)) = (outcome.is_success(), &result) {
            match response.json::<Vec<KnownCard>>() {
                Ok(cards) => {
                    debug!(user = self.id, cards = cards.len(), "Refreshed card cache");
                    self.cards.replace(cards);
                }
                Err(e) => outcome = Outcome::Failure(format!("Invalid card list: {}", e)),
            }
        }

        self.record(RequestRecord {
            method,
            name,
            status: status_of(&result),
            elapsed,
            outcome: outcome.clone(),
        })
        .await;
        outcome
    }

    pub async fn create_card(&mut self) -> Outcome {
        let rank = match choose(&mut self.rng, &self.targets.ranks) {
            Some(rank) => rank.clone(),
            None => return Outcome::Failure("No ranks configured".to_string()),
        };
        let description = vocabulary::describe(&mut self.rng);

        let request = HttpRequest::post(
            TaskKind::CreateCard.name(),
            self.targets.rank_cards_path(&rank),
        )
        .json(json!({
            "name": CARD_NAME,
            "description": description,
        }));

        self.issue(request, StatusPolicy::Default).await
    }

    /// Delete a known card. 404 counts as success since another user may
    /// have deleted it first.
    pub async fn delete_card(&mut self) -> Option<Outcome> {
        let card = self.cards.choose(&mut self.rng)?.clone();
        let request = HttpRequest::delete(
            TaskKind::DeleteCard.name(),
            self.targets.card_path(&card.rank_id, &card.id),
        );
        Some(self.issue(request, StatusPolicy::NotFoundIsSuccess).await)
    }

    /// Vote on a known card. 404 counts as success, as for deletes.
    pub async fn vote_card(&mut self) -> Option<Outcome> {
        let card = self.cards.choose(&mut self.rng)?.clone();
        let request = HttpRequest::post(
            TaskKind::VoteCard.name(),
            self.targets.vote_path(&card.rank_id, &card.id),
        );
        Some(self.issue(request, StatusPolicy::NotFoundIsSuccess).await)
    }

    /// Send, classify under `policy`, and report to the collector
    async fn issue(&self, request: HttpRequest, policy: StatusPolicy) -> Outcome {
        let method = request.method;
        let name = request.name.clone();

        let (result, elapsed) = self.send_timed(request).await;
        let outcome = classify_result(&result, policy);

        self.record(RequestRecord {
            method,
            name,
            status: status_of(&result),
            elapsed,
            outcome: outcome.clone(),
        })
        .await;
        outcome
    }

    async fn send_timed(&self, request: HttpRequest) -> (Result<HttpResponse, HttpError>, Duration) {
        let started = Instant::now();
        let result = self.client.send(request).await;
        (result, started.elapsed())
    }

    async fn record(&self, record: RequestRecord) {
        if let Outcome::Failure(ref reason) = record.outcome {
            debug!(
                user = self.id,
                method = %record.method,
                name = %record.name,
                "Request failed: {}",
                reason
            );
        }
        self.metrics.record(record).await;
    }
}

fn status_of(result: &Result<HttpResponse, HttpError>) -> Option<u16> {
    result.as_ref().ok().map(|response| response.status)
}
