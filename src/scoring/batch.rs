//! BatchScorer: a fixed pool of scoring workers fed through a bounded queue
//!
//! Each worker owns one [`Scorer`] (and so one parser) for its lifetime.
//! Jobs carry a oneshot reply; results are collected in submission order.
//! A job that times out, panics or cannot reach a worker becomes a failed
//! [`ItemScore`] with score 0.0 instead of aborting the batch.

use super::matcher::score_tuples;
use super::scorer::Scorer;
use crate::parse::SentenceParser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Why a batch item produced no regular score
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum BatchError {
    #[error("task timed out after {0:?}")]
    Timeout(Duration),

    #[error("scoring task panicked: {0}")]
    Panicked(String),

    #[error("no worker available to score the item")]
    WorkerLost,

    #[error("parse failed: {0}")]
    Parse(String),
}

/// Score of one batch item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemScore {
    /// F score; 0.0 for failed items
    pub score: f64,
    /// Set when the item failed or some of its sentences could not be parsed
    pub failure: Option<BatchError>,
}

impl ItemScore {
    pub fn scored(score: f64) -> Self {
        Self {
            score,
            failure: None,
        }
    }

    pub fn failed(failure: BatchError) -> Self {
        Self {
            score: 0.0,
            failure: Some(failure),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// One (references, candidate) pair
#[derive(Debug, Clone, Default)]
pub struct ScorePair {
    pub references: Vec<String>,
    pub candidate: String,
}

impl ScorePair {
    pub fn new(references: Vec<String>, candidate: impl Into<String>) -> Self {
        Self {
            references,
            candidate: candidate.into(),
        }
    }
}

struct Job {
    pair: ScorePair,
    reply: oneshot::Sender<ItemScore>,
}

/// Scores many pairs concurrently with a pool of reusable workers
pub struct BatchScorer {
    sender: mpsc::Sender<Job>,
    workers: Vec<JoinHandle<()>>,
}

impl BatchScorer {
    /// Start one worker per scorer. Must be called inside a tokio runtime.
    pub fn spawn<P>(scorers: impl IntoIterator<Item = Scorer<P>>, task_timeout: Duration) -> Self
    where
        P: SentenceParser + 'static,
    {
        let scorers: Vec<Arc<Scorer<P>>> = scorers.into_iter().map(Arc::new).collect();
        let (sender, receiver) = mpsc::channel(scorers.len().max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = scorers
            .into_iter()
            .enumerate()
            .map(|(index, scorer)| {
                tokio::spawn(run_worker(index, scorer, receiver.clone(), task_timeout))
            })
            .collect();

        Self { sender, workers }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Score every pair; the result at position i belongs to pair i
    pub async fn score_batch(&self, pairs: Vec<ScorePair>) -> Vec<ItemScore> {
        let mut replies = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let (reply, receiver) = oneshot::channel();
            // A closed queue drops the job and with it the reply sender
            let _ = self.sender.send(Job { pair, reply }).await;
            replies.push(receiver);
        }

        let mut results = Vec::with_capacity(replies.len());
        for (index, receiver) in replies.into_iter().enumerate() {
            let item = match receiver.await {
                Ok(item) => item,
                Err(_) => {
                    tracing::warn!(index, "batch item lost its worker");
                    ItemScore::failed(BatchError::WorkerLost)
                }
            };
            results.push(item);
        }
        results
    }

    /// Score keyed candidates against keyed references
    ///
    /// Items are scored in key order. Only the first candidate of each key
    /// is used and half-width spaces are removed from every sentence. A key
    /// without references is scored against nothing. Returns the mean (0.0
    /// for no items) and the per-item scores.
    pub async fn compute_score(
        &self,
        references: &BTreeMap<String, Vec<String>>,
        candidates: &BTreeMap<String, Vec<String>>,
    ) -> (f64, Vec<f64>) {
        let pairs = candidates
            .iter()
            .map(|(id, candidates)| {
                let candidate = candidates.first().map(|c| strip_spaces(c)).unwrap_or_default();
                let references = references
                    .get(id)
                    .map(|refs| refs.iter().map(|r| strip_spaces(r)).collect())
                    .unwrap_or_default();
                ScorePair::new(references, candidate)
            })
            .collect();

        let scores: Vec<f64> = self
            .score_batch(pairs)
            .await
            .into_iter()
            .map(|item| item.score)
            .collect();
        (mean(&scores), scores)
    }

    /// Close the queue and wait for every worker to finish
    pub async fn shutdown(self) {
        drop(self.sender);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

fn strip_spaces(sentence: &str) -> String {
    sentence.replace(' ', "")
}

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

async fn run_worker<P>(
    index: usize,
    scorer: Arc<Scorer<P>>,
    jobs: Arc<Mutex<mpsc::Receiver<Job>>>,
    task_timeout: Duration,
) where
    P: SentenceParser + 'static,
{
    tracing::debug!(worker = index, "scoring worker started");
    loop {
        let job = jobs.lock().await.recv().await;
        let Some(Job { pair, reply }) = job else {
            break;
        };

        let mut task = tokio::spawn(score_pair(scorer.clone(), pair));
        let item = match timeout(task_timeout, &mut task).await {
            Ok(Ok(item)) => item,
            Ok(Err(e)) => {
                tracing::warn!(worker = index, error = %e, "scoring task panicked");
                ItemScore::failed(BatchError::Panicked(e.to_string()))
            }
            Err(_) => {
                task.abort();
                tracing::warn!(worker = index, timeout = ?task_timeout, "scoring task timed out");
                ItemScore::failed(BatchError::Timeout(task_timeout))
            }
        };
        let _ = reply.send(item);
    }
    tracing::debug!(worker = index, "scoring worker stopped");
}

async fn score_pair<P>(scorer: Arc<Scorer<P>>, pair: ScorePair) -> ItemScore
where
    P: SentenceParser + 'static,
{
    let sets = scorer.tuple_sets(&pair.references, &pair.candidate).await;
    let synonyms = scorer.synonyms().clone();
    let failures = sets.failures;
    let (candidate, reference) = (sets.candidate, sets.reference);

    let score = tokio::task::spawn_blocking(move || {
        score_tuples(candidate, reference, synonyms.as_ref())
    })
    .await;

    match score {
        Ok(score) => ItemScore {
            score: score.f,
            failure: (!failures.is_empty()).then(|| BatchError::Parse(failures.join("; "))),
        },
        Err(e) => ItemScore::failed(BatchError::Panicked(e.to_string())),
    }
}
