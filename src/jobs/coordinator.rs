use crate::core::types::{CrawlJob, ProgressEnvelope};
use crate::repo;
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

const PROGRESS_CHANNEL_CAPACITY: usize = 256;

/// Keeps a `CrawlJob`'s persisted row and its in-memory progress
/// broadcast channel in sync. One coordinator per process; each job
/// gets its own `tokio::sync::broadcast` channel named per
/// `CrawlJob::progress_channel` (§6).
pub struct JobCoordinator {
    pool: SqlitePool,
    channels: Mutex<HashMap<i64, broadcast::Sender<ProgressEnvelope>>>,
}

impl JobCoordinator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, channels: Mutex::new(HashMap::new()) }
    }

    pub async fn start_job(&self, job_type: &str, parameters: &Value) -> Result<CrawlJob, sqlx::Error> {
        let job = repo::job::create(&self.pool, job_type, parameters).await?;
        repo::job::mark_running(&self.pool, job.id).await?;
        self.channel_for(job.id);
        repo::job::find(&self.pool, job.id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn complete_job(&self, job_id: i64, result_data: &Value) -> Result<(), sqlx::Error> {
        repo::job::mark_completed(&self.pool, job_id, result_data).await?;
        self.publish(job_id, 0, 0, "completed".to_string(), true);
        Ok(())
    }

    pub async fn fail_job(&self, job_id: i64, error_message: &str) -> Result<(), sqlx::Error> {
        repo::job::mark_failed(&self.pool, job_id, error_message).await?;
        self.publish(job_id, 0, 0, error_message.to_string(), true);
        Ok(())
    }

    pub async fn cancel_job(&self, job_id: i64) -> Result<(), sqlx::Error> {
        repo::job::mark_cancelled(&self.pool, job_id).await
    }

    /// Broadcast a progress tick for `job_id`. Silently drops if nobody
    /// subscribed — a job can run unobserved.
    pub fn report_progress(&self, job_id: i64, land_id: i64, current: u64, total: u64, message: &str) {
        let percentage = if total > 0 { (current as f64 / total as f64 * 100.0 * 100.0).round() / 100.0 } else { 0.0 };
        let envelope = ProgressEnvelope {
            task_id: Uuid::new_v4().to_string(),
            land_id,
            job_id,
            current,
            total,
            percentage,
            message: message.to_string(),
            completed: false,
            timestamp: Utc::now(),
        };
        let _ = self.channel_for(job_id).send(envelope);
    }

    /// Subscribe to `job_id`'s progress channel; creates it if this is
    /// the first subscriber.
    pub fn subscribe(&self, job_id: i64) -> broadcast::Receiver<ProgressEnvelope> {
        self.channel_for(job_id).subscribe()
    }

    fn publish(&self, job_id: i64, current: u64, total: u64, message: String, completed: bool) {
        let envelope = ProgressEnvelope {
            task_id: Uuid::new_v4().to_string(),
            land_id: 0,
            job_id,
            current,
            total,
            percentage: if completed { 100.0 } else { 0.0 },
            message,
            completed,
            timestamp: Utc::now(),
        };
        let _ = self.channel_for(job_id).send(envelope);
    }

    fn channel_for(&self, job_id: i64) -> broadcast::Sender<ProgressEnvelope> {
        let mut channels = self.channels.lock().unwrap();
        channels
            .entry(job_id)
            .or_insert_with(|| broadcast::channel(PROGRESS_CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_for_job_is_stable_across_calls() {
        // Doesn't need a real pool: exercises only the in-memory channel map.
        let channels: Mutex<HashMap<i64, broadcast::Sender<ProgressEnvelope>>> = Mutex::new(HashMap::new());
        let mut map = channels.lock().unwrap();
        let a = map.entry(1).or_insert_with(|| broadcast::channel(8).0).clone();
        let b = map.entry(1).or_insert_with(|| broadcast::channel(8).0).clone();
        assert!(a.same_channel(&b));
    }
}
