use std::{collections::HashMap, sync::Arc};

use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{JobRecord, SceneRequest};

/// In-memory job table shared between the HTTP handlers and the pipelines.
///
/// Only the pipeline that owns a job mutates it through [`JobRegistry::update`];
/// everything else reads snapshots.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<String, JobRecord>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, scenes: Vec<SceneRequest>, config: Option<Value>) -> String {
        let mut jobs = self.jobs.write().await;
        let mut job_id = Uuid::new_v4().to_string();
        while jobs.contains_key(&job_id) {
            job_id = Uuid::new_v4().to_string();
        }
        jobs.insert(job_id.clone(), JobRecord::new(job_id.clone(), scenes, config));
        job_id
    }

    pub async fn get(&self, job_id: &str) -> Option<JobRecord> {
        self.jobs.read().await.get(job_id).cloned()
    }

    pub async fn update<F, R>(&self, job_id: &str, mutation: F) -> Option<R>
    where
        F: FnOnce(&mut JobRecord) -> R,
    {
        let mut jobs = self.jobs.write().await;
        jobs.get_mut(job_id).map(mutation)
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }
}
