use std::{panic::AssertUnwindSafe, sync::Arc};

use anyhow::{Context, Result};
use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{registry::JobRegistry, scene::SceneProcessor};

/// Share of the progress range handed out while scenes are running. The rest
/// is only claimed once every asset is on disk.
const SCENE_PROGRESS_SPAN: usize = 80;

pub fn scene_progress(scene_index: usize, scene_count: usize) -> u8 {
    if scene_count == 0 {
        return 0;
    }
    (scene_index * SCENE_PROGRESS_SPAN / scene_count) as u8
}

/// Runs the job detached from the caller. Any error or panic ends up in the
/// job's `error` field.
pub fn spawn_pipeline(
    registry: JobRegistry,
    processor: Arc<SceneProcessor>,
    job_id: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = AssertUnwindSafe(run_pipeline(&registry, &processor, &job_id))
            .catch_unwind()
            .await;

        let failure = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => format!("{err:#}"),
            Err(_) => "Video pipeline task panicked".to_string(),
        };

        error!(job_id = %job_id, "Video job failed: {failure}");
        let recorded = registry
            .update(&job_id, |job| job.mark_failed(failure))
            .await
            .unwrap_or(false);
        if !recorded {
            warn!(job_id = %job_id, "Failure not recorded: job missing or already terminal");
        }
    })
}

pub async fn run_pipeline(
    registry: &JobRegistry,
    processor: &SceneProcessor,
    job_id: &str,
) -> Result<()> {
    let scenes = registry
        .get(job_id)
        .await
        .map(|job| job.scenes)
        .with_context(|| format!("Unknown job id: {job_id}"))?;
    let scene_count = scenes.len();

    info!(job_id = %job_id, scenes = scene_count, "Video job started");

    for (index, scene) in scenes.iter().enumerate() {
        let progress = scene_progress(index, scene_count);
        registry
            .update(job_id, |job| {
                job.advance(
                    progress,
                    format!("Processing scene {} of {}", index + 1, scene_count),
                )
            })
            .await;
        info!(job_id = %job_id, scene = index, progress, "Scene started");

        let asset = processor
            .process(scene, job_id, index)
            .await
            .with_context(|| format!("Scene {index} failed"))?;

        registry
            .update(job_id, |job| job.record_scene(asset))
            .await;
    }

    let ready = registry
        .update(job_id, |job| job.mark_ready())
        .await
        .unwrap_or(false);
    if !ready {
        anyhow::bail!("Job {job_id} produced no scene assets");
    }

    info!(job_id = %job_id, scenes = scene_count, "Video job ready");
    Ok(())
}
