// Job interactor - Runs one cut-and-deliver job end to end

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tempfile::TempDir;

use crate::app::name_resolver::NameResolver;
use crate::app::uploader::ChunkedUploader;
use crate::config::Settings;
use crate::domain::envelope::*;
use crate::domain::errors::*;
use crate::domain::graph::{FilterGraphBuilder, GraphPlan};
use crate::domain::model::*;
use crate::domain::rules::IntervalInverter;
use crate::domain::timestamp::{NormalizedCuts, TimestampNormalizer};
use crate::ports::*;
use crate::utils::Utils;

/// Knobs the pipeline needs from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct JobSettings {
    pub tolerance_secs: f64,
    pub ms_threshold: f64,
    pub chunk_size: u64,
    pub max_name_attempts: u32,
    pub default_folder: String,
    pub name_prefix: String,
    pub extension: String,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for JobSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            tolerance_secs: settings.segment.tolerance_secs,
            ms_threshold: settings.segment.ms_threshold,
            chunk_size: settings.upload.chunk_size_bytes,
            max_name_attempts: settings.upload.max_name_attempts,
            default_folder: settings.upload.default_folder.clone(),
            name_prefix: settings.upload.name_prefix.clone(),
            extension: settings.upload.extension.trim_start_matches('.').to_string(),
        }
    }
}

/// Everything decided before the engine runs
#[derive(Debug, Clone, PartialEq)]
pub struct CutPlan {
    pub cuts: NormalizedCuts,
    pub keep: SegmentPlan,
    pub graph: GraphPlan,
}

impl JobSettings {
    /// Normalize the job's cut list
    pub fn normalize(&self, request: &JobRequest) -> Result<NormalizedCuts, DomainError> {
        TimestampNormalizer::new(request.time_unit, self.ms_threshold)
            .normalize_all(request.cuts.segments())
    }

    /// Invert normalized cuts against the probed media and build the processing spec
    pub fn plan(&self, cuts: NormalizedCuts, media: &MediaDescriptor) -> Result<CutPlan, DomainError> {
        let keep = IntervalInverter::invert(&cuts.intervals, media.total_duration, self.tolerance_secs)?;
        let graph = FilterGraphBuilder::new(self.tolerance_secs).build(keep.intervals(), media)?;
        Ok(CutPlan { cuts, keep, graph })
    }
}

/// Interactor for the cut-and-deliver use case
pub struct JobInteractor {
    fetch_port: Arc<dyn FetchPort>,
    probe_port: Arc<dyn ProbePort>,
    transcode_port: Arc<dyn TranscodePort>,
    store_connector: Arc<dyn StoreConnector>,
    log_port: Arc<dyn LogPort>,
    settings: JobSettings,
}

impl JobInteractor {
    /// Create new job interactor with injected ports
    pub fn new(
        fetch_port: Arc<dyn FetchPort>,
        probe_port: Arc<dyn ProbePort>,
        transcode_port: Arc<dyn TranscodePort>,
        store_connector: Arc<dyn StoreConnector>,
        log_port: Arc<dyn LogPort>,
        settings: JobSettings,
    ) -> Self {
        Self {
            fetch_port,
            probe_port,
            transcode_port,
            store_connector,
            log_port,
            settings,
        }
    }

    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    /// Decode a raw job envelope and run it; never fails
    pub async fn handle(&self, input: Value) -> JobOutcome {
        let result = match JobRequest::from_value(input) {
            Ok(request) => self.execute(request).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            self.log_port
                .error(&format!("Job failed ({}): {}", e.kind(), e))
                .await;
        }
        JobOutcome::from(result)
    }

    /// Run a decoded job, cleaning up the workspace whatever the outcome
    pub async fn execute(&self, request: JobRequest) -> Result<JobReport, DomainError> {
        let credential = request.require_credential()?.to_string();
        let cuts = self.settings.normalize(&request)?;
        self.log_port
            .info(&format!(
                "Starting job for {} with {} cut(s) ({} shape)",
                request.video_url,
                cuts.intervals.len(),
                request.cuts.shape()
            ))
            .await;

        let workspace = tempfile::Builder::new()
            .prefix("segcut-")
            .tempdir()
            .map_err(|e| DomainError::FsFail(format!("cannot create workspace: {}", e)))?;

        let result = self.run(&request, &credential, cuts, workspace.path()).await;
        self.cleanup(workspace).await;
        result
    }

    async fn run(
        &self,
        request: &JobRequest,
        credential: &str,
        cuts: NormalizedCuts,
        workspace: &Path,
    ) -> Result<JobReport, DomainError> {
        let source = workspace.join("source");
        let output = workspace.join(format!("output.{}", self.settings.extension));

        let downloaded = self.fetch_port.fetch(&request.video_url, &source).await?;
        self.log_port
            .info(&format!("Downloaded {}", Utils::format_file_size(downloaded)))
            .await;

        let media = self.probe_port.probe_media(&source).await?;
        self.log_port
            .info(&format!(
                "Media file probed: {}, duration: {:.3}s",
                media.media_type(),
                media.total_duration
            ))
            .await;

        let plan = self.settings.plan(cuts, &media)?;
        for interval in plan.keep.intervals() {
            self.log_port.debug(&format!("Keeping {}", interval)).await;
        }
        self.log_port
            .info(&format!(
                "Keeping {} segment(s), {:.3}s total, {}",
                plan.graph.segments_kept,
                plan.graph.total_duration_kept,
                if plan.graph.spec.is_stream_copy() {
                    "stream copy"
                } else {
                    "re-encode"
                }
            ))
            .await;

        self.transcode_port
            .transcode(&plan.graph.spec, &source, &output)
            .await?;
        let size = tokio::fs::metadata(&output)
            .await
            .map_err(|e| DomainError::FsFail(format!("cannot stat output: {}", e)))?
            .len();
        self.log_port
            .info(&format!("Transcode produced {}", Utils::format_file_size(size)))
            .await;

        let store = self.store_connector.connect(credential)?;
        let folder = if request.destination_folder.trim().is_empty() {
            self.settings.default_folder.as_str()
        } else {
            request.destination_folder.as_str()
        };
        let resolver = NameResolver::new(
            self.settings.name_prefix.clone(),
            self.settings.extension.clone(),
            self.settings.max_name_attempts,
        );
        let destination = resolver
            .resolve(store.as_ref(), request.filename.as_deref(), folder)
            .await?;

        let uploader = ChunkedUploader::new(self.settings.chunk_size)?;
        let receipt = uploader
            .upload_file(store.as_ref(), &output, &destination)
            .await?;
        self.log_port
            .info(&format!(
                "Uploaded to {} in {} request(s)",
                receipt.path_display, receipt.chunks_uploaded
            ))
            .await;

        let download_url = match store.create_shared_link(&receipt.path_display).await {
            Ok(url) => url,
            Err(e) => {
                self.log_port
                    .warn(&format!("{}; returning the store path instead", e))
                    .await;
                receipt.path_display.clone()
            }
        };

        let mut warnings = plan.cuts.warnings;
        let dropped = plan.keep.len() - plan.graph.segments_kept;
        if dropped > 0 {
            warnings.push(format!(
                "{} keep segment(s) shorter than {}s were dropped",
                dropped, self.settings.tolerance_secs
            ));
        }

        Ok(JobReport {
            success: true,
            destination_path: receipt.path_display,
            filename_used: receipt.name,
            download_url,
            output_size_mb: Utils::size_in_mb(size),
            segments_kept: plan.graph.segments_kept,
            total_duration_kept: Utils::round_to(plan.graph.total_duration_kept, 3),
            chunks_uploaded: receipt.chunks_uploaded,
            media_type: media.media_type().to_string(),
            warnings,
        })
    }

    async fn cleanup(&self, workspace: TempDir) {
        let path = workspace.path().display().to_string();
        match workspace.close() {
            Ok(()) => self.log_port.debug(&format!("Removed workspace {}", path)).await,
            Err(e) => {
                self.log_port
                    .warn(&format!("Could not remove workspace {}: {}", path, e))
                    .await
            }
        }
    }
}
