use std::sync::Arc;

use crate::adapters::{
    DropboxConnector, FFmpegAdapter, FFprobeAdapter, HttpFetchAdapter, TracingLogAdapter,
};
use crate::app::job_interactor::{JobInteractor, JobSettings};
use crate::config::Settings;
use crate::ports::{FetchPort, LogPort, ProbePort, StoreConnector, TranscodePort};

pub trait AppContainer: Send + Sync {
    fn job_interactor(&self) -> Arc<JobInteractor>;
}

/// Wires the production adapters
pub struct DefaultAppContainer {
    job_interactor: Arc<JobInteractor>,
}

impl DefaultAppContainer {
    pub fn new(settings: &Settings) -> Self {
        let fetch_port = Arc::new(HttpFetchAdapter::new());
        let probe_port = Arc::new(FFprobeAdapter::new(settings.engine.ffprobe_bin.clone()));
        let transcode_port = Arc::new(FFmpegAdapter::new(
            settings.engine.ffmpeg_bin.clone(),
            settings.engine.encoder.clone(),
        ));
        let store_connector = Arc::new(DropboxConnector::with_endpoints(
            settings.upload.api_base.clone(),
            settings.upload.content_base.clone(),
        ));
        let log_port = Arc::new(TracingLogAdapter::for_job(job_id()));

        let job_interactor = Arc::new(JobInteractor::new(
            fetch_port as Arc<dyn FetchPort>,
            probe_port as Arc<dyn ProbePort>,
            transcode_port as Arc<dyn TranscodePort>,
            store_connector as Arc<dyn StoreConnector>,
            log_port as Arc<dyn LogPort>,
            JobSettings::from(settings),
        ));

        Self { job_interactor }
    }
}

impl AppContainer for DefaultAppContainer {
    fn job_interactor(&self) -> Arc<JobInteractor> {
        Arc::clone(&self.job_interactor)
    }
}

fn job_id() -> String {
    format!(
        "{}-{}",
        chrono::Local::now().format("%Y%m%d%H%M%S"),
        std::process::id()
    )
}
