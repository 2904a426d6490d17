//! Command implementations

use std::io::Read;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::job_interactor::JobSettings;
use crate::cli::args::{PlanArgs, RunArgs};
use crate::config::Settings;
use crate::domain::envelope::{JobOutcome, JobRequest};
use crate::domain::errors::DomainError;
use crate::domain::graph::ProcessingSpec;
use crate::domain::model::{Interval, MediaDescriptor};
use crate::error::{SegcutError, SegcutResult};

/// Engine arguments are shown with these placeholder paths
const PLAN_INPUT: &str = "<input>";
const PLAN_OUTPUT: &str = "<output>";

/// What `plan` prints
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub media_type: String,
    pub keep: Vec<Interval>,
    pub segments_kept: usize,
    pub total_duration_kept: f64,
    pub stream_copy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_graph: Option<String>,
    pub engine_args: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Read job text from a file or from stdin when `source` is `-`
pub fn read_job(source: &str) -> SegcutResult<String> {
    let result = if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        std::fs::read_to_string(Path::new(source))
    };

    result.map_err(|e| SegcutError::JobInput {
        source_name: source.to_string(),
        message: e.to_string(),
    })
}

fn print_json<T: Serialize>(value: &T) -> SegcutResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Execute the run command; returns whether the job succeeded
pub async fn run(args: RunArgs, settings: &Settings) -> SegcutResult<bool> {
    info!("Starting run for job {}", args.job);
    let text = read_job(&args.job)?;

    let outcome = match serde_json::from_str::<Value>(&text) {
        Ok(input) => {
            let container = DefaultAppContainer::new(settings);
            container.job_interactor().handle(input).await
        }
        Err(e) => JobOutcome::from(Err(DomainError::InputError(format!(
            "job is not valid JSON: {}",
            e
        )))),
    };

    print_json(&outcome)?;
    Ok(outcome.is_success())
}

/// Build the plan report for a decoded job
pub fn plan_report(
    request: &JobRequest,
    media: &MediaDescriptor,
    settings: &JobSettings,
    encoder: &crate::domain::graph::EncoderSettings,
) -> Result<PlanReport, DomainError> {
    let cuts = settings.normalize(request)?;
    let plan = settings.plan(cuts, media)?;

    let filter_graph = match &plan.graph.spec {
        ProcessingSpec::Filtered { graph } => Some(graph.render()),
        ProcessingSpec::DirectTrim { .. } => None,
    };
    let engine_args = plan
        .graph
        .spec
        .to_args(Path::new(PLAN_INPUT), Path::new(PLAN_OUTPUT), encoder);

    Ok(PlanReport {
        media_type: media.media_type().to_string(),
        keep: plan.graph.kept.clone(),
        segments_kept: plan.graph.segments_kept,
        total_duration_kept: plan.graph.total_duration_kept,
        stream_copy: plan.graph.spec.is_stream_copy(),
        filter_graph,
        engine_args,
        warnings: plan.cuts.warnings,
    })
}

/// Execute the plan command; returns whether a plan was produced
pub fn plan(args: PlanArgs, settings: &Settings) -> SegcutResult<bool> {
    info!("Planning job {} against {:.3}s of media", args.job, args.duration);
    let text = read_job(&args.job)?;

    let result = JobRequest::from_json(&text).and_then(|request| {
        let media = MediaDescriptor::new(!args.no_video, !args.no_audio, args.duration)?;
        plan_report(
            &request,
            &media,
            &JobSettings::from(settings),
            &settings.engine.encoder,
        )
    });

    match result {
        Ok(report) => {
            print_json(&report)?;
            Ok(true)
        }
        Err(e) => {
            print_json(&JobOutcome::Failure {
                error: e.to_string(),
            })?;
            Ok(false)
        }
    }
}
