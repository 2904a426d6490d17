//! Trim/concatenate processing graph
//!
//! Turns a keep plan into what the external engine runs: either a direct
//! stream-copy trim, or a filter graph of per-track trims joined by one
//! concat per track.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::model::{Interval, MediaDescriptor, TrackKind};

/// Fudge for float noise when comparing rounded durations to the tolerance
const DURATION_EPSILON: f64 = 1e-9;

/// Re-encode settings used whenever a filter graph is involved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "fast".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
        }
    }
}

/// One trim of one track
#[derive(Debug, Clone, PartialEq)]
pub struct TrimNode {
    pub track: TrackKind,
    pub interval: Interval,
    pub output: String,
}

impl TrimNode {
    fn render(&self) -> String {
        let (trim, setpts) = match self.track {
            TrackKind::Video => ("trim", "setpts"),
            TrackKind::Audio => ("atrim", "asetpts"),
        };
        format!(
            "[0:{}]{}=start={:.3}:end={:.3},{}=PTS-STARTPTS[{}]",
            self.track.specifier(),
            trim,
            self.interval.start,
            self.interval.end,
            setpts,
            self.output
        )
    }
}

/// Joins the trims of one track in order
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatNode {
    pub track: TrackKind,
    pub inputs: Vec<String>,
    pub output: String,
}

impl ConcatNode {
    fn render(&self) -> String {
        let (v, a) = match self.track {
            TrackKind::Video => (1, 0),
            TrackKind::Audio => (0, 1),
        };
        let inputs: String = self.inputs.iter().map(|l| format!("[{}]", l)).collect();
        format!(
            "{}concat=n={}:v={}:a={}[{}]",
            inputs,
            self.inputs.len(),
            v,
            a,
            self.output
        )
    }
}

/// Complete filter graph with the labels to map into the output
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    pub trims: Vec<TrimNode>,
    pub concats: Vec<ConcatNode>,
    pub outputs: Vec<(TrackKind, String)>,
}

impl FilterGraph {
    /// Render as a `-filter_complex` argument
    pub fn render(&self) -> String {
        self.trims
            .iter()
            .map(TrimNode::render)
            .chain(self.concats.iter().map(ConcatNode::render))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// What the transcoder is asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingSpec {
    /// Single range, stream copy
    DirectTrim {
        interval: Interval,
        tracks: Vec<TrackKind>,
    },
    /// Trim nodes, optionally concatenated, re-encoded
    Filtered { graph: FilterGraph },
}

impl ProcessingSpec {
    pub fn uses_concat(&self) -> bool {
        match self {
            ProcessingSpec::DirectTrim { .. } => false,
            ProcessingSpec::Filtered { graph } => !graph.concats.is_empty(),
        }
    }

    pub fn is_stream_copy(&self) -> bool {
        matches!(self, ProcessingSpec::DirectTrim { .. })
    }

    /// Full engine argument list (without the program name)
    pub fn to_args(&self, input: &Path, output: &Path, encoder: &EncoderSettings) -> Vec<String> {
        let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error", "-y", "-i"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(input.to_string_lossy().into_owned());

        match self {
            ProcessingSpec::DirectTrim { interval, tracks } => {
                args.push("-ss".to_string());
                args.push(format!("{:.3}", interval.start));
                args.push("-to".to_string());
                args.push(format!("{:.3}", interval.end));
                for track in tracks {
                    args.push("-map".to_string());
                    args.push(format!("0:{}:0", track.specifier()));
                }
                args.extend(["-c", "copy", "-avoid_negative_ts", "make_zero"].map(String::from));
            }
            ProcessingSpec::Filtered { graph } => {
                args.push("-filter_complex".to_string());
                args.push(graph.render());
                for (_, label) in &graph.outputs {
                    args.push("-map".to_string());
                    args.push(format!("[{}]", label));
                }
                for (track, _) in &graph.outputs {
                    match track {
                        TrackKind::Video => {
                            args.extend([
                                "-c:v".to_string(),
                                encoder.video_codec.clone(),
                                "-preset".to_string(),
                                encoder.preset.clone(),
                                "-crf".to_string(),
                                encoder.crf.to_string(),
                            ]);
                        }
                        TrackKind::Audio => {
                            args.extend([
                                "-c:a".to_string(),
                                encoder.audio_codec.clone(),
                                "-b:a".to_string(),
                                encoder.audio_bitrate.clone(),
                            ]);
                        }
                    }
                }
                args.extend(["-movflags", "+faststart"].map(String::from));
            }
        }

        args.push(output.to_string_lossy().into_owned());
        args
    }
}

/// Builder output: the processing spec plus what survived
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPlan {
    pub spec: ProcessingSpec,
    /// Surviving intervals, rounded, in output order
    pub kept: Vec<Interval>,
    pub segments_kept: usize,
    pub total_duration_kept: f64,
}

/// Builds the processing spec for a keep plan
#[derive(Debug, Clone)]
pub struct FilterGraphBuilder {
    tolerance: f64,
}

impl FilterGraphBuilder {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn build(&self, keep: &[Interval], media: &MediaDescriptor) -> Result<GraphPlan, DomainError> {
        let tracks = media.tracks();
        if tracks.is_empty() {
            return Err(DomainError::GraphEmpty(
                "source has neither a video nor an audio track".to_string(),
            ));
        }

        let survivors: Vec<Interval> = keep
            .iter()
            .map(round_interval)
            .filter(|i| i.duration() + DURATION_EPSILON >= self.tolerance)
            .collect();

        if survivors.is_empty() {
            return Err(DomainError::GraphEmpty(format!(
                "all {} keep interval(s) are shorter than {}s",
                keep.len(),
                self.tolerance
            )));
        }

        let total_duration_kept = survivors.iter().map(Interval::duration).sum();
        let segments_kept = survivors.len();

        let spec = if keep.len() == 1 {
            ProcessingSpec::DirectTrim {
                interval: survivors[0],
                tracks,
            }
        } else {
            ProcessingSpec::Filtered {
                graph: Self::trim_concat_graph(&survivors, &tracks),
            }
        };

        Ok(GraphPlan {
            spec,
            kept: survivors,
            segments_kept,
            total_duration_kept,
        })
    }

    /// Per-track trims, labels numbered by survivor position
    fn trim_concat_graph(survivors: &[Interval], tracks: &[TrackKind]) -> FilterGraph {
        let mut trims = Vec::with_capacity(survivors.len() * tracks.len());
        for (index, interval) in survivors.iter().enumerate() {
            for track in tracks {
                trims.push(TrimNode {
                    track: *track,
                    interval: *interval,
                    output: format!("{}{}", track.specifier(), index),
                });
            }
        }

        let mut concats = Vec::new();
        let mut outputs = Vec::with_capacity(tracks.len());
        for track in tracks {
            let labels: Vec<String> = trims
                .iter()
                .filter(|t| t.track == *track)
                .map(|t| t.output.clone())
                .collect();

            if labels.len() == 1 {
                outputs.push((*track, labels[0].clone()));
            } else {
                let output = format!("out{}", track.specifier());
                concats.push(ConcatNode {
                    track: *track,
                    inputs: labels,
                    output: output.clone(),
                });
                outputs.push((*track, output));
            }
        }

        FilterGraph {
            trims,
            concats,
            outputs,
        }
    }
}

fn round_ms(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn round_interval(interval: &Interval) -> Interval {
    Interval {
        start: round_ms(interval.start),
        end: round_ms(interval.end),
    }
}

#[cfg(test)]
mod tests;
