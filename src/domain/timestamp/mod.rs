//! Cut boundary normalization
//!
//! Raw boundaries arrive as JSON numbers or strings such as `"12.5"`,
//! `"12.5s"`, `"12500ms"` or `"00:12.5"`. Everything is reduced to seconds.
//! When neither the job nor the value itself states a unit, magnitudes above
//! the millisecond threshold are read as milliseconds and a warning is kept.

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::{Interval, TimeUnit};

/// Magnitude above which undeclared values are read as milliseconds
pub const DEFAULT_MS_THRESHOLD: f64 = 1000.0;

/// Seconds value plus how it was derived
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedTime {
    pub seconds: f64,
    /// True when the magnitude heuristic reinterpreted the value as milliseconds
    pub heuristic_ms: bool,
}

/// Result of normalizing a whole cut list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedCuts {
    pub intervals: Vec<Interval>,
    pub warnings: Vec<String>,
    pub skipped: usize,
}

/// Converts raw cut boundaries to canonical seconds
#[derive(Debug, Clone)]
pub struct TimestampNormalizer {
    declared_unit: Option<TimeUnit>,
    ms_threshold: f64,
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self::new(None, DEFAULT_MS_THRESHOLD)
    }
}

impl TimestampNormalizer {
    pub fn new(declared_unit: Option<TimeUnit>, ms_threshold: f64) -> Self {
        Self {
            declared_unit,
            ms_threshold,
        }
    }

    /// Normalize a single raw scalar
    pub fn normalize_value(&self, raw: &Value) -> Result<NormalizedTime, String> {
        let (magnitude, value_unit) = match raw {
            Value::Number(n) => {
                let v = n.as_f64().ok_or_else(|| format!("unrepresentable number {}", n))?;
                (v, None)
            }
            Value::String(s) => parse_text(s)?,
            Value::Null => return Err("value is null".to_string()),
            other => return Err(format!("expected number or string, got {}", other)),
        };

        if !magnitude.is_finite() {
            return Err(format!("value {} is not finite", magnitude));
        }
        if magnitude < 0.0 {
            return Err(format!("value {} is negative", magnitude));
        }

        if let Some(unit) = value_unit.or(self.declared_unit) {
            return Ok(NormalizedTime {
                seconds: unit.to_seconds(magnitude),
                heuristic_ms: false,
            });
        }

        if magnitude > self.ms_threshold {
            Ok(NormalizedTime {
                seconds: magnitude / 1000.0,
                heuristic_ms: true,
            })
        } else {
            Ok(NormalizedTime {
                seconds: magnitude,
                heuristic_ms: false,
            })
        }
    }

    /// Normalize one `{start, end, type?}` segment object
    pub fn normalize_segment(&self, segment: &Value) -> Result<(Interval, bool), String> {
        let object = segment
            .as_object()
            .ok_or_else(|| format!("expected an object, got {}", segment))?;

        let start_raw = object.get("start").ok_or("missing 'start'")?;
        let end_raw = object.get("end").ok_or("missing 'end'")?;

        let start = self
            .normalize_value(start_raw)
            .map_err(|e| format!("bad 'start': {}", e))?;
        let end = self
            .normalize_value(end_raw)
            .map_err(|e| format!("bad 'end': {}", e))?;

        let interval = Interval::new(start.seconds, end.seconds).map_err(|e| {
            if start.heuristic_ms == end.heuristic_ms {
                return e.to_string();
            }
            let (as_ms, as_secs) = if end.heuristic_ms {
                ("end", "start")
            } else {
                ("start", "end")
            };
            format!(
                "{}; mixed units: '{}' exceeded {} and was read as milliseconds while '{}' stayed in seconds, set time_unit",
                e, as_ms, self.ms_threshold, as_secs
            )
        })?;
        Ok((interval, start.heuristic_ms || end.heuristic_ms))
    }

    /// Normalize a whole cut list; bad segments are skipped with a warning.
    ///
    /// Fails only when segments were given and none of them survived.
    pub fn normalize_all(&self, segments: &[Value]) -> Result<NormalizedCuts, DomainError> {
        let mut result = NormalizedCuts::default();
        let mut heuristic_hits = 0usize;

        for (index, segment) in segments.iter().enumerate() {
            match self.normalize_segment(segment) {
                Ok((interval, heuristic)) => {
                    if heuristic {
                        heuristic_hits += 1;
                    }
                    debug!(index, start = interval.start, end = interval.end, "Normalized cut");
                    result.intervals.push(interval);
                }
                Err(reason) => {
                    warn!(index, %reason, "Skipping cut segment");
                    result.skipped += 1;
                    result
                        .warnings
                        .push(format!("cut segment {} skipped: {}", index, reason));
                }
            }
        }

        if heuristic_hits > 0 {
            warn!(
                segments = heuristic_hits,
                threshold = self.ms_threshold,
                "Cut values read as milliseconds by magnitude; declare time_unit to avoid this"
            );
            result.warnings.push(format!(
                "{} cut segment(s) had values above {} and were read as milliseconds; \
                 set time_unit to make this explicit",
                heuristic_hits, self.ms_threshold
            ));
        }

        if !segments.is_empty() && result.intervals.is_empty() {
            return Err(DomainError::InputError(format!(
                "none of the {} cut segments could be parsed",
                segments.len()
            )));
        }

        Ok(result)
    }
}

/// Split a textual value into magnitude and optional explicit unit
fn parse_text(text: &str) -> Result<(f64, Option<TimeUnit>), String> {
    let trimmed = text.trim().to_ascii_lowercase();
    if trimmed.is_empty() {
        return Err("empty string".to_string());
    }

    if trimmed.contains(':') {
        return parse_clock(&trimmed).map(|secs| (secs, Some(TimeUnit::Seconds)));
    }

    let (number, unit) = if let Some(rest) = trimmed.strip_suffix("ms") {
        (rest, Some(TimeUnit::Milliseconds))
    } else if let Some(rest) = ["seconds", "second", "secs", "sec", "s"]
        .iter()
        .find_map(|suffix| trimmed.strip_suffix(suffix))
    {
        (rest, Some(TimeUnit::Seconds))
    } else {
        (trimmed.as_str(), None)
    };

    let value = number
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not numeric", text.trim()))?;
    Ok((value, unit))
}

/// Parse `MM:SS.ms` or `HH:MM:SS.ms`
fn parse_clock(text: &str) -> Result<f64, String> {
    let parts: Vec<&str> = text.split(':').collect();
    let invalid = || format!("'{}' is not a valid clock time", text);

    match parts.as_slice() {
        [minutes, seconds] => {
            let minutes = minutes.parse::<u32>().map_err(|_| invalid())?;
            let seconds = seconds.parse::<f64>().map_err(|_| invalid())?;
            if !(0.0..60.0).contains(&seconds) {
                return Err(invalid());
            }
            Ok(minutes as f64 * 60.0 + seconds)
        }
        [hours, minutes, seconds] => {
            let hours = hours.parse::<u32>().map_err(|_| invalid())?;
            let minutes = minutes.parse::<u32>().map_err(|_| invalid())?;
            let seconds = seconds.parse::<f64>().map_err(|_| invalid())?;
            if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
                return Err(invalid());
            }
            Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
        }
        _ => Err(invalid()),
    }
}
