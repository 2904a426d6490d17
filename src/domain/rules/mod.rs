// Domain rules - Interval algebra

use crate::domain::errors::*;
use crate::domain::model::*;

/// Turns a set of remove-intervals into the complementary keep-intervals
pub struct IntervalInverter;

impl IntervalInverter {
    /// Compute keep-intervals for `[0, total_duration)` minus `remove`.
    ///
    /// Remove-intervals may overlap, be unordered or extend past the end.
    /// Gaps no longer than `tolerance` are not kept.
    pub fn invert(
        remove: &[Interval],
        total_duration: f64,
        tolerance: f64,
    ) -> Result<SegmentPlan, DomainError> {
        if remove.is_empty() {
            let whole = Interval::new(0.0, total_duration)
                .map_err(|e| DomainError::InversionEmpty(e.to_string()))?;
            return Ok(SegmentPlan::new(vec![whole], 0.0)?);
        }

        let mut sorted = remove.to_vec();
        sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut keep = Vec::with_capacity(sorted.len() + 1);
        let mut cursor = 0.0_f64;

        for cut in &sorted {
            let gap_end = cut.start.min(total_duration);
            if gap_end - cursor > tolerance {
                keep.push(Interval {
                    start: cursor,
                    end: gap_end,
                });
            }
            cursor = cursor.max(cut.end);
        }

        if total_duration - cursor > tolerance {
            keep.push(Interval {
                start: cursor,
                end: total_duration,
            });
        }

        if keep.is_empty() {
            return Err(DomainError::InversionEmpty(format!(
                "{} cut(s) cover the whole {:.3}s source",
                remove.len(),
                total_duration
            )));
        }

        SegmentPlan::new(keep, tolerance)
    }

    /// Merge overlapping remove-intervals and clip them to `[0, total_duration)`
    pub fn merged_within(remove: &[Interval], total_duration: f64) -> Vec<Interval> {
        let mut sorted: Vec<Interval> = remove
            .iter()
            .filter_map(|i| i.clamp_to(total_duration))
            .collect();
        sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
        for interval in sorted {
            match merged.last_mut() {
                Some(last) if interval.start <= last.end => {
                    last.end = last.end.max(interval.end);
                }
                _ => merged.push(interval),
            }
        }
        merged
    }
}
