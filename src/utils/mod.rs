//! Common utilities and helpers

pub mod logging;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Utility functions for segcut
pub struct Utils;

impl Utils {
    /// Round to `decimals` places
    pub fn round_to(value: f64, decimals: i32) -> f64 {
        let factor = 10f64.powi(decimals);
        (value * factor).round() / factor
    }

    /// Size in mebibytes, rounded to two places
    pub fn size_in_mb(size: u64) -> f64 {
        Self::round_to(size as f64 / BYTES_PER_MB, 2)
    }

    /// Format file size for display
    pub fn format_file_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
