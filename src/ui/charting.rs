use typerate::metrics::PerformanceSample;

/// Chart points as (seconds, wpm)
pub fn sample_coords(samples: &[PerformanceSample]) -> Vec<(f64, f64)> {
    samples.iter().copied().map(<(f64, f64)>::from).collect()
}

/// Compute X (seconds) and Y (WPM) bounds for the performance chart
pub fn compute_chart_params(coords: &[(f64, f64)], elapsed_secs: f64) -> (f64, f64) {
    let highest_wpm = coords.iter().map(|&(_, wpm)| wpm).fold(0.0, f64::max);

    let overall_duration = coords
        .last()
        .map_or(elapsed_secs, |&(t, _)| t.max(elapsed_secs))
        .max(1.0);

    (overall_duration, highest_wpm.round().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_chart_params_empty() {
        let (x, y) = compute_chart_params(&[], 0.0);
        assert_eq!(x, 1.0);
        assert_eq!(y, 1.0);
    }

    #[test]
    fn test_compute_chart_params_uses_latest_time_and_peak() {
        let coords = [(1.0, 30.0), (2.0, 48.4), (3.0, 41.0)];
        assert_eq!(compute_chart_params(&coords, 2.5), (3.0, 48.0));
        assert_eq!(compute_chart_params(&coords, 4.2), (4.2, 48.0));
    }

    #[test]
    fn test_sample_coords() {
        let samples = [PerformanceSample::new(1.0, 36), PerformanceSample::new(2.0, 42)];
        assert_eq!(sample_coords(&samples), vec![(1.0, 36.0), (2.0, 42.0)]);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
