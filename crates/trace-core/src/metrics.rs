//! Per-round performance metrics.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Smallest reaction bar height, in percent of the slowest segment.
const MIN_BAR_HEIGHT_PCT: f64 = 4.0;

/// Results shown after a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_time_ms: u64,
    pub avg_reaction_ms: u64,
    pub min_reaction_ms: u64,
    pub wrong_releases: u32,
    pub accuracy_pct: u32,
    /// Manhattan length of all committed routes, in pixels.
    pub path_distance_px: u64,
    /// Total pointer travel during drags, in pixels.
    pub cursor_distance_px: u64,
    /// Reaction time of each committed segment, in order.
    pub reaction_times_ms: Vec<u64>,
}

impl Summary {
    /// Total time formatted as seconds with one decimal, e.g. `"12.3s"`.
    pub fn total_time_label(&self) -> String {
        format!("{:.1}s", self.total_time_ms as f64 / 1000.0)
    }

    /// Height of each reaction bar as a percentage of the slowest segment.
    pub fn reaction_bar_heights(&self) -> Vec<f64> {
        let max = self.reaction_times_ms.iter().copied().max().unwrap_or(0).max(1) as f64;
        self.reaction_times_ms
            .iter()
            .map(|&t| (t as f64 / max * 100.0).max(MIN_BAR_HEIGHT_PCT))
            .collect()
    }
}

/// Accumulates round metrics as events arrive. History is never recomputed.
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    target_count: u32,
    reaction_times_ms: Vec<u64>,
    wrong_releases: u32,
    path_distance: f64,
    cursor_distance: f64,
    total_time: Option<Duration>,
}

impl MetricsAggregator {
    /// Create an aggregator for a round with `target_count` targets.
    pub fn new(target_count: u32) -> Self {
        Self {
            target_count,
            ..Self::default()
        }
    }

    pub fn record_segment(&mut self, reaction_ms: u64, route_distance: f64) {
        self.reaction_times_ms.push(reaction_ms);
        self.path_distance += route_distance;
    }

    pub fn record_cursor_delta(&mut self, dx: f64, dy: f64) {
        self.cursor_distance += dx.abs() + dy.abs();
    }

    pub fn record_wrong_release(&mut self) {
        self.wrong_releases = self.wrong_releases.saturating_add(1);
    }

    /// Stamp the total round time.
    pub fn finish(&mut self, total_time: Duration) {
        self.total_time = Some(total_time);
    }

    pub fn wrong_releases(&self) -> u32 {
        self.wrong_releases
    }

    pub fn reaction_times_ms(&self) -> &[u64] {
        &self.reaction_times_ms
    }

    pub fn path_distance(&self) -> f64 {
        self.path_distance
    }

    pub fn cursor_distance(&self) -> f64 {
        self.cursor_distance
    }

    /// Segments a complete round consists of.
    pub fn completed_segments(&self) -> u32 {
        self.target_count.saturating_sub(1)
    }

    /// `round(100 * n / (n + w))`, or 100 when nothing happened.
    pub fn accuracy_pct(&self) -> u32 {
        let n = u64::from(self.completed_segments());
        let total = n + u64::from(self.wrong_releases);
        if total == 0 {
            return 100;
        }
        (100.0 * n as f64 / total as f64).round() as u32
    }

    pub fn summary(&self) -> Summary {
        let times = &self.reaction_times_ms;
        let avg_reaction_ms = if times.is_empty() {
            0
        } else {
            (times.iter().sum::<u64>() as f64 / times.len() as f64).round() as u64
        };

        Summary {
            total_time_ms: self.total_time.map_or(0, |d| d.as_millis() as u64),
            avg_reaction_ms,
            min_reaction_ms: times.iter().copied().min().unwrap_or(0),
            wrong_releases: self.wrong_releases,
            accuracy_pct: self.accuracy_pct(),
            path_distance_px: self.path_distance.round() as u64,
            cursor_distance_px: self.cursor_distance.round() as u64,
            reaction_times_ms: times.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        let summary = MetricsAggregator::new(1).summary();
        assert_eq!(summary.avg_reaction_ms, 0);
        assert_eq!(summary.min_reaction_ms, 0);
        assert_eq!(summary.accuracy_pct, 100);
        assert_eq!(summary.total_time_ms, 0);
    }

    #[test]
    fn test_reaction_stats() {
        let mut metrics = MetricsAggregator::new(4);
        metrics.record_segment(300, 112.0);
        metrics.record_segment(450, 56.0);
        metrics.record_segment(401, 168.0);

        let summary = metrics.summary();
        assert_eq!(summary.avg_reaction_ms, 384);
        assert_eq!(summary.min_reaction_ms, 300);
        assert_eq!(summary.path_distance_px, 336);
        assert_eq!(summary.reaction_times_ms, vec![300, 450, 401]);
    }

    #[test]
    fn test_accuracy_without_wrong_releases() {
        for count in [2, 5, 30] {
            assert_eq!(MetricsAggregator::new(count).accuracy_pct(), 100);
        }
    }

    #[test]
    fn test_accuracy_rounding() {
        let mut metrics = MetricsAggregator::new(8);
        for _ in 0..3 {
            metrics.record_wrong_release();
        }
        // 7 segments, 3 wrong releases
        assert_eq!(metrics.accuracy_pct(), 70);

        let mut metrics = MetricsAggregator::new(3);
        metrics.record_wrong_release();
        // 2 / 3 = 66.67
        assert_eq!(metrics.accuracy_pct(), 67);
    }

    #[test]
    fn test_accuracy_single_target_with_wrong_release() {
        let mut metrics = MetricsAggregator::new(1);
        metrics.record_wrong_release();
        assert_eq!(metrics.accuracy_pct(), 0);
    }

    #[test]
    fn test_cursor_distance_is_manhattan() {
        let mut metrics = MetricsAggregator::new(2);
        metrics.record_cursor_delta(3.0, -4.0);
        metrics.record_cursor_delta(-1.5, 0.0);
        assert!((metrics.cursor_distance() - 8.5).abs() < f64::EPSILON);
        assert_eq!(metrics.summary().cursor_distance_px, 9);
    }

    #[test]
    fn test_finish_sets_total_time() {
        let mut metrics = MetricsAggregator::new(2);
        metrics.finish(Duration::from_millis(12_345));
        let summary = metrics.summary();
        assert_eq!(summary.total_time_ms, 12_345);
        assert_eq!(summary.total_time_label(), "12.3s");
    }

    #[test]
    fn test_reaction_bar_heights() {
        let mut metrics = MetricsAggregator::new(4);
        metrics.record_segment(1000, 0.0);
        metrics.record_segment(500, 0.0);
        metrics.record_segment(10, 0.0);

        let heights = metrics.summary().reaction_bar_heights();
        assert_eq!(heights, vec![100.0, 50.0, 4.0]);
    }
}
