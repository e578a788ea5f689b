//! Serving metrics and statistics tracking for the churn risk service.

use crate::types::risk::RiskLevel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

const MAX_TIMINGS: usize = 10_000;

/// Metrics collector for the prediction endpoints
pub struct ServiceMetrics {
    /// Total clients scored
    pub predictions_served: AtomicU64,
    /// Total batch requests served
    pub batches_served: AtomicU64,
    /// Requests rejected (validation, empty batch, no model)
    pub requests_rejected: AtomicU64,
    /// Predictions by risk tier: high, medium, low
    by_tier: RwLock<[u64; 3]>,
    /// Per-client processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Churn probability distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    start_time: Instant,
    started_at: DateTime<Utc>,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            batches_served: AtomicU64::new(0),
            requests_rejected: AtomicU64::new(0),
            by_tier: RwLock::new([0; 3]),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Record one scored client
    pub fn record_prediction(&self, processing_time: Duration, probability: f64, level: RiskLevel) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            if times.len() > MAX_TIMINGS {
                times.drain(0..MAX_TIMINGS / 2);
            }
        }

        let bucket = (probability.clamp(0.0, 1.0) * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut tiers) = self.by_tier.write() {
            tiers[tier_index(level)] += 1;
        }
    }

    /// Record a batch request; its clients are recorded individually
    pub fn record_batch(&self) {
        self.batches_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let Ok(times) = self.processing_times.read() else {
            return ProcessingStats::default();
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();
        let percentile = |p: f64| sorted[((count as f64 * p) as usize).min(count - 1)];

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: percentile(0.50),
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Clients scored per second since start
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or_default()
    }

    pub fn get_tier_counts(&self) -> TierCounts {
        let [high, medium, low] = self.by_tier.read().map(|t| *t).unwrap_or_default();
        TierCounts { high, medium, low }
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            started_at: self.started_at,
            uptime_secs: self.start_time.elapsed().as_secs(),
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            batches_served: self.batches_served.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            throughput: self.get_throughput(),
            by_risk_level: self.get_tier_counts(),
            processing: self.get_processing_stats(),
            score_distribution: self.get_score_distribution(),
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let served = snapshot.predictions_served;
        let tiers = snapshot.by_risk_level;
        let processing = &snapshot.processing;

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║             CHURN RISK SERVICE - METRICS SUMMARY             ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Clients Scored: {:>8}  │  Throughput: {:>8.1} clients/s   ║",
            served, snapshot.throughput
        );
        info!(
            "║ Batches:        {:>8}  │  Rejected:   {:>8}             ║",
            snapshot.batches_served, snapshot.requests_rejected
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Clients by Risk Level:                                       ║");
        for (level, count) in [
            (RiskLevel::High, tiers.high),
            (RiskLevel::Medium, tiers.medium),
            (RiskLevel::Low, tiers.low),
        ] {
            info!(
                "║   {:8}: {:>6} ({:>5.1}%)                                  ║",
                level.as_str(),
                count,
                percentage(count, served)
            );
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Churn Probability Distribution:                              ║");
        let total: u64 = snapshot.score_distribution.iter().sum();
        for (i, &count) in snapshot.score_distribution.iter().enumerate() {
            let pct = percentage(count, total);
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn tier_index(level: RiskLevel) -> usize {
    match level {
        RiskLevel::High => 0,
        RiskLevel::Medium => 1,
        RiskLevel::Low => 2,
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        count as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// Processing time statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

/// Serializable view served at `GET /metrics`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub predictions_served: u64,
    pub batches_served: u64,
    pub requests_rejected: u64,
    pub throughput: f64,
    pub by_risk_level: TierCounts,
    pub processing: ProcessingStats,
    pub score_distribution: [u64; 10],
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = ServiceMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), 0.82, RiskLevel::High);
        metrics.record_prediction(Duration::from_micros(200), 0.12, RiskLevel::Low);
        metrics.record_prediction(Duration::from_micros(300), 0.55, RiskLevel::Medium);
        metrics.record_batch();

        assert_eq!(metrics.predictions_served.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.batches_served.load(Ordering::Relaxed), 1);
        assert_eq!(
            metrics.get_tier_counts(),
            TierCounts {
                high: 1,
                medium: 1,
                low: 1
            }
        );
    }

    #[test]
    fn test_score_buckets() {
        let metrics = ServiceMetrics::new();
        metrics.record_prediction(Duration::from_micros(10), 1.0, RiskLevel::High);
        metrics.record_prediction(Duration::from_micros(10), 0.0, RiskLevel::Low);
        metrics.record_prediction(Duration::from_micros(10), 0.45, RiskLevel::Medium);

        let buckets = metrics.get_score_distribution();
        assert_eq!(buckets[9], 1);
        assert_eq!(buckets[0], 1);
        assert_eq!(buckets[4], 1);
    }

    #[test]
    fn test_processing_stats() {
        let metrics = ServiceMetrics::new();
        assert_eq!(metrics.get_processing_stats().count, 0);

        for us in [100, 200, 300, 400] {
            metrics.record_prediction(Duration::from_micros(us), 0.1, RiskLevel::Low);
        }
        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.max_us, 400);
        assert_eq!(stats.p99_us, 400);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = ServiceMetrics::new();
        metrics.record_prediction(Duration::from_micros(50), 0.9, RiskLevel::High);
        metrics.record_rejection();

        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["predictions_served"], 1);
        assert_eq!(json["requests_rejected"], 1);
        assert_eq!(json["by_risk_level"]["high"], 1);
        assert!(json["started_at"].is_string());
    }
}
