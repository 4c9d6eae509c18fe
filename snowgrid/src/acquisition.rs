//! Parallel point acquisition.
//!
//! Every sample point is queried concurrently and the call returns only once
//! all queries have settled. A failing, empty or slow point is dropped from
//! the result and logged; it never aborts the batch and is never retried.

use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;

use crate::measurement::{meters_to_inches, Measurement};
use crate::provider::SnowDepthProvider;
use crate::sampling::SamplePoint;

/// Prefix for station identifiers of acquired samples.
pub const STATION_PREFIX: &str = "NOHRSC_";

/// Summary of one acquisition run.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionReport {
    /// Points that reported a strictly positive depth, in plan order.
    pub measurements: Vec<Measurement>,
    /// Number of points queried.
    pub queried: usize,
    /// Points that answered with zero depth or no data.
    pub no_snow: usize,
    /// Points whose query returned an error.
    pub failed: usize,
    /// Points whose query did not finish within the timeout.
    pub timed_out: usize,
    /// Wall-clock duration of the whole batch.
    pub elapsed: Duration,
}

impl AcquisitionReport {
    /// Number of points with snow.
    pub fn with_snow(&self) -> usize {
        self.measurements.len()
    }
}

enum PointOutcome {
    Snow(Measurement),
    NoSnow,
    Failed,
    TimedOut,
}

/// Query every point concurrently and keep those with snow.
///
/// Depths are converted from meters to inches; results are tagged as gridded
/// estimates with station `NOHRSC_{point name}`.
pub async fn acquire(
    points: &[SamplePoint],
    provider: &dyn SnowDepthProvider,
    point_timeout: Duration,
) -> AcquisitionReport {
    let start = Instant::now();

    tracing::debug!(
        provider = provider.name(),
        points = points.len(),
        timeout_ms = point_timeout.as_millis() as u64,
        "Querying sample points in parallel"
    );

    let outcomes = join_all(
        points
            .iter()
            .map(|point| query_point(point, provider, point_timeout)),
    )
    .await;

    let mut report = AcquisitionReport {
        queried: points.len(),
        ..Default::default()
    };
    for outcome in outcomes {
        match outcome {
            PointOutcome::Snow(m) => report.measurements.push(m),
            PointOutcome::NoSnow => report.no_snow += 1,
            PointOutcome::Failed => report.failed += 1,
            PointOutcome::TimedOut => report.timed_out += 1,
        }
    }
    report.elapsed = start.elapsed();

    tracing::info!(
        provider = provider.name(),
        queried = report.queried,
        with_snow = report.with_snow(),
        no_snow = report.no_snow,
        failed = report.failed,
        timed_out = report.timed_out,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Acquisition complete"
    );

    report
}

async fn query_point(
    point: &SamplePoint,
    provider: &dyn SnowDepthProvider,
    point_timeout: Duration,
) -> PointOutcome {
    let query = provider.snow_depth_meters(point.lon, point.lat);

    match tokio::time::timeout(point_timeout, query).await {
        Ok(Ok(Some(meters))) => {
            let inches = meters_to_inches(meters);
            if inches > 0.0 {
                PointOutcome::Snow(Measurement::gridded(
                    point.lat,
                    point.lon,
                    inches,
                    format!("{}{}", STATION_PREFIX, point.name),
                    Utc::now(),
                ))
            } else {
                PointOutcome::NoSnow
            }
        }
        Ok(Ok(None)) => PointOutcome::NoSnow,
        Ok(Err(e)) => {
            tracing::warn!(point = %point.name, error = %e, "Sample point query failed");
            PointOutcome::Failed
        }
        Err(_) => {
            tracing::warn!(
                point = %point.name,
                timeout_ms = point_timeout.as_millis() as u64,
                "Sample point query timed out"
            );
            PointOutcome::TimedOut
        }
    }
}
