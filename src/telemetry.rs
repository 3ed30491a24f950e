use std::time::Duration;

use robosim::SimLink;
use robosim::config::TelemetryConfig;
use robosim::shared::now_millis;
use tracing::{debug, info, warn};

/// Odometry older than this many telemetry periods is reported as stale.
const STALE_PERIODS: u64 = 5;

/// Periodically logs the published snapshots until the simulation stops.
pub async fn run(link: SimLink, config: TelemetryConfig) -> anyhow::Result<()> {
    info!("Telemetry task started.");
    let period = Duration::from_millis(config.period_ms.max(1));
    let mut tick = tokio::time::interval(period);
    let mut last_scan_tick = None;

    loop {
        tick.tick().await;

        let odometry = link.odometry();
        let truth = link.ground_truth();
        let scan = link.laser_scan();
        let closest = scan.closest().map(|(_, range)| range);

        info!(
            tick = odometry.tick,
            pose = %truth.pose,
            control = %odometry.control,
            goal = %link.goal_control(),
            valid_beams = scan.valid_count(),
            ?closest,
            "Telemetry"
        );

        if last_scan_tick == Some(scan.tick) {
            debug!(scan_tick = scan.tick, "No new laser scan since the last report");
        }
        last_scan_tick = Some(scan.tick);

        if !link.is_running() {
            warn!(pose = %truth.pose, "Simulation is no longer running. Telemetry task exiting.");
            return Ok(());
        }

        let age_ms = now_millis().saturating_sub(odometry.timestamp_ms);
        if odometry.timestamp_ms != 0 && age_ms > STALE_PERIODS * config.period_ms {
            warn!(age_ms, "Odometry is stale; the simulation loop may be stalled.");
        }
    }
}
