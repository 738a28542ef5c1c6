use std::net::SocketAddr;

use crate::model::Event;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: booking mutations attempted. Labels: op, status.
pub const MUTATIONS_TOTAL: &str = "kennel_mutations_total";

/// Histogram: mutation latency in seconds, lock wait and journal included. Labels: op.
pub const MUTATION_DURATION_SECONDS: &str = "kennel_mutation_duration_seconds";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: bookings currently stored.
pub const BOOKINGS_STORED: &str = "kennel_bookings_stored";

/// Gauge: free kennel places today, as last published.
pub const FREE_SPACE_TODAY: &str = "kennel_free_space_today";

/// Histogram: time to write and sync one journal record, in seconds.
pub const JOURNAL_WRITE_DURATION_SECONDS: &str = "kennel_journal_write_duration_seconds";

/// Counter: journal compactions. Labels: status.
pub const JOURNAL_COMPACTIONS_TOTAL: &str = "kennel_journal_compactions_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Map an Event variant to a short label for metrics.
pub fn event_label(event: &Event) -> &'static str {
    match event {
        Event::BookingAdded { .. } => "add_booking",
        Event::BookingRemoved { .. } => "remove_booking",
        Event::BookingEdited { .. } => "edit_booking",
        Event::Restored { .. } => "restore",
    }
}

pub fn record_mutation(op: &'static str, status: &'static str, started: std::time::Instant) {
    metrics::counter!(MUTATIONS_TOTAL, "op" => op, "status" => status).increment(1);
    metrics::histogram!(MUTATION_DURATION_SECONDS, "op" => op).record(started.elapsed().as_secs_f64());
}
