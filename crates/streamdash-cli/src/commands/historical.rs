use streamdash_core::{
    FeedConsumer, HealthStatus, Metric, SeriesSummary, TimeRange, export::to_json_pretty, now_ms,
};

use crate::feed::FeedClient;

const SUMMARY_METRICS: [Metric; 6] = [
    Metric::Bitrate,
    Metric::Latency,
    Metric::ErrorRate,
    Metric::ActiveStreams,
    Metric::BandwidthOutgoing,
    Metric::BandwidthIncoming,
];

/// Fetch the backfill, filter it to `range`, and print a summary or write it
/// to `output` as pretty JSON.
pub fn run(url: &str, range: TimeRange, output: Option<&str>) {
    let client = FeedClient::new(url);
    let rt = super::runtime();
    let historical = match rt.block_on(client.fetch_historical()) {
        Ok(samples) => samples,
        Err(e) => {
            eprintln!("Failed to fetch {}/historical: {e}", client.base_url());
            std::process::exit(1);
        }
    };

    let mut consumer = FeedConsumer::new(range);
    consumer.seed(historical, now_ms());
    let samples = consumer.samples();

    if let Some(path) = output {
        let written = to_json_pretty(samples).and_then(|json| std::fs::write(path, json));
        match written {
            Ok(()) => println!("Wrote {} samples to {path}", samples.len()),
            Err(e) => {
                eprintln!("Failed to write {path}: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("{} samples ({})", samples.len(), range.description());
    if let Some(latest) = consumer.latest() {
        println!(
            "Status: {} (error rate {:.2} %)",
            HealthStatus::from_error_rate(latest.error_rate).label(),
            latest.error_rate
        );
    }
    println!();
    for metric in SUMMARY_METRICS {
        if let Some(summary) = SeriesSummary::of(metric, samples) {
            let unit = metric.unit();
            let label = if unit.is_empty() {
                metric.title().to_string()
            } else {
                format!("{} ({unit})", metric.title())
            };
            println!("  {}", summary.describe(&label));
        }
    }
}
