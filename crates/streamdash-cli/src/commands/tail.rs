use std::io::Write;

use eventsource_stream::EventStreamError;
use futures_util::StreamExt;
use streamdash_core::TelemetrySample;

use crate::feed::{FeedClient, live_events};

/// Print live samples as JSON lines. `count == 0` means until interrupted.
pub fn run(url: &str, count: usize) {
    let rt = super::runtime();
    if let Err(e) = rt.block_on(tail(FeedClient::new(url), count)) {
        eprintln!("Live feed error: {e}");
        std::process::exit(1);
    }
}

async fn tail(client: FeedClient, count: usize) -> Result<(), crate::feed::FeedError> {
    let resp = client.open_live().await?;
    log::info!("connected to {}/metrics", client.base_url());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut events = live_events(resp);
    let mut printed = 0usize;

    while let Some(event) = events.next().await {
        let event = match event {
            Ok(ev) => ev,
            Err(EventStreamError::Transport(e)) => return Err(e.into()),
            Err(e) => {
                log::warn!("skipping unreadable live frame: {e}");
                continue;
            }
        };
        let sample: TelemetrySample = match serde_json::from_str(&event.data) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("dropping live event: {e}");
                continue;
            }
        };
        let line = match serde_json::to_string(&sample) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("could not re-encode sample: {e}");
                continue;
            }
        };
        if writeln!(out, "{line}").and_then(|_| out.flush()).is_err() {
            return Ok(()); // Broken pipe
        }
        printed += 1;
        if count > 0 && printed >= count {
            return Ok(());
        }
    }

    log::warn!("live feed closed by server after {printed} samples");
    Ok(())
}
