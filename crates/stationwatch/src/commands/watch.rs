//! Continuous polling: report devices as they join and leave.

use std::collections::BTreeMap;

use chrono::Local;
use owo_colors::OwoColorize;
use serde_json::json;
use tracing::debug;

use stationwatch_api::DeviceClient;
use stationwatch_core::{DeviceRecord, DeviceSnapshot, Monitor, MonitorState, Origin, Poller};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Presence tracking ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Joined,
    Left,
}

/// Device identity across cycles: segment plus MAC (or label when the
/// router gave no MAC).
type PresenceKey = (Origin, String);

fn key(record: &DeviceRecord) -> PresenceKey {
    let id = record
        .mac
        .as_ref()
        .map_or_else(|| record.label().to_owned(), |m| m.as_str().to_owned());
    (record.origin, id)
}

/// Devices seen in the most recent successful cycle.
#[derive(Debug, Default)]
struct Presence {
    present: BTreeMap<PresenceKey, DeviceRecord>,
}

impl Presence {
    /// Replace the known set with `snapshot`, returning what changed.
    fn update(&mut self, snapshot: &DeviceSnapshot) -> Vec<(Change, DeviceRecord)> {
        let next: BTreeMap<PresenceKey, DeviceRecord> =
            snapshot.iter().map(|d| (key(d), d.clone())).collect();

        let mut changes: Vec<(Change, DeviceRecord)> = next
            .iter()
            .filter(|(k, _)| !self.present.contains_key(*k))
            .map(|(_, d)| (Change::Joined, d.clone()))
            .collect();
        changes.extend(
            self.present
                .iter()
                .filter(|(k, _)| !next.contains_key(*k))
                .map(|(_, d)| (Change::Left, d.clone())),
        );

        self.present = next;
        changes
    }

    fn len(&self) -> usize {
        self.present.len()
    }
}

// ── Rendering ───────────────────────────────────────────────────────

fn format_change(change: Change, d: &DeviceRecord, format: OutputFormat, color: bool) -> String {
    let event = match change {
        Change::Joined => "joined",
        Change::Left => "left",
    };

    match format {
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            json!({ "event": event, "at": Local::now().to_rfc3339(), "device": d }).to_string()
        }
        OutputFormat::Table | OutputFormat::Plain => {
            let mac = d.mac.as_ref().map_or("-", |m| m.as_str());
            let ip = d.ip.map(|ip| ip.to_string()).unwrap_or_default();
            let line = format!("{mac:<17}  {:<24} {ip:<15} ({})", d.label(), d.origin);
            let stamp = Local::now().format("%H:%M:%S");
            match (change, color) {
                (Change::Joined, true) => format!("{stamp} {} {line}", "+".green()),
                (Change::Left, true) => format!("{stamp} {} {}", "-".red(), line.dimmed()),
                (Change::Joined, false) => format!("{stamp} + {line}"),
                (Change::Left, false) => format!("{stamp} - {line}"),
            }
        }
    }
}

fn print_changes(changes: &[(Change, DeviceRecord)], global: &GlobalOpts, color: bool) {
    for (change, d) in changes {
        output::print_output(&format_change(*change, d, global.output_format(), color), global.quiet);
    }
}

fn report_failure(state: &MonitorState, color: bool) {
    let message = state.last_error.as_deref().unwrap_or("unknown error");
    let text = format!(
        "poll failed ({} in a row), keeping last known devices: {message}",
        state.consecutive_failures
    );
    if color {
        eprintln!("{}", text.yellow());
    } else {
        eprintln!("{text}");
    }
}

// ── Handler ─────────────────────────────────────────────────────────

/// Poll until interrupted, printing a line per join or departure.
pub async fn handle<C: DeviceClient + 'static>(
    poller: Poller<C>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color_mode());
    let interval = poller.scan_interval();

    let monitor = Monitor::start(poller).await?;
    let mut rx = monitor.subscribe();
    let mut presence = Presence::default();

    let initial = rx.borrow_and_update().clone();
    if let Some(ref snapshot) = initial.snapshot {
        print_changes(&presence.update(snapshot), global, color);
    }
    if !global.quiet {
        eprintln!(
            "watching {} device(s), polling every {}s (Ctrl-C to stop)",
            presence.len(),
            interval.as_secs()
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                if state.is_stale() {
                    report_failure(&state, color);
                } else if let Some(ref snapshot) = state.snapshot {
                    print_changes(&presence.update(snapshot), global, color);
                }
            }
        }
    }

    monitor.shutdown().await;
    Ok(())
}
