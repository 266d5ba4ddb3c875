//! TUI rendering.
//!
//! ┌──────────────────────────────────────────────────────────┐
//! │ 📡 streamdash   ● Live   Last 12 hours   Overview        │
//! ├─────────────┬─────────────┬──────────────┬───────────────┤
//! │ Bitrate     │ Latency     │ Error Rate   │ Active Streams│
//! │ 3120 kbps ▲ │ 88 ms ▲     │ 1.42 %       │ 131           │
//! ├─────────────┴──────┬──────┴──────────────┴───────────────┤
//! │ Bitrate            │ Bandwidth                           │
//! ├────────────────────┼─────────────────────────────────────┤
//! │ Latency            │ Error Rate                          │
//! ├────────────────────┴─────────────────────────────────────┤
//! │ details (d)                                              │
//! ├──────────────────────────────────────────────────────────┤
//! │ t: range   v: view   d: details   e: export   q: quit    │
//! └──────────────────────────────────────────────────────────┘

use ratatui::{prelude::*, widgets::*};

use streamdash_core::{
    HealthStatus, Kpis, Metric, SeriesSummary, TelemetrySample, Trend, ViewMode,
    summary::{axis_upper_bound, connection_label},
};

use super::app::Snapshot;

pub fn draw(f: &mut Frame, snap: &Snapshot) {
    let mut constraints = vec![
        Constraint::Length(3), // header
        Constraint::Length(4), // kpis
        Constraint::Min(12),   // charts
    ];
    if snap.show_details {
        constraints.push(Constraint::Length(8));
    }
    constraints.push(Constraint::Length(1)); // keys

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    draw_header(f, rows[0], snap);
    draw_kpis(f, rows[1], snap);
    draw_charts(f, rows[2], snap);
    if snap.show_details {
        draw_details(f, rows[3], snap);
    }
    draw_keys(f, rows[rows.len() - 1], snap);
}

fn draw_header(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let conn_color = if snap.connected {
        Color::Green
    } else {
        Color::Red
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" 📡 streamdash ", Style::default().bold().fg(Color::Cyan)),
            Span::styled(
                format!("  ● {}", connection_label(snap.connected)),
                Style::default().bold().fg(conn_color),
            ),
            Span::raw(format!("  {}", snap.range.description())),
            Span::styled(
                format!("  {}  ", snap.view.label()),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(
                format!("{} pts  #{} ", snap.samples.len(), snap.updates),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

    f.render_widget(block, area);
}

// ---------------------------------------------------------------------------
// KPI tiles
// ---------------------------------------------------------------------------

fn draw_kpis(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let Some(kpis) = Kpis::from_samples(&snap.samples) else {
        for (i, title) in ["Bitrate", "Latency", "Error Rate", "Active Streams"]
            .iter()
            .enumerate()
        {
            draw_tile(f, cols[i], title, Line::from("—"), Color::DarkGray);
        }
        return;
    };
    let latest = &kpis.latest;

    let bitrate = Line::from(vec![
        Span::styled(format!("{} kbps ", latest.bitrate), Style::default().bold()),
        trend_span(kpis.bitrate_trend, kpis.bitrate_change),
    ]);
    draw_tile(f, cols[0], "Bitrate", bitrate, Color::Cyan);

    let latency = Line::from(vec![
        Span::styled(format!("{} ms ", latest.latency), Style::default().bold()),
        trend_span(kpis.latency_trend, kpis.latency_change.abs()),
    ]);
    draw_tile(f, cols[1], "Latency", latency, Color::Cyan);

    let err_color = if kpis.error_rate_alert() {
        Color::Red
    } else {
        Color::Cyan
    };
    let error_rate = Line::from(Span::styled(
        format!("{:.2} %", latest.error_rate),
        Style::default().bold().fg(err_color),
    ));
    draw_tile(f, cols[2], "Error Rate", error_rate, err_color);

    let streams = Line::from(Span::styled(
        latest.active_streams.to_string(),
        Style::default().bold(),
    ));
    draw_tile(f, cols[3], "Active Streams", streams, Color::Cyan);
}

fn trend_span(trend: Trend, change: f64) -> Span<'static> {
    let color = match trend {
        Trend::Up => Color::Green,
        Trend::Down => Color::Red,
    };
    Span::styled(
        format!("{} {:.1}%", trend.arrow(), change),
        Style::default().fg(color),
    )
}

fn draw_tile(f: &mut Frame, area: Rect, title: &str, value: Line<'_>, border: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(" {title} "));
    f.render_widget(Paragraph::new(value).block(block), area);
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

const CHARTS: [(&str, &[(Metric, Color)]); 4] = [
    ("Bitrate (kbps)", &[(Metric::Bitrate, Color::Cyan)]),
    (
        "Bandwidth (MB)",
        &[
            (Metric::BandwidthOutgoing, Color::Magenta),
            (Metric::BandwidthIncoming, Color::Green),
        ],
    ),
    ("Latency (ms)", &[(Metric::Latency, Color::Yellow)]),
    ("Error Rate (%)", &[(Metric::ErrorRate, Color::Red)]),
];

fn draw_charts(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let cells: Vec<Rect> = match snap.view {
        ViewMode::Overview => {
            let halves = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Ratio(1, 2); 2])
                .split(area);
            halves
                .iter()
                .flat_map(|row| {
                    Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Ratio(1, 2); 2])
                        .split(*row)
                        .to_vec()
                })
                .collect()
        }
        ViewMode::Detailed => Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area)
            .to_vec(),
    };

    for ((title, series), cell) in CHARTS.iter().zip(cells) {
        draw_chart(f, cell, title, series, snap);
    }
}

fn draw_chart(f: &mut Frame, area: Rect, title: &str, series: &[(Metric, Color)], snap: &Snapshot) {
    let samples = &snap.samples;
    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "));

    if samples.is_empty() {
        let p = Paragraph::new("Waiting for data…")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    if snap.view == ViewMode::Detailed {
        if let Some(summary) = SeriesSummary::of(series[0].0, samples) {
            block = block.title_bottom(Line::from(format!(
                " {} ",
                summary.describe(series[0].0.title())
            )));
        }
    }

    let data: Vec<Vec<(f64, f64)>> = series.iter().map(|(m, _)| m.series(samples)).collect();
    let y_max = series
        .iter()
        .filter_map(|(m, _)| SeriesSummary::of(*m, samples))
        .map(|s| s.max)
        .fold(0.0, f64::max);
    let y_max = axis_upper_bound(y_max);

    let datasets: Vec<Dataset> = series
        .iter()
        .zip(&data)
        .map(|((metric, color), points)| {
            Dataset::default()
                .name(metric.title())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(points)
        })
        .collect();

    let (x_min, x_max) = x_bounds(samples);
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(Axis::default().bounds([x_min, x_max]).labels(vec![
            Line::from(clock_label(x_min as i64)),
            Line::from(clock_label(x_max as i64)),
        ]))
        .y_axis(Axis::default().bounds([0.0, y_max]).labels(vec![
            Line::from("0"),
            Line::from(format!("{y_max}")),
        ]));

    f.render_widget(chart, area);
}

fn x_bounds(samples: &[TelemetrySample]) -> (f64, f64) {
    let first = samples.first().map_or(0, |s| s.timestamp);
    let last = samples.last().map_or(0, |s| s.timestamp);
    let last = last.max(first + 1);
    (first as f64, last as f64)
}

/// `HH:MM:SS` (UTC) for an epoch-millisecond timestamp.
pub fn clock_label(ms: i64) -> String {
    let secs = ms.div_euclid(1000).rem_euclid(86_400);
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

fn draw_details(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    let Some(latest) = snap.samples.last() else {
        let p = Paragraph::new("No samples yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Details "));
        f.render_widget(p, area);
        return;
    };

    let health = HealthStatus::from_error_rate(latest.error_rate);
    let health_color = match health {
        HealthStatus::Healthy => Color::Green,
        HealthStatus::Warning => Color::Yellow,
        HealthStatus::Critical => Color::Red,
    };
    let status = vec![
        Line::from(vec![
            Span::raw("System     "),
            Span::styled(health.label(), Style::default().bold().fg(health_color)),
        ]),
        Line::from(format!("Connection {}", connection_label(snap.connected))),
        Line::from(format!("Updated    {}", clock_label(latest.timestamp))),
        Line::from(format!("Dropped    {}", snap.dropped)),
    ];
    f.render_widget(
        Paragraph::new(status).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Status Overview "),
        ),
        cols[0],
    );

    let metrics = vec![
        Line::from(format!("Bitrate        {} kbps", latest.bitrate)),
        Line::from(format!("Latency        {} ms", latest.latency)),
        Line::from(format!("Error Rate     {:.2} %", latest.error_rate)),
        Line::from(format!("Active Streams {}", latest.active_streams)),
    ];
    f.render_widget(
        Paragraph::new(metrics).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Current Metrics "),
        ),
        cols[1],
    );

    let bw = &latest.bandwidth;
    let bandwidth = vec![
        Line::from(format!("Outgoing {} MB", bw.outgoing)),
        Line::from(format!("Incoming {} MB", bw.incoming)),
        Line::from(format!("Total    {} MB", bw.total())),
    ];
    f.render_widget(
        Paragraph::new(bandwidth).block(Block::default().borders(Borders::ALL).title(" Bandwidth ")),
        cols[2],
    );
}

fn draw_keys(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let mut text = format!(
        " t: range ({})   v: view   d: details   e: export   q: quit",
        snap.range
    );
    if let Some(status) = &snap.status {
        text.push_str("   ");
        text.push_str(status);
    }
    let bar = Paragraph::new(text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}
