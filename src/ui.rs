pub mod charting;
pub mod heatmap;

use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;
use webbrowser::Browser;

use typerate::{
    metrics::{Metrics, TestResult},
    recorder::RecordStore,
    session::{Phase, Session},
};

use crate::app::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

impl<S: RecordStore> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Length(1), // padding
                Constraint::Min(1),    // body
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Span::styled(
            format!(
                "typerate · {} · {}",
                self.config.category, self.config.difficulty
            ),
            dim_bold(),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        match self.session.phase() {
            Phase::Idle | Phase::Running => render_typing(self, chunks[2], buf),
            Phase::Finished => render_results(self, chunks[2], buf),
        }

        Paragraph::new(Span::styled(
            legend(self.session.phase()),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[3], buf);
    }
}

fn legend(phase: Phase) -> &'static str {
    match phase {
        Phase::Finished if Browser::is_available() => {
            "(n)ew / (r)etry / (c)ategory / (d)ifficulty / (t)weet / (tab) new / (ctrl+c) quit"
        }
        Phase::Finished => {
            "(n)ew / (r)etry / (c)ategory / (d)ifficulty / (tab) new / (ctrl+c) quit"
        }
        _ => "(tab/esc) new / (ctrl+f) finish / (ctrl+s) stats / (ctrl+c) quit",
    }
}

fn render_typing<S: RecordStore>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let max_chars_per_line = area.width.max(1);
    let prompt_width = session.reference().width();
    let prompt_occupied_lines = if prompt_width <= max_chars_per_line as usize {
        1
    } else {
        ((prompt_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };
    let stats_lines = if app.config.show_stats { 2 } else { 1 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(stats_lines),
            Constraint::Length(1),
            Constraint::Length(1), // progress
            Constraint::Length(1),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Min(0),
        ])
        .split(area);

    metrics_grid(session, app.config.show_stats).render(chunks[0], buf);

    let progress = if session.phase() == Phase::Idle {
        "start typing to begin".to_string()
    } else {
        format!("{}%", session.progress())
    };
    Paragraph::new(Span::styled(progress, dim_bold()))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Paragraph::new(Line::from(passage_spans(session)))
        .alignment(if prompt_occupied_lines == 1 {
            // a passage that fits on one line reads best centred
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);

    if app.config.show_stats {
        let panel = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(chunks[5]);
        render_stats_panel(app, panel[1], buf);
    }
}

fn metrics_grid(session: &Session, show_stats: bool) -> Paragraph<'static> {
    let m = session.metrics();
    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{} wpm   {}% acc   {:.1}s   {} errors",
            m.wpm,
            m.accuracy,
            session.elapsed_seconds(),
            m.errors
        ),
        bold(),
    ))];
    if show_stats {
        lines.push(advanced_stats_line(&m));
    }
    Paragraph::new(lines).alignment(Alignment::Center)
}

fn advanced_stats_line(m: &Metrics) -> Line<'static> {
    Line::from(Span::styled(
        format!(
            "raw {}   net {}   consistency {}%",
            m.raw_wpm, m.net_wpm, m.consistency
        ),
        Style::default().fg(Color::Cyan),
    ))
}

/// Typed characters coloured by correctness, the cursor and the untyped remainder
pub fn passage_spans(session: &Session) -> Vec<Span<'static>> {
    let green = bold().fg(Color::Green);
    let red = bold().fg(Color::Red);

    let mut spans = session
        .input()
        .iter()
        .enumerate()
        .map(|(idx, &typed)| match session.expected_char(idx) {
            Some(expected) if expected == typed => Span::styled(expected.to_string(), green),
            _ => Span::styled(
                match typed {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red,
            ),
        })
        .collect::<Vec<Span>>();

    let cursor = session.input().len();
    if let Some(expected) = session.expected_char(cursor) {
        spans.push(Span::styled(
            expected.to_string(),
            dim_bold().add_modifier(Modifier::UNDERLINED),
        ));
    }

    let rest: String = session.reference().chars().skip(cursor + 1).collect();
    if !rest.is_empty() {
        spans.push(Span::styled(rest, dim_bold()));
    }
    spans
}

fn render_results<S: RecordStore>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // completion message
            Constraint::Length(1), // final stats
            Constraint::Length(1), // advanced stats
            Constraint::Min(10),   // chart and cards
        ])
        .split(area);

    let message = if app.new_best {
        Span::styled("New personal best!", bold().fg(Color::Yellow))
    } else {
        Span::styled("Test complete", bold())
    };
    Paragraph::new(message)
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    if let Some(result) = session.result() {
        Paragraph::new(Span::styled(
            format!(
                "{} wpm   {}% acc   {:.1}s   {} errors",
                result.wpm, result.accuracy, result.time, result.errors
            ),
            bold(),
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    }
    if app.config.show_stats {
        Paragraph::new(advanced_stats_line(&session.metrics()))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }

    render_stats_panel(app, chunks[3], buf);
}

/// Performance chart above the heatmap, personal best and recent tests cards
fn render_stats_panel<S: RecordStore>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(7)])
        .split(area);

    render_chart(session, chunks[0], buf);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(25),
            Constraint::Percentage(35),
        ])
        .split(chunks[1]);

    let heat = if session.tally().is_empty() {
        Line::from("no keys yet")
    } else {
        Line::from(
            heatmap::heat_cells(session.tally())
                .iter()
                .map(heatmap::present_cell)
                .collect::<Vec<_>>(),
        )
    };
    Paragraph::new(heat)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("keys"))
        .render(cards[0], buf);

    Paragraph::new(personal_best_lines(app.recorder.personal_best()))
        .block(Block::default().borders(Borders::ALL).title("personal best"))
        .render(cards[1], buf);

    let now = Utc::now();
    let recent = app
        .recorder
        .history()
        .iter()
        .map(|r| {
            Line::from(format!(
                "{} wpm {}%  {}",
                r.wpm,
                r.accuracy,
                relative_time(r.timestamp, now)
            ))
        })
        .collect::<Vec<_>>();
    Paragraph::new(recent)
        .block(Block::default().borders(Borders::ALL).title("recent"))
        .render(cards[2], buf);
}

fn render_chart(session: &Session, area: Rect, buf: &mut Buffer) {
    let coords = charting::sample_coords(session.samples());
    let (overall_duration, highest_wpm) =
        charting::compute_chart_params(&coords, session.elapsed_seconds());

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&coords)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(charting::format_label(overall_duration), bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(charting::format_label(highest_wpm), bold()),
                ]),
        )
        .render(area, buf);
}

fn personal_best_lines(best: Option<&TestResult>) -> Vec<Line<'static>> {
    match best {
        None => vec![Line::from("none yet")],
        Some(best) => vec![
            Line::from(Span::styled(format!("{} wpm", best.wpm), bold())),
            Line::from(format!("{}% acc", best.accuracy)),
            Line::from(format!("{}% consistency", best.consistency)),
            Line::from(format!("{:.1}s", best.time)),
        ],
    }
}

/// Coarse "n units ago" rendering of a past timestamp
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    let (n, unit) = match secs {
        0..=59 => return "just now".to_string(),
        60..=3_599 => (secs / 60, "minute"),
        3_600..=86_399 => (secs / 3_600, "hour"),
        _ => (secs / 86_400, "day"),
    };
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}
