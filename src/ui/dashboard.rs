use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::engine::EngineState;
use crate::model::signal::{Confidence, Regime, Signal};

use super::format::{
    format_elapsed, format_level, format_price_usd, format_remaining, proximity, Proximity,
};

pub struct HeaderBar<'a> {
    pub title: &'a str,
    pub data_ready: bool,
    pub points: usize,
    pub required: usize,
    /// Time spent collecting, when known.
    pub collecting_for: Option<chrono::TimeDelta>,
}

impl Widget for HeaderBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled(
            self.title,
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )];
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        if self.data_ready {
            spans.push(Span::styled("Data ready", Style::default().fg(Color::Green)));
        } else {
            let progress = match self.collecting_for {
                Some(elapsed) => format!(
                    "Collecting data: {}/{} ({})",
                    self.points,
                    self.required,
                    format_elapsed(elapsed)
                ),
                None => format!("Collecting data: {}/{}", self.points, self.required),
            };
            spans.push(Span::styled(progress, Style::default().fg(Color::Yellow)));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue));
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(block)
            .render(area, buf);
    }
}

fn signal_color(signal: &Signal) -> Color {
    match signal {
        Signal::Buy => Color::Green,
        Signal::Sell => Color::Red,
        Signal::Hold => Color::White,
        Signal::Loading { .. } => Color::Yellow,
    }
}

fn regime_color(regime: Regime) -> Color {
    match regime {
        Regime::Calm => Color::Green,
        Regime::Mixed => Color::Yellow,
        Regime::Volatile => Color::Red,
        Regime::Unknown => Color::DarkGray,
    }
}

fn confidence_color(confidence: Confidence) -> Color {
    match confidence {
        Confidence::High => Color::Green,
        Confidence::Medium => Color::Yellow,
        Confidence::Low => Color::DarkGray,
    }
}

fn level_style(proximity: Proximity, near_color: Color) -> Style {
    match proximity {
        Proximity::VeryNear => Style::default()
            .fg(near_color)
            .add_modifier(Modifier::BOLD),
        Proximity::Near => Style::default().fg(near_color),
        Proximity::Far => Style::default().fg(Color::Gray),
    }
}

/// Compact `RES/SUP` cell; needs both sides of the current range and a price.
pub fn levels_line(state: &EngineState) -> Line<'static> {
    let price = state.status.price;
    let range = state.levels.current_range.unwrap_or_default();
    let (resistance, support) = match (range.resistance, range.support) {
        (Some(r), Some(s)) if price != 0.0 => (r, s),
        _ => {
            return Line::from(Span::styled(
                "No levels",
                Style::default().fg(Color::DarkGray),
            ))
        }
    };

    Line::from(vec![
        Span::styled(
            format_level(resistance),
            level_style(proximity(price, resistance), Color::Red),
        ),
        Span::raw("/"),
        Span::styled(
            format_level(support),
            level_style(proximity(price, support), Color::Green),
        ),
    ])
}

pub struct SignalTable<'a> {
    pub asset_label: &'a str,
    pub state: &'a EngineState,
}

impl Widget for SignalTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let status = &self.state.status;
        let header = Row::new(vec![
            "ASSET",
            "PRICE",
            "SIGNAL",
            "SCORE",
            "REGIME",
            "CONF",
            "LEVELS",
            "VOLATILITY",
            "STABILITY",
        ])
        .style(
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        );

        let row = Row::new(vec![
            Cell::from(Span::styled(
                self.asset_label.to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Cell::from(Span::styled(
                format_price_usd(status.price),
                Style::default().fg(Color::Yellow),
            )),
            Cell::from(Span::styled(
                status.signal.to_string(),
                Style::default().fg(signal_color(&status.signal)),
            )),
            Cell::from(format!("{:.2}", status.score)),
            Cell::from(Span::styled(
                status.regime.to_string(),
                Style::default().fg(regime_color(status.regime)),
            )),
            Cell::from(Span::styled(
                status.confidence.to_string(),
                Style::default().fg(confidence_color(status.confidence)),
            )),
            Cell::from(levels_line(self.state)),
            Cell::from(format!("{:.2}", status.volatility)),
            Cell::from(format!("{:.2}", status.stability)),
        ]);

        let widths = [
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(15),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(20),
            Constraint::Length(12),
            Constraint::Length(10),
        ];

        let block = Block::default()
            .title(" Signal ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Widget::render(
            Table::new(vec![row], widths).header(header).block(block),
            area,
            buf,
        );
    }
}

pub struct FooterBar {
    pub session_start: chrono::DateTime<chrono::Local>,
    pub now: chrono::DateTime<chrono::Local>,
    pub remaining: Option<chrono::TimeDelta>,
    pub points: usize,
    pub collecting_for: Option<chrono::TimeDelta>,
}

impl Widget for FooterBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label = Style::default().add_modifier(Modifier::BOLD);
        let mut spans = vec![
            Span::styled("Session: ", label),
            Span::raw(self.session_start.format("%H:%M:%S").to_string()),
            Span::styled(" | Now: ", label),
            Span::raw(self.now.format("%H:%M:%S").to_string()),
        ];
        if let Some(remaining) = self.remaining {
            spans.push(Span::styled(" | Remaining: ", label));
            spans.push(Span::raw(format_remaining(remaining)));
        }
        if let Some(elapsed) = self.collecting_for {
            spans.push(Span::styled(" | Data: ", label));
            spans.push(Span::raw(format!(
                "{} points in {}",
                self.points,
                format_elapsed(elapsed)
            )));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue));
        Paragraph::new(Line::from(spans)).block(block).render(area, buf);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Events ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.messages.len().saturating_sub(visible);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|msg| {
                let color = if msg.starts_with("[ERR]") {
                    Color::Red
                } else if msg.starts_with("[WARN]") {
                    Color::Yellow
                } else {
                    Color::White
                };
                Line::from(Span::styled(msg.as_str(), Style::default().fg(color)))
            })
            .collect();
        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(" [Q]", Style::default().fg(Color::Yellow)),
            Span::styled("uit  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[S]", Style::default().fg(Color::Yellow)),
            Span::styled("ave  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[C]", Style::default().fg(Color::Yellow)),
            Span::styled("lear log  ", Style::default().fg(Color::DarkGray)),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
