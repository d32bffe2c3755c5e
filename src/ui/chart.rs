use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Widget},
};

/// Dot plot of the most recent prices with the current resistance/support rows marked.
pub struct PriceChart<'a> {
    prices: &'a [f64],
    title: String,
    resistance: Option<f64>,
    support: Option<f64>,
}

impl<'a> PriceChart<'a> {
    pub fn new(prices: &'a [f64], asset_label: &str) -> Self {
        Self {
            prices,
            title: format!(" Price ({}) ", asset_label),
            resistance: None,
            support: None,
        }
    }

    pub fn resistance(mut self, val: Option<f64>) -> Self {
        self.resistance = val;
        self
    }

    pub fn support(mut self, val: Option<f64>) -> Self {
        self.support = val;
        self
    }
}

fn row_for(value: f64, min: f64, range: f64, height: usize) -> usize {
    let normalized = ((value - min) / range).clamp(0.0, 1.0);
    height - 1 - ((normalized * (height - 1) as f64) as usize).min(height - 1)
}

impl Widget for PriceChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.prices.is_empty() || inner.height < 3 || inner.width < 4 {
            return;
        }

        let chart_height = inner.height as usize;
        let chart_width = inner.width as usize;
        let visible = &self.prices[self.prices.len().saturating_sub(chart_width)..];

        // Scale to prices and any level in view so the level rows stay on screen.
        let mut min_price = visible.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max_price = visible.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for level in [self.resistance, self.support].into_iter().flatten() {
            min_price = min_price.min(level);
            max_price = max_price.max(level);
        }
        let range = max_price - min_price;
        let range = if range < 0.01 { 1.0 } else { range };

        let level_rows = [
            (self.resistance, "R", Color::Red),
            (self.support, "S", Color::Green),
        ];
        for (level, tag, color) in level_rows {
            if let Some(level) = level {
                let y = inner.y + row_for(level, min_price, range, chart_height) as u16;
                let style = Style::default().fg(color);
                for x in inner.x..inner.x + inner.width {
                    buf.set_string(x, y, "·", style);
                }
                buf.set_string(inner.x + inner.width - 1, y, tag, style);
            }
        }

        for (i, &price) in visible.iter().enumerate() {
            let x = inner.x + i as u16;
            let y = inner.y + row_for(price, min_price, range, chart_height) as u16;
            buf.set_string(x, y, "●", Style::default().fg(Color::Cyan));
        }

        let label_style = Style::default().fg(Color::DarkGray);
        buf.set_string(inner.x, inner.y, format!("{:.1}", max_price), label_style);
        buf.set_string(
            inner.x,
            inner.y + inner.height - 1,
            format!("{:.1}", min_price),
            label_style,
        );
    }
}
