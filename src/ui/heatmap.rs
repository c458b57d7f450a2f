use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

use typerate::session::KeyPressTally;

/// Number of keys shown in the heatmap
pub const HEATMAP_KEYS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct HeatCell {
    pub label: String,
    pub count: u32,
    /// count relative to the most pressed key, 0.0..=1.0
    pub intensity: f64,
}

/// Most pressed keys, busiest first
pub fn heat_cells(tally: &KeyPressTally) -> Vec<HeatCell> {
    let max = tally.max();
    tally
        .top(HEATMAP_KEYS)
        .into_iter()
        .map(|(key, count)| HeatCell {
            label: key_label(key),
            count,
            intensity: if max == 0 {
                0.0
            } else {
                count as f64 / max as f64
            },
        })
        .collect()
}

pub fn key_label(key: char) -> String {
    if key == ' ' {
        "SPACE".to_string()
    } else {
        key.to_uppercase().collect()
    }
}

/// Purple background scaled by intensity
pub fn heat_color(intensity: f64) -> Color {
    let i = intensity.clamp(0.0, 1.0);
    let scale = |lo: f64, hi: f64| (lo + (hi - lo) * i).round() as u8;
    Color::Rgb(scale(40.0, 147.0), scale(20.0, 51.0), scale(60.0, 234.0))
}

/// Pure presenter for a single heatmap cell
pub fn present_cell(cell: &HeatCell) -> Span<'static> {
    let mut style = Style::default().bg(heat_color(cell.intensity)).fg(Color::White);
    if cell.intensity > 0.5 {
        style = style.add_modifier(Modifier::BOLD);
    }
    Span::styled(format!(" {} {} ", cell.label, cell.count), style)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally_of(s: &str) -> KeyPressTally {
        let mut tally = KeyPressTally::default();
        for c in s.chars() {
            tally.record(c);
        }
        tally
    }

    #[test]
    fn test_labels() {
        assert_eq!(key_label(' '), "SPACE");
        assert_eq!(key_label('a'), "A");
        assert_eq!(key_label(';'), ";");
    }

    #[test]
    fn test_cells_scale_against_max() {
        let cells = heat_cells(&tally_of("aaaab "));
        assert_eq!(cells[0].label, "A");
        assert_eq!(cells[0].count, 4);
        assert_eq!(cells[0].intensity, 1.0);
        assert!(cells.iter().all(|c| c.intensity > 0.0 && c.intensity <= 1.0));
        let space = cells.iter().find(|c| c.label == "SPACE").unwrap();
        assert_eq!(space.intensity, 0.25);
    }

    #[test]
    fn test_cells_capped() {
        let cells = heat_cells(&tally_of("abcdefghijklmnopqrstuvwxyz"));
        assert_eq!(cells.len(), HEATMAP_KEYS);
    }

    #[test]
    fn test_empty_tally() {
        assert!(heat_cells(&KeyPressTally::default()).is_empty());
    }

    #[test]
    fn test_heat_color_bounds() {
        assert_eq!(heat_color(0.0), Color::Rgb(40, 20, 60));
        assert_eq!(heat_color(1.0), Color::Rgb(147, 51, 234));
        assert_eq!(heat_color(7.0), heat_color(1.0));
    }

    #[test]
    fn test_present_cell_content() {
        let span = present_cell(&HeatCell {
            label: "SPACE".into(),
            count: 3,
            intensity: 1.0,
        });
        assert_eq!(span.content, " SPACE 3 ");
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
    }
}
