//! Aligned plain-text tables for `--format table`.

const MIN_COLUMN: usize = 6;
const GAP: &str = "  ";

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Render rows under `headers`, right-aligning numeric cells.
///
/// Columns shrink widest-first when the table exceeds `max_width`, never below
/// their header or six characters.
#[must_use]
pub fn render_entity_table(
    headers: &[&str],
    rows: &[Vec<String>],
    options: TableOptions,
) -> String {
    let floors = headers
        .iter()
        .map(|h| display_len(h).max(MIN_COLUMN))
        .collect::<Vec<_>>();
    let mut widths = floors
        .iter()
        .enumerate()
        .map(|(col, floor)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| display_len(cell))
                .fold(*floor, usize::max)
        })
        .collect::<Vec<_>>();

    if let Some(max_width) = options.max_width {
        shrink_to(&mut widths, &floors, max_width);
    }

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(&clip(header, *width), *width, false))
        .collect::<Vec<_>>()
        .join(GAP);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push("-".repeat(display_len(&header_line)));
    lines.insert(0, header_line);

    for row in rows {
        let cells = widths
            .iter()
            .enumerate()
            .map(|(col, width)| {
                let text = clip(row.get(col).map_or("-", String::as_str), *width);
                let line = pad(&text, *width, is_numeric(&text));
                if options.color {
                    paint(&text, line)
                } else {
                    line
                }
            })
            .collect::<Vec<_>>();
        lines.push(cells.join(GAP));
    }

    lines.join("\n")
}

fn shrink_to(widths: &mut [usize], floors: &[usize], max_width: usize) {
    let gaps = widths.len().saturating_sub(1) * GAP.len();
    let mut total = widths.iter().sum::<usize>() + gaps;

    while total > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(col, width)| **width > floors[*col])
            .max_by_key(|(_, width)| **width)
            .map(|(col, _)| col);
        let Some(col) = widest else {
            break;
        };
        widths[col] -= 1;
        total -= 1;
    }
}

fn display_len(value: &str) -> usize {
    value.chars().count()
}

fn clip(value: &str, width: usize) -> String {
    if display_len(value) <= width {
        return value.to_string();
    }
    let mut out = value.chars().take(width.saturating_sub(1)).collect::<String>();
    out.push('…');
    out
}

fn is_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.parse::<f64>().is_ok() && trimmed.chars().any(|ch| ch.is_ascii_digit())
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    if right_align {
        format!("{value:>width$}")
    } else {
        format!("{value:<width$}")
    }
}

/// Wrap a padded cell in an ANSI color when its text is a known status word.
fn paint(text: &str, padded: String) -> String {
    let code = match text.trim().to_ascii_lowercase().as_str() {
        "good" | "excellent" | "top_performer" | "above_average" | "decreasing" | "earned"
        | "model" => "32",
        "warning" | "average" | "stable" | "fallback" | "unknown" => "33",
        "exceeded" | "high" | "needs_improvement" | "below_average" | "increasing" | "used" => "31",
        _ => return padded,
    };
    format!("\u{1b}[{code}m{padded}\u{1b}[0m")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn numbers_align_right() {
        let table = render_entity_table(
            &["sector", "total"],
            &[
                vec!["IT".into(), "5.5".into()],
                vec!["Manufacturing".into(), "1234.25".into()],
            ],
            PLAIN,
        );
        let lines = table.lines().collect::<Vec<_>>();
        assert!(lines[2].ends_with("    5.5"));
        assert!(lines[3].ends_with("1234.25"));
    }

    #[test]
    fn narrow_terminal_clips_widest_column() {
        let table = render_entity_table(
            &["label", "badge"],
            &[vec!["A very long organization name".into(), "Gold".into()]],
            TableOptions {
                max_width: Some(24),
                color: false,
            },
        );
        let row = table.lines().nth(2).expect("row line");
        assert!(row.contains('…'));
        assert_eq!(display_len(row), 24);
    }

    #[test]
    fn missing_cells_render_as_dash() {
        let table = render_entity_table(&["a", "b"], &[vec!["x".into()]], PLAIN);
        assert!(table.lines().nth(2).is_some_and(|row| row.trim_end().ends_with('-')));
    }

    #[test]
    fn status_words_are_colored() {
        assert!(paint("exceeded", "exceeded".into()).starts_with("\u{1b}[31m"));
        assert!(paint("good", "good  ".into()).contains("good  "));
        assert_eq!(paint("IT", "IT".into()), "IT");
    }
}
