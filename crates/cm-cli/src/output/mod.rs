use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Format a response as pretty JSON, one-line JSON or an aligned table.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => tabulate(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Render to stdout.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render(value, format)?);
    Ok(())
}

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

/// Objects become key/value tables, except that a single array-of-objects
/// field (leaderboard entries, recent transactions, missing dates) is
/// rendered as its own table below the summary.
fn tabulate<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let options = table_options();

    match serde_json::to_value(value)? {
        Value::Array(items) => Ok(render_array_table(&items, options)),
        Value::Object(map) => {
            let mut entries = map.into_iter().collect::<Vec<_>>();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut rows = Vec::with_capacity(entries.len());
            let mut nested = Vec::new();
            for (key, value) in entries {
                match value {
                    Value::Array(items) if !items.is_empty() => {
                        rows.push(vec![key.clone(), format!("({} rows)", items.len())]);
                        nested.push((key, items));
                    }
                    other => rows.push(vec![key, value_to_cell(&other)]),
                }
            }

            let mut out = table::render_entity_table(&["key", "value"], &rows, options);
            for (key, items) in nested {
                out.push_str("\n\n");
                out.push_str(&key);
                out.push('\n');
                out.push_str(&render_array_table(&items, options));
            }
            Ok(out)
        }
        scalar => Ok(table::render_entity_table(
            &["value"],
            &[vec![value_to_cell(&scalar)]],
            options,
        )),
    }
}

fn render_array_table(items: &[Value], options: table::TableOptions) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_entity_table(&["value"], &rows, options);
    }

    // Union of keys in first-seen order; rows lacking a key show "-".
    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    if headers.is_empty() {
        return String::from("(no columns)");
    }

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| {
                    map.get(header)
                        .map_or_else(|| String::from("-"), value_to_cell)
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_entity_table(&header_refs, &rows, options)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        nested => nested.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::{render, table::render_entity_table};
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Row {
        rank: u32,
        label: &'static str,
    }

    #[derive(Serialize)]
    struct Board {
        sector: &'static str,
        entries: Vec<Row>,
    }

    fn board() -> Board {
        Board {
            sector: "IT",
            entries: vec![
                Row {
                    rank: 1,
                    label: "You",
                },
                Row {
                    rank: 2,
                    label: "Infosys",
                },
            ],
        }
    }

    #[test]
    fn json_output_keeps_nested_rows() {
        let out = render(&board(), OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["sector"], "IT");
        assert_eq!(parsed["entries"][1]["label"], "Infosys");
    }

    #[test]
    fn raw_output_is_one_line() {
        let out = render(&board(), OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_render_expands_nested_rows() {
        let out = render(&board(), OutputFormat::Table).expect("table render should work");
        assert!(out.lines().next().is_some_and(|line| line.contains("key")));
        assert!(out.contains("(2 rows)"));
        assert!(out.contains("Infosys"));
        assert!(out.lines().any(|line| line.contains("rank") && line.contains("label")));
    }

    #[test]
    fn divider_matches_header() {
        let headers = ["rank", "label", "intensity"];
        let rows = vec![
            vec!["1".to_string(), "You".to_string(), "0.5".to_string()],
            vec![
                "2".to_string(),
                "HCL Technologies".to_string(),
                "2.3".to_string(),
            ],
        ];

        let table = render_entity_table(
            &headers,
            &rows,
            super::table::TableOptions {
                max_width: None,
                color: false,
            },
        );
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("intensity"));
        assert!(lines[1].chars().all(|c| c == '-'));
    }
}
