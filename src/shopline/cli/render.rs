use chrono::{DateTime, Utc};
use colored::Colorize;
use serde_json::{Map, Value};
use shopline::error::Result;
use shopline::ids::format_id;
use shopline::invocation::{OutputFormat, OutputSettings};
use shopline::query;
use shopline::store::Credentials;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;

/// Keys that hold the record list of a list response, in preference order.
const ITEM_KEYS: &[&str] = &["items", "data", "results"];

/// Fields shown after the ID on a text line, when present.
const SUMMARY_FIELDS: &[&str] = &[
    "name",
    "title",
    "email",
    "status",
    "total_price",
    "created_at",
];

/// Renders an API response according to the settled output settings.
pub(super) fn render(value: &Value, output: &OutputSettings, prefix: &str) -> Result<String> {
    match output.format {
        OutputFormat::Json => render_json(value, output),
        OutputFormat::Text => Ok(render_text(value, prefix)),
    }
}

fn items_key(map: &Map<String, Value>) -> Option<&'static str> {
    ITEM_KEYS
        .iter()
        .copied()
        .find(|key| map.get(*key).is_some_and(Value::is_array))
}

fn items_of(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => items_key(map).and_then(|key| map[key].as_array()),
        _ => None,
    }
}

pub(super) fn render_json(value: &Value, output: &OutputSettings) -> Result<String> {
    let mut value = value.clone();
    if output.items_only {
        if let Some(items) = items_of(&value) {
            value = Value::Array(items.clone());
        }
    }

    if let Some(query) = &output.query {
        let results = query::run(query, &value)?;
        let lines = results
            .iter()
            .map(serde_json::to_string_pretty)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        return Ok(lines.join("\n"));
    }

    if !output.fields.is_empty() {
        value = project(&value, &output.fields);
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
}

fn insert_path(out: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            out.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = out
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(inner) = slot {
                insert_path(inner, rest, value);
            }
        }
    }
}

fn project_record(record: &Value, fields: &[String]) -> Value {
    let mut out = Map::new();
    for field in fields {
        if let Some(value) = lookup(record, field) {
            insert_path(&mut out, field, value.clone());
        }
    }
    Value::Object(out)
}

/// Keeps only `fields` (dotted paths allowed) of each record.
fn project(value: &Value, fields: &[String]) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(|i| project_record(i, fields)).collect()),
        Value::Object(map) => match items_key(map) {
            Some(key) => {
                let mut out = map.clone();
                out.insert(key.to_string(), project(&map[key], fields));
                Value::Object(out)
            }
            None => project_record(value, fields),
        },
        other => other.clone(),
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn item_line(item: &Value, prefix: &str) -> String {
    let id = item.get("id").and_then(scalar);
    let summary: Vec<String> = SUMMARY_FIELDS
        .iter()
        .filter_map(|f| item.get(*f).and_then(scalar))
        .filter(|s| !s.is_empty())
        .collect();
    let summary = truncate_to_width(&summary.join("  "), LINE_WIDTH);
    match id {
        Some(id) => format!("{} {}", format_id(prefix, &id).yellow(), summary),
        None => summary,
    }
}

fn record_lines(map: &Map<String, Value>, prefix: &str) -> Vec<String> {
    let key_width = map.keys().map(|k| k.width()).max().unwrap_or(0);
    map.iter()
        .map(|(key, value)| {
            let shown = match (key.as_str(), scalar(value)) {
                ("id", Some(id)) => format_id(prefix, &id).yellow().to_string(),
                (_, Some(s)) => s,
                (_, None) => truncate_to_width(&value.to_string(), LINE_WIDTH.saturating_sub(key_width)),
            };
            let padding = key_width.saturating_sub(key.width());
            format!("{}:{} {}", key.bold(), " ".repeat(padding), shown)
        })
        .collect()
}

pub(super) fn render_text(value: &Value, prefix: &str) -> String {
    if let Some(items) = items_of(value) {
        if items.is_empty() {
            return "No results.".dimmed().to_string();
        }
        return items
            .iter()
            .map(|item| item_line(item, prefix))
            .collect::<Vec<_>>()
            .join("\n");
    }
    match value {
        Value::Null => "Done.".green().to_string(),
        Value::Object(map) => record_lines(map, prefix).join("\n"),
        other => scalar(other).unwrap_or_else(|| other.to_string()),
    }
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

/// One line per stored profile for `spl auth list`.
pub(super) fn render_profiles(profiles: &[Credentials]) -> String {
    if profiles.is_empty() {
        return "No profiles stored.".dimmed().to_string();
    }
    let name_width = profiles.iter().map(|p| p.name.width()).max().unwrap_or(0);
    profiles
        .iter()
        .map(|p| {
            let padding = name_width.saturating_sub(p.name.width());
            let region = p
                .region
                .as_deref()
                .map(|r| format!(" ({})", r))
                .unwrap_or_default();
            let stale = if p.is_old() {
                format!("  {}", "token older than 90 days".yellow())
            } else {
                String::new()
            };
            format!(
                "{}{}  {}{}  {}{}",
                p.name.bold(),
                " ".repeat(padding),
                p.handle,
                region,
                format_time_ago(p.created_at).dimmed(),
                stale
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_output() -> OutputSettings {
        OutputSettings {
            format: OutputFormat::Json,
            ..OutputSettings::default()
        }
    }

    fn sample() -> Value {
        json!({
            "items": [
                {"id": "ord_1", "status": "open", "customer": {"email": "a@x.io", "name": "A"}},
                {"id": "ord_2", "status": "closed", "customer": {"email": "b@x.io", "name": "B"}}
            ],
            "total": 2
        })
    }

    #[test]
    fn test_items_only() {
        let output = OutputSettings {
            items_only: true,
            ..json_output()
        };
        let rendered: Value = serde_json::from_str(&render_json(&sample(), &output).unwrap()).unwrap();
        assert_eq!(rendered.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_fields_projection() {
        let output = OutputSettings {
            fields: vec!["id".into(), "customer.email".into()],
            ..json_output()
        };
        let rendered: Value = serde_json::from_str(&render_json(&sample(), &output).unwrap()).unwrap();
        assert_eq!(
            rendered["items"][0],
            json!({"id": "ord_1", "customer": {"email": "a@x.io"}})
        );
        assert_eq!(rendered["total"], 2);
    }

    #[test]
    fn test_query_output_lines() {
        let output = OutputSettings {
            query: Some(".items[].status".into()),
            ..json_output()
        };
        assert_eq!(render_json(&sample(), &output).unwrap(), "\"open\"\n\"closed\"");
    }

    #[test]
    fn test_query_filters_after_items_only() {
        let output = OutputSettings {
            items_only: true,
            query: Some(r#".[] | select(.status == "open") | .customer.email"#.into()),
            ..json_output()
        };
        assert_eq!(render_json(&sample(), &output).unwrap(), "\"a@x.io\"");

        let output = OutputSettings {
            query: Some(".items | length".into()),
            ..json_output()
        };
        assert_eq!(render_json(&sample(), &output).unwrap(), "2");
    }

    #[test]
    fn test_bad_query_is_an_error() {
        let output = OutputSettings {
            query: Some(".items[".into()),
            ..json_output()
        };
        assert!(render_json(&sample(), &output).is_err());
    }

    #[test]
    fn test_text_list_uses_formatted_ids() {
        colored::control::set_override(false);
        let text = render_text(&sample(), "order");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["[order:$ord_1] open", "[order:$ord_2] closed"]);
    }

    #[test]
    fn test_text_record_and_empty() {
        colored::control::set_override(false);
        let text = render_text(&json!({"id": "p_1", "title": "Hat"}), "product");
        assert_eq!(text, "id:    [product:$p_1]\ntitle: Hat");
        assert_eq!(render_text(&json!({"items": []}), "order"), "No results.");
        assert_eq!(render_text(&Value::Null, "order"), "Done.");
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("abcdef", 4), "abc…");
        assert_eq!(truncate_to_width("abc", 10), "abc");
    }
}
