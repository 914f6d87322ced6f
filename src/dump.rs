//! Format records for display (dump text, one-line summaries). Uses field display hints for
//! stop times and operating days.

use crate::record::Record;
use crate::schema::{FieldDescriptor, FieldDisplay};
use crate::timetable::{format_time, OperatingDays};
use crate::value::Value;

/// Render a uint32 according to the field's display hint. Hinted values keep the raw
/// number in parentheses.
pub fn format_u32(field: &FieldDescriptor, v: u32) -> String {
    match field.display {
        FieldDisplay::Plain => format!("{}", v),
        FieldDisplay::TimeOfDay => format!("{} ({})", format_time(v), v),
        FieldDisplay::OperatingDays => format!("{} ({})", OperatingDays(v), v),
    }
}

fn format_scalar(field: &FieldDescriptor, v: &Value) -> String {
    match v {
        Value::UInt32(x) => format_u32(field, *x),
        Value::String(s) => format!("{:?}", s),
        Value::Messages(m) => format!("[{} items]", m.len()),
    }
}

/// Multi-line dump of a record tree. Empty message fields are skipped.
pub fn record_to_dump(record: &Record, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let mut lines: Vec<String> = vec![format!("{}{} {{", pad, record.schema().name())];
    for (field, value) in record.iter() {
        match value {
            Value::Messages(children) if children.is_empty() => {}
            Value::Messages(children) if !field.repeated => {
                let sub = record_to_dump(&children[0], indent + 1);
                lines.push(format!("{}  {}: {}", pad, field.name, sub.trim_start()));
            }
            Value::Messages(children) => {
                lines.push(format!("{}  {}: [", pad, field.name));
                for (i, child) in children.iter().enumerate() {
                    let sub = record_to_dump(child, indent + 2);
                    lines.push(format!("{}    [{}] {}", pad, i, sub.trim_start()));
                }
                lines.push(format!("{}  ]", pad));
            }
            _ => lines.push(format!("{}  {}: {}", pad, field.name, format_scalar(field, value))),
        }
    }
    lines.push(format!("{}}}", pad));
    lines.join("\n")
}

/// One line: schema name and the non-default scalar fields, e.g.
/// `types.Data.Route { id: "R1", days: 1111100 (31), stops: [2 items] }`.
pub fn record_summary_line(record: &Record) -> String {
    let parts: Vec<String> = record
        .iter()
        .filter(|(_, v)| !v.is_default())
        .map(|(f, v)| format!("{}: {}", f.name, format_scalar(f, v)))
        .collect();
    if parts.is_empty() {
        format!("{} {{}}", record.schema().name())
    } else {
        format!("{} {{ {} }}", record.schema().name(), parts.join(", "))
    }
}
