use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use moteus_protocol::{CanFrame, QueryResult};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    command: &'a str,
    size: usize,
    hex: String,
}

pub fn print_frame(command: &str, frame: &CanFrame, format: OutputFormat) {
    let bytes = frame.as_bytes();
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                command,
                size: bytes.len(),
                hex: to_hex(bytes, ""),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    command.to_string(),
                    bytes.len().to_string(),
                    to_hex(bytes, " "),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("command={command} size={} payload={}", bytes.len(), to_hex(bytes, " "));
        }
        OutputFormat::Raw => print_raw(bytes),
    }
}

/// Reply fields as emitted; unreported values serialize as `null`.
#[derive(Serialize)]
struct QueryOutput {
    mode: &'static str,
    mode_value: u8,
    position: Option<f64>,
    velocity: Option<f64>,
    torque: Option<f64>,
    q_current: Option<f64>,
    d_current: Option<f64>,
    rezero_state: bool,
    voltage: Option<f64>,
    temperature: Option<f64>,
    fault: i32,
}

impl From<&QueryResult> for QueryOutput {
    fn from(result: &QueryResult) -> Self {
        Self {
            mode: result.mode.name(),
            mode_value: result.mode as u8,
            position: finite(result.position),
            velocity: finite(result.velocity),
            torque: finite(result.torque),
            q_current: finite(result.q_current),
            d_current: finite(result.d_current),
            rezero_state: result.rezero_state,
            voltage: finite(result.voltage),
            temperature: finite(result.temperature),
            fault: result.fault,
        }
    }
}

pub fn print_query_result(result: &QueryResult, format: OutputFormat) {
    let out = QueryOutput::from(result);
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (name, value) in rows(&out) {
                table.add_row(vec![name.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            let line: Vec<String> = rows(&out)
                .into_iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            println!("{}", line.join(" "));
        }
    }
}

fn rows(out: &QueryOutput) -> Vec<(&'static str, String)> {
    vec![
        ("mode", format!("{} ({})", out.mode, out.mode_value)),
        ("position", show(out.position)),
        ("velocity", show(out.velocity)),
        ("torque", show(out.torque)),
        ("q_current", show(out.q_current)),
        ("d_current", show(out.d_current)),
        ("rezero_state", out.rezero_state.to_string()),
        ("voltage", show(out.voltage)),
        ("temperature", show(out.temperature)),
        ("fault", out.fault.to_string()),
    ]
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn show(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn to_hex(bytes: &[u8], separator: &str) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(separator)
}
