use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
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

/// Result of one invocation, as printed by `request-info` and `call`.
#[derive(Serialize)]
pub struct InvocationOutput<'a> {
    pub function: String,
    pub params: &'a str,
    pub value: &'a str,
    /// Encoded result body, hex.
    pub wire: String,
}

pub fn print_invocation(out: &InvocationOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FUNCTION", "PARAMS", "VALUE", "WIRE"])
                .add_row(vec![
                    out.function.clone(),
                    out.params.to_string(),
                    out.value.to_string(),
                    out.wire.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "function={} params={} value={} wire={}",
                out.function, out.params, out.value, out.wire
            );
        }
        OutputFormat::Raw => {
            println!("{}", out.value);
        }
    }
}

/// A value converted between text and its wire form.
#[derive(Serialize)]
pub struct ValueOutput<'a> {
    #[serde(rename = "type")]
    pub ty: &'a str,
    pub value: String,
    pub wire: String,
    pub wire_len: usize,
}

pub fn print_value(out: &ValueOutput<'_>, format: OutputFormat, wire: &[u8]) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "VALUE", "WIRE", "BYTES"])
                .add_row(vec![
                    out.ty.to_string(),
                    out.value.clone(),
                    out.wire.clone(),
                    out.wire_len.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "type={} value={} wire={} bytes={}",
                out.ty, out.value, out.wire, out.wire_len
            );
        }
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_json<T: Serialize>(out: &T) {
    println!(
        "{}",
        serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}
