use std::sync::Arc;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use wrpc_runtime::ServeConfig;
use wrpc_system_info::{serve_interface, HostInfo, CALL, INSTANCE, REQUEST_INFO};
use wrpc_transport::MemoryServer;

use crate::cmd::InterfaceArgs;
use crate::exit::{serve_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct FunctionInfo {
    name: String,
    params: &'static str,
    results: &'static str,
}

#[derive(Serialize)]
struct InterfaceOutput {
    instance: &'static str,
    functions: Vec<FunctionInfo>,
}

fn signature(name: &str) -> (&'static str, &'static str) {
    match name {
        REQUEST_INFO => ("kind: kind", "string"),
        CALL => ("", "string"),
        _ => ("?", "?"),
    }
}

pub fn run(_args: InterfaceArgs, format: OutputFormat) -> CliResult<i32> {
    let server = MemoryServer::new();
    let stop = serve_interface(&server, Arc::new(HostInfo::new()), ServeConfig::default())
        .map_err(|err| serve_error("serve failed", err))?;
    let functions = server
        .served()
        .into_iter()
        .filter(|(instance, _)| instance == INSTANCE)
        .map(|(_, name)| {
            let (params, results) = signature(&name);
            FunctionInfo {
                name,
                params,
                results,
            }
        })
        .collect();
    stop.stop()
        .map_err(|err| transport_error("stop failed", err))?;

    let out = InterfaceOutput {
        instance: INSTANCE,
        functions,
    };
    print_interface(&out, format);
    Ok(SUCCESS)
}

fn print_interface(out: &InterfaceOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INSTANCE", "FUNCTION", "PARAMS", "RESULTS"]);
            for f in &out.functions {
                table.add_row(vec![
                    out.instance.to_string(),
                    f.name.clone(),
                    f.params.to_string(),
                    f.results.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("interface {}:", out.instance);
            for f in &out.functions {
                println!("  {}: func({}) -> {}", f.name, f.params, f.results);
            }
        }
        OutputFormat::Raw => {
            for f in &out.functions {
                println!("{}.{}", out.instance, f.name);
            }
        }
    }
}
