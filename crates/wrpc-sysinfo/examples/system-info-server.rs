//! Serve the system-info interface in-process and call it through the
//! typed client.
//!
//! Run with:
//!   cargo run --example system-info-server

use std::sync::Arc;

use wrpc_sysinfo::runtime::ServeConfig;
use wrpc_sysinfo::system_info::{self, HostInfo, Kind};
use wrpc_sysinfo::transport::{Context, MemoryServer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server = MemoryServer::new();
    let stop = system_info::serve_interface(
        &server,
        Arc::new(HostInfo::new()),
        ServeConfig::default(),
    )?;
    eprintln!("Serving {}", system_info::INSTANCE);

    let cx = Context::new();
    for &kind in <Kind as wrpc_sysinfo::codec::Enumeration>::VARIANTS {
        let info = system_info::request_info(&server, &cx, kind)?;
        println!("{kind}: {info}");
    }
    println!("call: {}", system_info::call(&server, &cx)?);

    stop.stop()?;
    Ok(())
}
