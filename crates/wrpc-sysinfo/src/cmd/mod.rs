use clap::{Args, Subcommand, ValueEnum};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod interface;
pub mod invoke;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Invoke `request-info` on an in-process host system-info server.
    RequestInfo(RequestInfoArgs),
    /// Invoke `call` on an in-process host system-info server.
    Call(CallArgs),
    /// Encode a value to its wire form (hex).
    Encode(EncodeArgs),
    /// Decode a value from its wire form (hex).
    Decode(DecodeArgs),
    /// List the functions of the system-info interface.
    Interface(InterfaceArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::RequestInfo(args) => invoke::request_info(args, format),
        Command::Call(args) => invoke::call(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Interface(args) => interface::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Wire types understood by `encode` and `decode`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum WireType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    String,
    Kind,
}

impl WireType {
    pub fn name(self) -> &'static str {
        match self {
            WireType::Bool => "bool",
            WireType::U8 => "u8",
            WireType::U16 => "u16",
            WireType::U32 => "u32",
            WireType::U64 => "u64",
            WireType::String => "string",
            WireType::Kind => "kind",
        }
    }
}

#[derive(Args, Debug)]
pub struct RequestInfoArgs {
    /// What to ask for: OS or ARCH (case-insensitive).
    pub kind: String,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Reply the host handler returns.
    #[arg(long, default_value = "pong", env = "WRPC_SYSINFO_REPLY")]
    pub reply: String,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Type of the value.
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub ty: WireType,
    /// Value in text form.
    pub value: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Type of the value.
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub ty: WireType,
    /// Wire bytes, hex encoded.
    pub hex: String,
    /// Maximum accepted string length.
    #[arg(long, value_name = "BYTES")]
    pub max_string_len: Option<usize>,
    /// Reject trailing bytes after the value.
    #[arg(long)]
    pub exact: bool,
}

#[derive(Args, Debug, Default)]
pub struct InterfaceArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
