//! cstruct CLI — pack a JSON struct description into a hex dump.
//!
//! Das Eingabedokument buendelt Layout-Tabelle, Wertebaum und
//! Gesamtgroesse:
//!
//! ```json
//! {
//!   "size": 16,
//!   "layout": [ { "shape": [1], "start": 0, "size": 4, "padding_previous": 0 } ],
//!   "values": [ [1, 2, 3, 4] ]
//! }
//! ```

use clap::{Args, Parser, Subcommand};
use cstruct::{free, pack, parse_layout, parse_values, pointer_width};
use std::io::Read;
use std::process;

#[derive(Parser)]
#[command(name = "cstruct", about = "Layout-driven C struct packing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pack a JSON struct description and print buffer + handles
    Pack(PackArgs),
    /// Print the native pointer width in bytes
    PtrSize,
}

#[derive(Args)]
struct PackArgs {
    /// Input JSON document ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Keep the native blocks alive (print addresses only, do not free)
    #[arg(long)]
    keep: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Fehler: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Pack(args) => run_pack(args),
        Command::PtrSize => {
            println!("{}", pointer_width());
            Ok(())
        }
    }
}

fn run_pack(args: PackArgs) -> Result<(), String> {
    let input = read_input(&args.input)?;
    let doc: serde_json::Value =
        serde_json::from_slice(&input).map_err(|e| format!("JSON-Parse-Fehler: {e}"))?;

    let size = doc
        .get("size")
        .and_then(|s| s.as_u64())
        .ok_or("document needs a non-negative integer 'size'")?;
    let layout_desc = doc.get("layout").ok_or("document needs a 'layout' array")?;
    let values_desc = doc.get("values").ok_or("document needs a 'values' array")?;

    let layout = parse_layout(layout_desc).map_err(|e| e.to_string())?;
    let values = parse_values(values_desc).map_err(|e| e.to_string())?;

    let (buffer, handles) = pack(&values, &layout, size as usize).map_err(|e| e.to_string())?;

    print_hex(&buffer);
    for (i, h) in handles.iter().enumerate() {
        println!("block {i}: address={:#x} size={}", h.address, h.size);
    }

    if !args.keep {
        for h in handles {
            free(h.address).map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}

fn read_input(path: &str) -> Result<Vec<u8>, String> {
    if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| format!("Lesefehler stdin: {e}"))?;
        Ok(buf)
    } else {
        std::fs::read(path).map_err(|e| format!("Lesefehler '{path}': {e}"))
    }
}

/// 16 Bytes pro Zeile, Offset vorangestellt.
fn print_hex(buffer: &[u8]) {
    for (offset, chunk) in buffer.chunks(16).enumerate() {
        let bytes: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        println!("{:08x}  {}", offset * 16, bytes.join(" "));
    }
}
