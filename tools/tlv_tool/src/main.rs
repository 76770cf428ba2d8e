use clap::{Arg, ArgAction, Command};
use matter_tlv::tlv::{self, TLVReader};
use simple_logger::SimpleLogger;
use std::fmt::Write;
use std::process;

const MAX_INPUT_LEN: usize = 1024;

fn parse_bytes(input: &str, base: u32) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();
    for byte in input.split(|c: char| c == ',' || c.is_whitespace()) {
        if byte.is_empty() {
            continue;
        }
        let byte = byte.strip_prefix("0x").unwrap_or(byte);
        let b = u8::from_str_radix(byte, base)
            .map_err(|_| format!("Error parsing input byte: {}", byte))?;
        bytes.push(b);
        if bytes.len() > MAX_INPUT_LEN {
            return Err("Input too long".to_string());
        }
    }
    Ok(bytes)
}

/// Print the value of every top-level element, one per line
fn write_values(bytes: &[u8], out: &mut String) -> Result<(), String> {
    let mut tr = TLVReader::new(bytes);
    while !tr.is_end_of_tlv() {
        let value = tr
            .to_any()
            .map_err(|e| format!("Decoding failed at offset {}: {}", tr.offset(), e))?;
        // Writing to a String does not fail
        let _ = writeln!(out, "{}", value);
    }
    Ok(())
}

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Trace)
        .with_colors(true)
        .without_timestamps()
        .init()
        .unwrap();

    let m = Command::new("tlv_tool")
        .about("Decode and print Matter TLV data")
        .arg(
            Arg::new("hex")
                .short('x')
                .long("hex")
                .action(ArgAction::SetTrue)
                .help("The input is a list of hexadecimal bytes (Default)"),
        )
        .arg(
            Arg::new("dec")
                .short('d')
                .long("dec")
                .action(ArgAction::SetTrue)
                .conflicts_with("hex")
                .help("The input is a list of decimal bytes"),
        )
        .arg(
            Arg::new("hexstring")
                .short('s')
                .long("hexstring")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["hex", "dec"])
                .help("The input is a single hexadecimal string"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .action(ArgAction::SetTrue)
                .help("Log every element of the flat TLV list instead of the decoded values"),
        )
        .arg(Arg::new("tlvs").help("The TLV bytes").required(true))
        .get_matches();

    let input = m.get_one::<String>("tlvs").unwrap();
    let bytes = if m.get_flag("hexstring") {
        let input = input.strip_prefix("0x").unwrap_or(input);
        hex::decode(input).map_err(|e| format!("Error parsing hex string: {}", e))
    } else if m.get_flag("dec") {
        parse_bytes(input, 10)
    } else {
        parse_bytes(input, 16)
    };
    let bytes = match bytes {
        Ok(b) => b,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let mut out = String::new();
    let result = if m.get_flag("list") {
        tlv::write_tlv_list(&bytes, &mut out).map_err(|e| format!("Decoding failed: {}", e))
    } else {
        write_values(&bytes, &mut out)
    };
    print!("{}", out);
    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}
