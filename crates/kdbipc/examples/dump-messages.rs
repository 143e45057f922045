//! Decode every message in a captured byte stream and print the values.
//!
//! Run with:
//!   cargo run --example dump-messages -- capture.bin
//!
//! Reads stdin when no path is given. Pass `-v` for decoder debug logs.

use std::fs::File;
use std::io::{self, BufReader, Read};

use kdbipc::frame::FrameError;
use kdbipc::{decode_with_options, DecodeError, DecodeOptions};
use tracing::level_filters::LevelFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut verbose = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            _ => path = Some(arg),
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN })
        .with_ansi(false)
        .with_target(false)
        .try_init();

    let input: Box<dyn Read> = match &path {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    };
    let mut input = BufReader::new(input);
    let options = DecodeOptions::default();

    let mut count = 0usize;
    loop {
        match decode_with_options(&mut input, &options) {
            Ok((header, value)) => {
                count += 1;
                println!("#{count} {:?} {value:#?}", header.kind);
            }
            Err(DecodeError::Frame(FrameError::ConnectionClosed)) => break,
            Err(err) if err.is_protocol() => {
                count += 1;
                println!("#{count} error '{err}");
            }
            Err(err) => {
                tracing::error!(index = count + 1, %err, "stopping at malformed message");
                return Err(err.into());
            }
        }
    }

    eprintln!("{count} message(s)");
    Ok(())
}
