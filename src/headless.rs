//! Headless terminal runner
//!
//! Drives the terminal without a GUI: either feeds a byte stream (stdin or a
//! file) straight through the parser, or spawns a real child process on a
//! PTY and captures the screen once it exits. Output is a JSON frame or
//! plain text, for snapshot testing and debugging.
//!
//! # Usage
//!
//! ```bash
//! # Parse escape sequences from stdin and print the frame as JSON
//! printf 'Hello \x1b[31mRed\x1b[0m' | bte-headless
//!
//! # Run a command on a PTY and capture its final screen as text
//! bte-headless --run /bin/echo hi --text
//!
//! # Process a recorded byte stream with a custom geometry
//! bte-headless -i session.bin -c 120 -r 40 -o frame.json
//! ```

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use bte::{CodepointGlyphs, Frame, ScreenConfig, Session, SessionConfig, Terminal};

struct Args {
    /// Input file (stdin if not specified).
    input: Option<PathBuf>,
    /// Output file (stdout if not specified).
    output: Option<PathBuf>,
    /// Command to run on a PTY instead of parsing a byte stream.
    run: Vec<String>,
    /// Output as plain text instead of JSON.
    text: bool,
    cols: usize,
    rows: usize,
    help: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            run: Vec::new(),
            text: false,
            cols: 80,
            rows: 24,
            help: false,
        }
    }
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "-h" | "--help" => {
                args.help = true;
            }
            "-i" | "--input" => {
                i += 1;
                if i < argv.len() {
                    args.input = Some(PathBuf::from(&argv[i]));
                }
            }
            "-o" | "--output" => {
                i += 1;
                if i < argv.len() {
                    args.output = Some(PathBuf::from(&argv[i]));
                }
            }
            "-t" | "--text" => {
                args.text = true;
            }
            "-c" | "--cols" => {
                i += 1;
                if i < argv.len() {
                    args.cols = argv[i].parse().unwrap_or(80);
                }
            }
            "-r" | "--rows" => {
                i += 1;
                if i < argv.len() {
                    args.rows = argv[i].parse().unwrap_or(24);
                }
            }
            "--run" => {
                // Everything after --run (up to the next flag) is the command
                while i + 1 < argv.len() && !argv[i + 1].starts_with('-') {
                    i += 1;
                    args.run.push(argv[i].clone());
                }
            }
            _ => {}
        }
        i += 1;
    }

    args
}

fn print_help() {
    eprintln!(
        r#"bte-headless - headless terminal for snapshot testing

USAGE:
    bte-headless [OPTIONS]

OPTIONS:
    -h, --help            Show this help message
    -i, --input <FILE>    Byte stream to parse (stdin if not specified)
    -o, --output <FILE>   Where to write the frame (stdout if not specified)
    -t, --text            Output plain text instead of JSON
    -c, --cols <N>        Terminal columns (default: 80)
    -r, --rows <N>        Terminal rows (default: 24)
    --run <CMD> [ARGS]    Run a command on a PTY and capture its final screen

EXAMPLES:
    printf 'Hello \x1b[31mRed\x1b[0m' | bte-headless -t
    bte-headless --run /bin/ls -t
    bte-headless -i recorded.bin -c 120 -r 40 -o frame.json
"#
    );
}

fn capture_stream(args: &Args) -> io::Result<Frame> {
    let input = if let Some(path) = &args.input {
        std::fs::read(path)?
    } else {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        data
    };

    let mut terminal = Terminal::new(
        args.cols,
        args.rows,
        ScreenConfig::default(),
        Arc::new(CodepointGlyphs),
    );
    terminal.process_bytes(&input);
    Ok(terminal.frame())
}

fn capture_command(args: &Args) -> io::Result<Frame> {
    let config = SessionConfig {
        command: args.run[0].clone(),
        args: args.run[1..].to_vec(),
        cols: args.cols,
        rows: args.rows,
        screen: ScreenConfig::default(),
    };
    let mut session = Session::spawn(config, Arc::new(CodepointGlyphs))
        .map_err(|e| io::Error::other(e.to_string()))?;
    session.wait().map_err(|e| io::Error::other(e.to_string()))?;
    Ok(session.frame())
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = parse_args();
    if args.help {
        print_help();
        return Ok(());
    }

    let frame = if args.run.is_empty() {
        capture_stream(&args)?
    } else {
        capture_command(&args)?
    };

    let output = if args.text {
        frame.to_text()
    } else {
        frame.to_json().map_err(io::Error::other)?
    };

    if let Some(path) = &args.output {
        let mut file = File::create(path)?;
        file.write_all(output.as_bytes())?;
    } else {
        io::stdout().write_all(output.as_bytes())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_stream(bytes: &[u8]) -> Frame {
        let mut terminal = Terminal::new(
            80,
            24,
            ScreenConfig::default(),
            Arc::new(CodepointGlyphs),
        );
        terminal.process_bytes(bytes);
        terminal.frame()
    }

    #[test]
    fn test_stream_to_text() {
        let frame = run_stream(b"Hello, World!");
        assert!(frame.to_text().starts_with("Hello, World!"));
    }

    #[test]
    fn test_stream_colors_survive_json() {
        let frame = run_stream(b"\x1b[31mRed\x1b[0m Normal");
        let text = frame.to_text();
        assert!(text.contains("Red"));
        assert!(text.contains("Normal"));
        let restored = Frame::from_json(&frame.to_json().unwrap()).unwrap();
        assert_eq!(restored, frame);
    }

    #[test]
    fn test_stream_cursor_position() {
        let frame = run_stream(b"\x1b[3;5HX");
        assert_eq!(frame.cursor.row, 2);
        assert_eq!(frame.cursor.col, 5);
    }
}
