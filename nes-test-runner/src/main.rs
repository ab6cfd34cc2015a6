//! Headless NES test ROM runner.
//!
//! Runs NES test ROMs and reports pass/fail status. Supports two
//! protocols:
//! 1. Modern blargg protocol: $6000 status, $6004+ text
//! 2. Screen-based: parse nametable 0 for result text (older tests)

use std::fs;
use std::path::Path;
use std::time::Instant;

use log::LevelFilter;
use machine_nes::{Console, FRAME_BYTES};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

/// Test result status codes ($6000 protocol).
mod status {
    pub const RUNNING: u8 = 0x80;
    pub const PASSED: u8 = 0x01;
}

/// Result of running a test ROM.
#[derive(Debug)]
struct TestResult {
    name: String,
    passed: bool,
    code: u8,
    message: String,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    let paths: Vec<&str> = args[1..]
        .iter()
        .filter(|a| !a.starts_with('-'))
        .map(String::as_str)
        .collect();

    TermLogger::init(
        if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        },
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("logger init");

    if paths.is_empty() {
        eprintln!("Usage: nes-test-runner [-v] <rom.nes> [rom2.nes ...]");
        eprintln!("       -v, --verbose  Show full screen output");
        std::process::exit(1);
    }

    let mut total_passed = 0;
    let mut total_failed = 0;

    for path in paths {
        match run_test(path, verbose) {
            Ok(result) => {
                if result.passed {
                    total_passed += 1;
                    println!(
                        "[PASS] {} - ${:02X} ({})",
                        result.name, result.code, result.message
                    );
                } else {
                    total_failed += 1;
                    println!(
                        "[FAIL] {} - ${:02X} ({})",
                        result.name, result.code, result.message
                    );
                }
            }
            Err(e) => {
                total_failed += 1;
                println!("[ERROR] {path} - {e}");
            }
        }
    }

    println!();
    println!("Summary: {total_passed} passed, {total_failed} failed");

    if total_failed > 0 {
        std::process::exit(1);
    }
}

fn run_test(path: &str, verbose: bool) -> Result<TestResult, String> {
    let path = Path::new(path);
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    let data = fs::read(path).map_err(|e| format!("Failed to read: {e}"))?;
    let mut console = Console::load(data.as_slice()).map_err(|e| e.to_string())?;

    let start = Instant::now();
    let max_frames = 600; // ~10 seconds at 60fps
    let mut frames = 0;
    let mut frame = vec![0u8; FRAME_BYTES];
    let mut last_screen_text = String::new();
    let mut stable_frames = 0;

    loop {
        console.step_frame((&mut frame[..]).try_into().expect("frame size"));
        frames += 1;

        // Modern protocol: status byte at $6000 (work RAM boards)
        let status = console.bus().peek(0x6000);
        if status != status::RUNNING && status != 0x00 {
            let message = read_test_message(&console);
            let passed = status == status::PASSED;

            if verbose {
                println!("\n--- {name} (modern protocol) ---");
                println!("Status: ${status:02X}");
                println!("Message: {message}");
                println!("Screen:\n{}", read_screen_text(&console));
            }

            return Ok(TestResult {
                name,
                passed,
                code: status,
                message,
            });
        }

        // Older tests: read screen text and look for a result code
        if frames >= 60 && frames % 30 == 0 {
            let screen_text = read_screen_text(&console);

            if let Some(code) = extract_result_code(&screen_text) {
                // Wait for the screen to stabilize before trusting it
                if screen_text == last_screen_text {
                    stable_frames += 30;
                    if stable_frames >= 60 {
                        let passed = code == 0x01;

                        if verbose {
                            println!("\n--- {name} (screen protocol) ---");
                            println!("Code: ${code:02X}");
                            println!("Screen:\n{screen_text}");
                        }

                        return Ok(TestResult {
                            name,
                            passed,
                            code,
                            message: screen_text.lines().next().unwrap_or("").to_string(),
                        });
                    }
                } else {
                    stable_frames = 0;
                    last_screen_text = screen_text;
                }
            }
        }

        if frames >= max_frames {
            let screen_text = read_screen_text(&console);
            let code = extract_result_code(&screen_text).unwrap_or(0);

            if verbose {
                println!("\n--- {name} (timeout) ---");
                println!("$6000: ${:02X}", console.bus().peek(0x6000));
                println!("Screen:\n{screen_text}");
            }

            let message = if screen_text.is_empty() {
                "No output detected".to_string()
            } else {
                format!("Screen: {}", screen_text.lines().next().unwrap_or(""))
            };

            return Ok(TestResult {
                name,
                passed: code == 0x01,
                code,
                message,
            });
        }

        if start.elapsed().as_secs() > 30 {
            return Err("Hard timeout after 30 seconds".to_string());
        }
    }
}

/// Read the NUL-terminated test message from $6004+.
fn read_test_message(console: &Console) -> String {
    let mut message = String::new();
    let mut addr = 0x6004u16;

    for _ in 0..256 {
        let byte = console.bus().peek(addr);
        if byte == 0 {
            break;
        }
        if (0x20..0x7F).contains(&byte) {
            message.push(byte as char);
        }
        addr = addr.wrapping_add(1);
    }

    if message.is_empty() {
        "No message".to_string()
    } else {
        message.trim().to_string()
    }
}

/// Read text from the screen by decoding nametable 0.
/// Blargg tests use a roughly ASCII-mapped font.
fn read_screen_text(console: &Console) -> String {
    let mut text = String::new();

    // 960 tiles = 30 rows x 32 cols; the first rows are usually blank
    for row in 2..28u16 {
        let mut line = String::new();
        for col in 0..32u16 {
            let tile = console.ppu().peek_nametable(row * 32 + col);
            line.push(tile_to_char(tile));
        }

        let trimmed = line.trim_end();
        if !trimmed.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(trimmed);
        }
    }

    text
}

/// Convert a tile index to an ASCII character (tile 0 = blank).
fn tile_to_char(tile: u8) -> char {
    if tile == 0 {
        ' '
    } else if (0x20..0x7F).contains(&tile) {
        tile as char
    } else {
        ' '
    }
}

/// Extract a result code from screen text (e.g., "$01" -> 0x01).
fn extract_result_code(text: &str) -> Option<u8> {
    let text_lower = text.to_lowercase();

    if text_lower.contains("passed") {
        return Some(0x01);
    }

    if text_lower.contains("failed") {
        // Try to extract the failure number
        for line in text.lines() {
            if let Some(pos) = line.find('#') {
                let rest = &line[pos + 1..];
                if let Some(num_str) = rest.split_whitespace().next() {
                    if let Ok(code) = num_str.parse::<u8>() {
                        return Some(code);
                    }
                }
            }
        }
        return Some(0xFF); // Generic failure
    }

    // Look for a pattern like "$01" or "$03"
    for line in text.lines() {
        if let Some(pos) = line.find('$') {
            let rest = &line[pos + 1..];
            if rest.len() >= 2 {
                if let Ok(code) = u8::from_str_radix(&rest[..2], 16) {
                    return Some(code);
                }
            }
        }
    }
    None
}
