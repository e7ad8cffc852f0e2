//! Build script for marquee-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates marquee.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Named colors accepted for `[line.<n>] color`
const COLOR_NAMES: &[&str] = &[
    "RED", "RED1", "RED2", "RED3", "ORANGE", "ORANGE1", "ORANGE2", "ORANGE3", "YELLOW", "GREEN",
    "GREEN1", "GREEN2", "GREEN3", "BLUE", "BLUE1", "BLUE2", "BLUE3", "PURPLE", "PURPLE1",
    "PURPLE2", "PURPLE3", "WHITE",
];

const LINE_COUNT: usize = 5;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate marquee.toml at compile time
///
/// The firmware parses the same file again at boot with its own
/// allocation-free reader; catching mistakes here keeps a typo from
/// silently falling back to defaults on the device.
fn validate_config() {
    println!("cargo:rerun-if-changed=marquee.toml");

    let config_path = Path::new("marquee.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: marquee.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds marquee.toml as its startup configuration.  ║\n\
            ║  Please create one in the marquee-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read marquee.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in marquee.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_network(&config, &mut errors);
    validate_feed(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_lines(&config, &mut errors);
    report("Invalid configuration in marquee.toml", &errors);

    println!("cargo:warning=marquee.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Only known sections may appear at the top level
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };
    for name in table.keys() {
        if !["network", "broker", "feed", "display", "line"].contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        }
    }
}

fn validate_network(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(toml::Value::String(ssid)) = config.get("network").and_then(|n| n.get("ssid")) {
        if ssid.len() > 32 {
            errors.push("[network] ssid must be at most 32 bytes".to_string());
        }
    }
    if let Some(port) = config.get("broker").and_then(|b| b.get("port")) {
        match port.as_integer() {
            Some(p) if (1..=65535).contains(&p) => {}
            _ => errors.push("[broker] port must be 1-65535".to_string()),
        }
    }
}

fn validate_feed(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(feed) = config.get("feed") else {
        return;
    };
    if let Some(toml::Value::String(topic)) = feed.get("topic") {
        if topic.is_empty() {
            errors.push("[feed] topic cannot be empty".to_string());
        }
    }
    let initial = feed.get("retry_initial_ms").and_then(|v| v.as_integer());
    let max = feed.get("retry_max_ms").and_then(|v| v.as_integer());
    if let (Some(initial), Some(max)) = (initial, max) {
        if initial <= 0 || initial > max {
            errors.push("[feed] retry_initial_ms must be 1..=retry_max_ms".to_string());
        }
    }
    if let Some(timeout) = feed.get("poll_timeout_ms").and_then(|v| v.as_integer()) {
        if timeout <= 0 {
            errors.push("[feed] poll_timeout_ms must be positive".to_string());
        }
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(display) = config.get("display") else {
        return;
    };
    if let Some(depth) = display.get("bit_depth").and_then(|v| v.as_integer()) {
        if !(1..=5).contains(&depth) {
            errors.push("[display] bit_depth must be 1-5".to_string());
        }
    }
    let target = display.get("target_fps").and_then(|v| v.as_integer()).unwrap_or(60);
    let min = display.get("min_fps").and_then(|v| v.as_integer()).unwrap_or(30);
    if target <= 0 || min <= 0 || min > target {
        errors.push("[display] need 0 < min_fps <= target_fps".to_string());
    }
}

fn validate_lines(config: &toml::Value, errors: &mut Vec<String>) {
    let lines = match config.get("line") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[line] must hold [line.<n>] tables".to_string());
            return;
        }
        None => return,
    };

    for (name, line) in lines {
        match name.parse::<usize>() {
            Ok(index) if index < LINE_COUNT => {}
            _ => errors.push(format!("[line.{}] index must be 0-{}", name, LINE_COUNT - 1)),
        }

        if let Some(toml::Value::String(color)) = line.get("color") {
            if !COLOR_NAMES.contains(&color.as_str()) {
                errors.push(format!("[line.{}] unknown color '{}'", name, color));
            }
        }
    }
}
