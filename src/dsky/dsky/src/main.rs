extern crate clap;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use dsky_core::{Key, KeyEvent};
use dsky_peripherals::runtime::{DskyRuntime, EngineConfig, Inbound};
use dsky_peripherals::stream::PacketReader;
use dsky_protocol::agc::PACKET_LEN;
use dsky_protocol::ChannelWrite;

mod console;
mod patterns;

use patterns::{Pattern, PATTERN_NAMES};

// How long replay waits for the engine to answer a frame request
const REPLAY_FRAME_TIMEOUT_MS: u64 = 2000;

/// Configures command-line interface using clap
fn get_cli_config<'a>() -> clap::ArgMatches<'a> {
    let description = "DSKY channel protocol engine for AGC simulators";
    clap::App::new("DSKY Protocol Engine")
        .version("0.1")
        .about(description)
        .setting(clap::AppSettings::SubcommandRequiredElseHelp)
        .arg(
            clap::Arg::with_name("flash-ms")
                .long("flash-ms")
                .takes_value(true)
                .global(true)
                .help("Flash half period in milliseconds"),
        )
        .arg(
            clap::Arg::with_name("lamp-test-ms")
                .long("lamp-test-ms")
                .takes_value(true)
                .global(true)
                .help("Lamp test duration in milliseconds"),
        )
        .arg(
            clap::Arg::with_name("refresh-ms")
                .long("refresh-ms")
                .takes_value(true)
                .global(true)
                .help("Engine tick interval in milliseconds"),
        )
        .subcommand(
            clap::SubCommand::with_name("replay")
                .about("Decode a captured simulator packet stream and print the final display")
                .arg(clap::Arg::with_name("FILE").required(true).index(1)),
        )
        .subcommand(
            clap::SubCommand::with_name("simulate")
                .about("Drive the engine with a fixed display pattern until Ctrl-C")
                .arg(
                    clap::Arg::with_name("pattern")
                        .long("pattern")
                        .takes_value(true)
                        .possible_values(&PATTERN_NAMES)
                        .default_value("v16n36"),
                )
                .arg(
                    clap::Arg::with_name("flash")
                        .long("flash")
                        .help("Flash the VERB/NOUN fields"),
                )
                .arg(
                    clap::Arg::with_name("lamp-test")
                        .long("lamp-test")
                        .help("Start with a lamp test"),
                ),
        )
        .subcommand(
            clap::SubCommand::with_name("keys")
                .about("Encode a key sequence into channel writes and packets")
                .arg(
                    clap::Arg::with_name("SEQUENCE")
                        .required(true)
                        .index(1)
                        .help("Keys as characters, e.g. V16N36E (P is PRO, K is KEY REL)"),
                ),
        )
        .get_matches()
}

fn parse_ms(
    matches: &clap::ArgMatches,
    name: &str,
    default: Duration,
) -> Result<Duration, Box<dyn Error>> {
    // Global args given after the subcommand land on its matches
    let value = matches
        .subcommand()
        .1
        .and_then(|sub| sub.value_of(name))
        .or_else(|| matches.value_of(name));
    match value {
        Some(v) => {
            let ms: u64 = v.parse().map_err(|e| format!("--{}: {}", name, e))?;
            Ok(Duration::from_millis(ms))
        }
        None => Ok(default),
    }
}

fn engine_config(matches: &clap::ArgMatches) -> Result<EngineConfig, Box<dyn Error>> {
    let defaults = EngineConfig::default();
    Ok(EngineConfig {
        flash_half_period: parse_ms(matches, "flash-ms", defaults.flash_half_period)?,
        lamp_test: parse_ms(matches, "lamp-test-ms", defaults.lamp_test)?,
        refresh: parse_ms(matches, "refresh-ms", defaults.refresh)?,
        queue_depth: defaults.queue_depth,
    })
}

fn replay(config: EngineConfig, path: &str) -> Result<(), Box<dyn Error>> {
    let file = File::open(path).map_err(|e| format!("{}: {}", path, e))?;
    let mut reader = PacketReader::new(BufReader::new(file));
    let runtime = DskyRuntime::spawn(config);

    let mut applied = 0usize;
    let mut masks = 0usize;
    while let Some(packet) = reader.next_packet()? {
        if packet.is_mask() {
            // Output channels are written whole; masks only matter for inputs
            masks += 1;
            continue;
        }
        runtime.inbound.send(Inbound::Word {
            channel: packet.channel(),
            value: packet.value(),
        })?;
        applied += 1;
    }
    info!(
        "Replayed {} words ({} mask packets, {} bytes skipped)",
        applied,
        masks,
        reader.skipped()
    );

    let frame = runtime
        .current_frame(Duration::from_millis(REPLAY_FRAME_TIMEOUT_MS))
        .ok_or("engine did not answer the frame request")?;
    print!("{}", console::render_panel(&frame));

    runtime.shutdown().map_err(|_| "engine thread panicked")?;
    Ok(())
}

fn simulate(
    config: EngineConfig,
    matches: &clap::ArgMatches,
    signal: Receiver<()>,
) -> Result<(), Box<dyn Error>> {
    let name = matches.value_of("pattern").unwrap_or("v16n36");
    let pattern = Pattern::by_name(name).ok_or_else(|| format!("Unknown pattern {}", name))?;
    let refresh = config.refresh;
    let runtime = DskyRuntime::spawn(config);

    for (channel, value) in pattern.channel_words() {
        runtime.inbound.send(Inbound::Word { channel, value })?;
    }
    if matches.is_present("flash") {
        runtime.inbound.send(Inbound::Word {
            channel: 0o163,
            value: dsky_core::constants::flash::VERB_NOUN,
        })?;
    }
    if matches.is_present("lamp-test") {
        runtime.inbound.send(Inbound::LampTest)?;
    }

    loop {
        if !signal.is_empty() {
            break;
        }
        match runtime.snapshots.recv_timeout(refresh) {
            Ok(frame) => {
                // Clear screen and home the cursor
                print!("\x1B[2J\x1B[H{}", console::render_panel(&frame));
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Engine stopped unexpectedly");
                break;
            }
        }
    }

    runtime.shutdown().map_err(|_| "engine thread panicked")?;
    Ok(())
}

fn packet_hex(bytes: &[u8; PACKET_LEN]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_write(event: &KeyEvent, write: &ChannelWrite) {
    let (channel, value, mask) = write.as_tuple();
    let packets: Vec<String> = write.packets().iter().map(packet_hex).collect();
    println!(
        "{:>8} {:<7} ({:o}, {:05o}, {:05o})  {}",
        event.key.label(),
        format!("{:?}", event.transition).to_lowercase(),
        channel,
        value,
        mask,
        packets.join(" | ")
    );
}

fn keys(sequence: &str) -> Result<(), Box<dyn Error>> {
    for c in sequence.chars().filter(|c| !c.is_whitespace()) {
        let key = match Key::from_char(c) {
            Ok(key) => key,
            Err(e) => {
                warn!("Skipping '{}': {}", c, e);
                continue;
            }
        };
        for event in [KeyEvent::pressed(key), KeyEvent::released(key)].iter() {
            for write in dsky_core::encode(event).iter() {
                print_write(event, write);
            }
        }
    }
    Ok(())
}

fn run(matches: clap::ArgMatches, signal: Receiver<()>) -> Result<(), Box<dyn Error>> {
    let config = engine_config(&matches)?;
    debug!("Engine config: {:?}", config);

    match matches.subcommand() {
        ("replay", Some(sub)) => replay(config, sub.value_of("FILE").unwrap_or_default()),
        ("simulate", Some(sub)) => simulate(config, sub, signal),
        ("keys", Some(sub)) => keys(sub.value_of("SEQUENCE").unwrap_or_default()),
        _ => Err("No subcommand given".into()),
    }
}

/// Main entry point for the DSKY engine
fn main() {
    env_logger::init();

    // Set up Ctrl-C handler with channel communication
    let (signal_sender, signal_receiver) = bounded(1);
    let handler_result = ctrlc::set_handler(move || {
        if signal_sender.is_full() {
            std::process::exit(-1); // Emergency exit if channel blocked
        }
        let _send_result = signal_sender.send(());
    });

    if let Err(e) = handler_result {
        error!("Signal handler failed: {:?}", e);
        return;
    }

    // Parse command-line arguments
    let cli_matches = get_cli_config();

    if let Err(e) = run(cli_matches, signal_receiver) {
        error!("{}", e);
        std::process::exit(1);
    }
}
