//! Space Invaders cabinet runner.
//!
//! Runs the cabinet headless for a number of frames, paced to real time
//! unless `--fast` is given. There is no window; the run ends with a
//! summary of CPU and cabinet state. Set `RUST_LOG=debug` (or `trace` for
//! an instruction trace) for more detail.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use emu_core::{Cpu, Observable};
use emu_invaders::{
    FrameOutcome, InterruptCadence, Invaders, InvadersConfig, InvadersError,
};
use intel_8080::{disassemble, UndefinedPolicy};

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    rom_path: Option<PathBuf>,
    load_address: u16,
    frames: u64,
    fast: bool,
    policy: UndefinedPolicy,
    cadence: InterruptCadence,
    dip_switches: u8,
}

fn parse_number(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix('$')) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        rom_path: None,
        load_address: 0x0000,
        frames: 600,
        fast: false,
        policy: UndefinedPolicy::Fault,
        cadence: InterruptCadence::HalfAndFullFrame,
        dip_switches: 0x00,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            "--load-address" => {
                i += 1;
                match args.get(i).and_then(|s| parse_number(s)).map(u16::try_from) {
                    Some(Ok(addr)) => cli.load_address = addr,
                    _ => usage_error("--load-address needs an address below 0x10000"),
                }
            }
            "--frames" => {
                i += 1;
                match args.get(i).and_then(|s| parse_number(s)) {
                    Some(n) => cli.frames = n,
                    None => usage_error("--frames needs a number"),
                }
            }
            "--fast" => {
                cli.fast = true;
            }
            "--policy" => {
                i += 1;
                cli.policy = match args.get(i).map(String::as_str) {
                    Some("fault") => UndefinedPolicy::Fault,
                    Some("nop") => UndefinedPolicy::Nop,
                    _ => usage_error("--policy is fault or nop"),
                };
            }
            "--cadence" => {
                i += 1;
                cli.cadence = match args.get(i).map(String::as_str) {
                    Some("half") => InterruptCadence::HalfAndFullFrame,
                    Some("full") => InterruptCadence::FullFrameOnly,
                    _ => usage_error("--cadence is half or full"),
                };
            }
            "--dip" => {
                i += 1;
                match args.get(i).and_then(|s| parse_number(s)).map(u8::try_from) {
                    Some(Ok(bits)) => cli.dip_switches = bits,
                    _ => usage_error("--dip needs a byte"),
                }
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => usage_error(&format!("unknown argument: {other}")),
        }
        i += 1;
    }

    cli
}

fn print_usage() {
    eprintln!("Usage: emu-invaders --rom <file> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --rom <file>           Program image (e.g. invaders.h/g/f/e concatenated)");
    eprintln!("  --load-address <addr>  Where to load the image [default: 0x0000]");
    eprintln!("  --frames <n>           Frames to run [default: 600]");
    eprintln!("  --fast                 Run unpaced, as fast as the host allows");
    eprintln!("  --policy <fault|nop>   Undefined opcode handling [default: fault]");
    eprintln!("  --cadence <half|full>  RST 1 + RST 2, or RST 2 only [default: half]");
    eprintln!("  --dip <byte>           DIP switch bank on port 2 [default: 0]");
}

fn usage_error(message: &str) -> ! {
    eprintln!("{message}");
    print_usage();
    process::exit(2);
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn make_invaders(cli: &CliArgs) -> Invaders {
    let Some(ref path) = cli.rom_path else {
        usage_error("--rom is required");
    };

    let config = InvadersConfig {
        load_address: cli.load_address,
        cadence: cli.cadence,
        undefined_policy: cli.policy,
        dip_switches: cli.dip_switches,
        ..InvadersConfig::default()
    };

    match Invaders::from_rom_file(path, config) {
        Ok(invaders) => invaders,
        Err(e) => {
            eprintln!("Failed to load ROM: {e}");
            process::exit(1);
        }
    }
}

/// Run until `frames` frames have completed. Returns the outcome of the
/// last slice.
fn run(invaders: &mut Invaders, cli: &CliArgs) -> Result<FrameOutcome, InvadersError> {
    if cli.fast {
        while invaders.frame_count() < cli.frames {
            let outcome = invaders.run_frame()?;
            if outcome != FrameOutcome::Completed {
                return Ok(outcome);
            }
        }
        return Ok(FrameOutcome::Completed);
    }

    let mut pacer = invaders.pacer();
    while invaders.frame_count() < cli.frames {
        pacer.wait();
        let budget = pacer.budget(Instant::now());
        let outcome = invaders.run_cycles(budget)?;
        if outcome != FrameOutcome::Completed {
            return Ok(outcome);
        }
    }
    Ok(FrameOutcome::Completed)
}

fn print_summary(invaders: &Invaders) {
    let cpu = invaders.cpu();
    let regs = cpu.registers();
    eprintln!(
        "Frames: {}  Cycles: {}  Instructions: {}",
        invaders.frame_count(),
        cpu.total_cycles().get(),
        cpu.instructions()
    );
    eprintln!(
        "PC={:04X} SP={:04X} A={:02X} BC={:04X} DE={:04X} HL={:04X} F={:02X} INTE={}",
        regs.pc,
        regs.sp,
        regs.a,
        regs.bc(),
        regs.de(),
        regs.hl(),
        regs.flags.to_psw(),
        u8::from(regs.inte)
    );
    for path in ["ports.sound1", "ports.sound2", "ports.watchdog"] {
        if let Some(value) = invaders.query(path) {
            eprintln!("{path}: {value}");
        }
    }
}

fn main() {
    env_logger::init();
    let cli = parse_args();
    let mut invaders = make_invaders(&cli);

    let result = run(&mut invaders, &cli);
    print_summary(&invaders);

    match result {
        Ok(FrameOutcome::Completed) => {}
        Ok(FrameOutcome::Halted { pc }) => {
            eprintln!("CPU halted at {pc:04X}");
        }
        Err(InvadersError::Cpu(e)) => {
            let pc = invaders.cpu().pc();
            let bus = invaders.bus();
            let bytes = [bus.peek(pc), bus.peek(pc.wrapping_add(1)), bus.peek(pc.wrapping_add(2))];
            let (text, _) = disassemble(&bytes);
            eprintln!("CPU fault: {e} ({text})");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
