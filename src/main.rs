use std::path::PathBuf;

use anyhow::{Context, Result};
use chip8_core::chip8::display::{HEIGHT, ROW_BYTES, WIDTH};
use chip8_core::log::{self as chip8_log, Level};
use chip8_core::{error, info, warn, Chip8, Step};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Headless CHIP-8 runner: executes a ROM for a bounded number of
/// instructions and prints the final frame as text.
#[derive(Parser, Debug)]
#[command(name = "chip8", version, about, long_about = None)]
struct Args {
    /// Path to the program image, loaded at 0x200
    rom: PathBuf,

    /// Number of instructions to execute
    #[arg(long, default_value_t = 5_000)]
    steps: u64,

    /// Instructions executed per 60 Hz timer tick
    #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u64).range(1..))]
    cycles_per_tick: u64,

    /// Seed the RND instruction for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Log every executed instruction
    #[arg(long)]
    trace: bool,

    /// Only log warnings and errors
    #[arg(long, conflicts_with = "trace")]
    quiet: bool,

    /// Do not print the final frame
    #[arg(long)]
    no_display: bool,
}

/// Renders the packed framebuffer, two pixel rows per text line.
fn render(frame: &[u8]) -> String {
    let pixel = |row: usize, col: usize| frame[row * ROW_BYTES + col / 8] & (0x80 >> (col % 8)) != 0;

    let mut out = String::with_capacity((WIDTH + 1) * HEIGHT / 2);
    for row in (0..HEIGHT).step_by(2) {
        for col in 0..WIDTH {
            out.push(match (pixel(row, col), pixel(row + 1, col)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
    }
    out
}

fn main() -> Result<()> {
    let args = Args::parse();

    chip8_log::set_level(if args.trace {
        Level::Trace
    } else if args.quiet {
        Level::Warn
    } else {
        Level::Info
    });

    let game = std::fs::read(&args.rom)
        .with_context(|| format!("failed to read ROM {}", args.rom.display()))?;

    let mut chip8 = match args.seed {
        Some(seed) => Chip8::with_rng(StdRng::seed_from_u64(seed)),
        None => Chip8::new(),
    };
    chip8
        .load(&game)
        .with_context(|| format!("failed to load ROM {}", args.rom.display()))?;
    info!("loaded {} ({} bytes)", args.rom.display(), game.len());

    let mut executed: u64 = 0;
    let mut frames: u64 = 0;
    let mut cycles: u64 = 0;

    while executed < args.steps {
        match chip8.step() {
            Ok(Step::Continue) => {}
            Ok(Step::Drawn) => frames += 1,
            Ok(Step::AwaitingKey) => {
                warn!("program is waiting for a key at {:#05x}; no input attached", chip8.cpu.read_pc());
                break;
            }
            Err(err) => {
                error!("halted at {:#05x} after {} instructions: {}", chip8.cpu.read_pc(), executed, err);
                if !args.no_display {
                    print!("{}", render(chip8.framebuffer()));
                }
                return Err(err).context("execution halted");
            }
        }
        executed += 1;

        cycles += 1;
        if cycles == args.cycles_per_tick {
            chip8.tick_timers();
            cycles = 0;
        }
    }

    info!(
        "executed {} instructions, {} frame updates, pc = {:#05x}, call depth {}",
        executed,
        frames,
        chip8.cpu.read_pc(),
        chip8.stack_depth()
    );

    if !args.no_display {
        print!("{}", render(chip8.framebuffer()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_pairs_rows() {
        let mut frame = [0u8; ROW_BYTES * HEIGHT];
        frame[0] = 0x80;
        frame[ROW_BYTES] = 0xC0;

        let text = render(&frame);
        let first_line = text.lines().next().unwrap();
        assert!(first_line.starts_with("█▄ "));
        assert_eq!(text.lines().count(), HEIGHT / 2);
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from(["chip8", "game.ch8", "--steps", "10", "--seed", "3"]).unwrap();
        assert_eq!(args.steps, 10);
        assert_eq!(args.seed, Some(3));
        assert_eq!(args.cycles_per_tick, 9);

        assert!(Args::try_parse_from(["chip8", "game.ch8", "--cycles-per-tick", "0"]).is_err());
        assert!(Args::try_parse_from(["chip8", "game.ch8", "--trace", "--quiet"]).is_err());
    }
}
