mod config;

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use log::{error, info};
use pocket_emu_core::{
    EmulatorError, GameBoy,
    frontend::{Emulator, Event, Frontend, RunOptions},
    ppu::{Frame, SCREEN_HEIGHT, SCREEN_WIDTH},
};
use thiserror::Error;

#[derive(Parser)]
#[command(version, about = "Headless DMG emulator")]
struct Args {
    /// Path to ROM file
    rom: PathBuf,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Config file (defaults to $XDG_CONFIG_HOME/pocket-emu/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the save-state directory
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Run as fast as possible
    #[arg(long)]
    no_pacing: bool,

    /// Restore this save-state slot before starting
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    load_slot: Option<u8>,

    /// Write the last presented frame to this PNG file on exit
    #[arg(long)]
    screenshot: Option<PathBuf>,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("failed to read ROM {}: {source}", path.display())]
    RomRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Emulator(#[from] EmulatorError),
    #[error("failed to write screenshot {}: {source}", path.display())]
    Screenshot {
        path: PathBuf,
        #[source]
        source: png::EncodingError,
    },
}

/// Frontend without a display: keeps the latest frame and never closes.
#[derive(Default)]
struct HeadlessFrontend {
    last_frame: Option<Frame>,
}

impl Frontend for HeadlessFrontend {
    fn present(&mut self, frame: &Frame) {
        self.last_frame = Some(frame.clone());
    }

    fn poll_events(&mut self) -> Vec<Event> {
        Vec::new()
    }
}

fn write_screenshot(path: &Path, frame: &Frame) -> Result<(), png::EncodingError> {
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        SCREEN_WIDTH as u32,
        SCREEN_HEIGHT as u32,
    );
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let mut rgb = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT * 3);
    for argb in frame.to_argb() {
        rgb.extend_from_slice(&[(argb >> 16) as u8, (argb >> 8) as u8, argb as u8]);
    }
    writer.write_image_data(&rgb)?;
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    let config_path = args.config.unwrap_or_else(config::default_config_path);
    let cfg = config::load_from_file(&config_path);

    let rom = std::fs::read(&args.rom).map_err(|source| CliError::RomRead {
        path: args.rom.clone(),
        source,
    })?;
    let rom_name = args
        .rom
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("rom"));

    let options = RunOptions {
        save_dir: args.save_dir.unwrap_or(cfg.save_dir),
        rom_name,
        pacing: cfg.pacing && !args.no_pacing,
        fast_forward_multiplier: cfg.fast_forward_multiplier,
        max_frames: args.frames,
    };
    let mut emulator = Emulator::new(
        GameBoy::with_cartridge(rom),
        HeadlessFrontend::default(),
        options,
    );
    if let Some(slot) = args.load_slot {
        emulator.load_slot(slot);
    }

    let frames = emulator.run()?;
    info!("Ran {frames} frames");

    if let Some(path) = args.screenshot {
        let (_, frontend) = emulator.into_parts();
        if let Some(frame) = frontend.last_frame {
            write_screenshot(&path, &frame).map_err(|source| CliError::Screenshot {
                path: path.clone(),
                source,
            })?;
            info!("Wrote screenshot to {}", path.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
