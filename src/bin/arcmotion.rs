use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "arcmotion", version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a JSON request script against a fixture session.
    Play(PlayArgs),
    /// Solve an arc and print its samples as JSON lines.
    Arc(ArcArgs),
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Script JSON: an array of `{"at": ms, "payload": {...}}`.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Engine config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Channel state JSON, loaded when present and written back on exit.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Send frames as Art-Net to this host (overrides the config's target).
    #[arg(long)]
    artnet: Option<String>,

    /// Pace the script in wall time instead of jumping the virtual clock.
    #[arg(long)]
    realtime: bool,
}

#[derive(Parser, Debug)]
struct ArcArgs {
    /// Engine config JSON (arc fixture and rate).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start orientation as `pan,tilt` channel values.
    #[arg(long, value_parser = parse_pan_tilt)]
    start: arcmotion::PanTilt,

    #[arg(long, value_parser = parse_pan_tilt)]
    end: arcmotion::PanTilt,

    #[arg(long, value_parser = parse_pan_tilt)]
    center: arcmotion::PanTilt,

    /// Arc duration in milliseconds.
    #[arg(long)]
    duration: u64,

    /// Sub-range of the arc as `start,end` fractions.
    #[arg(long, value_parser = parse_pair)]
    interval: Option<(f64, f64)>,
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected 'a,b', got '{s}'"))?;
    let a = a.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let b = b.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((a, b))
}

fn parse_pan_tilt(s: &str) -> Result<arcmotion::PanTilt, String> {
    parse_pair(s).map(|(pan, tilt)| arcmotion::PanTilt::new(pan, tilt))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Play(args) => cmd_play(args),
        Command::Arc(args) => cmd_arc(args),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_config(path: Option<&Path>) -> anyhow::Result<arcmotion::EngineConfig> {
    match path {
        Some(p) => arcmotion::EngineConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(arcmotion::EngineConfig::default()),
    }
}

/// Art-Net when a target is configured, otherwise frames are only counted.
enum Output {
    ArtNet(arcmotion::ArtNetSender),
    Count(arcmotion::CountingSender),
}

impl arcmotion::FrameSender for Output {
    fn send(&mut self, frame: &[u8]) {
        match self {
            Self::ArtNet(s) => s.send(frame),
            Self::Count(s) => s.send(frame),
        }
    }

    fn set_universe(&mut self, universe: u16) {
        match self {
            Self::ArtNet(s) => s.set_universe(universe),
            Self::Count(s) => s.set_universe(universe),
        }
    }
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let mut config = read_config(args.config.as_deref())?;
    if let Some(address) = args.artnet {
        let port = config
            .artnet
            .as_ref()
            .map_or(arcmotion::output::ARTNET_PORT, |t| t.port);
        config.artnet = Some(arcmotion::ArtNetTarget { address, port });
    }

    let f = File::open(&args.in_path)
        .with_context(|| format!("open script '{}'", args.in_path.display()))?;
    let steps = arcmotion::parse_script(BufReader::new(f)).with_context(|| "parse script JSON")?;

    let output = match &config.artnet {
        Some(t) => Output::ArtNet(
            arcmotion::ArtNetSender::connect(&t.address, t.port, config.universe)
                .with_context(|| format!("connect art-net '{}:{}'", t.address, t.port))?,
        ),
        None => Output::Count(arcmotion::CountingSender::new()),
    };

    let store = match &args.state {
        Some(p) if p.exists() => Some(
            arcmotion::ChannelStore::from_path(p)
                .with_context(|| format!("load state '{}'", p.display()))?,
        ),
        _ => None,
    };
    let mut session = match store {
        Some(store) => arcmotion::FixtureSession::with_store(config, store, output)?,
        None => arcmotion::FixtureSession::new(config, output)?,
    };

    let clock = if args.realtime {
        arcmotion::PlaybackClock::Realtime
    } else {
        arcmotion::PlaybackClock::Virtual
    };
    let report = session.play_script(&steps, clock);
    let frames = match session.sender() {
        Output::Count(c) => Some(c.count()),
        Output::ArtNet(_) => None,
    };
    let store = session.shutdown();

    if let Some(p) = &args.state {
        store
            .write_to_path(p)
            .with_context(|| format!("write state '{}'", p.display()))?;
    }

    let summary = serde_json::json!({
        "accepted": report.accepted,
        "rejected": report.rejected,
        "ticks": report.ticks,
        "frames": frames,
        "channels": store.as_slice(),
    });
    let mut out = std::io::stdout().lock();
    serde_json::to_writer(&mut out, &summary).with_context(|| "write summary")?;
    writeln!(out)?;
    Ok(())
}

fn cmd_arc(args: ArcArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let interval = match args.interval {
        Some((a, b)) => arcmotion::FractionInterval::new(a, b)?,
        None => arcmotion::FractionInterval::FULL,
    };
    let req = arcmotion::ArcRequest {
        current: args.start,
        target: args.end,
        center: args.center,
        fixture: config.arc,
        duration: std::time::Duration::from_millis(args.duration),
        update_interval: config.rate(),
        interval,
    };
    let path = arcmotion::solve_arc(&req).with_context(|| "solve arc")?;

    let mut out = std::io::stdout().lock();
    for s in path {
        let line = serde_json::json!({
            "index": s.index,
            "offset_ms": s.offset.as_millis() as u64,
            "pan": s.pan,
            "tilt": s.tilt,
            "terminal": s.terminal,
        });
        serde_json::to_writer(&mut out, &line).with_context(|| "write sample")?;
        writeln!(out)?;
    }
    Ok(())
}
