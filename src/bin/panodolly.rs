use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use panodolly::{BlendMode, EncoderCapabilities, TransitionConfig, TransitionJob};

#[derive(Parser, Debug)]
#[command(name = "panodolly", version, about = "Depth-aware transitions between panoramas")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate transitions for every consecutive pair in a panorama directory.
    Run(RunArgs),
    /// Generate a single transition from explicit files.
    Pair(PairArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// JSON config file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of transition frames.
    #[arg(long)]
    frames: Option<u64>,

    /// Transition mode.
    #[arg(long, value_parser = ["depth_warp", "crossfade", "morph"])]
    mode: Option<String>,

    /// Skip video generation.
    #[arg(long, default_value_t = false)]
    no_video: bool,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory containing panorama images.
    #[arg(default_value = "panoramas/stitched")]
    panoramas_dir: PathBuf,

    /// Output directory for transitions.
    #[arg(default_value = "panoramas/transitions")]
    output_dir: PathBuf,

    /// Directory containing depth maps (default: PANORAMAS_DIR/depth).
    #[arg(long)]
    depth_dir: Option<PathBuf>,

    #[command(flatten)]
    render: RenderArgs,
}

#[derive(Args, Debug)]
struct PairArgs {
    #[arg(long)]
    pano1: PathBuf,
    #[arg(long)]
    depth1: PathBuf,
    #[arg(long)]
    pano2: PathBuf,
    #[arg(long)]
    depth2: PathBuf,

    /// Output directory; frames land in OUT_DIR/sequences/NAME.
    #[arg(long)]
    out_dir: PathBuf,

    /// Transition name (default: STEM1_to_STEM2).
    #[arg(long)]
    name: Option<String>,

    #[command(flatten)]
    render: RenderArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Pair(args) => cmd_pair(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &RenderArgs) -> anyhow::Result<TransitionConfig> {
    let mut cfg = match &args.config {
        Some(path) => TransitionConfig::from_path(path)?,
        None => TransitionConfig::default(),
    };
    if let Some(frames) = args.frames {
        cfg.frames = frames;
    }
    if let Some(mode) = &args.mode {
        cfg.mode = BlendMode::parse(mode);
    }
    if args.no_video {
        cfg.video.enabled = false;
    }
    if args.threads.is_some() {
        cfg.threading.threads = args.threads;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn require_dir(path: &Path, what: &str) -> anyhow::Result<()> {
    if !path.is_dir() {
        anyhow::bail!("{what} directory not found: {}", path.display());
    }
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.render)?;
    let depth_dir = args
        .depth_dir
        .clone()
        .unwrap_or_else(|| args.panoramas_dir.join("depth"));
    require_dir(&args.panoramas_dir, "panorama")?;
    require_dir(&depth_dir, "depth")?;

    let caps = EncoderCapabilities::detect();
    let report = panodolly::generate_all_transitions(
        &args.panoramas_dir,
        &depth_dir,
        &args.output_dir,
        &cfg,
        &caps,
    )?;

    for out in &report.succeeded {
        eprintln!("wrote {} ({} frames)", out.name, out.frames);
    }
    for name in &report.skipped {
        eprintln!("skipped {name}: missing panorama or depth map");
    }
    for (name, reason) in &report.failed {
        eprintln!("failed {name}: {reason}");
    }
    if !report.is_clean() {
        anyhow::bail!("{} transition(s) failed", report.failed.len());
    }
    Ok(())
}

fn cmd_pair(args: PairArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.render)?;
    let name = match &args.name {
        Some(n) => n.clone(),
        None => format!("{}_to_{}", stem(&args.pano1)?, stem(&args.pano2)?),
    };
    let job = TransitionJob {
        name,
        pano1: args.pano1,
        pano2: args.pano2,
        depth1: args.depth1,
        depth2: args.depth2,
    };

    let caps = EncoderCapabilities::detect();
    let out = panodolly::generate_transition(&job, &cfg, &args.out_dir, &caps)?;
    if let Some(dir) = &out.sequence_dir {
        eprintln!("wrote {}", dir.display());
    }
    if let Some(video) = &out.video {
        eprintln!("wrote {}", video.display());
    }
    Ok(())
}

fn stem(path: &Path) -> anyhow::Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .with_context(|| format!("panorama path '{}' has no file name", path.display()))
}
