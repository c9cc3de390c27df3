use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vatex", version)]
struct Cli {
    /// Log per-frame detail.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bake a mesh animation into a vertex animation texture.
    Bake(BakeArgs),
    /// Print the UV layout for a vertex count as JSON.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct BakeArgs {
    /// Input mesh animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Also write the UV layout manifest here.
    #[arg(long)]
    uv_out: Option<PathBuf>,

    /// Bake config JSON; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Texture edge length in texels.
    #[arg(long)]
    texture_size: Option<u32>,

    /// First frame to sample (1-based).
    #[arg(long)]
    start: Option<u64>,

    /// Last frame to sample (inclusive).
    #[arg(long)]
    end: Option<u64>,

    /// Fail when an integer part overflows its 2-bit field.
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Encode frames in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Number of mesh vertices.
    #[arg(long)]
    vertices: usize,

    /// Texture edge length in texels.
    #[arg(long, default_value_t = vatex::TEXTURE_SIZE)]
    texture_size: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Bake(args) => cmd_bake(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_bake(args: BakeArgs) -> anyhow::Result<()> {
    let mesh = vatex::MeshAnimation::from_path(&args.in_path)?;

    let mut cfg = match &args.config {
        Some(path) => vatex::BakeConfig::from_path(path)?,
        None => vatex::BakeConfig::default(),
    };
    if let Some(size) = args.texture_size {
        cfg.texture_size = size;
    }
    if let Some(start) = args.start {
        cfg.frames.start = vatex::FrameNumber(start);
    }
    if let Some(end) = args.end {
        cfg.frames.end = vatex::FrameNumber(end);
    }
    if args.strict {
        cfg.mode = vatex::EncodeMode::Strict;
    }
    if args.parallel {
        cfg.parallel = true;
    }
    if args.threads.is_some() {
        cfg.threads = args.threads;
    }

    let baked = vatex::bake(&mesh, &cfg, &mut vatex::LogProgress::default())
        .with_context(|| format!("bake '{}'", args.in_path.display()))?;

    vatex::write_png(&baked.pixels, &args.out)?;
    eprintln!("wrote {}", args.out.display());

    if let Some(uv_out) = &args.uv_out {
        vatex::write_layout_json(&baked.layout, baked.frames, baked.loop_uvs.clone(), uv_out)?;
        eprintln!("wrote {}", uv_out.display());
    }
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let layout = vatex::assign_layout(args.vertices, args.texture_size)?;
    let json = serde_json::to_string_pretty(&layout).context("serialize layout")?;
    println!("{json}");
    Ok(())
}
