use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use fractal_codec::{
    Decoder, EncodedImage, Encoder, EncoderOptions, Symmetry, SymmetrySet, crop_to_codec_bounds,
    load_image, psnr, save_image,
};

#[derive(Parser, Debug)]
#[command(name = "fractal", version, about = "Fractal (IFS) image codec")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode an image into a transform file.
    Encode(EncodeArgs),
    /// Reconstruct an image from a transform file.
    Decode(DecodeArgs),
    /// Summarize a transform file.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Input image (any format the `image` crate reads).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output transform file (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Encoder options JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Subdivide blocks whose best match error is at or above this value.
    #[arg(long)]
    threshold: Option<u32>,

    /// Symmetry to search (repeatable), e.g. `identity`, `rot90`, `flip-horizontal`.
    #[arg(long = "symmetry")]
    symmetries: Vec<Symmetry>,

    /// Search every symmetry the encoder may emit.
    #[arg(long, conflicts_with = "symmetries")]
    all_symmetries: bool,

    /// Search top-level blocks in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Center-crop the input to the largest square multiple of 32 pixels.
    #[arg(long, default_value_t = false)]
    crop: bool,
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    /// Input transform file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image; the format follows the extension.
    #[arg(long)]
    out: PathBuf,

    /// Number of decode phases.
    #[arg(long, default_value_t = 8)]
    phases: u32,

    /// Export one 1-based channel as grey instead of all channels.
    #[arg(long, default_value_t = 0)]
    channel: usize,

    /// Original image to report PSNR against.
    #[arg(long)]
    reference: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input transform file.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Encode(args) => cmd_encode(args),
        Command::Decode(args) => cmd_decode(args),
        Command::Info(args) => cmd_info(args),
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

fn encoder_options(args: &EncodeArgs) -> anyhow::Result<EncoderOptions> {
    let mut opts = match &args.config {
        Some(path) => EncoderOptions::from_path(path)?,
        None => EncoderOptions::default(),
    };
    if let Some(threshold) = args.threshold {
        opts.quality_threshold = threshold;
    }
    if args.all_symmetries {
        opts.symmetries = SymmetrySet::searchable();
    } else if !args.symmetries.is_empty() {
        opts.symmetries = args.symmetries.iter().copied().collect();
    }
    if args.parallel {
        opts.threading.parallel = true;
    }
    if args.threads.is_some() {
        opts.threading.threads = args.threads;
    }
    Ok(opts)
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let opts = encoder_options(&args)?;
    let mut img = load_image(&args.in_path)?;
    if args.crop {
        img = crop_to_codec_bounds(&img)?;
    }

    let encoder = Encoder::new(opts)?;
    let (set, stats) = encoder.encode_with_stats(&img)?;
    let encoded = EncodedImage::new(img.width(), img.height(), set);
    encoded.to_path(&args.out)?;

    let raw_bytes = u64::from(img.width()) * u64::from(img.height()) * img.channels() as u64;
    let file_bytes = std::fs::metadata(&args.out)
        .with_context(|| format!("stat '{}'", args.out.display()))?
        .len();
    tracing::info!(
        transforms = stats.transforms,
        subdivisions = stats.subdivisions,
        smallest_block = stats.smallest_block,
        largest_block = stats.largest_block,
        ratio = raw_bytes as f64 / file_bytes.max(1) as f64,
        "wrote {}",
        args.out.display()
    );
    Ok(())
}

fn cmd_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let encoded = EncodedImage::from_path(&args.in_path)?;
    let mut decoder = Decoder::new(
        encoded.width,
        encoded.height,
        encoded.transforms.channels(),
    )?;
    let phases = decoder.run_phases(&encoded.transforms, args.phases)?;
    if let Some(last) = phases.last() {
        tracing::info!(
            phases = last.phase,
            max_deviation = last.max_deviation,
            "decoded"
        );
    }

    let img = decoder.make_image(args.channel)?;
    save_image(&args.out, &img)?;

    if let Some(reference) = &args.reference {
        let original = load_image(reference)?;
        let original = if args.channel == 0 {
            original
        } else {
            fractal_codec::Image::from_planes(vec![original.plane(args.channel)?.clone()])?
        };
        tracing::info!(psnr_db = psnr(&original, &img)?, "compared with reference");
    }

    tracing::info!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let encoded = EncodedImage::from_path(&args.in_path)?;
    let set = &encoded.transforms;
    println!("size: {}x{}", encoded.width, encoded.height);
    println!("channels: {}", set.channels());
    for channel in 1..=set.channels() {
        println!("channel {channel}: {} transforms", set.channel(channel)?.len());
    }
    println!("max |scale|: {:.4}", set.max_abs_scale());
    for (size, count) in set.block_size_histogram() {
        println!("block {size:>2}x{size:<2}: {count}");
    }
    Ok(())
}
