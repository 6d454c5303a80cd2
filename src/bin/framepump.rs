//! framepump - paced frame feeder for asynchronous image-analysis engines.
//!
//! Feeds frames from a local file (repeated) or a directory of frame files
//! (round-robin) into an analysis engine at a target rate, one frame in
//! flight at a time, and writes per-frame detection reports.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use framepump::config::read_config_file;
use framepump::{
    CliOverrides, FeedConfig, FeedConfigFile, FeedLoop, FrameSource, InputSelect, IterationBudget,
    JsonLinesSink, LogSink, PixelFormat, ResultFormat, ResultSink, RunState, StubEngine,
    TextFileSink,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Feed frames to an asynchronous image-analysis engine at a paced rate",
    after_help = "Examples:\n  \
        framepump -w 720 --height 480 -p /mnt/sdcard/test_image.yuv -r 10 -o result.txt\n  \
        framepump -w 720 --height 480 -d /mnt/sdcard/yuv_images/ -r 10 -o result.txt"
)]
struct Args {
    /// Input image path, fed repeatedly.
    #[arg(short = 'p', long, env = "FRAMEPUMP_PATH", conflicts_with = "directory")]
    path: Option<PathBuf>,

    /// Directory of frame files, fed round-robin.
    #[arg(short = 'd', long, env = "FRAMEPUMP_DIRECTORY")]
    directory: Option<PathBuf>,

    /// Frame width in pixels.
    #[arg(short = 'w', long, env = "FRAMEPUMP_WIDTH")]
    width: Option<u32>,

    /// Frame height in pixels.
    #[arg(long, env = "FRAMEPUMP_HEIGHT")]
    height: Option<u32>,

    /// Target detection rate, frames per second.
    #[arg(short = 'r', long, env = "FRAMEPUMP_DETECT_RATE")]
    detect_rate: Option<u32>,

    /// Frames to feed before exiting: a count, 'unbounded', or 'inf'.
    /// Defaults to 1 in single-file mode, one full pass in directory mode.
    #[arg(short = 'c', long, env = "FRAMEPUMP_COUNT", value_parser = parse_budget)]
    count: Option<IterationBudget>,

    /// Frame pixel layout.
    #[arg(long, value_enum, env = "FRAMEPUMP_PIXEL_FORMAT")]
    pixel_format: Option<PixelFormat>,

    /// Write per-frame detection results to this file.
    #[arg(short = 'o', long, env = "FRAMEPUMP_RESULT_OUTPUT")]
    result_output: Option<PathBuf>,

    /// Result file encoding.
    #[arg(long, value_enum, env = "FRAMEPUMP_RESULT_FORMAT")]
    result_format: Option<ResultFormat>,

    /// JSON config file supplying any values not given on the command line.
    #[arg(long, env = "FRAMEPUMP_CONFIG")]
    config: Option<PathBuf>,

    /// Simulated per-frame latency of the stub engine, in milliseconds.
    #[arg(long, env = "FRAMEPUMP_STUB_LATENCY_MS", default_value_t = 0)]
    stub_latency_ms: u64,
}

fn parse_budget(s: &str) -> Result<IterationBudget, String> {
    s.parse()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let file_cfg = match &args.config {
        Some(path) => read_config_file(path)?,
        None => FeedConfigFile::default(),
    };
    let cli = CliOverrides {
        width: args.width,
        height: args.height,
        pixel_format: args.pixel_format,
        detect_rate: args.detect_rate,
        count: args.count,
        path: args.path,
        directory: args.directory,
        result_output: args.result_output,
        result_format: args.result_format,
    };
    let cfg = FeedConfig::resolve(cli, file_cfg)?;

    let source = match &cfg.input {
        InputSelect::File(path) => FrameSource::open_file(path.clone())?,
        InputSelect::Directory(dir) => FrameSource::open_directory(dir.clone())?,
    };

    let sink: Box<dyn ResultSink> = match (&cfg.result_output, cfg.result_format) {
        (Some(path), ResultFormat::Text) => {
            log::info!("writing results to {}", path.display());
            Box::new(TextFileSink::create(path)?)
        }
        (Some(path), ResultFormat::Json) => {
            log::info!("writing results to {} (json lines)", path.display());
            Box::new(JsonLinesSink::create(path)?)
        }
        (None, _) => Box::new(LogSink),
    };

    let engine = StubEngine::new().with_latency(Duration::from_millis(args.stub_latency_ms));
    log::info!("using analysis engine 'stub'");

    let run = RunState::new();
    let stopper = run.clone();
    ctrlc::set_handler(move || {
        stopper.request_stop();
    })
    .expect("error setting Ctrl-C handler");

    let handle = FeedLoop::new(cfg, source, Box::new(engine), sink, run)?.spawn();
    let summary = handle.join()?;
    log::info!(
        "fed {} frame(s), outcome {:?}",
        summary.frames_submitted,
        summary.outcome
    );
    Ok(())
}
