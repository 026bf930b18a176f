//! lenet command-line interface.
//!
//! Run with:
//!   cargo run -- summary
//!   cargo run -- classify digit.png --seed 42
//!
//! There is no weight file format, so `classify` scores images with freshly
//! initialized parameters. `RUST_LOG=debug` shows the shape of every stage.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

use lenet::{Cnn, InitConfig, InitScheme};

#[derive(Parser, Debug)]
#[command(name = "lenet", version, about = "LeNet-style classifier for 28x28 grayscale images")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print each layer's output shape and parameter count.
    Summary {
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Score one or more images and print logits plus predicted class.
    Classify {
        /// Image files (PNG, JPEG, BMP or GIF). Resized to 28x28 grayscale.
        #[arg(required = true)]
        images: Vec<String>,

        /// JSON file with `scheme` and `seed`; command-line flags override it.
        #[arg(long, env = "LENET_INIT_CONFIG")]
        config: Option<String>,

        /// Parameter initialization scheme.
        #[arg(long, value_enum)]
        init: Option<SchemeArg>,

        /// Seed for reproducible parameters.
        #[arg(long)]
        seed: Option<u64>,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SchemeArg {
    FanInUniform,
    He,
    Xavier,
    Zeros,
}

impl From<SchemeArg> for InitScheme {
    fn from(arg: SchemeArg) -> InitScheme {
        match arg {
            SchemeArg::FanInUniform => InitScheme::FanInUniform,
            SchemeArg::He => InitScheme::He,
            SchemeArg::Xavier => InitScheme::Xavier,
            SchemeArg::Zeros => InitScheme::Zeros,
        }
    }
}

#[derive(Serialize)]
struct Prediction<'a> {
    image: &'a str,
    class: usize,
    logits: &'a [f64],
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", level);
    }
    pretty_env_logger::init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Summary { json } => summary(json),
        Command::Classify { images, config, init, seed, json } => {
            let mut cfg = match config {
                Some(path) => InitConfig::load_json(&path)
                    .with_context(|| format!("loading init config {}", path))?,
                None => InitConfig::default(),
            };
            if let Some(scheme) = init {
                cfg.scheme = scheme.into();
            }
            if seed.is_some() {
                cfg.seed = seed;
            }
            classify(&images, &cfg, json)
        }
    }
}

fn summary(json: bool) -> Result<()> {
    let cnn = Cnn::with_init(InitScheme::Zeros, &mut rand::thread_rng());
    let layers = cnn.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&layers)?);
        return Ok(());
    }

    println!("{:<12} {:>12} {:>8}", "layer", "output", "params");
    for layer in &layers {
        println!("{}", layer);
    }
    println!("total parameters: {}", cnn.num_parameters());
    Ok(())
}

fn classify(images: &[String], cfg: &InitConfig, json: bool) -> Result<()> {
    info!("initializing network with {:?} (seed {:?})", cfg.scheme, cfg.seed);
    let cnn = Cnn::from_config(cfg);

    let batch = lenet::input::batch_from_paths(images).context("reading input images")?;
    info!("input batch {:?}", batch.shape());

    let logits = cnn.forward(&batch).context("forward pass")?;
    let classes = logits.argmax_rows();

    let predictions: Vec<Prediction> = images
        .iter()
        .zip(&logits.data)
        .zip(&classes)
        .map(|((image, row), &class)| Prediction { image, class, logits: row })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&predictions)?);
    } else {
        for p in &predictions {
            let scores: Vec<String> = p.logits.iter().map(|v| format!("{:.4}", v)).collect();
            println!("{}: class {}  [{}]", p.image, p.class, scores.join(", "));
        }
    }
    Ok(())
}
