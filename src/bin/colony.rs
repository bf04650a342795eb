use clap::Parser;
use flexi_logger::Logger;
use std::error::Error;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use colony_counter::overlay::render_overlay;
use colony_counter::{ColonyCounter, CountReport, CounterConfig, PlateImage};

#[derive(Parser, Debug)]
#[command(
    name = "colony_cli",
    about = "Locate specimen dishes on scanned plate images and count their colonies",
    version
)]
struct Cli {
    /// Image files, or directories containing images
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for JSON reports and overlay PNGs
    #[arg(short = 'o', long = "out-dir", default_value = "output")]
    out_dir: PathBuf,

    /// Write a JSON report per image
    #[arg(short = 'j', long = "json")]
    json: bool,

    /// Write an overlay PNG per image with dishes and colonies circled
    #[arg(short = 'p', long = "plot")]
    plot: bool,

    /// Expected dish radius in pixels
    #[arg(long, default_value_t = CounterConfig::default().expected_dish_radius)]
    dish_radius: f64,

    /// Circle candidates closer than this are treated as the same dish
    #[arg(long, default_value_t = CounterConfig::default().dedup_distance)]
    dedup_distance: f64,

    /// Maximum number of circle candidates to consider
    #[arg(long, default_value_t = CounterConfig::default().candidate_cap)]
    candidates: usize,

    /// Smallest blob scale (sigma) searched
    #[arg(long, default_value_t = CounterConfig::default().min_sigma)]
    min_sigma: f64,

    /// Largest blob scale (sigma) searched
    #[arg(long, default_value_t = CounterConfig::default().max_sigma)]
    max_sigma: f64,

    /// Minimum blob response reported as a colony
    #[arg(long, default_value_t = CounterConfig::default().detection_threshold)]
    threshold: f32,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn config(&self) -> CounterConfig {
        CounterConfig {
            expected_dish_radius: self.dish_radius,
            dedup_distance: self.dedup_distance,
            candidate_cap: self.candidates,
            min_sigma: self.min_sigma,
            max_sigma: self.max_sigma,
            detection_threshold: self.threshold,
            ..CounterConfig::default()
        }
    }
}

fn collect_images(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut images = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| p.is_file() && PlateImage::is_decodable_path(p))
                .collect();
            found.sort();
            images.extend(found);
        } else {
            images.push(input.clone());
        }
    }
    Ok(images)
}

fn output_path(out_dir: &Path, image_path: &Path, suffix: &str) -> PathBuf {
    let stem = image_path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("scan");
    out_dir.join(format!("{stem}_{suffix}"))
}

fn write_outputs(cli: &Cli, image_path: &Path, image: &PlateImage, report: &CountReport) -> Result<(), Box<dyn Error>> {
    if !cli.json && !cli.plot {
        return Ok(());
    }
    fs::create_dir_all(&cli.out_dir)?;

    if cli.json {
        let out_json = output_path(&cli.out_dir, image_path, "colonies.json");
        fs::write(&out_json, report.to_json()?)?;
        log::info!("wrote {}", out_json.display());
    }

    if cli.plot {
        let out_plot = output_path(&cli.out_dir, image_path, "colonies.png");
        render_overlay(image, report)?.save(&out_plot)?;
        log::info!("wrote {}", out_plot.display());
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _logger = Logger::try_with_env_or_str(&cli.log_level)?.start()?;

    let config = cli.config();
    config.validate()?;

    let images = collect_images(&cli.inputs)?;
    if images.is_empty() {
        log::warn!("no images found in the given inputs");
        return Ok(());
    }

    for image_path in &images {
        let image = match PlateImage::open(image_path) {
            Ok(v) => v,
            Err(e) => {
                log::error!("failed to open {}: {e}", image_path.display());
                continue;
            }
        };

        let mut counter = ColonyCounter::new(image, config.clone())?;
        let report = match counter.report() {
            Ok(v) => v,
            Err(e) => {
                log::error!("counting failed for {}: {e}", image_path.display());
                continue;
            }
        };

        if images.len() > 1 {
            println!("{}", image_path.display());
        }
        for line in report.summary_lines() {
            println!("{line}");
        }

        if let Err(e) = write_outputs(&cli, image_path, counter.image(), &report) {
            log::error!("failed to write outputs for {}: {e}", image_path.display());
        }
    }

    Ok(())
}
