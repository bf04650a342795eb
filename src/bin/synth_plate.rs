use clap::Parser;
use flexi_logger::Logger;
use std::error::Error;
use std::path::PathBuf;

use colony_counter::synthetic::{SyntheticColony, SyntheticDish, render_scan, save_scan};

/// Write a synthetic scan of two dishes with a few colonies each
#[derive(Parser, Debug)]
#[command(name = "synth_plate", version)]
struct Args {
    /// Output image path
    #[arg(short = 'o', long = "output", default_value = "synthetic_plates.png")]
    output: PathBuf,

    /// Dish radius in pixels; the image is sized to fit two dishes side by side
    #[arg(long, default_value_t = 480.0)]
    radius: f64,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let _logger = Logger::try_with_env_or_str("info")?.start()?;

    let r = args.radius;
    let margin = (r * 0.1).max(10.0);
    let width = (4.0 * r + 3.0 * margin).ceil() as usize;
    let height = (2.0 * r + 2.0 * margin).ceil() as usize;

    let dishes = [
        SyntheticDish {
            center_x: margin + r,
            center_y: margin + r,
            radius: r,
            level: 0.15,
        },
        SyntheticDish {
            center_x: 2.0 * margin + 3.0 * r,
            center_y: margin + r,
            radius: r,
            level: 0.15,
        },
    ];

    // Colonies on a ring at half the dish radius: five in the first dish, three in the second.
    let colonies: Vec<SyntheticColony> = dishes
        .iter()
        .zip([5usize, 3])
        .flat_map(|(dish, count)| {
            (0..count).map(move |i| {
                let angle = i as f64 * std::f64::consts::TAU / count as f64;
                SyntheticColony {
                    x: dish.center_x + 0.5 * dish.radius * angle.cos(),
                    y: dish.center_y + 0.5 * dish.radius * angle.sin(),
                    sigma: 5.0,
                    amplitude: 0.8,
                }
            })
        })
        .collect();

    let scan = render_scan(width, height, 0.0, &dishes, &colonies)?;
    save_scan(&scan, &args.output)?;
    log::info!("wrote {} ({}x{})", args.output.display(), width, height);

    Ok(())
}
