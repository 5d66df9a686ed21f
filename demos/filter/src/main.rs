use argh::FromArgs;
use std::{path::PathBuf, time::Instant};

use pixconv::image::Image;
use pixconv::imgproc::{
    accel::{Accelerator, RayonAccelerator},
    filter::kernel_from,
    parallel::{convolve_passes, PassConfig},
};
use pixconv::io::{functional as F, ppm};

#[derive(FromArgs)]
/// Apply a square convolution kernel to an image and write it as a binary pixmap
struct Args {
    /// path to an input image
    #[argh(option, short = 'i')]
    input: Option<PathBuf>,

    /// path to the output pixmap (P6)
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// the filter to apply: blur, sharpen, edge or emboss
    #[argh(option, short = 'f')]
    filter: Option<String>,

    /// the number of worker threads
    #[argh(option, short = 'p', default = "1")]
    threads: usize,

    /// how many times the filter is applied
    #[argh(option, short = 'r', default = "1")]
    repeats: usize,

    /// run the passes on the rayon accelerator backend
    #[argh(switch)]
    accel: bool,

    /// print the version and exit
    #[argh(switch)]
    version: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let input = args.input.ok_or("missing required option --input")?;
    let output = args.output.ok_or("missing required option --output")?;
    let filter = args.filter.ok_or("missing required option --filter")?;

    // validate everything before touching the input
    let config = PassConfig::default()
        .with_threads(args.threads)
        .with_repeats(args.repeats);
    config.validate()?;
    let kernel = kernel_from(&filter)?;

    // read the image
    let image: Image<u8, 3> = F::read_image_any_rgb8(&input)?;
    log::info!(
        "loaded {} ({}x{})",
        input.display(),
        image.width(),
        image.height()
    );

    let start = Instant::now();
    let filtered = if args.accel {
        let backend = RayonAccelerator::with_num_threads(config.threads);
        log::info!("running {filter} x{} on the {} backend", config.repeats, backend.name());
        backend.apply(&image, &kernel, config.repeats)?
    } else {
        log::info!(
            "running {filter} x{} on {} threads",
            config.repeats,
            config.threads
        );
        convolve_passes(&image, &kernel, config)?
    };
    log::info!("convolution took {:?}", start.elapsed());

    // write the result
    ppm::write_image_ppm(&output, &filtered)?;
    log::info!("wrote {}", output.display());

    Ok(())
}
