use argh::FromArgs;
use std::path::PathBuf;

use pixconv::image::Image;
use pixconv::imgproc::metrics::{count_differences, DEFAULT_TOLERANCE};
use pixconv::io::functional as F;

#[derive(FromArgs)]
/// Compare two images sample by sample and fail if they differ beyond a tolerance
struct Args {
    /// path to the image under test
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// path to the reference image
    #[argh(option, short = 't')]
    target: PathBuf,

    /// largest absolute difference still counted as equal
    #[argh(option, default = "DEFAULT_TOLERANCE")]
    tolerance: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let input: Image<u8, 3> = F::read_image_any_rgb8(&args.input)?;
    let target: Image<u8, 3> = F::read_image_any_rgb8(&args.target)?;

    if input.size() != target.size() {
        return Err(format!(
            "image dimensions differ: {} vs {}",
            input.size(),
            target.size()
        )
        .into());
    }

    let count = count_differences(&input, &target, args.tolerance)?;
    log::info!(
        "{count} of {} samples differ by more than {}",
        input.as_slice().len(),
        args.tolerance
    );

    if count > 0 {
        eprintln!("Images differ: {count} samples");
        std::process::exit(1);
    }

    println!("Images match");
    Ok(())
}
