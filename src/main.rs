use clap::{Arg, Command};

use fatview::block_device::FileBlockDevice;
use fatview::browser;
use fatview::volume::Volume;

fn main() {
    let matches = Command::new("fatview")
        .about("Read-only browser for FAT12/16/32 disk images")
        .arg(
            Arg::new("image")
                .help("Path to the disk image to open")
                .default_value("floppy.img"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Raise the log level to debug")
                .num_args(0),
        )
        .get_matches();

    let image_path = matches.get_one::<String>("image").map(String::as_str).unwrap();
    let verbose = matches.get_flag("verbose");

    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let device = match FileBlockDevice::open(image_path) {
        Ok(device) => device,
        Err(err) => {
            browser::report_mount_failure(&err);
            std::process::exit(1);
        }
    };

    let mut volume = match Volume::mount(device) {
        Ok(volume) => volume,
        Err(err) => {
            browser::report_mount_failure(&err);
            std::process::exit(1);
        }
    };

    browser::run(&mut volume);
}
