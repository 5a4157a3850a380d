//! Command line front end for Brother QL printers.
//!
//! ```bash
//! ql-raster status
//! ql-raster preview photo.jpg preview.png
//! ql-raster print photo.jpg --cut-at-end
//! ```
//!
//! QL_RASTER_SERIAL picks one printer when several are attached. It and
//! RUST_LOG may also be set in a .env file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ql_raster::{raster, Error, PrintOptions, Printer, UsbTransport};

/// Print pictures on Brother QL label printers
#[derive(Parser, Debug)]
#[command(name = "ql-raster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Show the printer status and installed media
    Status,

    /// Write the dithered image as it would be printed
    Preview {
        /// Picture to convert
        input: PathBuf,

        /// PNG file to write
        output: PathBuf,

        #[command(flatten)]
        adjust: Adjust,
    },

    /// Print a picture
    Print {
        /// Picture to print
        input: PathBuf,

        /// Cut after the label
        #[arg(long)]
        cut_at_end: bool,

        /// Cut after every label
        #[arg(long)]
        auto_cut: bool,

        /// Enable automatic status notifications
        #[arg(long)]
        notify: bool,

        /// Lead with the right margin
        #[arg(long)]
        flip_margins: bool,

        #[command(flatten)]
        adjust: Adjust,
    },
}

#[derive(clap::Args, Debug, PartialEq)]
struct Adjust {
    /// Brightness, 100 is neutral
    #[arg(long, default_value_t = raster::DEFAULT_BRIGHTNESS)]
    brightness: u32,

    /// Contrast, 100 is neutral
    #[arg(long, default_value_t = raster::DEFAULT_CONTRAST)]
    contrast: u32,
}

impl Adjust {
    fn options(&self) -> PrintOptions {
        PrintOptions::default()
            .brightness(self.brightness)
            .contrast(self.contrast)
    }
}

fn open_printer() -> Result<Printer<UsbTransport>, Error> {
    let transport = match std::env::var("QL_RASTER_SERIAL") {
        Ok(serial) => UsbTransport::new().serial(serial),
        Err(_) => UsbTransport::new(),
    };
    let mut printer = Printer::new(transport);
    printer.connect()?;
    Ok(printer)
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Commands::Status => {
            let printer = open_printer()?;
            if let Some(status) = printer.status() {
                println!("{:#?}", status);
                match status.supply_name() {
                    Some(name) => println!("Media: {}", name),
                    None if status.media_present() => println!("Media: unknown roll"),
                    None => println!("Media: none"),
                }
            }
        }
        Commands::Preview {
            input,
            output,
            adjust,
        } => {
            let image = image::open(&input)?;
            let printer = open_printer()?;
            let (mono, _) = printer.preview(&image, &adjust.options())?;
            std::fs::write(&output, raster::preview_png(&mono)?)
                .map_err(|e| Error::Image(image::ImageError::IoError(e)))?;
            println!(
                "Wrote {}x{} preview to {}",
                mono.width(),
                mono.height(),
                output.display()
            );
        }
        Commands::Print {
            input,
            cut_at_end,
            auto_cut,
            notify,
            flip_margins,
            adjust,
        } => {
            let image = image::open(&input)?;
            let options = adjust
                .options()
                .cut_at_end(cut_at_end)
                .auto_cut(auto_cut)
                .enable_status_notifications(notify)
                .flip_margins(flip_margins);
            let mut printer = open_printer()?;
            printer.print_image(&image, &options)?;
            println!("Printed {}", input.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn print_defaults() {
        let cli = Cli::try_parse_from(["ql-raster", "print", "label.png"]).unwrap();
        match cli.command {
            Commands::Print {
                cut_at_end,
                auto_cut,
                notify,
                flip_margins,
                adjust,
                ..
            } => {
                assert!(!cut_at_end && !auto_cut && !notify && !flip_margins);
                assert_eq!(adjust.options(), PrintOptions::default());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn print_flags_and_adjustments() {
        let cli = Cli::try_parse_from([
            "ql-raster",
            "print",
            "label.png",
            "--cut-at-end",
            "--flip-margins",
            "--brightness",
            "100",
            "--contrast",
            "120",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Commands::Print {
                input: PathBuf::from("label.png"),
                cut_at_end: true,
                auto_cut: false,
                notify: false,
                flip_margins: true,
                adjust: Adjust {
                    brightness: 100,
                    contrast: 120,
                },
            }
        );
    }

    #[test]
    fn non_numeric_brightness_is_rejected() {
        assert!(Cli::try_parse_from(["ql-raster", "print", "a.png", "--brightness", "lots"]).is_err());
    }

    #[test]
    fn preview_needs_output() {
        assert!(Cli::try_parse_from(["ql-raster", "preview", "a.png"]).is_err());
        let cli = Cli::try_parse_from(["ql-raster", "preview", "a.png", "b.png"]).unwrap();
        assert!(matches!(cli.command, Commands::Preview { .. }));
    }

    #[test]
    fn dotenv_file_provides_log_filter() {
        let vars: Vec<(String, String)> =
            dotenvy::from_read_iter("RUST_LOG=ql_raster=debug\nQL_RASTER_SERIAL=000G1Z123456\n".as_bytes())
                .collect::<Result<_, _>>()
                .unwrap();
        assert_eq!(vars[0], ("RUST_LOG".to_string(), "ql_raster=debug".to_string()));
        assert_eq!(vars[1].0, "QL_RASTER_SERIAL");
    }
}
