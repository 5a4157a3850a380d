//! Brother QL Raster Printer Driver
//!
//! This crate turns pictures into cut labels on Brother QL series printers
//! using the raster command protocol: the image is dithered for the
//! installed media, packed into raster lines, framed with commands and
//! streamed to the printer, whose status frames are then polled until the
//! label is done.
//!
//! The byte link is any [`Transport`]. [`UsbTransport`] talks to a real
//! printer over USB bulk transfers.
//!
//! # Example
//!
//! ```rust,no_run
//! use ql_raster::{PrintOptions, Printer, UsbTransport};
//!
//! let mut printer = Printer::new(UsbTransport::new());
//! printer.connect().unwrap();
//!
//! let image = image::open("label.png").unwrap();
//! let options = PrintOptions::default().cut_at_end(true);
//! printer.print_image(&image, &options).unwrap();
//! ```

pub mod commands;
mod error;
mod media;
mod model;
mod printer;
pub mod raster;
mod status;
mod transport;
mod usb;

pub use crate::{
    error::{Error, PrinterError},
    media::{resolve_geometry, supply_name, Geometry, MediaType},
    model::Model,
    printer::{JobState, PrintOptions, Printer},
    raster::RasterLine,
    status::{
        ErrorInfo1, ErrorInfo2, Notification, PhaseType, PrinterStatus, StatusType,
        STATUS_FRAME_LEN,
    },
    transport::Transport,
    usb::{UsbTransport, BROTHER_VENDOR_ID},
};

/// Number of dots on the print head of the supported printers.
pub const PRINTER_WIDTH: u32 = 720;

/// Bytes in one raster line (720 dots / 8).
pub const RASTER_LINE_BYTES: usize = 90;
