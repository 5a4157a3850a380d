//! Error types for Brother QL raster printing.
//!
//! This module defines all possible errors that can occur while talking to
//! the printer, converting images and running a print job.

use crate::status::{ErrorInfo1, ErrorInfo2};
use thiserror::Error;

/// Main error type for printer operations.
///
/// None of these are retried internally. Every failure ends the current call
/// or print job and is handed back to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// USB communication error.
    ///
    /// Wraps underlying rusb errors for device communication issues,
    /// timeouts, or permission problems.
    #[error(transparent)]
    UsbError(#[from] rusb::Error),

    /// No printer could be found or opened.
    #[error("Device is offline")]
    DeviceOffline,

    #[error("Can't read device list, permission issue ?")]
    DeviceListNotReadable,

    #[error("Device is missing endpoint")]
    MissingEndpoint,

    /// The device accepted fewer bytes than were written.
    #[error("Short write to printer: {0} bytes accepted")]
    InvalidResponse(usize),

    /// A status frame shorter than 32 bytes was handed to the parser.
    #[error("Status frame must be 32 bytes, got {0}")]
    MalformedFrame(usize),

    /// An operation needs a status observed on this session first.
    #[error("Not connected: connect to the printer first")]
    NotConnected,

    /// The monochrome image does not match the printable width of the media.
    #[error("Image width {image_width} does not match printable dots {printable_dots}")]
    WidthMismatch {
        image_width: u32,
        printable_dots: u32,
    },

    /// Margin and printable width do not fit into a single raster line.
    #[error("Margin {margin} plus {printable_dots} printable dots exceeds the raster line")]
    MarginOverflow { margin: u32, printable_dots: u32 },

    /// A raster line must be exactly 90 bytes.
    #[error("Raster line must be 90 bytes, got {0}")]
    InvalidLineLength(usize),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// A single status frame read did not finish in time.
    #[error("Status request return no response")]
    ReadStatusTimeout,

    /// Print job timed out waiting for completion.
    ///
    /// The printer did not report completion within the deadline. This may
    /// indicate a hardware issue or a very long label.
    #[error("Print job timeout waiting for completion")]
    PrintTimeout,

    /// Hardware-level printer error.
    ///
    /// Reported by the device itself during a job, such as cover open,
    /// media issues, or mechanical problems.
    #[error(transparent)]
    PrinterError(PrinterError),
}

/// Error reported by the printer in a status frame.
///
/// Both flag sets are kept as received so the caller can inspect every bit,
/// including ones this crate has no name for.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Printer reported an error: {error1:?} / {error2:?}")]
pub struct PrinterError {
    pub error1: ErrorInfo1,
    pub error2: ErrorInfo2,
}

impl PrinterError {
    /// Check if this represents a "no error" state.
    pub fn is_no_error(&self) -> bool {
        self.error1.is_empty() && self.error2.is_empty()
    }
}

impl From<PrinterError> for Error {
    fn from(err: PrinterError) -> Self {
        Error::PrinterError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printer_error_message_lists_both_flag_sets() {
        let err = PrinterError {
            error1: ErrorInfo1::TAPE_CUTTER_JAM,
            error2: ErrorInfo2::COVER_OPEN,
        };
        let msg = Error::from(err).to_string();
        assert!(msg.contains("TAPE_CUTTER_JAM"), "{}", msg);
        assert!(msg.contains("COVER_OPEN"), "{}", msg);
    }

    #[test]
    fn empty_flags_mean_no_error() {
        let err = PrinterError {
            error1: ErrorInfo1::empty(),
            error2: ErrorInfo2::empty(),
        };
        assert!(err.is_no_error());
    }
}
