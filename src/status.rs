//! Status frames sent by the printer.
//!
//! Every answer to a status request, and every automatic notification, is a
//! fixed 32 byte frame. [`PrinterStatus::from_buf`] turns it into a value and
//! resolves the printable area for the installed media.

use bitflags::bitflags;
use log::{debug, warn};

use crate::{
    error::{Error, PrinterError},
    media::{self, Geometry, MediaType},
    model::Model,
};

/// Size of a status frame in bytes.
pub const STATUS_FRAME_LEN: usize = 32;

/// Print head mark, frame size and fixed 'B'.
const HEADER: [u8; 3] = [0x80, 0x20, 0x42];

bitflags! {
    /// Error information 1, byte 8.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ErrorInfo1: u8 {
        const NO_MEDIA = 0b0000_0001;
        // die-cut only
        const END_OF_MEDIA = 0b0000_0010;
        const TAPE_CUTTER_JAM = 0b0000_0100;
        const MAIN_UNIT_IN_USE = 0b0001_0000;
        const TURNED_OFF = 0b0010_0000;
        const HIGH_VOLTAGE_ADAPTER = 0b0100_0000;
        const FAN_NOT_WORKING = 0b1000_0000;
    }

    /// Error information 2, byte 9.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ErrorInfo2: u8 {
        const REPLACE_MEDIA = 0b0000_0001;
        const EXPANSION_BUFFER_FULL = 0b0000_0010;
        const TRANSMISSION_ERROR = 0b0000_0100;
        const COMMUNICATION_BUFFER_FULL = 0b0000_1000;
        const COVER_OPEN = 0b0001_0000;
        const CANCEL_KEY = 0b0010_0000;
        const CANNOT_FEED = 0b0100_0000;
        const SYSTEM_ERROR = 0b1000_0000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    Reply,
    PrintingCompleted,
    ErrorOccurred,
    Offline,
    Notification,
    PhaseChange,
    Unknown(u8),
}

impl StatusType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => Self::Reply,
            0x01 => Self::PrintingCompleted,
            0x02 => Self::ErrorOccurred,
            0x04 => Self::Offline,
            0x05 => Self::Notification,
            0x06 => Self::PhaseChange,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseType {
    WaitingToReceive,
    Printing,
    Unknown(u8),
}

impl PhaseType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => Self::WaitingToReceive,
            0x01 => Self::Printing,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    NotAvailable,
    CoolingStarted,
    CoolingFinished,
    Unknown(u8),
}

impl Notification {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => Self::NotAvailable,
            0x03 => Self::CoolingStarted,
            0x04 => Self::CoolingFinished,
            other => Self::Unknown(other),
        }
    }
}

///
/// Status received from the printer encoded to Rust friendly type.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterStatus {
    pub header_ok: bool,
    pub model: Model,
    pub media_type: MediaType,
    pub media_width_mm: u8,
    pub media_length_mm: u8,
    pub error1: ErrorInfo1,
    pub error2: ErrorInfo2,
    pub status_type: StatusType,
    pub phase_type: PhaseType,
    pub phase_number: u16,
    pub notification: u8,
    /// Derived from the media, zero when the media is not in the table.
    pub left_margin: u32,
    pub printable_dots: u32,
    pub right_margin: u32,
}

impl PrinterStatus {
    /// Parse a status frame.
    ///
    /// Only the first 32 bytes are looked at. A wrong header is logged and
    /// reported through `header_ok`, the remaining fields are still decoded.
    pub fn from_buf(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() < STATUS_FRAME_LEN {
            return Err(Error::MalformedFrame(buf.len()));
        }

        let header_ok = buf[..3] == HEADER;
        if !header_ok {
            warn!("Unexpected status header: {:02X?}", &buf[..3]);
        }

        let media_type = MediaType::from_code(buf[11]);
        let media_width_mm = buf[10];
        let media_length_mm = buf[17];

        let geometry = media::resolve_geometry(media_type, media_width_mm, media_length_mm)
            .unwrap_or_else(|| {
                debug!(
                    "No geometry for media {:?} {}x{}",
                    media_type, media_width_mm, media_length_mm
                );
                Geometry::default()
            });

        Ok(PrinterStatus {
            header_ok,
            model: Model::from_code(buf[4]),
            media_type,
            media_width_mm,
            media_length_mm,
            error1: ErrorInfo1::from_bits_retain(buf[8]),
            error2: ErrorInfo2::from_bits_retain(buf[9]),
            status_type: StatusType::from_code(buf[18]),
            phase_type: PhaseType::from_code(buf[19]),
            phase_number: u16::from_be_bytes([buf[20], buf[21]]),
            notification: buf[22],
            left_margin: geometry.left,
            printable_dots: geometry.printable,
            right_margin: geometry.right,
        })
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            left: self.left_margin,
            printable: self.printable_dots,
            right: self.right_margin,
        }
    }

    pub fn media_present(&self) -> bool {
        self.media_type != MediaType::None && !self.error1.contains(ErrorInfo1::NO_MEDIA)
    }

    pub fn supply_name(&self) -> Option<&'static str> {
        media::supply_name(self.media_type, self.media_width_mm, self.media_length_mm)
    }

    pub fn notification_kind(&self) -> Notification {
        Notification::from_code(self.notification)
    }

    /// The two error flag sets as a printer error.
    pub fn printer_error(&self) -> PrinterError {
        PrinterError {
            error1: self.error1,
            error2: self.error2,
        }
    }
}
