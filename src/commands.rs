//! Raster command frames.
//!
//! Pure byte builders, no I/O. Layouts follow the Brother QL raster command
//! reference and must stay bit exact.

use bitflags::bitflags;

use crate::{media::MediaType, raster::RasterLine, status::PrinterStatus, RASTER_LINE_BYTES};

/// ESC i S
pub const REQUEST_STATUS: [u8; 3] = [0x1B, 0x69, 0x53];
/// ESC @
pub const INITIALIZE: [u8; 2] = [0x1B, 0x40];
/// ESC i a 01
pub const SWITCH_TO_RASTER_MODE: [u8; 4] = [0x1B, 0x69, 0x61, 0x01];
/// ESC i M @
pub const AUTO_CUT: [u8; 4] = [0x1B, 0x69, 0x4D, 0x40];
/// ESC i K 08
pub const CUT_AT_END: [u8; 4] = [0x1B, 0x69, 0x4B, 0x08];
/// ESC i d, 35 dots
pub const SET_MARGIN_AMOUNT: [u8; 5] = [0x1B, 0x69, 0x64, 0x23, 0x00];
/// FF: print without feeding
pub const END_OF_PAGE: [u8; 1] = [0x0C];
/// Control-Z: print then eject
pub const PRINT_WITH_FEEDING: [u8; 1] = [0x1A];
/// M 00
pub const NO_COMPRESSION: [u8; 2] = [0x4D, 0x00];
/// ESC i ! 00: notify automatically
pub const AUTOMATIC_STATUS_NOTIFICATION: [u8; 4] = [0x1B, 0x69, 0x21, 0x00];
/// ESC i A 01
pub const CUT_EACH_1: [u8; 4] = [0x1B, 0x69, 0x41, 0x01];

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct PrintInfoFlags: u8 {
        const VALIDATE_KIND = 0b0000_0010;
        const VALIDATE_WIDTH = 0b0000_0100;
        const VALIDATE_LENGTH = 0b0000_1000;
        const RECOVER = 0b1000_0000;
    }
}

/// ESC i z: print information for `lines` raster lines on the current media.
///
/// Length is only validated on die-cut labels, continuous tape sends 0.
pub fn print_information(status: &PrinterStatus, lines: u32) -> [u8; 13] {
    let die_cut = status.media_type == MediaType::DieCut;

    let mut flags =
        PrintInfoFlags::RECOVER | PrintInfoFlags::VALIDATE_KIND | PrintInfoFlags::VALIDATE_WIDTH;
    if die_cut {
        flags |= PrintInfoFlags::VALIDATE_LENGTH;
    }

    let length = if die_cut { status.media_length_mm } else { 0 };
    let count = lines.to_le_bytes();

    [
        0x1B,
        0x69,
        0x7A,
        flags.bits(),
        status.media_type.code(),
        status.media_width_mm,
        length,
        count[0],
        count[1],
        count[2],
        count[3],
        0x00, // Starting page
        0x00, // Reserved
    ]
}

/// g 00 5A followed by the 90 bytes of the line.
pub fn raster_data(line: &RasterLine) -> Vec<u8> {
    let mut buf = Vec::with_capacity(3 + RASTER_LINE_BYTES);
    buf.extend_from_slice(&[0x67, 0x00, RASTER_LINE_BYTES as u8]);
    buf.extend_from_slice(line.as_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::tests::frame;
    use pretty_assertions::assert_eq;

    #[test]
    fn print_information_continuous() {
        let status = PrinterStatus::from_buf(&frame(62, 0x0A, 0, 0)).unwrap();
        let cmd = print_information(&status, 123);

        assert_eq!(&cmd[..3], &[0x1B, 0x69, 0x7A]);
        assert_eq!(cmd[3] & 0x80, 0x80);
        assert_eq!(cmd[3] & 0x02, 0x02);
        assert_eq!(cmd[3] & 0x04, 0x04);
        assert_eq!(cmd[3] & 0x08, 0x00);
        assert_eq!(cmd[4], 0x0A);
        assert_eq!(cmd[5], 62);
        assert_eq!(cmd[6], 0);
        assert_eq!(u32::from_le_bytes([cmd[7], cmd[8], cmd[9], cmd[10]]), 123);
        assert_eq!(&cmd[11..], &[0x00, 0x00]);
    }

    #[test]
    fn print_information_die_cut() {
        let status = PrinterStatus::from_buf(&frame(29, 0x0B, 90, 0)).unwrap();
        let cmd = print_information(&status, 0x0001_0203);

        assert_eq!(
            cmd,
            [0x1B, 0x69, 0x7A, 0x8E, 0x0B, 29, 90, 0x03, 0x02, 0x01, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn raster_data_frame() {
        let mut bytes = [0u8; RASTER_LINE_BYTES];
        bytes[0] = 0xFF;
        let cmd = raster_data(&RasterLine::from(bytes));

        assert_eq!(cmd.len(), 93);
        assert_eq!(cmd[0], 0x67);
        assert_eq!(cmd[1], 0x00);
        assert_eq!(cmd[2], 0x5A);
        assert_eq!(cmd[3], 0xFF);
        assert!(cmd[4..].iter().all(|b| *b == 0));
    }

    #[test]
    fn fixed_commands() {
        assert_eq!(REQUEST_STATUS.to_vec(), vec![0x1B, 0x69, 0x53]);
        assert_eq!(SET_MARGIN_AMOUNT.to_vec(), vec![0x1B, 0x69, 0x64, 0x23, 0x00]);
        assert_eq!(CUT_AT_END.to_vec(), vec![0x1B, 0x69, 0x4B, 0x08]);
    }
}
