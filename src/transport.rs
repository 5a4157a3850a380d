use std::time::Duration;

use crate::Error;

/// Byte link to a printer.
///
/// The print job logic only needs to push bytes and pull fixed size frames,
/// so any backend (USB, a recorded session, a test double) can drive it.
pub trait Transport {
    /// Open and claim the device. Fails with [`Error::DeviceOffline`] when
    /// no printer is available.
    fn connect(&mut self) -> Result<(), Error>;

    /// Write all of `buf`.
    fn write(&mut self, buf: &[u8]) -> Result<(), Error>;

    /// Read exactly `len` bytes, waiting at most `timeout` for each transfer.
    /// Fails with [`Error::ReadStatusTimeout`] when the device stays silent.
    fn read_frame(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>, Error>;

    /// Release the device. Closing an unconnected transport does nothing.
    fn close(&mut self);
}
