use image::{DynamicImage, GrayImage, RgbaImage};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

use crate::{
    commands,
    error::Error,
    raster::{self, RasterLine, DEFAULT_BRIGHTNESS, DEFAULT_CONTRAST},
    status::{PrinterStatus, StatusType, STATUS_FRAME_LEN},
    transport::Transport,
};

const POLL_INTERVAL: Duration = Duration::from_millis(150);
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(20);
const READ_TIMEOUT: Duration = Duration::from_secs(4);

/// Options for a single print job.
///
/// Cut flags default to off, brightness and contrast to the dithering
/// defaults.
///
/// # Example
///
/// ```
/// use ql_raster::PrintOptions;
///
/// let options = PrintOptions::default().cut_at_end(true).auto_cut(true);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    cut_at_end: bool,
    auto_cut: bool,
    enable_status_notifications: bool,
    brightness: u32,
    contrast: u32,
    flip_margins: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            cut_at_end: false,
            auto_cut: false,
            enable_status_notifications: false,
            brightness: DEFAULT_BRIGHTNESS,
            contrast: DEFAULT_CONTRAST,
            flip_margins: false,
        }
    }
}

impl PrintOptions {
    /// Cut after the last label.
    pub fn cut_at_end(self, flag: bool) -> Self {
        PrintOptions {
            cut_at_end: flag,
            ..self
        }
    }

    /// Enable auto cut, cutting after every label.
    pub fn auto_cut(self, flag: bool) -> Self {
        PrintOptions {
            auto_cut: flag,
            ..self
        }
    }

    pub fn enable_status_notifications(self, flag: bool) -> Self {
        PrintOptions {
            enable_status_notifications: flag,
            ..self
        }
    }

    /// Brightness applied before dithering, 100 is neutral.
    pub fn brightness(self, brightness: u32) -> Self {
        PrintOptions { brightness, ..self }
    }

    /// Contrast applied before dithering, 100 is neutral.
    pub fn contrast(self, contrast: u32) -> Self {
        PrintOptions { contrast, ..self }
    }

    /// Let the right margin lead when packing images.
    pub fn flip_margins(self, flag: bool) -> Self {
        PrintOptions {
            flip_margins: flag,
            ..self
        }
    }
}

/// Where the current print job is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Initializing,
    ConfiguringMode,
    StreamingData,
    AwaitingCompletion,
    Completed,
    Failed,
}

/// A session with one printer.
///
/// The session owns the transport and the last status the printer sent.
/// Jobs take `&mut self`, so only one can run at a time. The transport is
/// closed by [`Printer::close`] or when the session is dropped.
pub struct Printer<T: Transport> {
    transport: T,
    connected: bool,
    status: Option<PrinterStatus>,
    state: JobState,
    poll_interval: Duration,
    completion_timeout: Duration,
    read_timeout: Duration,
}

impl<T: Transport> Printer<T> {
    pub fn new(transport: T) -> Self {
        Printer {
            transport,
            connected: false,
            status: None,
            state: JobState::Idle,
            poll_interval: POLL_INTERVAL,
            completion_timeout: COMPLETION_TIMEOUT,
            read_timeout: READ_TIMEOUT,
        }
    }

    /// Delay between status requests while waiting for a job to finish.
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// How long a job may take to report completion.
    pub fn completion_timeout(mut self, completion_timeout: Duration) -> Self {
        self.completion_timeout = completion_timeout;
        self
    }

    /// How long a single status frame read may take.
    pub fn read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Open the transport and read the initial status.
    ///
    /// The transport is closed again when the status can't be read.
    pub fn connect(&mut self) -> Result<PrinterStatus, Error> {
        self.transport.connect()?;
        self.connected = true;

        match self.refresh_status() {
            Ok(status) => {
                info!(
                    "Connected to {:?}, media {:?} {}x{}mm",
                    status.model, status.media_type, status.media_width_mm, status.media_length_mm
                );
                if status.model.is_wide() {
                    warn!("{:?} has a wide print head, only 720 dot lines are sent", status.model);
                }
                Ok(status)
            }
            Err(err) => {
                self.close();
                Err(err)
            }
        }
    }

    /// Request a fresh status and keep it as the current one.
    pub fn refresh_status(&mut self) -> Result<PrinterStatus, Error> {
        self.transport.write(&commands::REQUEST_STATUS)?;
        let frame = self
            .transport
            .read_frame(STATUS_FRAME_LEN, self.read_timeout)?;
        let status = PrinterStatus::from_buf(&frame)?;
        debug!("Parsed Status struct: {:?}", status);
        self.status = Some(status);
        Ok(status)
    }

    /// Last status the printer sent, `None` before connecting.
    pub fn status(&self) -> Option<&PrinterStatus> {
        self.status.as_ref()
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Dither `image` for the installed media without printing it.
    pub fn preview(
        &self,
        image: &DynamicImage,
        options: &PrintOptions,
    ) -> Result<(GrayImage, RgbaImage), Error> {
        let status = self.status.ok_or(Error::NotConnected)?;
        raster::build_mono_at_width(
            image,
            status.printable_dots,
            options.brightness,
            options.contrast,
        )
    }

    /// Dither `image` for the installed media and print it.
    pub fn print_image(&mut self, image: &DynamicImage, options: &PrintOptions) -> Result<(), Error> {
        let status = self.status.ok_or(Error::NotConnected)?;
        let (mono, _) = self.preview(image, options)?;
        let lines = raster::pack_raster_lines(
            &mono,
            status.printable_dots,
            status.left_margin,
            status.right_margin,
            options.flip_margins,
        )?;
        self.print_lines(&lines, options)
    }

    /// Print raster lines as one label and wait until the printer is done.
    ///
    /// Any failure ends the job in [`JobState::Failed`]. Nothing is resent,
    /// the printer may already be acting on what it received.
    pub fn print_lines(&mut self, lines: &[RasterLine], options: &PrintOptions) -> Result<(), Error> {
        let status = self.status.ok_or(Error::NotConnected)?;

        match self.run_job(&status, lines, options) {
            Ok(()) => {
                self.enter(JobState::Completed);
                info!("Printed {} lines", lines.len());
                Ok(())
            }
            Err(err) => {
                self.enter(JobState::Failed);
                warn!("print error {}", err);
                Err(err)
            }
        }
    }

    fn run_job(
        &mut self,
        status: &PrinterStatus,
        lines: &[RasterLine],
        options: &PrintOptions,
    ) -> Result<(), Error> {
        self.enter(JobState::Initializing);
        self.transport.write(&commands::INITIALIZE)?;
        if options.enable_status_notifications {
            self.transport
                .write(&commands::AUTOMATIC_STATUS_NOTIFICATION)?;
        }

        self.enter(JobState::ConfiguringMode);
        self.transport.write(&commands::SWITCH_TO_RASTER_MODE)?;
        self.transport.write(&commands::NO_COMPRESSION)?;
        self.transport
            .write(&commands::print_information(status, lines.len() as u32))?;
        if options.auto_cut {
            self.transport.write(&commands::AUTO_CUT)?;
            self.transport.write(&commands::CUT_EACH_1)?;
        }
        if options.cut_at_end {
            self.transport.write(&commands::CUT_AT_END)?;
        }
        self.transport.write(&commands::SET_MARGIN_AMOUNT)?;

        self.enter(JobState::StreamingData);
        for line in lines {
            self.transport.write(&commands::raster_data(line))?;
        }
        self.transport.write(&commands::PRINT_WITH_FEEDING)?;

        self.enter(JobState::AwaitingCompletion);
        self.wait_for_completion()
    }

    fn wait_for_completion(&mut self) -> Result<(), Error> {
        let start = Instant::now();

        while start.elapsed() < self.completion_timeout {
            let status = self.refresh_status()?;

            match status.status_type {
                StatusType::ErrorOccurred => return Err(status.printer_error().into()),
                StatusType::PrintingCompleted => return Ok(()),
                other => debug!(
                    "Waiting for completion: {:?}, phase {:?} #{}",
                    other, status.phase_type, status.phase_number
                ),
            }
            std::thread::sleep(self.poll_interval);
        }
        Err(Error::PrintTimeout)
    }

    fn enter(&mut self, state: JobState) {
        debug!("Job state {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Release the transport and forget the cached status.
    pub fn close(&mut self) {
        if self.connected {
            self.transport.close();
            self.connected = false;
        }
        self.status = None;
    }
}

impl<T: Transport> Drop for Printer<T> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = PrintOptions::default();
        assert!(!options.cut_at_end && !options.auto_cut && !options.enable_status_notifications);
        assert!(!options.flip_margins);
        assert_eq!((options.brightness, options.contrast), (150, 80));
    }

    #[test]
    fn builder_sets_flags() {
        let options = PrintOptions::default()
            .cut_at_end(true)
            .auto_cut(true)
            .enable_status_notifications(true)
            .brightness(100)
            .contrast(120)
            .flip_margins(true);
        assert!(options.cut_at_end && options.auto_cut && options.enable_status_notifications);
        assert!(options.flip_margins);
        assert_eq!((options.brightness, options.contrast), (100, 120));
    }
}
