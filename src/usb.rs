use log::{debug, info};
use rusb::{Context, Device, DeviceDescriptor, DeviceHandle, Direction, TransferType, UsbContext};
use std::time::Duration;

use crate::{transport::Transport, Error};

/// USB vendor ID of Brother Industries.
pub const BROTHER_VENDOR_ID: u16 = 0x04F9;

const WRITE_TIMEOUT: Duration = Duration::from_secs(10);
// Empty bulk reads tolerated before a frame read gives up.
const MAX_EMPTY_READS: u32 = 10;

/// Bulk endpoint pair on one claimed interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Endpoints {
    iface: u8,
    setting: u8,
    address_in: u8,
    address_out: u8,
}

struct AltSetting {
    iface: u8,
    setting: u8,
    bulk: Vec<(Direction, u8)>,
}

fn select_endpoints(settings: &[AltSetting]) -> Option<Endpoints> {
    settings.iter().find_map(|alt| {
        let address = |direction: Direction| {
            alt.bulk
                .iter()
                .find(|(d, _)| *d == direction)
                .map(|(_, address)| *address)
        };
        Some(Endpoints {
            iface: alt.iface,
            setting: alt.setting,
            address_in: address(Direction::In)?,
            address_out: address(Direction::Out)?,
        })
    })
}

struct Connection {
    handle: DeviceHandle<Context>,
    endpoints: Endpoints,
}

/// Bulk transfer link to the first matching Brother printer.
pub struct UsbTransport {
    vendor_id: u16,
    serial: Option<String>,
    write_timeout: Duration,
    connection: Option<Connection>,
}

impl Default for UsbTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UsbTransport {
    pub fn new() -> Self {
        UsbTransport {
            vendor_id: BROTHER_VENDOR_ID,
            serial: None,
            write_timeout: WRITE_TIMEOUT,
            connection: None,
        }
    }

    /// Only attach to the printer with this serial number.
    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    pub fn write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    fn open_device(
        &self,
        context: &Context,
    ) -> Result<(Device<Context>, DeviceDescriptor, DeviceHandle<Context>), Error> {
        let devices = context.devices()?;

        if devices.is_empty() {
            debug!("Failed to read device list");
            return Err(Error::DeviceListNotReadable);
        }
        for device in devices.iter() {
            let device_desc = match device.device_descriptor() {
                Ok(d) => d,
                Err(err) => {
                    debug!("{:?}", err);
                    continue;
                }
            };

            if device_desc.vendor_id() != self.vendor_id {
                continue;
            }
            debug!("{:?}", device_desc);

            let handle = match device.open() {
                Ok(handle) => handle,
                Err(err) => {
                    debug!("Failed to open device: {:?}", err);
                    continue;
                }
            };

            match &self.serial {
                None => return Ok((device, device_desc, handle)),
                Some(serial) => match Self::read_serial(&handle, &device_desc) {
                    Ok(s) if &s == serial => return Ok((device, device_desc, handle)),
                    Ok(_) => continue,
                    Err(err) => {
                        debug!("Failed to read serial number string: {:?}", err);
                        continue;
                    }
                },
            }
        }
        debug!("No device match with serial: {:?}", self.serial);
        Err(Error::DeviceOffline)
    }

    fn read_serial(
        handle: &DeviceHandle<Context>,
        device_desc: &DeviceDescriptor,
    ) -> Result<String, rusb::Error> {
        let timeout = Duration::from_secs(1);
        let languages = handle.read_languages(timeout)?;
        let language = languages.first().copied().ok_or(rusb::Error::NotFound)?;
        handle.read_serial_number_string(language, device_desc, timeout)
    }

    /// The first alternate setting with both a bulk IN and a bulk OUT endpoint.
    fn find_endpoints(
        device: &Device<Context>,
        device_desc: &DeviceDescriptor,
    ) -> Option<Endpoints> {
        let mut settings = Vec::new();
        for n in 0..device_desc.num_configurations() {
            let config_desc = match device.config_descriptor(n) {
                Ok(c) => c,
                Err(_) => continue,
            };
            for interface in config_desc.interfaces() {
                for interface_desc in interface.descriptors() {
                    let bulk = interface_desc
                        .endpoint_descriptors()
                        .filter(|e| e.transfer_type() == TransferType::Bulk)
                        .map(|e| (e.direction(), e.address()))
                        .collect();
                    settings.push(AltSetting {
                        iface: interface_desc.interface_number(),
                        setting: interface_desc.setting_number(),
                        bulk,
                    });
                }
            }
        }
        select_endpoints(&settings)
    }

    fn connection(&self) -> Result<&Connection, Error> {
        self.connection.as_ref().ok_or(Error::DeviceOffline)
    }
}

impl Transport for UsbTransport {
    fn connect(&mut self) -> Result<(), Error> {
        if self.connection.is_some() {
            return Ok(());
        }

        let context = Context::new()?;
        let (device, device_desc, mut handle) = self.open_device(&context)?;

        let endpoints =
            Self::find_endpoints(&device, &device_desc).ok_or(Error::MissingEndpoint)?;

        // Some models come up with the usblp kernel driver bound to the interface.
        if let Err(err) = handle.set_auto_detach_kernel_driver(true) {
            debug!("Kernel driver auto detach unavailable: {:?}", err);
        }
        handle.claim_interface(endpoints.iface)?;
        handle.set_alternate_setting(endpoints.iface, endpoints.setting)?;

        info!(
            "Attached printer {:04x}:{:04x} on interface {}",
            device_desc.vendor_id(),
            device_desc.product_id(),
            endpoints.iface
        );

        self.connection = Some(Connection { handle, endpoints });
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), Error> {
        let conn = self.connection()?;
        let n = conn
            .handle
            .write_bulk(conn.endpoints.address_out, buf, self.write_timeout)?;
        if n != buf.len() {
            debug!(
                "write error: bytes wrote {} != bytes supplied {}, possibly timeout ?",
                n,
                buf.len()
            );
            return Err(Error::InvalidResponse(n));
        }
        Ok(())
    }

    fn read_frame(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>, Error> {
        let conn = self.connection()?;
        let mut buf = vec![0u8; len];
        let mut filled = 0;
        let mut empty_reads = 0;

        while filled < len {
            match conn
                .handle
                .read_bulk(conn.endpoints.address_in, &mut buf[filled..], timeout)
            {
                Ok(0) => {
                    empty_reads += 1;
                    if empty_reads >= MAX_EMPTY_READS {
                        return Err(Error::ReadStatusTimeout);
                    }
                }
                Ok(n) => filled += n,
                Err(rusb::Error::Timeout) => return Err(Error::ReadStatusTimeout),
                Err(e) => return Err(Error::UsbError(e)),
            }
        }
        debug!("Raw frame: {:02X?}", buf);
        Ok(buf)
    }

    fn close(&mut self) {
        if let Some(mut conn) = self.connection.take() {
            if let Err(err) = conn.handle.release_interface(conn.endpoints.iface) {
                debug!("Failed to release interface: {:?}", err);
            }
            info!("Released printer");
        }
    }
}

impl Drop for UsbTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alt(iface: u8, setting: u8, bulk: &[(Direction, u8)]) -> AltSetting {
        AltSetting {
            iface,
            setting,
            bulk: bulk.to_vec(),
        }
    }

    #[test]
    fn endpoints_come_from_one_setting() {
        let settings = [
            alt(0, 0, &[(Direction::In, 0x81)]),
            alt(1, 0, &[(Direction::Out, 0x02)]),
            alt(2, 1, &[(Direction::Out, 0x03), (Direction::In, 0x84)]),
        ];
        assert_eq!(
            select_endpoints(&settings),
            Some(Endpoints {
                iface: 2,
                setting: 1,
                address_in: 0x84,
                address_out: 0x03,
            })
        );
    }

    #[test]
    fn split_endpoints_are_missing() {
        let settings = [
            alt(0, 0, &[(Direction::In, 0x81)]),
            alt(1, 0, &[(Direction::Out, 0x02)]),
        ];
        assert_eq!(select_endpoints(&settings), None);
    }
}
