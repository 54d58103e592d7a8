use std::{fmt, time::Duration};

use nusb::transfer::{Control, ControlType, Recipient, TransferError};
use powermate_shared::{DEVICE_PRODUCT_IDS, DEVICE_PRODUCT_ID_NEW, DEVICE_VENDOR_ID, REQUEST};
use tracing::{debug, info};

use crate::{Device, Error, Result, Transport, TransportError};

const CONTROL_TYPE: ControlType = ControlType::Vendor;
const RECIPIENT: Recipient = Recipient::Interface;

// usbfs takes the timeout as u32 milliseconds
const BLOCK_INDEFINITELY: Duration = Duration::from_millis(u32::MAX as u64);

/// Both generations take the same transfers and the same pulse speed range, `0..=510`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
	New,
	Old,
}

/// A PowerMate found on the bus, not yet opened.
#[derive(Debug)]
pub struct UsbDevice {
	info: nusb::DeviceInfo,
}

impl UsbDevice {
	pub fn product_id(&self) -> u16 {
		self.info.product_id()
	}

	pub fn generation(&self) -> Generation {
		if self.product_id() == DEVICE_PRODUCT_ID_NEW {
			Generation::New
		} else {
			Generation::Old
		}
	}

	pub fn product_name(&self) -> Option<&str> {
		self.info.product_string()
	}
}

impl fmt::Display for UsbDevice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"usb:{:03}/{:03} [{:04x}:{:04x}]",
			self.info.bus_number(),
			self.info.device_address(),
			self.info.vendor_id(),
			self.info.product_id(),
		)
	}
}

fn is_powermate(info: &nusb::DeviceInfo) -> bool {
	info.vendor_id() == DEVICE_VENDOR_ID && DEVICE_PRODUCT_IDS.contains(&info.product_id())
}

/// Lists every attached PowerMate, old and new.
pub fn find_devices() -> Result<Vec<UsbDevice>> {
	let devices: Vec<UsbDevice> = nusb::list_devices()
		.map_err(Error::Usb)?
		.filter(is_powermate)
		.map(|info| UsbDevice { info })
		.collect();

	info!(count = devices.len(), "found powermate devices");

	Ok(devices)
}

/// Finds the first attached PowerMate.
///
/// If more than one device is connected the returned device will be the first the OS lists.
pub fn find_device() -> Result<Option<UsbDevice>> {
	let device = nusb::list_devices()
		.map_err(Error::Usb)?
		.find(is_powermate)
		.map(|info| UsbDevice { info });

	if let Some(device) = &device {
		info!(%device, "found powermate");
	}

	Ok(device)
}

impl Device for UsbDevice {
	type Handle = UsbHandle;

	/// Opens the device without claiming an interface, so the kernel's input
	/// driver keeps delivering events while we send control transfers.
	fn open(&self) -> Result<UsbHandle> {
		let device = self.info.open().map_err(Error::Usb)?;

		debug!(device = %self, generation = ?self.generation(), "opened");

		Ok(UsbHandle { device, open: true })
	}
}

/// An opened PowerMate. Released when dropped.
pub struct UsbHandle {
	device: nusb::Device,
	open:   bool,
}

impl fmt::Debug for UsbHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UsbHandle").field("open", &self.open).finish_non_exhaustive()
	}
}

fn transport_error(error: TransferError) -> TransportError {
	match error {
		TransferError::Disconnected => TransportError::Disconnected,
		TransferError::Cancelled => TransportError::Cancelled,
		TransferError::Stall => TransportError::Stalled,
		e => TransportError::Failed(e.to_string()),
	}
}

impl Transport for UsbHandle {
	fn send_control(
		&mut self,
		value: u16,
		index: u16,
		payload: &[u8],
		timeout: Option<Duration>,
	) -> std::result::Result<(), TransportError> {
		let control = Control {
			control_type: CONTROL_TYPE,
			recipient: RECIPIENT,
			request: REQUEST,
			value,
			index,
		};

		self.device
			.control_out_blocking(control, payload, timeout.unwrap_or(BLOCK_INDEFINITELY))
			.map(|_| ())
			.map_err(|e| {
				let e = transport_error(e);
				if matches!(e, TransportError::Disconnected) {
					self.open = false;
				}
				e
			})
	}

	fn is_open(&self) -> bool {
		self.open
	}
}
