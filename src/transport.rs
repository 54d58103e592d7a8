use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
	#[error("control transfer cancelled or timed out")]
	Cancelled,
	#[error("control transfer stalled")]
	Stalled,
	#[error("device disconnected")]
	Disconnected,
	#[error("control transfer failed: {0}")]
	Failed(String),
}

/// An open handle that can carry control transfers to the device.
///
/// Dropping the handle closes it.
pub trait Transport {
	/// Sends one vendor control transfer and blocks until it completes.
	///
	/// `timeout` of `None` blocks indefinitely.
	fn send_control(
		&mut self,
		value: u16,
		index: u16,
		payload: &[u8],
		timeout: Option<Duration>,
	) -> Result<(), TransportError>;

	fn is_open(&self) -> bool;
}

/// Something that can be opened into a [`Transport`], usually a discovered USB device.
pub trait Device {
	type Handle: Transport;

	fn open(&self) -> crate::Result<Self::Handle>;
}
