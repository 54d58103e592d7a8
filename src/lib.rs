use std::{
	io,
	ops::{Deref, DerefMut},
	time::Duration,
};

pub use powermate_shared::{
	encode_speed,
	pack_field,
	pack_state,
	Action,
	Field,
	InputEvent,
	LedState,
	PulseOp,
	Transfer,
};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

mod event;
mod policy;
#[cfg(feature = "tokio")]
pub mod tokio;
mod transport;
mod usb;

pub use event::EventReader;
pub use policy::{ParseStrategyError, SyncPolicy, SyncState, SyncStrategy};
pub use transport::{Device, Transport, TransportError};
pub use usb::{find_device, find_devices, Generation, UsbDevice, UsbHandle};

#[derive(Debug, Error)]
pub enum Error {
	#[error("no powermate device found")]
	DeviceNotFound,
	#[error(transparent)]
	Transport(#[from] TransportError),
	#[error("usb: {0}")]
	Usb(#[source] nusb::Error),
	#[error(transparent)]
	Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
	pub strategy:  SyncStrategy,
	/// Push every change to the device as it happens.
	pub auto_sync: bool,
	/// `None` blocks until the device answers.
	pub timeout:   Option<Duration>,
}

/// The LED state of one PowerMate and, while connected, the handle to push it through.
///
/// The device can't report what it is showing, so everything here is what we
/// assume it shows. Numeric setters clamp instead of failing; they only return
/// an error when auto-sync is on and the transfer itself fails.
pub struct PowerMate<D: Device> {
	device: D,
	handle: Option<D::Handle>,

	led:     LedState,
	policy:  SyncPolicy,
	timeout: Option<Duration>,
}

impl PowerMate<UsbDevice> {
	/// Finds the first attached PowerMate and creates a controller for it, not yet connected.
	pub fn find(config: Config) -> Result<Self> {
		let Some(device) = find_device()? else {
			return Err(Error::DeviceNotFound);
		};

		Ok(Self::new(device, config))
	}
}

impl<D: Device> PowerMate<D> {
	pub fn new(device: D, config: Config) -> Self {
		Self {
			device,
			handle: None,

			led: LedState::default(),
			policy: SyncPolicy::new(config.strategy, config.auto_sync),
			timeout: config.timeout,
		}
	}

	pub fn device(&self) -> &D {
		&self.device
	}

	pub fn config(&self) -> Config {
		Config {
			strategy:  self.policy.strategy(),
			auto_sync: self.policy.auto_sync(),
			timeout:   self.timeout,
		}
	}

	/// Replaces the configuration. Nothing is sent.
	pub fn set_config(&mut self, config: Config) {
		self.policy.set_strategy(config.strategy);
		self.policy.set_auto_sync(config.auto_sync);
		self.timeout = config.timeout;
	}

	pub fn connect(&mut self) -> Result<()> {
		if self.connected() {
			return Ok(());
		}

		self.handle = Some(self.device.open()?);
		info!("connected");

		Ok(())
	}

	pub fn disconnect(&mut self) {
		if self.handle.take().is_some() {
			info!("disconnected");
		}
	}

	pub fn connected(&self) -> bool {
		self.handle.as_ref().is_some_and(Transport::is_open)
	}

	/// Connects and returns a guard that disconnects again when dropped.
	///
	/// If already connected, the guard leaves the connection open.
	pub fn connection(&mut self) -> Result<Connection<'_, D>> {
		let was_connected = self.connected();
		self.connect()?;

		Ok(Connection {
			power_mate: self,
			was_connected,
		})
	}

	/// Runs `f` connected; the connection is released on every exit path, panics included.
	pub fn with_connection<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
		let mut connection = self.connection()?;
		f(&mut connection)
	}

	pub fn led_state(&self) -> &LedState {
		&self.led
	}

	pub fn sync_state(&self) -> SyncState {
		self.policy.state()
	}

	pub fn brightness(&self) -> u8 {
		self.led.brightness()
	}

	pub fn set_brightness(&mut self, brightness: i32) -> Result<()> {
		self.led.set_brightness(brightness);
		self.mutated(Field::Brightness)
	}

	pub fn pulse_table(&self) -> u8 {
		self.led.pulse_table()
	}

	pub fn set_pulse_table(&mut self, table: i32) -> Result<()> {
		self.led.set_pulse_table(table);
		self.mutated(Field::PulseMode)
	}

	pub fn pulse_speed(&self) -> u16 {
		self.led.pulse_speed()
	}

	pub fn set_pulse_speed(&mut self, speed: i32) -> Result<()> {
		self.led.set_pulse_speed(speed);
		self.mutated(Field::PulseMode)
	}

	pub fn pulse_asleep(&self) -> bool {
		self.led.pulse_asleep()
	}

	pub fn set_pulse_asleep(&mut self, enabled: bool) -> Result<()> {
		self.led.set_pulse_asleep(enabled);
		self.mutated(Field::PulseAsleep)
	}

	pub fn pulse_awake(&self) -> bool {
		self.led.pulse_awake()
	}

	pub fn set_pulse_awake(&mut self, enabled: bool) -> Result<()> {
		self.led.set_pulse_awake(enabled);
		self.mutated(Field::PulseAwake)
	}

	pub fn auto_sync(&self) -> bool {
		self.policy.auto_sync()
	}

	/// Turning auto-sync on does not sync, call [`Self::sync`] for that.
	pub fn set_auto_sync(&mut self, auto_sync: bool) {
		self.policy.set_auto_sync(auto_sync);
	}

	/// Pulses at the default speed while awake.
	pub fn pulse(&mut self) -> Result<()> {
		self.set_pulse_speed(i32::from(powermate_shared::DEFAULT_PULSE_SPEED))?;
		self.set_pulse_awake(true)
	}

	/// What [`Self::sync`] would send right now.
	pub fn transfers(&self) -> Vec<Transfer> {
		self.policy.full_sync(&self.led)
	}

	/// Sends the whole current state. Skipped while disconnected.
	pub fn sync(&mut self) -> Result<()> {
		let transfers = self.policy.full_sync(&self.led);
		self.send(&transfers)
	}

	fn mutated(&mut self, field: Field) -> Result<()> {
		let transfers = self.policy.mutated(&self.led, field);
		if transfers.is_empty() {
			return Ok(());
		}

		self.send(&transfers)
	}

	fn send(&mut self, transfers: &[Transfer]) -> Result<()> {
		let timeout = self.timeout;
		let Some(handle) = self.handle.as_mut().filter(|handle| handle.is_open()) else {
			trace!(count = transfers.len(), "not connected, skipping transfers");
			return Ok(());
		};

		for transfer in transfers {
			debug!(value = transfer.value, index = transfer.index, "send");

			if let Err(e) = handle.send_control(transfer.value, transfer.index, &[], timeout) {
				warn!(value = transfer.value, index = transfer.index, "transfer failed: {e}");
				return Err(e.into());
			}
		}

		self.policy.synced();

		Ok(())
	}
}

/// A connected [`PowerMate`], see [`PowerMate::connection`].
pub struct Connection<'a, D: Device> {
	power_mate:    &'a mut PowerMate<D>,
	was_connected: bool,
}

impl<D: Device> Deref for Connection<'_, D> {
	type Target = PowerMate<D>;

	fn deref(&self) -> &Self::Target {
		self.power_mate
	}
}

impl<D: Device> DerefMut for Connection<'_, D> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		self.power_mate
	}
}

impl<D: Device> Drop for Connection<'_, D> {
	fn drop(&mut self) {
		if !self.was_connected {
			self.power_mate.disconnect();
		}
	}
}
