use std::{
	cell::{Cell, RefCell},
	panic::{self, AssertUnwindSafe},
	rc::Rc,
	time::Duration,
};

use powermate::{
	pack_state,
	Config,
	Device,
	Error,
	PowerMate,
	SyncState,
	SyncStrategy,
	Transfer,
	Transport,
	TransportError,
};

#[derive(Debug, Default, Clone)]
struct Bus {
	sent:     Rc<RefCell<Vec<(Transfer, Option<Duration>)>>>,
	fail:     Rc<Cell<bool>>,
	closed:   Rc<Cell<bool>>,
	open:     Rc<Cell<usize>>,
	released: Rc<Cell<usize>>,
}

impl Bus {
	fn sent(&self) -> Vec<Transfer> {
		self.sent.borrow().iter().map(|(transfer, _)| *transfer).collect()
	}
}

struct MockDevice(Bus);

struct MockHandle(Bus);

impl Device for MockDevice {
	type Handle = MockHandle;

	fn open(&self) -> powermate::Result<MockHandle> {
		self.0.open.set(self.0.open.get() + 1);
		self.0.closed.set(false);
		Ok(MockHandle(self.0.clone()))
	}
}

impl Transport for MockHandle {
	fn send_control(
		&mut self,
		value: u16,
		index: u16,
		payload: &[u8],
		timeout: Option<Duration>,
	) -> Result<(), TransportError> {
		assert!(payload.is_empty());
		if self.0.fail.get() {
			return Err(TransportError::Stalled);
		}
		self.0.sent.borrow_mut().push((Transfer::new(value, index), timeout));
		Ok(())
	}

	fn is_open(&self) -> bool {
		!self.0.closed.get()
	}
}

impl Drop for MockHandle {
	fn drop(&mut self) {
		self.0.released.set(self.0.released.get() + 1);
	}
}

fn power_mate(config: Config) -> (PowerMate<MockDevice>, Bus) {
	let bus = Bus::default();
	(PowerMate::new(MockDevice(bus.clone()), config), bus)
}

fn auto_sync(strategy: SyncStrategy) -> Config {
	Config {
		strategy,
		auto_sync: true,
		..Config::default()
	}
}

#[test]
fn defaults_before_any_transfer() {
	let (pm, _) = power_mate(Config::default());

	assert_eq!(pm.brightness(), 255);
	assert_eq!(pm.pulse_table(), 0);
	assert_eq!(pm.pulse_speed(), 255);
	assert!(!pm.pulse_asleep());
	assert!(!pm.pulse_awake());
	assert!(!pm.auto_sync());
	assert!(!pm.connected());
	assert_eq!(pm.sync_state(), SyncState::Dirty);
}

#[test]
fn setters_clamp() {
	let (mut pm, _) = power_mate(Config::default());

	pm.set_brightness(-1).unwrap();
	assert_eq!(pm.brightness(), 0);
	pm.set_brightness(256).unwrap();
	assert_eq!(pm.brightness(), 255);

	pm.set_pulse_speed(-1).unwrap();
	assert_eq!(pm.pulse_speed(), 0);
	pm.set_pulse_speed(9999).unwrap();
	assert_eq!(pm.pulse_speed(), 510);

	pm.set_pulse_table(5).unwrap();
	assert_eq!(pm.pulse_table(), 2);
}

#[test]
fn auto_sync_sends_once_per_setter() {
	let (mut pm, bus) = power_mate(auto_sync(SyncStrategy::Packed));
	pm.connect().unwrap();

	pm.set_brightness(10).unwrap();
	assert_eq!(bus.sent(), vec![pack_state(pm.led_state())]);
	assert_eq!(pm.sync_state(), SyncState::Synced);

	pm.set_brightness(20).unwrap();
	pm.set_pulse_awake(true).unwrap();
	assert_eq!(bus.sent().len(), 3);
	assert_eq!(bus.sent()[2], pack_state(pm.led_state()));
}

#[test]
fn auto_sync_per_field() {
	let (mut pm, bus) = power_mate(auto_sync(SyncStrategy::PerField));
	pm.connect().unwrap();

	pm.set_brightness(100).unwrap();
	pm.set_pulse_asleep(true).unwrap();
	pm.set_pulse_table(1).unwrap();
	pm.set_pulse_speed(0).unwrap();

	assert_eq!(
		bus.sent(),
		vec![
			Transfer::new(0x0001, 100),
			Transfer::new(0x0002, 1),
			Transfer::new(0x0104, 0x0001),
			Transfer::new(0x0104, 0xFF00),
		]
	);
}

#[test]
fn deferred_until_sync() {
	let (mut pm, bus) = power_mate(Config::default());
	pm.connect().unwrap();

	pm.set_brightness(255).unwrap();
	pm.set_pulse_speed(255).unwrap();
	pm.set_pulse_awake(true).unwrap();
	assert!(bus.sent().is_empty());
	assert_eq!(pm.sync_state(), SyncState::Dirty);

	pm.sync().unwrap();
	assert_eq!(bus.sent(), vec![Transfer::new(0x0010, 0x00FF)]);
	assert_eq!(pm.sync_state(), SyncState::Synced);
}

#[test]
fn sync_is_idempotent() {
	let (mut pm, bus) = power_mate(Config::default());
	pm.connect().unwrap();
	pm.set_pulse_table(2).unwrap();

	pm.sync().unwrap();
	pm.sync().unwrap();

	let sent = bus.sent();
	assert_eq!(sent.len(), 2);
	assert_eq!(sent[0], sent[1]);
}

#[test]
fn per_field_sync_sends_every_field() {
	let (mut pm, bus) = power_mate(Config {
		strategy: SyncStrategy::PerField,
		..Config::default()
	});
	pm.connect().unwrap();

	pm.sync().unwrap();
	assert_eq!(bus.sent(), pm.transfers());
	assert_eq!(bus.sent().len(), 4);
}

#[test]
fn disconnected_skips_transport() {
	let (mut pm, bus) = power_mate(auto_sync(SyncStrategy::Packed));

	pm.set_brightness(3).unwrap();
	pm.set_pulse_asleep(true).unwrap();
	pm.sync().unwrap();

	assert!(bus.sent().is_empty());
	assert_eq!(bus.open.get(), 0);
	assert_eq!(pm.brightness(), 3);
	assert_eq!(pm.sync_state(), SyncState::Dirty);
}

#[test]
fn closed_handle_skips_transport() {
	let (mut pm, bus) = power_mate(auto_sync(SyncStrategy::PerField));
	pm.connect().unwrap();
	assert!(pm.connected());

	bus.closed.set(true);
	assert!(!pm.connected());

	pm.set_brightness(3).unwrap();
	pm.set_pulse_awake(true).unwrap();
	pm.sync().unwrap();

	assert!(bus.sent().is_empty());
	assert_eq!(pm.brightness(), 3);
	assert_eq!(pm.sync_state(), SyncState::Dirty);

	pm.connect().unwrap();
	assert!(pm.connected());
	assert_eq!(bus.open.get(), 2);
	assert_eq!(bus.released.get(), 1);

	pm.sync().unwrap();
	assert_eq!(bus.sent().len(), 4);
	assert_eq!(pm.sync_state(), SyncState::Synced);
}

#[test]
fn transport_errors_surface() {
	let (mut pm, bus) = power_mate(auto_sync(SyncStrategy::Packed));
	pm.connect().unwrap();
	bus.fail.set(true);

	let result = pm.set_brightness(42);
	assert!(matches!(result, Err(Error::Transport(TransportError::Stalled))));
	assert_eq!(pm.brightness(), 42);
	assert_eq!(pm.sync_state(), SyncState::Dirty);

	assert!(matches!(pm.sync(), Err(Error::Transport(TransportError::Stalled))));
}

#[test]
fn timeout_is_passed_through() {
	let timeout = Some(Duration::from_millis(250));
	let (mut pm, bus) = power_mate(Config {
		timeout,
		..Config::default()
	});
	pm.connect().unwrap();
	pm.sync().unwrap();

	assert_eq!(bus.sent.borrow()[0].1, timeout);
}

#[test]
fn pulse_starts_default_pulse() {
	let (mut pm, _) = power_mate(Config::default());
	pm.set_pulse_speed(12).unwrap();

	pm.pulse().unwrap();
	assert_eq!(pm.pulse_speed(), 255);
	assert!(pm.pulse_awake());
}

#[test]
fn connect_is_idempotent() {
	let (mut pm, bus) = power_mate(Config::default());

	pm.connect().unwrap();
	pm.connect().unwrap();
	assert_eq!(bus.open.get(), 1);

	pm.disconnect();
	pm.disconnect();
	assert_eq!(bus.released.get(), 1);
	assert!(!pm.connected());
}

#[test]
fn with_connection_releases_on_error() {
	let (mut pm, bus) = power_mate(Config::default());
	bus.fail.set(true);

	let result = pm.with_connection(|pm| {
		assert!(pm.connected());
		pm.sync()
	});

	assert!(result.is_err());
	assert!(!pm.connected());
	assert_eq!(bus.released.get(), 1);
}

#[test]
fn with_connection_releases_on_panic() {
	let (mut pm, bus) = power_mate(Config::default());

	let result = panic::catch_unwind(AssertUnwindSafe(|| {
		let _ = pm.with_connection(|_| -> powermate::Result<()> { panic!("boom") });
	}));

	assert!(result.is_err());
	assert!(!pm.connected());
	assert_eq!(bus.released.get(), 1);
}

#[test]
fn with_connection_keeps_existing_connection() {
	let (mut pm, bus) = power_mate(Config::default());
	pm.connect().unwrap();

	pm.with_connection(|pm| pm.sync()).unwrap();

	assert!(pm.connected());
	assert_eq!(bus.open.get(), 1);
	assert_eq!(bus.released.get(), 0);
}

#[test]
fn connection_guard_disconnects_on_drop() {
	let (mut pm, bus) = power_mate(auto_sync(SyncStrategy::Packed));

	{
		let mut connection = pm.connection().unwrap();
		connection.set_brightness(1).unwrap();
	}

	assert!(!pm.connected());
	assert_eq!(bus.sent().len(), 1);
}

#[test]
fn set_config_switches_strategy() {
	let (mut pm, bus) = power_mate(Config::default());
	pm.connect().unwrap();

	pm.set_config(auto_sync(SyncStrategy::PerField));
	assert!(pm.auto_sync());
	assert!(bus.sent().is_empty());

	pm.set_pulse_awake(true).unwrap();
	assert_eq!(bus.sent(), vec![Transfer::new(0x0003, 1)]);
}
