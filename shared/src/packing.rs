use crate::{
	encode_speed,
	DEFAULT_BRIGHTNESS,
	DEFAULT_PULSE_SPEED,
	DEFAULT_PULSE_TABLE,
	MAX_BRIGHTNESS,
	MAX_PULSE_SPEED,
	MAX_PULSE_TABLE,
	SET_PULSE_ASLEEP,
	SET_PULSE_AWAKE,
	SET_PULSE_MODE,
	SET_STATIC_BRIGHTNESS,
};

/// The `value` and `index` fields of one control transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transfer {
	pub value: u16,
	pub index: u16,
}

impl Transfer {
	pub const fn new(value: u16, index: u16) -> Self {
		Self { value, index }
	}
}

/// One independently transferable aspect of the LED state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
	Brightness,
	PulseAsleep,
	PulseAwake,
	/// Pulse speed and pulse table travel together.
	PulseMode,
}

impl Field {
	pub const ALL: [Field; 4] = [Field::Brightness, Field::PulseAsleep, Field::PulseAwake, Field::PulseMode];
}

/// What the LED is assumed to show. The device can't be queried, so this is
/// never read back from hardware.
///
/// Every setter clamps into the field's valid range, so a `LedState` is always
/// packable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedState {
	brightness:   u8,
	pulse_table:  u8,
	pulse_speed:  u16,
	pulse_asleep: bool,
	pulse_awake:  bool,
}

impl Default for LedState {
	fn default() -> Self {
		Self {
			brightness:   DEFAULT_BRIGHTNESS,
			pulse_table:  DEFAULT_PULSE_TABLE,
			pulse_speed:  DEFAULT_PULSE_SPEED,
			pulse_asleep: false,
			pulse_awake:  false,
		}
	}
}

fn clamp(value: i32, max: u16) -> u16 {
	value.clamp(0, i32::from(max)) as u16
}

impl LedState {
	pub fn brightness(&self) -> u8 {
		self.brightness
	}

	pub fn pulse_table(&self) -> u8 {
		self.pulse_table
	}

	pub fn pulse_speed(&self) -> u16 {
		self.pulse_speed
	}

	pub fn pulse_asleep(&self) -> bool {
		self.pulse_asleep
	}

	pub fn pulse_awake(&self) -> bool {
		self.pulse_awake
	}

	pub fn set_brightness(&mut self, brightness: i32) {
		self.brightness = clamp(brightness, u16::from(MAX_BRIGHTNESS)) as u8;
	}

	pub fn set_pulse_table(&mut self, table: i32) {
		self.pulse_table = clamp(table, u16::from(MAX_PULSE_TABLE)) as u8;
	}

	pub fn set_pulse_speed(&mut self, speed: i32) {
		self.pulse_speed = clamp(speed, MAX_PULSE_SPEED);
	}

	pub fn set_pulse_asleep(&mut self, enabled: bool) {
		self.pulse_asleep = enabled;
	}

	pub fn set_pulse_awake(&mut self, enabled: bool) {
		self.pulse_awake = enabled;
	}
}

/// Packs the whole state into one transfer.
///
/// ```text
///  bit:  20      19        18-17        16-8        7-0
///        awake   asleep    pulse_table  pulse_speed brightness
/// ```
///
/// `value` carries bits 16 and up, `index` the low byte.
pub fn pack_state(state: &LedState) -> Transfer {
	let data = u32::from(state.brightness)
		| (u32::from(state.pulse_speed) << 8)
		| (u32::from(state.pulse_table) << 17)
		| (u32::from(state.pulse_asleep) << 19)
		| (u32::from(state.pulse_awake) << 20);

	Transfer::new((data >> 16) as u16, (data & 0xFF) as u16)
}

/// Packs a single field into its opcode transfer: opcode in `value`, payload in `index`.
pub fn pack_field(state: &LedState, field: Field) -> Transfer {
	match field {
		Field::Brightness => Transfer::new(SET_STATIC_BRIGHTNESS, u16::from(state.brightness)),
		Field::PulseAsleep => Transfer::new(SET_PULSE_ASLEEP, u16::from(state.pulse_asleep)),
		Field::PulseAwake => Transfer::new(SET_PULSE_AWAKE, u16::from(state.pulse_awake)),
		Field::PulseMode => {
			let (op, arg) = encode_speed(state.pulse_speed);
			Transfer::new(
				(u16::from(state.pulse_table) << 8) | SET_PULSE_MODE,
				(u16::from(arg) << 8) | op as u16,
			)
		}
	}
}
