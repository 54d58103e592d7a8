use crate::{BTN_0, EV_KEY, EV_REL, REL_DIAL};

pub const EVENT_SIZE: usize = 16;

/// One input event record as the knob reports it: `i32 sec, i32 usec, u16 type, u16 code, i32 value`,
/// little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputEvent {
	pub sec:   i32,
	pub usec:  i32,
	pub kind:  u16,
	pub code:  u16,
	pub value: i32,
}

/// What a user did to the knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
	/// Positive is clockwise.
	Rotate(i32),
	Press,
	Release,
	Other,
}

impl InputEvent {
	pub fn from_bytes(bytes: &[u8; EVENT_SIZE]) -> Self {
		let i32_at = |at: usize| i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
		let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);

		Self {
			sec:   i32_at(0),
			usec:  i32_at(4),
			kind:  u16_at(8),
			code:  u16_at(10),
			value: i32_at(12),
		}
	}

	pub fn action(&self) -> Action {
		match (self.kind, self.code) {
			(EV_REL, REL_DIAL) => Action::Rotate(self.value),
			(EV_KEY, BTN_0) if self.value == 0 => Action::Release,
			(EV_KEY, BTN_0) => Action::Press,
			_ => Action::Other,
		}
	}
}
