use crate::MAX_PULSE_SPEED;

/// Segment selector of the pulse engine's speed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PulseOp {
	/// Slower than the default, `arg` is how much slower.
	FadeDown = 0,
	/// The default pulse rate, `arg` is always zero.
	Steady = 1,
	/// Faster than the default, `arg` is how much faster.
	FadeUp = 2,
}

/// Maps a logical pulse speed in `0..=510` to the `(op, arg)` pair the pulse engine consumes.
///
/// | speed      | op         | arg           |
/// |------------|------------|---------------|
/// | `0..=254`  | `FadeDown` | `255 - speed` |
/// | `255`      | `Steady`   | `0`           |
/// | `256..=510`| `FadeUp`   | `speed - 255` |
///
/// # Panics
///
/// If `speed` is above [`MAX_PULSE_SPEED`]. Speeds are clamped when they are stored,
/// so an out of range value here is a bug in the caller.
pub fn encode_speed(speed: u16) -> (PulseOp, u8) {
	assert!(
		speed <= MAX_PULSE_SPEED,
		"pulse speed {speed} out of range (max {MAX_PULSE_SPEED})"
	);

	match speed {
		0..=254 => (PulseOp::FadeDown, (255 - speed) as u8),
		255 => (PulseOp::Steady, 0),
		_ => (PulseOp::FadeUp, (speed - 255) as u8),
	}
}
