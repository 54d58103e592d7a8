use std::{fmt, str::FromStr};

use powermate_shared::{pack_field, pack_state, Field, LedState, Transfer};

/// Which transfer shape carries state to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SyncStrategy {
	/// The whole state packed into a single transfer.
	#[default]
	Packed,
	/// One opcode transfer per field.
	PerField,
}

impl fmt::Display for SyncStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncStrategy::Packed => f.write_str("packed"),
			SyncStrategy::PerField => f.write_str("per-field"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sync strategy \"{0}\" (expected \"packed\" or \"per-field\")")]
pub struct ParseStrategyError(String);

impl FromStr for SyncStrategy {
	type Err = ParseStrategyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"packed" => Ok(SyncStrategy::Packed),
			"per-field" | "per_field" | "perfield" => Ok(SyncStrategy::PerField),
			_ => Err(ParseStrategyError(s.to_string())),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncState {
	/// Mutated since the last transfer, or never sent at all.
	Dirty,
	/// Matches the last transfer sent.
	Synced,
}

/// Decides what gets sent after each mutation.
///
/// Starts [`SyncState::Dirty`] since the defaults have never reached the device.
#[derive(Debug, Clone)]
pub struct SyncPolicy {
	strategy:  SyncStrategy,
	auto_sync: bool,
	state:     SyncState,
}

impl SyncPolicy {
	pub fn new(strategy: SyncStrategy, auto_sync: bool) -> Self {
		Self {
			strategy,
			auto_sync,
			state: SyncState::Dirty,
		}
	}

	pub fn strategy(&self) -> SyncStrategy {
		self.strategy
	}

	pub fn set_strategy(&mut self, strategy: SyncStrategy) {
		self.strategy = strategy;
	}

	pub fn auto_sync(&self) -> bool {
		self.auto_sync
	}

	pub fn set_auto_sync(&mut self, auto_sync: bool) {
		self.auto_sync = auto_sync;
	}

	pub fn state(&self) -> SyncState {
		self.state
	}

	/// Records that `field` changed and returns what has to be sent right away.
	///
	/// Empty unless auto-sync is on.
	pub fn mutated(&mut self, led: &LedState, field: Field) -> Vec<Transfer> {
		self.state = SyncState::Dirty;

		if !self.auto_sync {
			return Vec::new();
		}

		match self.strategy {
			SyncStrategy::Packed => vec![pack_state(led)],
			SyncStrategy::PerField => vec![pack_field(led, field)],
		}
	}

	/// Transfers that bring the device fully up to date with `led`.
	pub fn full_sync(&self, led: &LedState) -> Vec<Transfer> {
		match self.strategy {
			SyncStrategy::Packed => vec![pack_state(led)],
			SyncStrategy::PerField => Field::ALL.iter().map(|&field| pack_field(led, field)).collect(),
		}
	}

	/// Call once every transfer returned by [`Self::mutated`] or [`Self::full_sync`] went out.
	pub fn synced(&mut self) {
		self.state = SyncState::Synced;
	}
}
