use std::{env, thread, time::Duration};

use color_eyre::eyre::Result;
use powermate::{Config, PowerMate, SyncStrategy};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	// e.g. `cargo run --example pulse -- per-field`
	let strategy = match env::args().nth(1) {
		Some(arg) => arg.parse::<SyncStrategy>()?,
		None => SyncStrategy::default(),
	};

	let mut power_mate = PowerMate::find(Config {
		strategy,
		auto_sync: true,
		timeout: Some(Duration::from_millis(500)),
	})?;
	info!(device = %power_mate.device(), %strategy, "using powermate");

	power_mate.with_connection(|pm| {
		for brightness in (0..=255).step_by(5).chain((0..=255).rev().step_by(5)) {
			pm.set_brightness(brightness)?;
			thread::sleep(Duration::from_millis(10));
		}

		for table in 0..=2 {
			pm.set_pulse_table(table)?;
			for speed in [0, 255, 510] {
				info!(table, speed, "pulsing");
				pm.set_pulse_speed(speed)?;
				pm.set_pulse_awake(true)?;
				thread::sleep(Duration::from_secs(2));
			}
		}

		pm.set_pulse_awake(false)?;
		pm.set_brightness(255)
	})?;

	Ok(())
}
