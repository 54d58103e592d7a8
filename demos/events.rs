use std::env;

use eyre::{eyre, Result};
use powermate::{tokio::AsyncEventReader, Action, Config, PowerMate};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Turns the knob into a brightness dial.
///
/// Takes the knob's event node, e.g. `/dev/input/by-id/usb-Griffin_Technology__Inc._Griffin_PowerMate-event-if00`.
#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	let path = env::args().nth(1).ok_or_else(|| eyre!("usage: events <event device>"))?;

	let mut power_mate = PowerMate::find(Config {
		auto_sync: true,
		..Config::default()
	})?;
	power_mate.connect()?;

	let mut events = AsyncEventReader::open(&path).await?;

	while let Some(event) = events.next_event().await? {
		match event.action() {
			Action::Rotate(delta) => {
				let brightness = i32::from(power_mate.brightness()) + delta * 4;
				power_mate.set_brightness(brightness)?;
				info!(brightness = power_mate.brightness(), "rotated");
			}
			Action::Press => {
				let pulsing = power_mate.pulse_awake();
				power_mate.set_pulse_awake(!pulsing)?;
				info!(pulsing = !pulsing, "pressed");
			}
			Action::Release | Action::Other => {}
		}
	}

	power_mate.disconnect();

	Ok(())
}
