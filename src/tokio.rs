use std::io;

use powermate_shared::{InputEvent, EVENT_SIZE};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::Result;

/// Async version of [`crate::EventReader`].
pub struct AsyncEventReader<R> {
	reader: R,
}

impl AsyncEventReader<tokio::fs::File> {
	pub async fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
		Ok(Self::new(tokio::fs::File::open(path).await?))
	}
}

impl<R: AsyncRead + Unpin> AsyncEventReader<R> {
	pub fn new(reader: R) -> Self {
		Self { reader }
	}

	pub fn into_inner(self) -> R {
		self.reader
	}

	/// Waits for the next record, `None` once the stream ends on a record boundary.
	pub async fn next_event(&mut self) -> Result<Option<InputEvent>> {
		let mut buffer = [0u8; EVENT_SIZE];
		let mut filled = 0;

		while filled < EVENT_SIZE {
			match self.reader.read(&mut buffer[filled..]).await {
				Ok(0) if filled == 0 => return Ok(None),
				Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
				Ok(n) => filled += n,
				Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
				Err(e) => return Err(e.into()),
			}
		}

		Ok(Some(InputEvent::from_bytes(&buffer)))
	}
}
