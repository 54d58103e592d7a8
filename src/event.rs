use std::{
	fs::File,
	io::{self, Read},
	path::Path,
};

use powermate_shared::{InputEvent, EVENT_SIZE};

use crate::Result;

/// Reads input event records off a byte stream, e.g. the knob's event node.
pub struct EventReader<R> {
	reader: R,
}

impl EventReader<File> {
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		Ok(Self::new(File::open(path)?))
	}
}

impl<R: Read> EventReader<R> {
	pub fn new(reader: R) -> Self {
		Self { reader }
	}

	pub fn into_inner(self) -> R {
		self.reader
	}
}

impl<R: Read> Iterator for EventReader<R> {
	type Item = Result<InputEvent>;

	/// Ends at EOF on a record boundary, EOF halfway through a record is an error.
	fn next(&mut self) -> Option<Self::Item> {
		let mut buffer = [0u8; EVENT_SIZE];
		let mut filled = 0;

		while filled < EVENT_SIZE {
			match self.reader.read(&mut buffer[filled..]) {
				Ok(0) if filled == 0 => return None,
				Ok(0) => return Some(Err(io::Error::from(io::ErrorKind::UnexpectedEof).into())),
				Ok(n) => filled += n,
				Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
				Err(e) => return Some(Err(e.into())),
			}
		}

		Some(Ok(InputEvent::from_bytes(&buffer)))
	}
}
