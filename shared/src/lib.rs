#![no_std]

mod event;
mod packing;
mod pulse;

pub use event::{Action, InputEvent, EVENT_SIZE};
pub use packing::{pack_field, pack_state, Field, LedState, Transfer};
pub use pulse::{encode_speed, PulseOp};

// https://github.com/torvalds/linux/blob/master/drivers/input/misc/powermate.c
pub const DEVICE_VENDOR_ID: u16 = 0x077D;
pub const DEVICE_PRODUCT_ID_NEW: u16 = 0x0410;
pub const DEVICE_PRODUCT_ID_OLD: u16 = 0x04AA;
pub const DEVICE_PRODUCT_IDS: [u16; 2] = [DEVICE_PRODUCT_ID_NEW, DEVICE_PRODUCT_ID_OLD];

/// Vendor request, host to device, recipient interface.
pub const REQUEST_TYPE: u8 = 0x41;
pub const REQUEST: u8 = 0x01;

pub const SET_STATIC_BRIGHTNESS: u16 = 0x01;
pub const SET_PULSE_ASLEEP: u16 = 0x02;
pub const SET_PULSE_AWAKE: u16 = 0x03;
pub const SET_PULSE_MODE: u16 = 0x04;

pub const MAX_BRIGHTNESS: u8 = 255;
/// The device stores three waveform presets.
pub const MAX_PULSE_TABLE: u8 = 2;
pub const MAX_PULSE_SPEED: u16 = 510;

pub const DEFAULT_BRIGHTNESS: u8 = MAX_BRIGHTNESS;
pub const DEFAULT_PULSE_TABLE: u8 = 0;
/// Maps to the steady pulse marker, see [`encode_speed`].
pub const DEFAULT_PULSE_SPEED: u16 = 255;

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;
pub const EV_MSC: u16 = 0x04;
pub const EV_LED: u16 = 0x11;

pub const BTN_0: u16 = 0x100;
pub const REL_DIAL: u16 = 0x07;
pub const MSC_PULSELED: u16 = 0x01;
