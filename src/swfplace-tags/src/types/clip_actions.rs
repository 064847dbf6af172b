use bitflags::bitflags;
use swfplace_bit_buf::{BitReader, BitWriter};

use crate::{CodecOptions, DecodeError, EncodeError, Field};

const FIELD: Field = Field::ClipActions;

bitflags! {
    /// The events a clip action handles (`CLIPEVENTFLAGS`).
    ///
    /// The first byte on the wire is the lowest byte of the value.
    /// Files before SWF 6 only store the lower two bytes.
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ClipEventFlags: u32 {
        const KEY_UP = 1 << 7;
        const KEY_DOWN = 1 << 6;
        const MOUSE_UP = 1 << 5;
        const MOUSE_DOWN = 1 << 4;
        const MOUSE_MOVE = 1 << 3;
        const UNLOAD = 1 << 2;
        const ENTER_FRAME = 1 << 1;
        const LOAD = 1 << 0;

        const DRAG_OVER = 1 << 15;
        const ROLL_OUT = 1 << 14;
        const ROLL_OVER = 1 << 13;
        const RELEASE_OUTSIDE = 1 << 12;
        const RELEASE = 1 << 11;
        const PRESS = 1 << 10;
        const INITIALIZE = 1 << 9;
        const DATA = 1 << 8;

        const CONSTRUCT = 1 << 18;
        /// The record stores the key code it reacts to.
        const KEY_PRESS = 1 << 17;
        const DRAG_OUT = 1 << 16;
    }
}

/// One event handler of a clip (`CLIPACTIONRECORD`).
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClipActionRecord {
    pub event_flags: ClipEventFlags,
    /// Present exactly when the flags contain
    /// [`ClipEventFlags::KEY_PRESS`].
    pub key_code: Option<u8>,
    /// The undecoded ActionScript bytecode of the handler.
    pub actions: Vec<u8>,
}

/// The event handler table of a clip (`CLIPACTIONS`).
///
/// The reserved leading word is kept as read so it encodes back
/// unchanged; it does not take part in comparisons.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default)]
pub struct ClipActions {
    /// Union of the events of all records.
    pub all_event_flags: ClipEventFlags,
    pub records: Vec<ClipActionRecord>,
    #[cfg_attr(feature = "serde", serde(skip))]
    reserved: u16,
}

impl PartialEq for ClipActions {
    fn eq(&self, other: &Self) -> bool {
        self.all_event_flags == other.all_event_flags && self.records == other.records
    }
}

impl Eq for ClipActions {}

fn read_event_flags(
    reader: &mut BitReader<'_>,
    options: &CodecOptions,
) -> Result<ClipEventFlags, DecodeError> {
    let bits = if options.wide_clip_events() {
        reader.read_u32()?
    } else {
        reader.read_u16()? as u32
    };

    Ok(ClipEventFlags::from_bits_retain(bits))
}

fn write_event_flags(
    flags: ClipEventFlags,
    writer: &mut BitWriter,
    options: &CodecOptions,
) -> Result<(), EncodeError> {
    if options.wide_clip_events() {
        writer.write_u32(flags.bits());
    } else {
        let bits = u16::try_from(flags.bits())
            .map_err(|_| EncodeError::ValueOutOfRange { field: FIELD })?;
        writer.write_u16(bits);
    }

    Ok(())
}

impl ClipActions {
    pub fn new(all_event_flags: ClipEventFlags, records: Vec<ClipActionRecord>) -> Self {
        Self {
            all_event_flags,
            records,
            reserved: 0,
        }
    }

    pub fn read(reader: &mut BitReader<'_>, options: &CodecOptions) -> Result<Self, DecodeError> {
        let reserved = reader.read_u16()?;
        let all_event_flags = read_event_flags(reader, options)?;

        let mut records = Vec::new();
        loop {
            // A record without events terminates the list.
            let event_flags = read_event_flags(reader, options)?;
            if event_flags.is_empty() {
                break;
            }

            let mut size = reader.read_u32()? as usize;
            let key_code = if event_flags.contains(ClipEventFlags::KEY_PRESS) {
                size = size.checked_sub(1).ok_or(DecodeError::MalformedField {
                    field: FIELD,
                    reason: "action size does not cover the key code",
                })?;
                Some(reader.read_u8()?)
            } else {
                None
            };
            let actions = reader.read_bytes(size)?.to_vec();

            records.push(ClipActionRecord {
                event_flags,
                key_code,
                actions,
            });
        }

        log::trace!("Read {} clip action records", records.len());

        Ok(Self {
            all_event_flags,
            records,
            reserved,
        })
    }

    pub fn write(&self, writer: &mut BitWriter, options: &CodecOptions) -> Result<(), EncodeError> {
        writer.write_u16(self.reserved);
        write_event_flags(self.all_event_flags, writer, options)?;

        for record in &self.records {
            let has_key = record.event_flags.contains(ClipEventFlags::KEY_PRESS);
            if record.event_flags.is_empty() || has_key != record.key_code.is_some() {
                return Err(EncodeError::ValueOutOfRange { field: FIELD });
            }

            let size = u32::try_from(record.actions.len() + has_key as usize)
                .map_err(|_| EncodeError::ValueOutOfRange { field: FIELD })?;

            write_event_flags(record.event_flags, writer, options)?;
            writer.write_u32(size);
            if let Some(key) = record.key_code {
                writer.write_u8(key);
            }
            writer.write_bytes(&record.actions);
        }

        write_event_flags(ClipEventFlags::empty(), writer, options)
    }
}
