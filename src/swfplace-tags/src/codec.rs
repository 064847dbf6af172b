use swfplace_amf3::serde::Serializer;
use swfplace_bit_buf::{BitReader, BitWriter};

use crate::{
    diagnostics::{Diagnostics, Logged},
    field_table, CodecOptions, DecodeError, EmbeddedValue, EncodeError, OpaquePolicy, PlaceFlags,
    PlaceObject, Version,
};

/// A decoder and encoder for placement records.
///
/// The codec is immutable after construction; all state of a
/// decode or encode lives on the stack of the call, so a single
/// instance may be shared between threads.
#[derive(Clone, Debug)]
pub struct PlaceCodec {
    options: CodecOptions,
    amf: Serializer,
}

impl Default for PlaceCodec {
    fn default() -> Self {
        Self::new(CodecOptions::default())
    }
}

impl PlaceCodec {
    /// Creates a new codec with its configuration.
    pub fn new(options: CodecOptions) -> Self {
        let amf = Serializer::new(options.amf.clone());
        Self { options, amf }
    }

    /// Gets the codec configuration in use.
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Gets the serializer for embedded values.
    pub fn serializer(&self) -> &Serializer {
        &self.amf
    }

    /// Decodes a record body of the given revision from `reader`,
    /// logging diagnostic events.
    ///
    /// For PlaceObject4, all bytes left in the reader are taken to be
    /// the embedded value.
    pub fn decode(
        &self,
        reader: &mut BitReader<'_>,
        version: Version,
    ) -> Result<PlaceObject, DecodeError> {
        self.decode_with(reader, version, &mut Logged)
    }

    /// Decodes a record body like [`PlaceCodec::decode`], reporting
    /// diagnostic events to `diagnostics`.
    pub fn decode_with<D: Diagnostics>(
        &self,
        reader: &mut BitReader<'_>,
        version: Version,
        diagnostics: &mut D,
    ) -> Result<PlaceObject, DecodeError> {
        let flags = read_flags(reader, version)?;
        log::debug!("Decoding {version} record with flags {:#06x}", flags.bits());

        let undefined = flags.difference(version.defined_flags());
        if !undefined.is_empty() {
            return Err(DecodeError::MalformedFlags {
                version,
                bits: undefined.bits(),
            });
        }

        let mut record = PlaceObject::new(reader.read_u16()?);
        record.move_flag = flags.contains(PlaceFlags::MOVE);
        record.has_image = flags.contains(PlaceFlags::HAS_IMAGE);

        for spec in field_table(version) {
            if flags.contains(spec.flag) {
                log::trace!("Reading {}", spec.field);
                spec.decode(reader, &self.options, &mut record)?;
            }
        }

        if version.has_embedded_value() {
            record.embedded_value = self.decode_embedded(reader, record.depth, diagnostics)?;
        }

        Ok(record)
    }

    fn decode_embedded<D: Diagnostics>(
        &self,
        reader: &mut BitReader<'_>,
        depth: u16,
        diagnostics: &mut D,
    ) -> Result<Option<EmbeddedValue>, DecodeError> {
        let tail = reader.remainder();
        if tail.is_empty() {
            return Ok(None);
        }

        let value = EmbeddedValue::decode(&self.amf, tail)?;
        match &value {
            EmbeddedValue::Decoded { trailing, .. } if !trailing.is_empty() => {
                diagnostics.embedded_value_trailing_bytes(depth, trailing.len());
            }
            EmbeddedValue::Decoded { .. } => {}
            EmbeddedValue::OpaqueCapture(capture) => {
                diagnostics.embedded_value_undecodable(depth, capture.reason());
            }
        }
        reader.skip_bytes(tail.len())?;

        Ok(Some(value))
    }

    /// Encodes `record` as a record body of the given revision and
    /// appends it to `writer`.
    ///
    /// The record is assembled in scratch space first; on error,
    /// nothing is written.
    pub fn encode(
        &self,
        record: &PlaceObject,
        version: Version,
        writer: &mut BitWriter,
    ) -> Result<(), EncodeError> {
        if let Some(field) = record.illegal_fields(version).next() {
            return Err(EncodeError::FieldNotLegal { field, version });
        }

        let embedded = self.encode_embedded(record)?;

        let mut flags = PlaceFlags::empty();
        flags.set(PlaceFlags::MOVE, record.move_flag);
        flags.set(PlaceFlags::HAS_IMAGE, record.has_image);
        for spec in field_table(version) {
            if spec.is_present(record) {
                flags |= spec.flag;
            }
        }
        log::debug!("Encoding {version} record with flags {:#06x}", flags.bits());

        let mut scratch = BitWriter::new();
        write_flags(&mut scratch, flags, version);
        scratch.write_u16(record.depth);
        for spec in field_table(version) {
            if spec.is_present(record) {
                log::trace!("Writing {}", spec.field);
                spec.encode(record, &self.options, &mut scratch)?;
            }
        }
        scratch.write_bytes(&embedded);

        writer.write_bytes(&scratch.into_inner());
        Ok(())
    }

    /// Encodes `record` into a new buffer.
    pub fn encode_to_vec(
        &self,
        record: &PlaceObject,
        version: Version,
    ) -> Result<Vec<u8>, EncodeError> {
        let mut writer = BitWriter::new();
        self.encode(record, version, &mut writer)?;
        Ok(writer.into_inner())
    }

    fn encode_embedded(&self, record: &PlaceObject) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        match &record.embedded_value {
            None => {}
            Some(EmbeddedValue::Decoded { value, trailing }) => {
                self.amf.serialize(value, &mut out)?;
                out.extend_from_slice(trailing);
            }
            Some(EmbeddedValue::OpaqueCapture(capture)) => match self.options.opaque_policy {
                OpaquePolicy::Reject => {
                    return Err(EncodeError::ReEncodeUnsupported {
                        reason: capture.reason().clone(),
                    })
                }
                OpaquePolicy::Passthrough => {
                    log::debug!(
                        "Writing {} opaque bytes of the object at depth {}",
                        capture.bytes().len(),
                        record.depth
                    );
                    out.extend_from_slice(capture.bytes());
                }
            },
        }

        Ok(out)
    }
}

fn read_flags(reader: &mut BitReader<'_>, version: Version) -> Result<PlaceFlags, DecodeError> {
    let high = reader.read_u8()? as u16;
    let low = match version.flag_width() {
        16 => reader.read_u8()? as u16,
        _ => 0,
    };

    Ok(PlaceFlags::from_bits_retain(high << 8 | low))
}

fn write_flags(writer: &mut BitWriter, flags: PlaceFlags, version: Version) {
    let [high, low] = flags.bits().to_be_bytes();
    writer.write_u8(high);
    if version.flag_width() == 16 {
        writer.write_u8(low);
    }
}
