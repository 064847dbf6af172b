use swfplace_amf3::serde::SerializerOptions;

/// What to do when encoding an embedded value that was captured
/// as opaque bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpaquePolicy {
    /// Fail the encode with
    /// [`EncodeError::ReEncodeUnsupported`][crate::EncodeError::ReEncodeUnsupported].
    #[default]
    Reject,
    /// Write the captured bytes back verbatim.
    ///
    /// This makes decoded records round-trip byte for byte, at the
    /// cost of emitting data the codec never understood.
    Passthrough,
}

/// Codec configuration which influences how records are interpreted.
#[derive(Clone, Debug)]
pub struct CodecOptions {
    /// The version of the SWF file the records belong to.
    ///
    /// Clip event flags are 32 bits wide since SWF 6 and 16 bits
    /// before.
    pub swf_version: u8,
    /// Handling of opaque embedded values on encode.
    pub opaque_policy: OpaquePolicy,
    /// Configuration of the embedded AMF3 serializer.
    pub amf: SerializerOptions,
}

impl CodecOptions {
    /// Whether clip event flags use the 32-bit encoding.
    #[inline]
    pub fn wide_clip_events(&self) -> bool {
        self.swf_version >= 6
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            swf_version: 19,
            opaque_policy: OpaquePolicy::Reject,
            amf: SerializerOptions::default(),
        }
    }
}
