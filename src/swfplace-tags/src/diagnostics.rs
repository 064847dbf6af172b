//! Receivers for non-fatal events during record decoding.

use swfplace_amf3::serde::Undecodable;

/// Defines common handlers for diagnostic events during
/// the decoding routine.
///
/// None of these events fail a decode; implementations can
/// customize how they want to receive and process them.
pub trait Diagnostics {
    /// Called when the embedded value of the record at `depth`
    /// was kept as opaque bytes.
    fn embedded_value_undecodable(&mut self, depth: u16, reason: &Undecodable);

    /// Called when `count` bytes of the record at `depth` follow its
    /// decoded embedded value.
    fn embedded_value_trailing_bytes(&mut self, depth: u16, count: usize);
}

/// Receiver which forwards all events to the [`log`] facade.
///
/// This is what [`PlaceCodec::decode`][crate::PlaceCodec::decode] uses.
#[derive(Clone, Copy, Debug, Default)]
pub struct Logged;

impl Diagnostics for Logged {
    fn embedded_value_undecodable(&mut self, depth: u16, reason: &Undecodable) {
        log::warn!(
            "Embedded value of the object at depth {depth} references {reason}; keeping its raw bytes"
        );
    }

    fn embedded_value_trailing_bytes(&mut self, depth: u16, count: usize) {
        log::warn!("Embedded value of the object at depth {depth} is followed by {count} bytes");
    }
}

/// Quiet receiver which does not produce any output.
#[derive(Clone, Copy, Debug, Default)]
pub struct Quiet;

impl Diagnostics for Quiet {
    fn embedded_value_undecodable(&mut self, _depth: u16, _reason: &Undecodable) {}

    fn embedded_value_trailing_bytes(&mut self, _depth: u16, _count: usize) {}
}

/// An event recorded by [`Collected`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    EmbeddedValueUndecodable { depth: u16, reason: Undecodable },
    EmbeddedValueTrailingBytes { depth: u16, count: usize },
}

/// Receiver which stores all events for later inspection.
#[derive(Clone, Debug, Default)]
pub struct Collected {
    pub events: Vec<Event>,
}

impl Diagnostics for Collected {
    fn embedded_value_undecodable(&mut self, depth: u16, reason: &Undecodable) {
        self.events.push(Event::EmbeddedValueUndecodable {
            depth,
            reason: reason.clone(),
        });
    }

    fn embedded_value_trailing_bytes(&mut self, depth: u16, count: usize) {
        self.events
            .push(Event::EmbeddedValueTrailingBytes { depth, count });
    }
}
