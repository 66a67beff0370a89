//! Domain events emitted by the player backend.
//!
//! A [`DomainEvent`] is an event name plus a set of uniquely named
//! [`FieldValue`]s. The frontend treats every event the same way: it never
//! filters on the name, it only forwards.

use serde::ser::{Error as _, Serialize, Serializer};

use super::model::{Album, Artist, Image, Model, Playlist, Ref, TlTrack, Track};

/// A single event field.
///
/// Primitive JSON values, lists, and [`Model`] objects all have a JSON
/// form. [`FieldValue::Unsupported`] stands for a backend value without
/// one; encoding it fails.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// JSON `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number. Non-finite values cannot be encoded.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Ordered list of values.
    List(Vec<FieldValue>),
    /// A library model, flattened to its field mapping.
    Model(Box<Model>),
    /// A value of the named type that has no JSON form.
    Unsupported(&'static str),
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            Self::Float(v) => Err(S::Error::custom(format!(
                "non-finite float {v} is not valid JSON"
            ))),
            Self::Str(v) => serializer.serialize_str(v),
            Self::List(items) => serializer.collect_seq(items),
            Self::Model(model) => model.serialize(serializer),
            Self::Unsupported(type_name) => Err(S::Error::custom(format!(
                "{type_name} is not JSON serializable"
            ))),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Model> for FieldValue {
    fn from(v: Model) -> Self {
        Self::Model(Box::new(v))
    }
}

macro_rules! impl_from_model_type {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    Self::Model(Box::new(Model::from(v)))
                }
            }
        )*
    };
}

impl_from_model_type!(Ref, Artist, Album, Track, TlTrack, Playlist, Image);

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Playback state reported by `playback_state_changed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing is playing.
    Stopped,
    /// A track is playing.
    Playing,
    /// Playback is paused.
    Paused,
}

impl PlaybackState {
    /// Wire name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

/// Notification of a backend state change.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainEvent {
    name: String,
    fields: Vec<(String, FieldValue)>,
}

impl DomainEvent {
    /// Creates an event with no fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field, replacing an existing field of the same name.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    /// Event kind, e.g. `track_playback_started`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the event carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `track_playback_started(tl_track)`.
    #[must_use]
    pub fn track_playback_started(tl_track: TlTrack) -> Self {
        Self::new("track_playback_started").with_field("tl_track", tl_track)
    }

    /// `track_playback_paused(tl_track, time_position)`.
    #[must_use]
    pub fn track_playback_paused(tl_track: TlTrack, time_position: i64) -> Self {
        Self::new("track_playback_paused")
            .with_field("tl_track", tl_track)
            .with_field("time_position", time_position)
    }

    /// `track_playback_resumed(tl_track, time_position)`.
    #[must_use]
    pub fn track_playback_resumed(tl_track: TlTrack, time_position: i64) -> Self {
        Self::new("track_playback_resumed")
            .with_field("tl_track", tl_track)
            .with_field("time_position", time_position)
    }

    /// `track_playback_ended(tl_track, time_position)`.
    #[must_use]
    pub fn track_playback_ended(tl_track: TlTrack, time_position: i64) -> Self {
        Self::new("track_playback_ended")
            .with_field("tl_track", tl_track)
            .with_field("time_position", time_position)
    }

    /// `playback_state_changed(old_state, new_state)`.
    #[must_use]
    pub fn playback_state_changed(old_state: PlaybackState, new_state: PlaybackState) -> Self {
        Self::new("playback_state_changed")
            .with_field("old_state", old_state.as_str())
            .with_field("new_state", new_state.as_str())
    }

    /// `tracklist_changed()`.
    #[must_use]
    pub fn tracklist_changed() -> Self {
        Self::new("tracklist_changed")
    }

    /// `volume_changed(volume)`.
    #[must_use]
    pub fn volume_changed(volume: u32) -> Self {
        Self::new("volume_changed").with_field("volume", volume)
    }

    /// `mute_changed(mute)`.
    #[must_use]
    pub fn mute_changed(mute: bool) -> Self {
        Self::new("mute_changed").with_field("mute", mute)
    }

    /// `seeked(time_position)`.
    #[must_use]
    pub fn seeked(time_position: i64) -> Self {
        Self::new("seeked").with_field("time_position", time_position)
    }

    /// `stream_title_changed(title)`.
    #[must_use]
    pub fn stream_title_changed(title: impl Into<String>) -> Self {
        Self::new("stream_title_changed").with_field("title", title.into())
    }
}
