//! Library model objects carried inside domain events.
//!
//! Every model flattens to a JSON object tagged with `"__model__"` naming
//! its type, at every nesting level: a track inside a tracklist entry, and
//! the album and artists inside that track, all carry their own tag. Unset
//! optional fields and empty collections are left out.

use serde::{Serialize, Serializer};

/// Kind of item a [`Ref`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefType {
    /// An album.
    Album,
    /// An artist.
    Artist,
    /// A browsable directory.
    Directory,
    /// A playlist.
    Playlist,
    /// A single track.
    Track,
}

/// Lightweight reference to a library item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ref {
    /// Item URI.
    pub uri: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// What the URI points at.
    #[serde(rename = "type")]
    pub ref_type: RefType,
}

/// A performing or composing artist.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Artist {
    /// Artist URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Artist name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Name used when sorting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sortname: Option<String>,
    /// MusicBrainz identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub musicbrainz_id: Option<String>,
}

/// An album and its release metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Album {
    /// Album URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Album title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Album artists.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "tagged_seq")]
    pub artists: Vec<Artist>,
    /// Number of tracks on the album.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_tracks: Option<u32>,
    /// Number of discs in the release.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_discs: Option<u32>,
    /// Release date, `YYYY` or `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// MusicBrainz identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub musicbrainz_id: Option<String>,
}

/// A playable track.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Track {
    /// Track URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Track title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Track artists.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "tagged_seq")]
    pub artists: Vec<Artist>,
    /// Album the track belongs to.
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "tagged_option")]
    pub album: Option<Album>,
    /// Composers.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "tagged_seq")]
    pub composers: Vec<Artist>,
    /// Performers.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "tagged_seq")]
    pub performers: Vec<Artist>,
    /// Genre tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Position on the disc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_no: Option<u32>,
    /// Disc number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disc_no: Option<u32>,
    /// Release date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Length in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    /// Bitrate in kbit/s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
    /// Free-form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// MusicBrainz identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub musicbrainz_id: Option<String>,
    /// Modification time in milliseconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
}

/// A track placed in the tracklist, paired with its tracklist id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TlTrack {
    /// Tracklist id, unique within the current tracklist.
    pub tlid: u64,
    /// The queued track.
    #[serde(serialize_with = "tagged")]
    pub track: Track,
}

/// A stored playlist.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Playlist {
    /// Playlist URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Playlist name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tracks in playlist order.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "tagged_seq")]
    pub tracks: Vec<Track>,
    /// Modification time in milliseconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
}

/// Artwork for a library item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    /// Image URI.
    pub uri: String,
    /// Width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// A model type and the name written to its `__model__` key.
pub trait ModelType: Serialize {
    /// Type name written to the `__model__` key.
    const NAME: &'static str;
}

/// `value`'s fields with the `__model__` key written first.
#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "__model__")]
    model: &'static str,
    #[serde(flatten)]
    value: &'a T,
}

impl<'a, T: ModelType> Tagged<'a, T> {
    const fn new(value: &'a T) -> Self {
        Self {
            model: T::NAME,
            value,
        }
    }
}

fn tagged<T: ModelType, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    Tagged::new(value).serialize(serializer)
}

fn tagged_option<T: ModelType, S: Serializer>(
    value: &Option<T>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.serialize_some(&Tagged::new(value)),
        None => serializer.serialize_none(),
    }
}

fn tagged_seq<T: ModelType, S: Serializer>(
    values: &[T],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().map(Tagged::new))
}

/// Any model value, tagged with its type name when serialized.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    /// See [`Ref`].
    Ref(Ref),
    /// See [`Artist`].
    Artist(Artist),
    /// See [`Album`].
    Album(Album),
    /// See [`Track`].
    Track(Track),
    /// See [`TlTrack`].
    TlTrack(TlTrack),
    /// See [`Playlist`].
    Playlist(Playlist),
    /// See [`Image`].
    Image(Image),
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ref(value) => tagged(value, serializer),
            Self::Artist(value) => tagged(value, serializer),
            Self::Album(value) => tagged(value, serializer),
            Self::Track(value) => tagged(value, serializer),
            Self::TlTrack(value) => tagged(value, serializer),
            Self::Playlist(value) => tagged(value, serializer),
            Self::Image(value) => tagged(value, serializer),
        }
    }
}

macro_rules! impl_model {
    ($($ty:ident),* $(,)?) => {
        $(
            impl ModelType for $ty {
                const NAME: &'static str = stringify!($ty);
            }

            impl From<$ty> for Model {
                fn from(value: $ty) -> Self {
                    Self::$ty(value)
                }
            }
        )*
    };
}

impl_model!(Ref, Artist, Album, Track, TlTrack, Playlist, Image);
