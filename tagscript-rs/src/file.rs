//! Read-only view of the file a script is being evaluated for.
//!
//! Only `$matchedtracks()` and `$is_complete()` consult it, and only when the
//! file belongs to an album that is being matched.  Tagging scripts run
//! without a file context.

/// Album-level facts exposed to scripts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlbumInfo {
    /// Tracks in the album linked to exactly one file.
    pub matched_tracks: usize,
    /// Every track in the album is matched to a single file.
    pub complete: bool,
}

/// Collaborator interface implemented by the host's file objects.
pub trait FileContext {
    /// The containing album, if this file is part of one being matched.
    fn album(&self) -> Option<AlbumInfo>;
}

/// A fixed file context, handy for tests and the command-line runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticFile {
    pub album: Option<AlbumInfo>,
}

impl StaticFile {
    /// A file that is not attached to any album.
    pub fn standalone() -> Self {
        Self { album: None }
    }

    /// A file inside an album with the given match state.
    pub fn in_album(matched_tracks: usize, complete: bool) -> Self {
        Self {
            album: Some(AlbumInfo { matched_tracks, complete }),
        }
    }
}

impl FileContext for StaticFile {
    fn album(&self) -> Option<AlbumInfo> {
        self.album
    }
}
