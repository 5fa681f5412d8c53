mod ids;
mod playlist;
mod progress_map;
mod video;
mod watch;

pub use ids::{ParseIdError, VideoId};
pub use playlist::{Playlist, PlaylistError};
pub use progress_map::ProgressMap;
pub use video::{VideoEntry, VideoError, VideoSource};
pub use watch::{WatchRecord, WatchStatus};
