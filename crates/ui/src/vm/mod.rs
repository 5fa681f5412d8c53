mod player_vm;

pub use player_vm::{
    ActiveVideoVm, CourseProgressVm, PlaylistRowVm, map_active_video, map_course_progress,
    map_playlist_rows, video_src,
};
