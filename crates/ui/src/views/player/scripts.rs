use dioxus::document::eval;

pub(super) const VIDEO_ELEMENT_ID: &str = "course-video";

/// Returns `[currentTime, duration]` of the player, or `null` when absent.
pub(super) fn playback_position_script() -> String {
    format!(
        r#"const video = document.getElementById({VIDEO_ELEMENT_ID:?});
            if (!video) {{
                return null;
            }}
            return [video.currentTime, video.duration];"#
    )
}

/// Resumes playback if the element exists and is paused.
pub(super) fn resume_playback_script() -> String {
    format!(
        r#"const video = document.getElementById({VIDEO_ELEMENT_ID:?});
            if (video && video.paused) {{
                video.play().catch(() => {{}});
            }}
            return null;"#
    )
}

pub(super) fn scroll_to_top_script() -> &'static str {
    r#"window.scrollTo({ top: 0, behavior: "smooth" });
        return null;"#
}

/// `(current_time, duration)` in seconds, or `None` if the element is gone
/// or the duration is not known yet.
pub(super) async fn read_playback_position() -> Option<(f64, f64)> {
    let script = playback_position_script();
    eval(&script).join::<Option<(f64, f64)>>().await.ok().flatten()
}

pub(super) async fn resume_playback() {
    let script = resume_playback_script();
    let _ = eval(&script).await;
}

pub(super) async fn scroll_to_top() {
    let _ = eval(scroll_to_top_script()).await;
}
