use dioxus::prelude::*;

use course_core::model::VideoId;

use crate::vm::{CourseProgressVm, PlaylistRowVm};

#[component]
pub(super) fn CourseSidebar(
    progress: CourseProgressVm,
    rows: Vec<PlaylistRowVm>,
    on_select: EventHandler<VideoId>,
) -> Element {
    rsx! {
        aside { class: "course-sidebar",
            h2 { class: "course-sidebar__title", "Topics for This Course" }

            CourseProgressHeader { progress }

            div { class: "course-week",
                div { class: "course-week__title", "Week 1–4" }
                p { class: "course-week__subtitle",
                    "Advanced story telling techniques for writers: Personas, Characters & Plots"
                }

                ul { class: "playlist",
                    for row in rows {
                        PlaylistRow { key: "{row.id}", row, on_select }
                    }
                }
            }
        }
    }
}

#[component]
fn CourseProgressHeader(progress: CourseProgressVm) -> Element {
    let percent = progress.percent;
    rsx! {
        div { class: "course-progress",
            div { class: "course-progress__labels",
                span { class: "course-progress__who", "You" }
                span { class: "course-progress__value", "{percent}%" }
            }
            div {
                class: "course-progress__bar",
                role: "progressbar",
                aria_valuemin: "0",
                aria_valuemax: "100",
                aria_valuenow: "{percent}",
                div { class: "course-progress__fill", style: "width: {percent}%" }
            }
        }
    }
}

#[component]
fn PlaylistRow(row: PlaylistRowVm, on_select: EventHandler<VideoId>) -> Element {
    let class = if row.active {
        "playlist-row playlist-row--active"
    } else {
        "playlist-row"
    };
    let id = row.id.clone();

    rsx! {
        li { class: "{class}", onclick: move |_| on_select.call(id.clone()),
            div { class: "playlist-row__main",
                span { class: "icon icon-file", aria_hidden: "true", "📄" }
                div {
                    div { class: "playlist-row__title", "{row.title}" }
                    div { class: "playlist-row__meta",
                        if let Some(badge) = row.question_badge.as_ref() {
                            span { class: "badge badge--questions", "{badge}" }
                        }
                        span { class: "playlist-row__duration", "{row.duration_label}" }
                    }
                }
            }
            // The lock is decorative: every row stays selectable.
            div { class: "playlist-row__status",
                if row.watched {
                    span { class: "icon icon-watched", title: "Watched", "✔" }
                } else {
                    span { class: "icon icon-locked", title: "Not watched yet", "🔒" }
                }
            }
        }
    }
}
