mod scripts;
mod sidebar;
mod view;

pub use view::PlayerView;
#[cfg(test)]
pub(crate) use view::PlayerTestHandles;
