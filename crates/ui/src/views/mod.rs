mod player;

pub use player::PlayerView;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;
