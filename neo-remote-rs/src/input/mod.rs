//! Switch and pot conditioning.

mod debounce;
mod gesture;
mod pot;

pub use debounce::DebouncedSwitch;
pub use gesture::{Gesture, GestureClassifier};
pub use pot::{map_u16_expo, PotFilter, PotSampler, POT_WINDOW};
