//! Image-level helpers shared by the detection and recognition stages.

pub mod region;
pub mod resize;

pub use region::{rotate_about_center_expanded, RegionExtractor};
pub use resize::{limit_height, resize_to_height};
