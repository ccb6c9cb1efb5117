use std::path::PathBuf;

pub struct Args {
    pub glb: Option<PathBuf>,
    pub view: ViewOptions,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewOptions {
    /// Degrees per second the model turns about its vertical axis.
    pub rotation_speed: f32,
    /// Distance from the camera to the model's origin.
    pub camera_distance: f32,
}

impl ViewOptions {
    pub const DEFAULT_ROTATION_SPEED: f32 = 30.0;
    pub const DEFAULT_CAMERA_DISTANCE: f32 = 3.0;
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            rotation_speed: Self::DEFAULT_ROTATION_SPEED,
            camera_distance: Self::DEFAULT_CAMERA_DISTANCE,
        }
    }
}
