use std::path::PathBuf;

use clap::Parser;

use glb_viewer::args::{Args, ViewOptions};

/// A basic viewer for binary glTF (.glb) assets
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the .glb file of the asset that will be displayed by the viewer
    pub glb: PathBuf,

    /// Degrees per second the model turns about its vertical axis
    #[arg(short = 'r', long, default_value_t = ViewOptions::DEFAULT_ROTATION_SPEED, allow_negative_numbers = true)]
    pub rotation_speed: f32,

    /// Distance from the camera to the model's origin
    #[arg(short = 'd', long, default_value_t = ViewOptions::DEFAULT_CAMERA_DISTANCE, value_parser = parse_camera_distance)]
    pub camera_distance: f32,
}

fn parse_camera_distance(value: &str) -> Result<f32, String> {
    let distance: f32 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;

    if distance.is_finite() && distance > 0.0 {
        Ok(distance)
    } else {
        Err(String::from("the camera distance must be greater than zero"))
    }
}

impl From<Cli> for Args {
    fn from(value: Cli) -> Self {
        Args {
            glb: Some(value.glb),
            view: ViewOptions {
                rotation_speed: value.rotation_speed,
                camera_distance: value.camera_distance,
            },
        }
    }
}
