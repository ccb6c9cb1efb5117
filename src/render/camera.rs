use std::time::Duration;

pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 0.0, 1.0,
);

/// A fixed camera on the +Z axis looking at a model that spins about Y.
#[derive(Clone, Copy, Debug)]
pub struct TurntableCamera {
    pub distance: f32,
    pub rotation_speed: cgmath::Deg<f32>,
    pub fovy: cgmath::Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl TurntableCamera {
    pub fn new(distance: f32, rotation_speed: cgmath::Deg<f32>) -> Self {
        Self {
            distance,
            rotation_speed,
            fovy: cgmath::Deg(45.0).into(),
            znear: 0.1,
            zfar: 100.0_f32.max(distance * 4.0),
        }
    }

    pub fn model_matrix(&self, elapsed: Duration) -> cgmath::Matrix4<f32> {
        let angle = (self.rotation_speed.0 * elapsed.as_secs_f32()) % 360.0;
        cgmath::Matrix4::from_angle_y(cgmath::Deg(angle))
    }

    pub fn view_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::look_at_rh(
            cgmath::Point3::new(0.0, 0.0, self.distance),
            cgmath::Point3::new(0.0, 0.0, 0.0),
            cgmath::Vector3::unit_y(),
        )
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> cgmath::Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, aspect_ratio, self.znear, self.zfar)
    }

    pub fn view_uniform(&self, aspect_ratio: f32, elapsed: Duration) -> ViewUniform {
        ViewUniform::new(
            self.model_matrix(elapsed),
            self.projection_matrix(aspect_ratio) * self.view_matrix(),
        )
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewUniform {
    pub model_matrix: [[f32; 4]; 4],
    pub view_projection_matrix: [[f32; 4]; 4],
}

impl ViewUniform {
    pub fn new(
        model_matrix: cgmath::Matrix4<f32>,
        view_projection_matrix: cgmath::Matrix4<f32>,
    ) -> Self {
        Self {
            model_matrix: model_matrix.into(),
            view_projection_matrix: view_projection_matrix.into(),
        }
    }
}
