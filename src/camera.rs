//! # Camera Module
//!
//! Computes the single matrix uploaded to the vertex shader:
//!
//! ```text
//! transform = OPENGL_TO_WGPU × projection × view × rotation
//! ```
//!
//! - **Projection**: right-handed perspective with an OpenGL depth range (`z ∈ [-1, 1]`).
//! - **View**: right-handed look-at from the camera eye toward its target.
//! - **Rotation**: optional per-frame rotation of the model about the Z axis. Only the animated
//!   sweep passes an angle; a static frame leaves the model untransformed.
//! - **Remap**: [`opengl_to_wgpu_matrix`] moves depth from `[-1, 1]` to the `[0, 1]` range wgpu
//!   clips against.
//!
//! Nothing here is cached. A new matrix is computed whenever the aspect ratio or the rotation angle
//! changes, and the result is a plain `nalgebra_glm::Mat4` value.

use nalgebra_glm::{Mat4, Vec3};

/// Column-major remap from OpenGL clip space to wgpu clip space: `z' = 0.5 z + 0.5 w`.
#[rustfmt::skip]
const OPENGL_TO_WGPU: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
];

/// Returns the OpenGL → wgpu clip-space remap matrix.
pub fn opengl_to_wgpu_matrix() -> Mat4 {
    Mat4::from_column_slice(&OPENGL_TO_WGPU)
}

/// Perspective camera parameters.
///
/// The aspect ratio and rotation angle are not part of the camera: they are supplied each time a
/// transform is computed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    /// Vertical field of view, in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Camera {
    /// Camera for the latitude/longitude globe: looks at the origin from `(3, 0, 1)` with +Z up,
    /// matching the poles of the grid sphere.
    pub fn globe() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 1.0,
            far: 1000.0,
            eye: nalgebra_glm::vec3(3.0, 0.0, 1.0),
            target: Vec3::zeros(),
            up: Vec3::z(),
        }
    }

    /// Camera for the stacked-ring sphere, whose bands are stacked along +Y.
    pub fn stacked() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 1.0,
            far: 1000.0,
            eye: nalgebra_glm::vec3(2.0, 2.0, 3.0),
            target: Vec3::zeros(),
            up: Vec3::y(),
        }
    }

    /// Shorthand for [`compute_transform`] with this camera.
    pub fn transform(&self, aspect_ratio: f32, rotation_degrees: Option<f32>) -> Mat4 {
        compute_transform(self, aspect_ratio, rotation_degrees)
    }
}

/// Computes `OPENGL_TO_WGPU × projection × view × rotation` for `camera`.
///
/// # Parameters
///
/// - `aspect_ratio`: render target width divided by height.
/// - `rotation_degrees`: rotation of the model about the Z axis, or `None` for a static frame.
///
/// # Example
///
/// ```
/// use sphere_capture::{compute_transform, Camera};
///
/// let transform = compute_transform(&Camera::globe(), 1.0, None);
/// // The target sits on the camera axis, so it projects to the centre of the image.
/// let clip = transform * nalgebra_glm::vec4(0.0, 0.0, 0.0, 1.0);
/// assert!((clip.x / clip.w).abs() < 1e-6);
/// assert!((clip.y / clip.w).abs() < 1e-6);
/// ```
pub fn compute_transform(
    camera: &Camera,
    aspect_ratio: f32,
    rotation_degrees: Option<f32>,
) -> Mat4 {
    let projection = nalgebra_glm::perspective_rh_no(
        aspect_ratio,
        camera.fov_y_degrees.to_radians(),
        camera.near,
        camera.far,
    );
    let view = nalgebra_glm::look_at_rh(&camera.eye, &camera.target, &camera.up);
    let model = match rotation_degrees {
        Some(angle) => nalgebra_glm::rotation(angle.to_radians(), &Vec3::z()),
        None => Mat4::identity(),
    };

    opengl_to_wgpu_matrix() * projection * view * model
}
