//! Perspective / orthographic camera.

use crate::transform::{look_at, orthographic, perspective};
use cgmath::{Deg, InnerSpace as _, Matrix4, Rad, Vector3};

// The projection flips or degenerates outside of those bounds.
const MIN_FOV_DEG: f32 = 1.;
const MAX_FOV_DEG: f32 = 179.;
const MIN_NEAR_PLANE: f32 = 1e-3;
const MIN_DEPTH_RANGE: f32 = 1e-3;

const DEFAULT_NEAR_PLANE: f32 = 0.1;
const DEFAULT_FAR_PLANE: f32 = 100.;

/// A camera looking at a target point.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
  /// Camera body position.
  pub position: Vector3<f32>,
  /// Position to look at.
  pub target: Vector3<f32>,
  /// Vertical field of view, in degrees.
  pub fov: f32,
  /// Screen width / screen height.
  pub aspect_ratio: f32,
  pub near_plane: f32,
  pub far_plane: f32,
  pub orthographic: bool,
  /// Height of the orthographic frustum.
  pub ortho_height: f32,
}

impl Camera {
  pub fn new(aspect_ratio: f32) -> Self {
    Camera {
      position: Vector3::new(0., 0., 5.),
      target: Vector3::new(0., 0., 0.),
      fov: 60.,
      aspect_ratio,
      near_plane: DEFAULT_NEAR_PLANE,
      far_plane: DEFAULT_FAR_PLANE,
      orthographic: false,
      ortho_height: 6.,
    }
  }

  /// Restore everything but the aspect ratio.
  pub fn reset(&mut self) {
    *self = Camera::new(self.aspect_ratio);
  }

  /// Unit direction the camera is looking at; -Z if the target sits on the camera.
  pub fn forward(&self) -> Vector3<f32> {
    let to_target = self.target - self.position;

    if to_target.magnitude2() < 1e-12 {
      -Vector3::unit_z()
    } else {
      to_target.normalize()
    }
  }

  pub fn view_matrix(&self) -> Matrix4<f32> {
    look_at(self.position, self.target, Vector3::unit_y())
  }

  pub fn projection_matrix(&self) -> Matrix4<f32> {
    let aspect_ratio = if self.aspect_ratio.is_finite() && self.aspect_ratio > 0. {
      self.aspect_ratio
    } else {
      1.
    };
    let near = finite_or(self.near_plane, DEFAULT_NEAR_PLANE).max(MIN_NEAR_PLANE);
    let far = finite_or(self.far_plane, DEFAULT_FAR_PLANE).max(near + MIN_DEPTH_RANGE);

    if self.orthographic {
      orthographic(self.ortho_height, aspect_ratio, near, far)
    } else {
      let Rad(fovy) = Deg(clamp_fov(self.fov)).into();
      perspective(fovy, aspect_ratio, near, far)
    }
  }

  pub fn view_projection(&self) -> Matrix4<f32> {
    self.projection_matrix() * self.view_matrix()
  }
}

fn finite_or(x: f32, default: f32) -> f32 {
  if x.is_finite() {
    x
  } else {
    default
  }
}

/// Keep a field of view (in degrees) in a range that doesn’t flip the projection.
pub fn clamp_fov(fov: f32) -> f32 {
  fov.max(MIN_FOV_DEG).min(MAX_FOV_DEG)
}
