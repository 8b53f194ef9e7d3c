//! Matrix construction.
//!
//! All matrices are column-major, right-handed and map to the OpenGL clip space, where the depth
//! ranges from -1 (near plane) to 1 (far plane).

use cgmath::{Deg, InnerSpace as _, Matrix4, Vector3};

// Below that squared length, a direction is considered degenerate.
const DEGENERATE_EPSILON: f32 = 1e-12;

pub fn translate(v: Vector3<f32>) -> Matrix4<f32> {
  Matrix4::from_translation(v)
}

pub fn scale(v: Vector3<f32>) -> Matrix4<f32> {
  Matrix4::from_nonuniform_scale(v.x, v.y, v.z)
}

pub fn rotate_x(angle: impl Into<Deg<f32>>) -> Matrix4<f32> {
  Matrix4::from_angle_x(angle.into())
}

pub fn rotate_y(angle: impl Into<Deg<f32>>) -> Matrix4<f32> {
  Matrix4::from_angle_y(angle.into())
}

pub fn rotate_z(angle: impl Into<Deg<f32>>) -> Matrix4<f32> {
  Matrix4::from_angle_z(angle.into())
}

/// View matrix of an eye looking at `target`.
///
/// The eye ends up at the origin, looking down the negative Z axis. If `eye` and `target` are the
/// same point, the eye looks down -Z; if the viewing direction is parallel to `up`, +Z is used as
/// the up hint instead.
pub fn look_at(eye: Vector3<f32>, target: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
  let to_target = target - eye;
  let f = if to_target.magnitude2() < DEGENERATE_EPSILON {
    -Vector3::unit_z()
  } else {
    to_target.normalize()
  };

  let mut r = f.cross(up);
  if r.magnitude2() < DEGENERATE_EPSILON {
    r = f.cross(Vector3::unit_z());
  }
  let r = r.normalize();
  let u = r.cross(f);

  #[rustfmt::skip]
  let view = Matrix4::new(
    r.x, u.x, -f.x, 0.,
    r.y, u.y, -f.y, 0.,
    r.z, u.z, -f.z, 0.,
    -r.dot(eye), -u.dot(eye), f.dot(eye), 1.,
  );

  view
}

/// Perspective projection; `fovy` is the vertical field of view, in radians.
pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
  let f = 1. / (fovy * 0.5).tan();
  let depth = near - far;

  #[rustfmt::skip]
  let projection = Matrix4::new(
    f / aspect, 0., 0., 0.,
    0., f, 0., 0.,
    0., 0., (far + near) / depth, -1.,
    0., 0., 2. * far * near / depth, 0.,
  );

  projection
}

/// Orthographic projection of a box `height` units high, centered on the viewing axis.
pub fn orthographic(height: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
  let top = height * 0.5;
  let right = top * aspect;
  let depth = far - near;

  #[rustfmt::skip]
  let projection = Matrix4::new(
    1. / right, 0., 0., 0.,
    0., 1. / top, 0., 0.,
    0., 0., -2. / depth, 0.,
    0., 0., -(far + near) / depth, 1.,
  );

  projection
}

/// Placement of an object in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
  pub position: Vector3<f32>,
  /// Euler angles, in degrees.
  pub rotation: Vector3<f32>,
  pub scale: Vector3<f32>,
}

impl Default for Transform {
  fn default() -> Self {
    Transform {
      position: Vector3::new(0., 0., 0.),
      rotation: Vector3::new(0., 0., 0.),
      scale: Vector3::new(1., 1., 1.),
    }
  }
}

impl Transform {
  pub fn from_position(position: Vector3<f32>) -> Self {
    Transform {
      position,
      ..Transform::default()
    }
  }

  /// Object-to-world matrix: scale first, then rotate around Z, X and Y, then translate.
  pub fn model_matrix(&self) -> Matrix4<f32> {
    translate(self.position)
      * rotate_y(Deg(self.rotation.y))
      * rotate_x(Deg(self.rotation.x))
      * rotate_z(Deg(self.rotation.z))
      * scale(self.scale)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cgmath::{Point3, Rad, SquareMatrix as _, Vector4};

  fn assert_mat_eq(a: Matrix4<f32>, b: Matrix4<f32>) {
    let a: &[f32; 16] = a.as_ref();
    let b: &[f32; 16] = b.as_ref();

    for (x, y) in a.iter().zip(b.iter()) {
      assert!((x - y).abs() < 1e-5, "{:?} != {:?}", a, b);
    }
  }

  fn transform_point(m: Matrix4<f32>, p: Vector3<f32>) -> Vector3<f32> {
    let v = m * Vector4::new(p.x, p.y, p.z, 1.);
    Vector3::new(v.x, v.y, v.z) / v.w
  }

  #[test]
  fn look_at_matches_cgmath() {
    let eye = Vector3::new(1., 2., 5.);
    let target = Vector3::new(-1., 0., 0.5);
    let up = Vector3::unit_y();

    let expected = Matrix4::look_at_rh(
      Point3::new(eye.x, eye.y, eye.z),
      Point3::new(target.x, target.y, target.z),
      up,
    );

    assert_mat_eq(look_at(eye, target, up), expected);
  }

  #[test]
  fn look_at_puts_target_down_negative_z() {
    let eye = Vector3::new(3., -1., 2.);
    let target = Vector3::new(0., 1., -4.);
    let view = look_at(eye, target, Vector3::unit_y());

    let e = transform_point(view, eye);
    assert!(e.magnitude() < 1e-5);

    let t = transform_point(view, target);
    assert!(t.x.abs() < 1e-5 && t.y.abs() < 1e-5);
    assert!((t.z + (target - eye).magnitude()).abs() < 1e-4);
  }

  #[test]
  fn look_at_same_point_looks_down_negative_z() {
    let eye = Vector3::new(0., 0., 3.);
    let view = look_at(eye, eye, Vector3::unit_y());
    assert_mat_eq(view, translate(-eye));
  }

  #[test]
  fn look_at_straight_down_stays_finite() {
    let view = look_at(Vector3::new(0., 5., 0.), Vector3::new(0., 0., 0.), Vector3::unit_y());
    let values: &[f32; 16] = view.as_ref();
    assert!(values.iter().all(|x| x.is_finite()));

    let t = transform_point(view, Vector3::new(0., 0., 0.));
    assert!((t.z + 5.).abs() < 1e-5);
  }

  #[test]
  fn perspective_matches_cgmath() {
    let expected = cgmath::perspective(Rad(1.2), 1.5, 0.1, 100.);
    assert_mat_eq(perspective(1.2, 1.5, 0.1, 100.), expected);
  }

  #[test]
  fn perspective_maps_near_and_far_planes() {
    let projection = perspective(std::f32::consts::FRAC_PI_2, 1., 0.5, 20.);

    let near = transform_point(projection, Vector3::new(0., 0., -0.5));
    let far = transform_point(projection, Vector3::new(0., 0., -20.));
    assert!((near.z + 1.).abs() < 1e-5);
    assert!((far.z - 1.).abs() < 1e-4);
  }

  #[test]
  fn orthographic_matches_cgmath() {
    let expected = cgmath::ortho(-4.5, 4.5, -3., 3., 0.1, 100.);
    assert_mat_eq(orthographic(6., 1.5, 0.1, 100.), expected);
  }

  #[test]
  fn default_transform_is_identity() {
    assert_mat_eq(Transform::default().model_matrix(), Matrix4::identity());
  }

  #[test]
  fn model_matrix_scales_rotates_then_translates() {
    let transform = Transform {
      position: Vector3::new(1., 2., 3.),
      rotation: Vector3::new(0., 90., 0.),
      scale: Vector3::new(2., 2., 2.),
    };

    // +X scaled to 2, rotated 90° around Y lands on -Z, then moved
    let p = transform_point(transform.model_matrix(), Vector3::new(1., 0., 0.));
    assert!((p - Vector3::new(1., 2., 1.)).magnitude() < 1e-5);
  }
}
