//! Mouse-look, fly-through camera controller.
//!
//! While the aim button is held, moving the cursor turns the camera and the movement keys fly it
//! around. Releasing the aim button freezes the camera where it is.

use crate::{
  camera::{clamp_fov, Camera},
  Direction, InputAction, Settings,
};
use cgmath::{InnerSpace as _, Vector3, Zero as _};

const MAX_PITCH_DEG: f32 = 89.;
// Degrees of field of view per scroll unit.
const FOV_SCROLL_SENSITIVITY: f32 = 2.;

/// Yaw / pitch camera controller.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraController {
  /// Degrees; 0 looks down -Z, positive turns right.
  pub yaw: f32,
  /// Degrees; positive looks up.
  pub pitch: f32,
  /// Degrees of rotation per pixel of cursor motion.
  pub mouse_sensitivity: f32,
  /// Units per second.
  pub move_speed: f32,
  /// Units per second, while sprinting.
  pub sprint_move_speed: f32,
  aiming: bool,
  last_cursor: Option<[f32; 2]>,
  held: [bool; 6],
  sprinting: bool,
}

impl Default for CameraController {
  fn default() -> Self {
    CameraController::new(&Settings::default())
  }
}

impl CameraController {
  pub fn new(settings: &Settings) -> Self {
    CameraController {
      yaw: 0.,
      pitch: 0.,
      mouse_sensitivity: settings.mouse_sensitivity,
      move_speed: settings.move_speed,
      sprint_move_speed: settings.sprint_move_speed,
      aiming: false,
      last_cursor: None,
      held: [false; 6],
      sprinting: false,
    }
  }

  /// Unit vector the controller looks along.
  pub fn forward(&self) -> Vector3<f32> {
    let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
    let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();

    Vector3::new(yaw_sin * pitch_cos, pitch_sin, -yaw_cos * pitch_cos)
  }

  /// Point the controller where the camera currently looks, so that aiming doesn’t snap the view.
  pub fn look_at_camera(&mut self, camera: &Camera) {
    let f = camera.forward();
    self.pitch = clamp_pitch(f.y.max(-1.).min(1.).asin().to_degrees());
    self.yaw = f.x.atan2(-f.z).to_degrees();
  }

  /// Forget the orientation and any input in flight; speeds and sensitivity are kept.
  pub fn reset(&mut self) {
    self.yaw = 0.;
    self.pitch = 0.;
    self.aiming = false;
    self.last_cursor = None;
    self.held = [false; 6];
    self.sprinting = false;
  }

  /// Update the input state with an action; returns whether the action was consumed.
  pub fn handle(&mut self, action: &InputAction) -> bool {
    match *action {
      InputAction::AimPressed => {
        self.aiming = true;
        self.last_cursor = None;
      }

      InputAction::AimReleased => {
        self.aiming = false;
        self.last_cursor = None;
      }

      InputAction::CursorMoved { x, y } => self.look(x, y),

      InputAction::Move { direction, active } => {
        self.held[direction as usize] = active;
      }

      InputAction::Sprint { active } => {
        self.sprinting = active;
      }

      _ => return false,
    }

    true
  }

  fn look(&mut self, x: f32, y: f32) {
    if !self.aiming {
      return;
    }

    // the first sample after aiming started only records where the cursor is
    let [px, py] = self.last_cursor.unwrap_or([x, y]);
    self.last_cursor = Some([x, y]);

    self.yaw += (x - px) * self.mouse_sensitivity;
    self.pitch = clamp_pitch(self.pitch - (y - py) * self.mouse_sensitivity);
  }

  /// Move and orient the camera; `dt` is in seconds.
  pub fn update(&self, camera: &mut Camera, dt: f32) {
    if !self.aiming {
      return;
    }

    let forward = self.forward();
    let right = forward.cross(Vector3::unit_y()).normalize();
    let up = right.cross(forward).normalize();

    let motion = Direction::ALL
      .iter()
      .filter(|&&direction| self.held[direction as usize])
      .fold(Vector3::zero(), |motion, direction| {
        motion
          + match direction {
            Direction::Forward => forward,
            Direction::Backward => -forward,
            Direction::Right => right,
            Direction::Left => -right,
            Direction::Up => up,
            Direction::Down => -up,
          }
      });

    let speed = if self.sprinting {
      self.sprint_move_speed
    } else {
      self.move_speed
    };

    camera.position += motion * speed * dt;
    camera.target = camera.position + forward;
  }
}

fn clamp_pitch(pitch: f32) -> f32 {
  pitch.max(-MAX_PITCH_DEG).min(MAX_PITCH_DEG)
}

/// A camera together with its controller and the camera-related actions every 3D assignment
/// shares: projection toggle, reset, field of view scrolling and resizing.
#[derive(Clone, Debug)]
pub struct CameraRig {
  pub camera: Camera,
  pub controller: CameraController,
  settings: Settings,
  last_time: Option<f32>,
}

impl CameraRig {
  pub fn new(settings: &Settings) -> Self {
    let mut rig = CameraRig {
      camera: Camera::new(settings.aspect_ratio()),
      controller: CameraController::new(settings),
      settings: settings.clone(),
      last_time: None,
    };
    rig.reset();
    rig
  }

  /// Bring the camera back to its starting point.
  ///
  /// A held aim button stays in effect; only its cursor sample is forgotten.
  pub fn reset(&mut self) {
    let aiming = self.controller.aiming;

    self.camera.reset();
    self.camera.fov = clamp_fov(self.settings.fov);
    self.controller.reset();
    self.controller.aiming = aiming;
    self.controller.look_at_camera(&self.camera);
  }

  /// Handle a camera-related action; returns whether the action was consumed.
  pub fn handle(&mut self, action: &InputAction) -> bool {
    if self.controller.handle(action) {
      return true;
    }

    match *action {
      InputAction::ToggleProjection => {
        self.camera.orthographic = !self.camera.orthographic;
        log::info!(
          "now using {} projection",
          if self.camera.orthographic {
            "orthographic"
          } else {
            "perspective"
          }
        );
      }

      InputAction::Reset => {
        self.reset();
        log::info!("camera reset");
      }

      InputAction::VScroll { amount } => {
        if self.camera.orthographic {
          self.camera.ortho_height = (self.camera.ortho_height - amount * 0.5).max(0.5);
        } else {
          self.camera.fov = clamp_fov(self.camera.fov - amount * FOV_SCROLL_SENSITIVITY);
          log::info!("new fov is {}°", self.camera.fov);
        }
      }

      InputAction::Resized { width, height } => {
        log::debug!("resized: {}×{}", width, height);
        if height > 0 {
          self.camera.aspect_ratio = width as f32 / height as f32;
        }
      }

      _ => return false,
    }

    true
  }

  /// Advance the camera to `time`, in seconds.
  pub fn update(&mut self, time: f32) {
    let dt = self.last_time.map_or(0., |last| (time - last).max(0.));
    self.last_time = Some(time);
    self.controller.update(&mut self.camera, dt);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn assert_vec_eq(a: Vector3<f32>, b: Vector3<f32>) {
    assert!((a - b).magnitude() < 1e-4, "{:?} != {:?}", a, b);
  }

  fn aiming_controller() -> CameraController {
    let mut controller = CameraController::default();
    controller.handle(&InputAction::AimPressed);
    controller
  }

  #[test]
  fn zero_angles_look_down_negative_z() {
    assert_vec_eq(CameraController::default().forward(), -Vector3::unit_z());
  }

  #[test]
  fn first_cursor_sample_does_not_turn() {
    let mut controller = aiming_controller();
    controller.handle(&InputAction::CursorMoved { x: 500., y: 300. });
    assert_eq!(controller.yaw, 0.);
    assert_eq!(controller.pitch, 0.);

    controller.handle(&InputAction::CursorMoved { x: 510., y: 290. });
    assert!((controller.yaw - 1.).abs() < 1e-5);
    assert!((controller.pitch - 1.).abs() < 1e-5);
  }

  #[test]
  fn cursor_is_ignored_when_not_aiming() {
    let mut controller = CameraController::default();
    controller.handle(&InputAction::CursorMoved { x: 0., y: 0. });
    controller.handle(&InputAction::CursorMoved { x: 100., y: 100. });
    assert_eq!(controller.yaw, 0.);
    assert_eq!(controller.pitch, 0.);
  }

  #[test]
  fn releasing_aim_forgets_the_cursor() {
    let mut controller = aiming_controller();
    controller.handle(&InputAction::CursorMoved { x: 0., y: 0. });
    controller.handle(&InputAction::AimReleased);
    controller.handle(&InputAction::AimPressed);
    controller.handle(&InputAction::CursorMoved { x: 300., y: 0. });
    assert_eq!(controller.yaw, 0.);
  }

  #[test]
  fn pitch_is_clamped() {
    let mut controller = aiming_controller();
    controller.handle(&InputAction::CursorMoved { x: 0., y: 0. });
    controller.handle(&InputAction::CursorMoved { x: 0., y: -10_000. });
    assert_eq!(controller.pitch, MAX_PITCH_DEG);

    controller.handle(&InputAction::CursorMoved { x: 0., y: 10_000. });
    assert_eq!(controller.pitch, -MAX_PITCH_DEG);
  }

  #[test]
  fn moves_only_while_aiming() {
    let mut camera = Camera::new(1.);
    let mut controller = CameraController::default();
    controller.handle(&InputAction::Move {
      direction: Direction::Forward,
      active: true,
    });

    controller.update(&mut camera, 1.);
    assert_eq!(camera, Camera::new(1.));

    controller.handle(&InputAction::AimPressed);
    controller.update(&mut camera, 0.5);
    assert_vec_eq(camera.position, Vector3::new(0., 0., 2.5));
    assert_vec_eq(camera.target, Vector3::new(0., 0., 1.5));
  }

  #[test]
  fn strafes_and_sprints() {
    let mut camera = Camera::new(1.);
    let mut controller = aiming_controller();
    controller.handle(&InputAction::Move {
      direction: Direction::Right,
      active: true,
    });
    controller.handle(&InputAction::Move {
      direction: Direction::Up,
      active: true,
    });
    controller.handle(&InputAction::Sprint { active: true });

    controller.update(&mut camera, 0.1);
    assert_vec_eq(camera.position, Vector3::new(1., 1., 5.));

    controller.handle(&InputAction::Move {
      direction: Direction::Up,
      active: false,
    });
    controller.handle(&InputAction::Sprint { active: false });
    controller.update(&mut camera, 0.1);
    assert_vec_eq(camera.position, Vector3::new(1.5, 1., 5.));
  }

  #[test]
  fn opposite_directions_cancel_out() {
    let mut camera = Camera::new(1.);
    let mut controller = aiming_controller();
    for direction in [Direction::Left, Direction::Right].iter().copied() {
      controller.handle(&InputAction::Move {
        direction,
        active: true,
      });
    }

    controller.update(&mut camera, 1.);
    assert_vec_eq(camera.position, Vector3::new(0., 0., 5.));
  }

  #[test]
  fn look_at_camera_recovers_angles() {
    let mut camera = Camera::new(1.);
    camera.position = Vector3::new(0., 0., 0.);
    camera.target = Vector3::new(1., 1., 0.);

    let mut controller = CameraController::default();
    controller.look_at_camera(&camera);
    assert!((controller.yaw - 90.).abs() < 1e-3);
    assert!((controller.pitch - 45.).abs() < 1e-3);
    assert_vec_eq(controller.forward(), camera.forward());
  }

  #[test]
  fn unrelated_actions_are_not_consumed() {
    let mut controller = CameraController::default();
    assert!(!controller.handle(&InputAction::MainToggle));
    assert!(controller.handle(&InputAction::Sprint { active: true }));
  }

  #[test]
  fn rig_toggles_projection_and_resets() {
    let mut rig = CameraRig::new(&Settings::default());
    assert!(rig.handle(&InputAction::ToggleProjection));
    assert!(rig.camera.orthographic);

    rig.camera.position = Vector3::new(9., 9., 9.);
    assert!(rig.handle(&InputAction::Reset));
    assert!(!rig.camera.orthographic);
    assert_eq!(rig.camera.position, Vector3::new(0., 0., 5.));
  }

  #[test]
  fn reset_while_aiming_keeps_control() {
    let mut rig = CameraRig::new(&Settings::default());
    rig.handle(&InputAction::AimPressed);
    rig.handle(&InputAction::CursorMoved { x: 0., y: 0. });
    rig.handle(&InputAction::CursorMoved { x: 200., y: 0. });
    assert!(rig.controller.yaw != 0.);

    rig.handle(&InputAction::Reset);
    assert_eq!(rig.controller.yaw, 0.);

    // the cursor jumped while resetting; only movement after the reset counts
    rig.handle(&InputAction::CursorMoved { x: 500., y: 0. });
    assert_eq!(rig.controller.yaw, 0.);
    rig.handle(&InputAction::CursorMoved { x: 510., y: 0. });
    let expected = 10. * rig.controller.mouse_sensitivity;
    assert!((rig.controller.yaw - expected).abs() < 1e-5);

    let before = rig.camera.position;
    rig.handle(&InputAction::Move {
      direction: Direction::Forward,
      active: true,
    });
    rig.update(0.);
    rig.update(1.);
    assert!(rig.camera.position != before);
  }

  #[test]
  fn rig_scrolls_fov_and_tracks_aspect_ratio() {
    let mut rig = CameraRig::new(&Settings::default());
    rig.handle(&InputAction::VScroll { amount: 5. });
    assert_eq!(rig.camera.fov, 50.);

    rig.handle(&InputAction::Resized {
      width: 800,
      height: 400,
    });
    assert_eq!(rig.camera.aspect_ratio, 2.);

    rig.handle(&InputAction::Resized {
      width: 800,
      height: 0,
    });
    assert_eq!(rig.camera.aspect_ratio, 2.);
  }

  #[test]
  fn rig_uses_elapsed_time() {
    let mut rig = CameraRig::new(&Settings::default());
    rig.handle(&InputAction::AimPressed);
    rig.handle(&InputAction::Move {
      direction: Direction::Backward,
      active: true,
    });

    // the first update only records the time
    rig.update(10.);
    assert_vec_eq(rig.camera.position, Vector3::new(0., 0., 5.));

    rig.update(10.2);
    assert_vec_eq(rig.camera.position, Vector3::new(0., 0., 6.));
  }
}
