//! Camera assignment: eight cubes hovering around the origin, seen through a fly-through camera.
//!
//! Hold the aim button (right mouse button) to look around and fly with the movement keys; hold the
//! sprint modifier to go faster. Scrolling changes the field of view.
//!
//! Press the <main action> to spin the cubes or stop them.
//! Press the projection toggle to switch between perspective and orthographic projection.
//! Press reset to bring the camera back where it started.

use crate::{
  camera_controller::CameraRig,
  procgen::create_cube,
  shared::{build_program, upload_mesh, AnimationClock, MeshTess, Semantics},
  transform::Transform,
  AssignmentError, Example, InputAction, LoopFeedback, PlatformServices,
};
use cgmath::Vector3;
use luminance::UniformInterface;
use luminance_front::{
  context::GraphicsContext,
  face_culling::{FaceCulling, FaceCullingMode, FaceCullingOrder},
  framebuffer::Framebuffer,
  pipeline::PipelineState,
  render_state::RenderState,
  shader::{types::Mat44, Program, Uniform},
  texture::Dim2,
  Backend,
};

const VS: &'static str = include_str!("mesh-vs.glsl");
const FS: &'static str = include_str!("normal-fs.glsl");

const CLEAR_COLOR: [f32; 4] = [0.3, 0.4, 0.9, 1.];

pub const CUBE_COUNT: usize = 8;
const CUBE_SIZE: f32 = 0.5;
// Distance of the cubes from the vertical axis.
const CUBE_RING_RADIUS: f32 = 3.;
// Degrees per second.
const SPIN_SPEED: f32 = 45.;

#[derive(UniformInterface)]
struct ShaderInterface {
  model: Uniform<Mat44<f32>>,
  view: Uniform<Mat44<f32>>,
  projection: Uniform<Mat44<f32>>,
}

/// Where the cubes start.
///
/// Even cubes sit on the Z axis and odd ones on the X axis, each axis alternating between its
/// negative and positive side. The first half is raised above the ground, the second half is
/// lowered below it.
pub fn cube_positions() -> [Vector3<f32>; CUBE_COUNT] {
  let half = CUBE_COUNT / 2;
  let mut positions = [Vector3::new(0., 0., 0.); CUBE_COUNT];

  for (i, position) in positions.iter_mut().enumerate() {
    let sign = if (i / 2) % 2 == 0 { -1. } else { 1. };

    if i % 2 == 0 {
      position.z = sign * CUBE_RING_RADIUS;
    } else {
      position.x = sign * CUBE_RING_RADIUS;
    }

    position.y = if i < half {
      i as f32 / half as f32 + 0.75
    } else {
      -((i - half) as f32 / half as f32 + 0.75)
    };
  }

  positions
}

pub struct LocalExample {
  program: Program<Semantics, (), ShaderInterface>,
  cube: MeshTess,
  transforms: Vec<Transform>,
  rig: CameraRig,
  spin: AnimationClock,
}

impl Example for LocalExample {
  fn bootstrap(
    platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, AssignmentError> {
    let program = build_program(context, VS, FS)?;
    let cube = upload_mesh(context, &create_cube(CUBE_SIZE)?)?;
    let transforms = cube_positions()
      .iter()
      .map(|&position| Transform::from_position(position))
      .collect();
    let rig = CameraRig::new(platform.settings());

    Ok(LocalExample {
      program,
      cube,
      transforms,
      rig,
      spin: AnimationClock::paused(),
    })
  }

  fn render_frame(
    mut self,
    time: f32,
    back_buffer: Framebuffer<Dim2, (), ()>,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> LoopFeedback<Self> {
    for action in actions {
      match action {
        InputAction::Quit => return LoopFeedback::Exit,

        InputAction::MainToggle => {
          self.spin.toggle();
          log::info!("cubes spinning: {}", !self.spin.is_paused());
        }

        action => {
          self.rig.handle(&action);
        }
      }
    }

    self.rig.update(time);

    let angle = self.spin.tick(time) * SPIN_SPEED;
    for transform in &mut self.transforms {
      transform.rotation.y = angle;
    }

    let view = Mat44::new(self.rig.camera.view_matrix());
    let projection = Mat44::new(self.rig.camera.projection_matrix());

    let program = &mut self.program;
    let cube = &self.cube;
    let transforms = &self.transforms;
    let render_st = &RenderState::default().set_face_culling(FaceCulling::new(
      FaceCullingOrder::CCW,
      FaceCullingMode::Back,
    ));

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color(CLEAR_COLOR),
        |_, mut shd_gate| {
          shd_gate.shade(program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.view, view);
            iface.set(&uni.projection, projection);

            transforms.iter().try_for_each(|transform| {
              iface.set(&uni.model, Mat44::new(transform.model_matrix()));
              rdr_gate.render(render_st, |mut tess_gate| tess_gate.render(cube))
            })
          })
        },
      )
      .assume();

    if render.is_ok() {
      LoopFeedback::Continue(self)
    } else {
      LoopFeedback::Exit
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cubes_alternate_between_axes() {
    let positions = cube_positions();

    assert_eq!(positions[0], Vector3::new(0., 0.75, -3.));
    assert_eq!(positions[1], Vector3::new(-3., 1., 0.));
    assert_eq!(positions[2], Vector3::new(0., 1.25, 3.));
    assert_eq!(positions[3], Vector3::new(3., 1.5, 0.));
    assert_eq!(positions[4], Vector3::new(0., -0.75, -3.));
    assert_eq!(positions[5], Vector3::new(-3., -1., 0.));
    assert_eq!(positions[6], Vector3::new(0., -1.25, 3.));
    assert_eq!(positions[7], Vector3::new(3., -1.5, 0.));
  }

  #[test]
  fn first_half_is_raised_second_half_lowered() {
    let positions = cube_positions();
    let (raised, lowered) = positions.split_at(CUBE_COUNT / 2);

    assert!(raised.iter().all(|p| p.y > 0.));
    assert!(lowered.iter().all(|p| p.y < 0.));
  }

  #[test]
  fn cubes_sit_on_the_ring() {
    for p in &cube_positions() {
      assert_eq!(p.x.abs() + p.z.abs(), CUBE_RING_RADIUS);
      assert!(p.x == 0. || p.z == 0.);
    }
  }
}
