//! Lighting assignment: a few textured shapes lit by up to four colored point lights.
//!
//! Shading follows the Phong reflection model. Every light is shown as a small unlit sphere of its
//! own color. The camera works as in the camera assignment.
//!
//! Press the <main action> to cycle through the number of active lights.
//! Press the <auxiliary action> to select which material parameter to tweak, and the increase /
//! decrease actions to tweak it.

use crate::{
  camera_controller::CameraRig,
  procgen::{create_cube, create_cylinder, create_plane, create_sphere},
  shared::{
    build_program, load_texture, upload_mesh, Filter, MeshTess, RGBATexture, Semantics,
    TextureOptions,
  },
  transform::Transform,
  AssignmentError, Example, Features, InputAction, LoopFeedback, PlatformServices,
};
use cgmath::Vector3;
use luminance::UniformInterface;
use luminance_front::{
  context::GraphicsContext,
  face_culling::{FaceCulling, FaceCullingMode, FaceCullingOrder},
  framebuffer::Framebuffer,
  pipeline::{PipelineState, TextureBinding},
  pixel::NormUnsigned,
  render_state::RenderState,
  shader::{
    types::{Mat44, Vec3},
    Program, Uniform,
  },
  texture::{Dim2, Wrap},
  Backend,
};
use std::fmt;

const VS: &'static str = include_str!("mesh-vs.glsl");
const LIT_FS: &'static str = include_str!("lit-fs.glsl");
const UNLIT_FS: &'static str = include_str!("unlit-fs.glsl");

const BRICK_TEXTURE: &str = "brick_color.jpg";

const CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 1.];

/// Lights the lit program can take at once.
pub const MAX_LIGHTS: usize = 4;

const GIZMO_RADIUS: f32 = 0.5;
const GIZMO_SEGMENTS: u32 = 20;

// Increase / decrease steps.
const COEFFICIENT_STEP: f32 = 0.05;
const SHININESS_STEP: f32 = 5.;

#[derive(UniformInterface)]
struct LitInterface {
  model: Uniform<Mat44<f32>>,
  view: Uniform<Mat44<f32>>,
  projection: Uniform<Mat44<f32>>,
  albedo: Uniform<TextureBinding<Dim2, NormUnsigned>>,
  camera_position: Uniform<Vec3<f32>>,
  light_count: Uniform<i32>,
  ambient_k: Uniform<f32>,
  diffuse_k: Uniform<f32>,
  specular_k: Uniform<f32>,
  shininess: Uniform<f32>,
  light0_position: Uniform<Vec3<f32>>,
  light0_color: Uniform<Vec3<f32>>,
  light1_position: Uniform<Vec3<f32>>,
  light1_color: Uniform<Vec3<f32>>,
  light2_position: Uniform<Vec3<f32>>,
  light2_color: Uniform<Vec3<f32>>,
  light3_position: Uniform<Vec3<f32>>,
  light3_color: Uniform<Vec3<f32>>,
}

impl LitInterface {
  // position and color uniforms of every light slot
  fn lights(&self) -> [(&Uniform<Vec3<f32>>, &Uniform<Vec3<f32>>); MAX_LIGHTS] {
    [
      (&self.light0_position, &self.light0_color),
      (&self.light1_position, &self.light1_color),
      (&self.light2_position, &self.light2_color),
      (&self.light3_position, &self.light3_color),
    ]
  }
}

#[derive(UniformInterface)]
struct UnlitInterface {
  model: Uniform<Mat44<f32>>,
  view: Uniform<Mat44<f32>>,
  projection: Uniform<Mat44<f32>>,
  color: Uniform<Vec3<f32>>,
}

/// Point light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
  /// World space.
  pub position: Vector3<f32>,
  /// Linear RGB.
  pub color: Vector3<f32>,
}

impl Light {
  pub fn new(position: Vector3<f32>, color: Vector3<f32>) -> Self {
    Light { position, color }
  }
}

/// Red, green and blue lights around the scene, and a dim white one above it.
pub fn default_lights() -> [Light; MAX_LIGHTS] {
  [
    Light::new(Vector3::new(5., 2., 7.), Vector3::new(0.5, 0., 0.)),
    Light::new(Vector3::new(5., 2., -7.), Vector3::new(0., 0.5, 0.)),
    Light::new(Vector3::new(-5., 2., 0.), Vector3::new(0., 0., 0.5)),
    Light::new(Vector3::new(0., 6., 0.), Vector3::new(0.15, 0.15, 0.15)),
  ]
}

/// Number of lights after `count` when cycling; wraps from all of them to none.
pub fn next_light_count(count: usize) -> usize {
  (count + 1) % (MAX_LIGHTS + 1)
}

/// Phong material coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
  /// In [0; 1].
  pub ambient_k: f32,
  /// In [0; 1].
  pub diffuse_k: f32,
  /// In [0; 1].
  pub specular_k: f32,
  /// In [1; 255].
  pub shininess: f32,
}

impl Default for Material {
  fn default() -> Self {
    Material {
      ambient_k: 1.,
      diffuse_k: 1.,
      specular_k: 1.,
      shininess: 15.,
    }
  }
}

impl Material {
  pub fn get(&self, param: MaterialParam) -> f32 {
    match param {
      MaterialParam::Ambient => self.ambient_k,
      MaterialParam::Diffuse => self.diffuse_k,
      MaterialParam::Specular => self.specular_k,
      MaterialParam::Shininess => self.shininess,
    }
  }

  /// Move a parameter by `steps` increments, staying in its range.
  pub fn adjust(&mut self, param: MaterialParam, steps: f32) {
    let coefficient = |k: f32| (k + steps * COEFFICIENT_STEP).max(0.).min(1.);

    match param {
      MaterialParam::Ambient => self.ambient_k = coefficient(self.ambient_k),
      MaterialParam::Diffuse => self.diffuse_k = coefficient(self.diffuse_k),
      MaterialParam::Specular => self.specular_k = coefficient(self.specular_k),
      MaterialParam::Shininess => {
        self.shininess = (self.shininess + steps * SHININESS_STEP).max(1.).min(255.)
      }
    }
  }
}

/// Material parameter selected for tweaking.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MaterialParam {
  Ambient,
  Diffuse,
  Specular,
  Shininess,
}

impl MaterialParam {
  pub fn next(self) -> Self {
    match self {
      MaterialParam::Ambient => MaterialParam::Diffuse,
      MaterialParam::Diffuse => MaterialParam::Specular,
      MaterialParam::Specular => MaterialParam::Shininess,
      MaterialParam::Shininess => MaterialParam::Ambient,
    }
  }
}

impl fmt::Display for MaterialParam {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      MaterialParam::Ambient => f.write_str("ambient coefficient"),
      MaterialParam::Diffuse => f.write_str("diffuse coefficient"),
      MaterialParam::Specular => f.write_str("specular coefficient"),
      MaterialParam::Shininess => f.write_str("shininess"),
    }
  }
}

// A mesh and where it’s drawn.
struct Object {
  tess: MeshTess,
  transform: Transform,
}

pub struct LocalExample {
  lit_program: Program<Semantics, (), LitInterface>,
  unlit_program: Program<Semantics, (), UnlitInterface>,
  brick: RGBATexture,
  objects: Vec<Object>,
  gizmo: MeshTess,
  lights: [Light; MAX_LIGHTS],
  light_count: usize,
  material: Material,
  selected: MaterialParam,
  rig: CameraRig,
}

impl Example for LocalExample {
  fn features() -> Features {
    Features::none().texture(BRICK_TEXTURE)
  }

  fn bootstrap(
    platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, AssignmentError> {
    let brick = load_texture(
      context,
      platform,
      BRICK_TEXTURE,
      TextureOptions::new(Wrap::Repeat, Filter::Linear),
    )?;

    let lit_program = build_program(context, VS, LIT_FS)?;
    let unlit_program = build_program(context, VS, UNLIT_FS)?;

    let meshes = [
      (create_cube(1.)?, Vector3::new(0., 0., 0.)),
      (create_plane(5., 5., 10)?, Vector3::new(0., -1., 0.)),
      (create_sphere(0.5, 64)?, Vector3::new(-1.5, 0., 0.)),
      (create_cylinder(0.5, 1., 32)?, Vector3::new(1.5, 0., 0.)),
    ];
    let objects = meshes
      .iter()
      .map(|(mesh, position)| {
        Ok(Object {
          tess: upload_mesh(context, mesh)?,
          transform: Transform::from_position(*position),
        })
      })
      .collect::<Result<Vec<_>, AssignmentError>>()?;

    let gizmo = upload_mesh(context, &create_sphere(GIZMO_RADIUS, GIZMO_SEGMENTS)?)?;
    let rig = CameraRig::new(platform.settings());

    Ok(LocalExample {
      lit_program,
      unlit_program,
      brick,
      objects,
      gizmo,
      lights: default_lights(),
      light_count: MAX_LIGHTS,
      material: Material::default(),
      selected: MaterialParam::Ambient,
      rig,
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
          self.light_count = next_light_count(self.light_count);
          log::info!("{} light(s) on", self.light_count);
        }

        InputAction::AuxiliaryToggle => {
          self.selected = self.selected.next();
          log::info!(
            "tweaking {} ({})",
            self.selected,
            self.material.get(self.selected)
          );
        }

        InputAction::Increase | InputAction::Decrease => {
          let steps = if action == InputAction::Increase {
            1.
          } else {
            -1.
          };
          self.material.adjust(self.selected, steps);
          log::info!("{} = {}", self.selected, self.material.get(self.selected));
        }

        action => {
          self.rig.handle(&action);
        }
      }
    }

    self.rig.update(time);

    let camera = &self.rig.camera;
    let view = Mat44::new(camera.view_matrix());
    let projection = Mat44::new(camera.projection_matrix());
    let camera_position = Vec3::new(camera.position.x, camera.position.y, camera.position.z);

    let lit_program = &mut self.lit_program;
    let unlit_program = &mut self.unlit_program;
    let brick = &mut self.brick;
    let objects = &self.objects;
    let gizmo = &self.gizmo;
    let lights = &self.lights;
    let active_lights = &self.lights[..self.light_count];
    let light_count = self.light_count as i32;
    let material = self.material;
    let render_st = &RenderState::default().set_face_culling(FaceCulling::new(
      FaceCullingOrder::CCW,
      FaceCullingMode::Back,
    ));

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color(CLEAR_COLOR),
        |pipeline, mut shd_gate| {
          let bound_brick = pipeline.bind_texture(brick)?;

          shd_gate.shade(lit_program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.view, view);
            iface.set(&uni.projection, projection);
            iface.set(&uni.albedo, bound_brick.binding());
            iface.set(&uni.camera_position, camera_position);
            iface.set(&uni.light_count, light_count);
            iface.set(&uni.ambient_k, material.ambient_k);
            iface.set(&uni.diffuse_k, material.diffuse_k);
            iface.set(&uni.specular_k, material.specular_k);
            iface.set(&uni.shininess, material.shininess);

            for (light, (position, color)) in lights.iter().zip(uni.lights().iter()) {
              iface.set(position, Vec3::new(light.position.x, light.position.y, light.position.z));
              iface.set(color, Vec3::new(light.color.x, light.color.y, light.color.z));
            }

            objects.iter().try_for_each(|object| {
              iface.set(&uni.model, Mat44::new(object.transform.model_matrix()));
              rdr_gate.render(render_st, |mut tess_gate| tess_gate.render(&object.tess))
            })
          })?;

          shd_gate.shade(unlit_program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.view, view);
            iface.set(&uni.projection, projection);

            active_lights.iter().try_for_each(|light| {
              let transform = Transform::from_position(light.position);
              iface.set(&uni.model, Mat44::new(transform.model_matrix()));
              iface.set(
                &uni.color,
                Vec3::new(light.color.x, light.color.y, light.color.z),
              );
              rdr_gate.render(render_st, |mut tess_gate| tess_gate.render(gizmo))
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
