use crate::{
  procgen::{self, MeshData},
  AssignmentError, PlatformServices,
};
use luminance::{shader::UniformInterface, Semantics, Vertex};
use luminance_front::{
  context::GraphicsContext,
  pixel::NormRGBA8UI,
  shader::Program,
  tess::{Mode, Tess},
  texture::{Dim2, MagFilter, MinFilter, Sampler, TexelUpload, Texture, Wrap},
  Backend,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Semantics)]
pub enum Semantics {
  // reference vertex positions with the position variable in vertex shaders
  #[sem(name = "position", repr = "[f32; 3]", wrapper = "VertexPosition")]
  Position,
  // reference vertex normals with the normal variable in vertex shaders
  #[sem(name = "normal", repr = "[f32; 3]", wrapper = "VertexNormal")]
  Normal,
  // reference texture coordinates with the uv variable in vertex shaders
  #[sem(name = "uv", repr = "[f32; 2]", wrapper = "VertexUV")]
  UV,
}

/// Vertex of the procedurally generated meshes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Vertex)]
#[vertex(sem = "Semantics")]
pub struct MeshVertex {
  pub position: VertexPosition,
  pub normal: VertexNormal,
  pub uv: VertexUV,
}

impl From<&procgen::Vertex> for MeshVertex {
  fn from(v: &procgen::Vertex) -> Self {
    MeshVertex::new(
      VertexPosition::new(v.position.into()),
      VertexNormal::new(v.normal.into()),
      VertexUV::new(v.uv.into()),
    )
  }
}

/// Vertex of flat, screen-space quads.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Vertex)]
#[vertex(sem = "Semantics")]
pub struct QuadVertex {
  pub position: VertexPosition,
  pub uv: VertexUV,
}

/// GPU mesh.
pub type MeshTess = Tess<MeshVertex, u32>;

/// Upload a procedural mesh as an indexed triangle list.
pub fn upload_mesh(
  context: &mut impl GraphicsContext<Backend = Backend>,
  mesh: &MeshData,
) -> Result<MeshTess, AssignmentError> {
  let vertices: Vec<MeshVertex> = mesh.vertices.iter().map(MeshVertex::from).collect();

  let tess = context
    .new_tess()
    .set_vertices(vertices)
    .set_indices(&mesh.indices[..])
    .set_mode(Mode::Triangle)
    .build()?;

  Ok(tess)
}

/// Compile a program over the mesh semantics; warnings are logged, not fatal.
pub fn build_program<Uni>(
  context: &mut impl GraphicsContext<Backend = Backend>,
  vs: &str,
  fs: &str,
) -> Result<Program<Semantics, (), Uni>, AssignmentError>
where
  Uni: UniformInterface<Backend>,
{
  let built = context
    .new_shader_program::<Semantics, (), Uni>()
    .from_strings(vs, None, None, fs)?;

  for warning in &built.warnings {
    log::warn!("shader program warning: {}", warning);
  }

  Ok(built.ignore_warnings())
}

/// RGBA texture.
pub type RGBATexture = Texture<Dim2, NormRGBA8UI>;

/// How texels are picked between texture samples.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Filter {
  Nearest,
  Linear,
}

/// Sampling parameters of a 2D texture.
#[derive(Clone, Copy, Debug)]
pub struct TextureOptions {
  /// Wrapping, on both axes.
  pub wrap: Wrap,
  pub filter: Filter,
}

impl TextureOptions {
  pub fn new(wrap: Wrap, filter: Filter) -> Self {
    TextureOptions { wrap, filter }
  }

  /// Sampler to create the texture with. Minification always goes through mipmaps.
  pub fn sampler(&self) -> Sampler {
    let (min_filter, mag_filter) = match self.filter {
      Filter::Linear => (MinFilter::LinearMipmapLinear, MagFilter::Linear),
      Filter::Nearest => (MinFilter::NearestMipmapNearest, MagFilter::Nearest),
    };

    Sampler {
      wrap_s: self.wrap,
      wrap_t: self.wrap,
      min_filter,
      mag_filter,
      ..Sampler::default()
    }
  }
}

/// Number of mipmap levels below the base level of a `width`×`height` texture.
pub fn mipmap_levels(width: u32, height: u32) -> usize {
  let size = width.max(height).max(1);
  (31 - size.leading_zeros()) as usize
}

/// Upload a texture provided by the platform, with a full mipmap chain.
pub fn load_texture(
  context: &mut impl GraphicsContext<Backend = Backend>,
  platform: &mut impl PlatformServices,
  name: &str,
  options: TextureOptions,
) -> Result<RGBATexture, AssignmentError> {
  let img = platform
    .fetch_texture(name)
    .map_err(|e| AssignmentError::Fetch {
      name: name.to_owned(),
      source: Box::new(e),
    })?;
  let (width, height) = img.dimensions();
  let texels = img.as_raw();

  let texture = context.new_texture_raw(
    [width, height],
    options.sampler(),
    TexelUpload::base_level_with_mipmaps(&texels[..], mipmap_levels(width, height) as _),
  )?;

  log::info!("loaded texture {} ({}×{})", name, width, height);
  Ok(texture)
}

/// Animation time that can be paused without jumping once resumed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationClock {
  elapsed: f32,
  last_time: Option<f32>,
  paused: bool,
}

impl AnimationClock {
  /// A clock that doesn’t run until toggled.
  pub fn paused() -> Self {
    AnimationClock {
      paused: true,
      ..AnimationClock::default()
    }
  }

  pub fn is_paused(&self) -> bool {
    self.paused
  }

  pub fn toggle(&mut self) {
    self.paused = !self.paused;
  }

  /// Advance to the platform time `time` (seconds) and return the animation time.
  pub fn tick(&mut self, time: f32) -> f32 {
    if let Some(last) = self.last_time {
      if !self.paused {
        self.elapsed += (time - last).max(0.);
      }
    }

    self.last_time = Some(time);
    self.elapsed
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cgmath::{Vector2, Vector3};

  #[test]
  fn mesh_vertex_from_procgen() {
    let v = procgen::Vertex::new(
      Vector3::new(1., 2., 3.),
      Vector3::new(0., 1., 0.),
      Vector2::new(0.25, 0.75),
    );

    let expected = MeshVertex::new(
      VertexPosition::new([1., 2., 3.]),
      VertexNormal::new([0., 1., 0.]),
      VertexUV::new([0.25, 0.75]),
    );
    assert_eq!(MeshVertex::from(&v), expected);
  }

  #[test]
  fn linear_filter_uses_trilinear_mipmapping() {
    let sampler = TextureOptions::new(Wrap::Repeat, Filter::Linear).sampler();
    assert!(matches!(sampler.wrap_s, Wrap::Repeat));
    assert!(matches!(sampler.wrap_t, Wrap::Repeat));
    assert!(matches!(sampler.min_filter, MinFilter::LinearMipmapLinear));
    assert!(matches!(sampler.mag_filter, MagFilter::Linear));
  }

  #[test]
  fn nearest_filter_stays_nearest() {
    let sampler = TextureOptions::new(Wrap::ClampToEdge, Filter::Nearest).sampler();
    assert!(matches!(sampler.wrap_s, Wrap::ClampToEdge));
    assert!(matches!(sampler.min_filter, MinFilter::NearestMipmapNearest));
    assert!(matches!(sampler.mag_filter, MagFilter::Nearest));
  }

  #[test]
  fn mipmap_levels_follow_the_largest_side() {
    assert_eq!(mipmap_levels(1, 1), 0);
    assert_eq!(mipmap_levels(0, 0), 0);
    assert_eq!(mipmap_levels(2, 1), 1);
    assert_eq!(mipmap_levels(512, 256), 9);
    assert_eq!(mipmap_levels(300, 700), 9);
    assert_eq!(mipmap_levels(1024, 1024), 10);
  }

  #[test]
  fn clock_starts_at_zero() {
    let mut clock = AnimationClock::default();
    assert_eq!(clock.tick(12.), 0.);
    assert_eq!(clock.tick(12.5), 0.5);
  }

  #[test]
  fn paused_clock_does_not_jump_when_resumed() {
    let mut clock = AnimationClock::default();
    clock.tick(0.);
    clock.tick(1.);

    clock.toggle();
    assert!(clock.is_paused());
    assert_eq!(clock.tick(3.), 1.);

    clock.toggle();
    assert_eq!(clock.tick(3.), 1.);
    assert_eq!(clock.tick(3.25), 1.25);
  }

  #[test]
  fn clock_ignores_time_going_backward() {
    let mut clock = AnimationClock::default();
    clock.tick(5.);
    assert_eq!(clock.tick(4.), 0.);
    assert_eq!(clock.tick(4.5), 0.5);
  }

  #[test]
  fn paused_clock_waits_for_toggle() {
    let mut clock = AnimationClock::paused();
    clock.tick(0.);
    assert_eq!(clock.tick(2.), 0.);

    clock.toggle();
    assert_eq!(clock.tick(2.5), 0.5);
  }
}
