//! Texturing assignment: a tiling background distorted by a noise texture, with a sprite bobbing
//! on top of it.
//!
//! Both layers are the same full-screen quad, drawn twice with different programs. The sprite is
//! alpha-blended over the background.
//!
//! Press the <main action> to pause or resume the animation.

use crate::{
  shared::{
    build_program, load_texture, AnimationClock, Filter, QuadVertex, RGBATexture, Semantics,
    TextureOptions, VertexPosition, VertexUV,
  },
  AssignmentError, Example, Features, InputAction, LoopFeedback, PlatformServices,
};
use luminance::UniformInterface;
use luminance_front::{
  blending::{Blending, Equation, Factor},
  context::GraphicsContext,
  framebuffer::Framebuffer,
  pipeline::{PipelineState, TextureBinding},
  pixel::NormUnsigned,
  render_state::RenderState,
  shader::{Program, Uniform},
  tess::{Mode, Tess},
  texture::{Dim2, Wrap},
  Backend,
};

const BACKGROUND_VS: &'static str = include_str!("background-vs.glsl");
const BACKGROUND_FS: &'static str = include_str!("background-fs.glsl");
const CHARACTER_VS: &'static str = include_str!("character-vs.glsl");
const CHARACTER_FS: &'static str = include_str!("character-fs.glsl");

const BACKGROUND_TEXTURE: &str = "background.png";
const NOISE_TEXTURE: &str = "noise.png";
const CHARACTER_TEXTURE: &str = "flower.png";

const CLEAR_COLOR: [f32; 4] = [0.3, 0.4, 0.9, 1.];

// full-screen quad corners: position and texture coordinates
const QUAD_CORNERS: [([f32; 3], [f32; 2]); 4] = [
  ([-1., -1., 0.], [0., 0.]),
  ([1., -1., 0.], [1., 0.]),
  ([1., 1., 0.], [1., 1.]),
  ([-1., 1., 0.], [0., 1.]),
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

#[derive(UniformInterface)]
struct BackgroundInterface {
  time: Uniform<f32>,
  background: Uniform<TextureBinding<Dim2, NormUnsigned>>,
  noise: Uniform<TextureBinding<Dim2, NormUnsigned>>,
}

#[derive(UniformInterface)]
struct CharacterInterface {
  time: Uniform<f32>,
  character: Uniform<TextureBinding<Dim2, NormUnsigned>>,
}

pub struct LocalExample {
  background_program: Program<Semantics, (), BackgroundInterface>,
  character_program: Program<Semantics, (), CharacterInterface>,
  quad: Tess<QuadVertex, u16>,
  background: RGBATexture,
  noise: RGBATexture,
  character: RGBATexture,
  clock: AnimationClock,
}

impl Example for LocalExample {
  fn features() -> Features {
    Features::none()
      .texture(BACKGROUND_TEXTURE)
      .texture(NOISE_TEXTURE)
      .texture(CHARACTER_TEXTURE)
  }

  fn bootstrap(
    platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, AssignmentError> {
    let background = load_texture(
      context,
      platform,
      BACKGROUND_TEXTURE,
      TextureOptions::new(Wrap::Repeat, Filter::Nearest),
    )?;
    let noise = load_texture(
      context,
      platform,
      NOISE_TEXTURE,
      TextureOptions::new(Wrap::Repeat, Filter::Nearest),
    )?;
    let character = load_texture(
      context,
      platform,
      CHARACTER_TEXTURE,
      TextureOptions::new(Wrap::ClampToEdge, Filter::Nearest),
    )?;

    let background_program = build_program(context, BACKGROUND_VS, BACKGROUND_FS)?;
    let character_program = build_program(context, CHARACTER_VS, CHARACTER_FS)?;

    let vertices: Vec<QuadVertex> = QUAD_CORNERS
      .iter()
      .map(|&(position, uv)| QuadVertex::new(VertexPosition::new(position), VertexUV::new(uv)))
      .collect();
    let quad = context
      .new_tess()
      .set_vertices(vertices)
      .set_indices(&QUAD_INDICES[..])
      .set_mode(Mode::Triangle)
      .build()?;

    Ok(LocalExample {
      background_program,
      character_program,
      quad,
      background,
      noise,
      character,
      clock: AnimationClock::default(),
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
          self.clock.toggle();
          log::info!(
            "animation {}",
            if self.clock.is_paused() {
              "paused"
            } else {
              "resumed"
            }
          );
        }

        _ => (),
      }
    }

    let t = self.clock.tick(time);

    let background_program = &mut self.background_program;
    let character_program = &mut self.character_program;
    let background = &mut self.background;
    let noise = &mut self.noise;
    let character = &mut self.character;
    let quad = &self.quad;

    // layers are ordered by drawing order, not by depth
    let background_st = &RenderState::default().set_depth_test(None);
    let character_st = &RenderState::default()
      .set_depth_test(None)
      .set_blending(Blending {
        equation: Equation::Additive,
        src: Factor::SrcAlpha,
        dst: Factor::SrcAlphaComplement,
      });

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color(CLEAR_COLOR),
        |pipeline, mut shd_gate| {
          let bound_background = pipeline.bind_texture(background)?;
          let bound_noise = pipeline.bind_texture(noise)?;
          let bound_character = pipeline.bind_texture(character)?;

          shd_gate.shade(background_program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.time, t);
            iface.set(&uni.background, bound_background.binding());
            iface.set(&uni.noise, bound_noise.binding());

            rdr_gate.render(background_st, |mut tess_gate| tess_gate.render(quad))
          })?;

          shd_gate.shade(character_program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.time, t);
            iface.set(&uni.character, bound_character.binding());

            rdr_gate.render(character_st, |mut tess_gate| tess_gate.render(quad))
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
  fn quad_covers_clip_space_counter_clockwise() {
    for tri in QUAD_INDICES.chunks(3) {
      let p = |i: u16| QUAD_CORNERS[i as usize].0;
      let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
      let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
      assert!(cross > 0.);
    }

    for &([x, y, _], [u, w]) in &QUAD_CORNERS {
      assert_eq!(u, (x + 1.) * 0.5);
      assert_eq!(w, (y + 1.) * 0.5);
    }
  }
}
