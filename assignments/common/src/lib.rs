//! Graphics coursework assignments.
//!
//! This crate provides the assignments as a set of platform-agnostic demos: texturing, camera
//! control and Phong lighting. Running them on a given windowing backend is done once for the whole
//! set by the platform code (see the `assignments-desktop` crate).
//!
//! # Architecture
//!
//! Assignments are simple modules exposed from this crate. They do not depend on any
//! platform-specific concepts, such as system events or window capacities. Whenever an assignment
//! requires user interaction, an abstract [`InputAction`] is used, which the platform code maps
//! from its own events.
//!
//! Assignments are responsible for allocating the luminance resources and implementing their
//! render loop through the [`Example`] trait.
//!
//! The reusable part lives next to them:
//!
//! - [`transform`] and [`camera`] build model, view and projection matrices.
//! - [`camera_controller`] implements the mouse-look, fly-through camera.
//! - [`procgen`] generates plane, sphere, cylinder and cube meshes on the CPU.
//! - [`shared`] uploads those meshes and textures to the GPU.

use image::RgbaImage;
use luminance_front::{
  context::GraphicsContext,
  framebuffer::Framebuffer,
  shader::ProgramError,
  tess::TessError,
  texture::{Dim2, TextureError},
  Backend,
};
use std::{error::Error, fmt};

pub mod camera;
pub mod camera_controller;
pub mod cubes;
pub mod lighting;
pub mod procgen;
pub mod shared;
pub mod textures;
pub mod transform;

use procgen::MeshError;

/// Assignment interface.
pub trait Example: Sized {
  /// Features the assignment needs the platform to provide before bootstrapping.
  fn features() -> Features {
    Features::none()
  }

  /// Bootstrap the assignment.
  fn bootstrap(
    platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, AssignmentError>;

  /// Render a frame of the assignment.
  ///
  /// `time` is the number of seconds elapsed since the platform started the assignment.
  fn render_frame(
    self,
    time: f32,
    back_buffer: Framebuffer<Dim2, (), ()>,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> LoopFeedback<Self>;
}

/// Movement direction, relative to where the camera is looking.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
  Forward,
  Backward,
  Left,
  Right,
  Up,
  Down,
}

impl Direction {
  /// All the directions, in declaration order.
  pub const ALL: [Direction; 6] = [
    Direction::Forward,
    Direction::Backward,
    Direction::Left,
    Direction::Right,
    Direction::Up,
    Direction::Down,
  ];
}

/// A type used to pass “inputs” to assignments.
#[derive(Clone, Debug, PartialEq)]
pub enum InputAction {
  /// Quit the application.
  Quit,

  /// Main action. Typically used to switch an effect on and off or to cycle through it.
  MainToggle,

  /// Auxiliary action. Often used to select which parameter the increase / decrease actions tweak.
  AuxiliaryToggle,

  /// The aim button (right mouse button on desktop) was pressed; the camera follows the cursor.
  AimPressed,

  /// The aim button was released.
  AimReleased,

  /// The cursor moved, in window coordinates (pixels, origin at the top-left corner).
  CursorMoved { x: f32, y: f32 },

  /// A movement key changed state.
  Move { direction: Direction, active: bool },

  /// The sprint modifier changed state.
  Sprint { active: bool },

  /// Switch between perspective and orthographic projection.
  ToggleProjection,

  /// Reset the camera to its initial state.
  Reset,

  /// Increase the currently selected parameter.
  Increase,

  /// Decrease the currently selected parameter.
  Decrease,

  /// Vertical scrolling.
  VScroll { amount: f32 },

  /// Framebuffer size changed.
  Resized { width: u32, height: u32 },
}

/// What to do after a frame was rendered.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoopFeedback<T> {
  Continue(T),
  Exit,
}

/// Features an assignment requires from the platform.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Features {
  textures: Vec<String>,
}

impl Features {
  /// No feature required.
  pub fn none() -> Self {
    Self::default()
  }

  /// Require a texture, by name.
  pub fn texture(mut self, name: impl Into<String>) -> Self {
    self.textures.push(name.into());
    self
  }

  /// Textures to preload.
  pub fn textures(&self) -> &[String] {
    &self.textures
  }
}

/// User-tweakable settings, provided by the platform.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
  /// Initial window size, in pixels.
  pub window_size: [u32; 2],
  /// Vertical field of view, in degrees.
  pub fov: f32,
  /// Camera speed, in units per second.
  pub move_speed: f32,
  /// Camera speed while sprinting, in units per second.
  pub sprint_move_speed: f32,
  /// Degrees of rotation per pixel of cursor motion.
  pub mouse_sensitivity: f32,
}

impl Settings {
  /// Aspect ratio of the initial window.
  pub fn aspect_ratio(&self) -> f32 {
    let [width, height] = self.window_size;

    if height == 0 {
      1.
    } else {
      width as f32 / height as f32
    }
  }
}

impl Default for Settings {
  fn default() -> Self {
    Settings {
      window_size: [1080, 720],
      fov: 60.,
      move_speed: 5.,
      sprint_move_speed: 10.,
      mouse_sensitivity: 0.1,
    }
  }
}

/// Services the platform provides to assignments.
pub trait PlatformServices {
  type FetchError: Error + 'static;

  /// Get a preloaded texture, decoded as RGBA and flipped so that its first row is the bottom one.
  fn fetch_texture(&mut self, name: impl AsRef<str>) -> Result<&RgbaImage, Self::FetchError>;

  /// Settings to start with.
  fn settings(&self) -> &Settings;
}

/// What can go wrong while bootstrapping an assignment.
#[derive(Debug)]
pub enum AssignmentError {
  /// The platform could not provide a texture.
  Fetch {
    name: String,
    source: Box<dyn Error>,
  },
  /// The texture could not be created on the GPU.
  Texture(TextureError),
  /// A shader program failed to compile or link.
  Program(ProgramError),
  /// A tessellation could not be created.
  Tess(TessError),
  /// A procedural mesh was asked with invalid parameters.
  Mesh(MeshError),
}

impl fmt::Display for AssignmentError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      AssignmentError::Fetch { ref name, ref source } => {
        write!(f, "cannot fetch texture {}: {}", name, source)
      }
      AssignmentError::Texture(ref e) => write!(f, "cannot create texture: {}", e),
      AssignmentError::Program(ref e) => write!(f, "cannot create shader program: {}", e),
      AssignmentError::Tess(ref e) => write!(f, "cannot create tessellation: {}", e),
      AssignmentError::Mesh(ref e) => write!(f, "cannot generate mesh: {}", e),
    }
  }
}

impl Error for AssignmentError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      AssignmentError::Fetch { ref source, .. } => Some(source.as_ref()),
      AssignmentError::Texture(ref e) => Some(e),
      AssignmentError::Program(ref e) => Some(e),
      AssignmentError::Tess(ref e) => Some(e),
      AssignmentError::Mesh(ref e) => Some(e),
    }
  }
}

impl From<TextureError> for AssignmentError {
  fn from(e: TextureError) -> Self {
    AssignmentError::Texture(e)
  }
}

impl From<ProgramError> for AssignmentError {
  fn from(e: ProgramError) -> Self {
    AssignmentError::Program(e)
  }
}

impl From<TessError> for AssignmentError {
  fn from(e: TessError) -> Self {
    AssignmentError::Tess(e)
  }
}

impl From<MeshError> for AssignmentError {
  fn from(e: MeshError) -> Self {
    AssignmentError::Mesh(e)
  }
}
