mod platform;

use assignments::{AssignmentError, Direction, Example, InputAction, LoopFeedback, Settings};
use glfw::{Action, Context as _, CursorMode, Key, Modifiers, MouseButton, WindowEvent};
use luminance_glfw::GlfwSurface;
use luminance_windowing::{WindowDim, WindowOpt};
use platform::{DesktopFetchError, DesktopPlatformServices};
use std::{error::Error, fmt, iter, path::PathBuf, process, time::Instant};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct CLIOpts {
  #[structopt(short, long, default_value = "assets")]
  /// Directory where to pick textures from.
  textures: PathBuf,

  #[structopt(short, long)]
  /// List available assignments.
  list_examples: bool,

  #[structopt(long, default_value = "1080")]
  /// Initial window width, in pixels.
  width: u32,

  #[structopt(long, default_value = "720")]
  /// Initial window height, in pixels.
  height: u32,

  #[structopt(long, default_value = "60")]
  /// Vertical field of view, in degrees.
  fov: f32,

  #[structopt(long, default_value = "5")]
  /// Camera speed, in units per second.
  move_speed: f32,

  #[structopt(long, default_value = "10")]
  /// Camera speed while sprinting, in units per second.
  sprint_speed: f32,

  #[structopt(long, default_value = "0.1")]
  /// Degrees of camera rotation per pixel of mouse motion.
  sensitivity: f32,

  /// Assignment to run.
  example: Option<String>,
}

impl CLIOpts {
  fn settings(&self) -> Settings {
    Settings {
      window_size: [self.width, self.height],
      fov: self.fov,
      move_speed: self.move_speed,
      sprint_move_speed: self.sprint_speed,
      mouse_sensitivity: self.sensitivity,
    }
  }
}

/// Errors that stop an assignment from running.
#[derive(Debug)]
pub enum DesktopError {
  Fetch(DesktopFetchError),
  Surface(String),
  BackBuffer(String),
  Assignment(AssignmentError),
}

impl fmt::Display for DesktopError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      DesktopError::Fetch(ref e) => write!(f, "cannot load textures: {}", e),
      DesktopError::Surface(ref e) => write!(f, "cannot create GLFW surface: {}", e),
      DesktopError::BackBuffer(ref e) => write!(f, "cannot get back buffer: {}", e),
      DesktopError::Assignment(ref e) => write!(f, "cannot bootstrap assignment: {}", e),
    }
  }
}

impl Error for DesktopError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      DesktopError::Fetch(ref e) => Some(e),
      DesktopError::Assignment(ref e) => Some(e),
      _ => None,
    }
  }
}

impl From<DesktopFetchError> for DesktopError {
  fn from(e: DesktopFetchError) -> Self {
    DesktopError::Fetch(e)
  }
}

impl From<AssignmentError> for DesktopError {
  fn from(e: AssignmentError) -> Self {
    DesktopError::Assignment(e)
  }
}

/// Macro to declaratively add assignments.
macro_rules! examples {
  ($($ex_name:literal, $test_ident:ident),* $(,)?) => {
    fn show_available_examples() {
      println!("available assignments:");
      $( println!("  - {}", $ex_name); )*
    }

    // create a function that will run an assignment based on its name
    fn pick_and_run_example(cli_opts: CLIOpts) -> Result<(), DesktopError> {
      let example_name = cli_opts.example.as_ref().map(|n| n.as_str());
      match example_name {
        $(
          Some($ex_name) => {
            run_example::<assignments::$test_ident::LocalExample>(&cli_opts, $ex_name)
          }
        ),*

        _ => {
          log::error!("no assignment found");
          show_available_examples();
          Ok(())
        }
      }
    }
  }
}

// Run an assignment.
fn run_example<E>(cli_opts: &CLIOpts, name: &str) -> Result<(), DesktopError>
where
  E: Example,
{
  let settings = cli_opts.settings();
  let [width, height] = settings.window_size;

  // Check the features so that we know what we need to load.
  let mut services = DesktopPlatformServices::new(&cli_opts.textures, settings, E::features())?;

  // First thing first: we create a new surface to render to and get events from.
  let dim = WindowDim::Windowed { width, height };
  let surface = GlfwSurface::new_gl33(name, WindowOpt::default().set_dim(dim))
    .map_err(|e| DesktopError::Surface(e.to_string()))?;
  let mut context = surface.context;
  let events = surface.events_rx;

  let example = E::bootstrap(&mut services, &mut context)?;
  log::info!("running {}", name);
  let start_t = Instant::now();

  // render a dummy frame to pass a single action containing the initial framebuffer size; the
  // window size asked for might not be the one we got
  let (fb_w, fb_h) = context.window.get_framebuffer_size();
  let back_buffer = context
    .back_buffer()
    .map_err(|e| DesktopError::BackBuffer(e.to_string()))?;
  let feedback = example.render_frame(
    0.,
    back_buffer,
    iter::once(InputAction::Resized {
      width: fb_w as _,
      height: fb_h as _,
    }),
    &mut context,
  );
  let mut example = match feedback {
    LoopFeedback::Exit => return Ok(()),
    LoopFeedback::Continue(example) => example,
  };

  'app: loop {
    // handle events
    context.window.glfw.poll_events();
    let actions: Vec<_> = glfw::flush_messages(&events)
      .flat_map(|(_, event)| adapt_events(event))
      .collect();

    // the cursor is captured while aiming
    for action in &actions {
      match action {
        InputAction::AimPressed => context.window.set_cursor_mode(CursorMode::Disabled),
        InputAction::AimReleased => context.window.set_cursor_mode(CursorMode::Normal),
        _ => (),
      }
    }

    let t = start_t.elapsed().as_secs_f64();
    let back_buffer = context
      .back_buffer()
      .map_err(|e| DesktopError::BackBuffer(e.to_string()))?;
    let feedback = example.render_frame(t as _, back_buffer, actions.into_iter(), &mut context);

    if let LoopFeedback::Continue(stepped) = feedback {
      example = stepped;
      context.window.swap_buffers();
    } else {
      break 'app;
    }
  }

  Ok(())
}

fn movement_direction(key: Key) -> Option<Direction> {
  match key {
    Key::W => Some(Direction::Forward),
    Key::S => Some(Direction::Backward),
    Key::A => Some(Direction::Left),
    Key::D => Some(Direction::Right),
    Key::Q => Some(Direction::Up),
    Key::E => Some(Direction::Down),
    _ => None,
  }
}

fn adapt_events(event: WindowEvent) -> Option<InputAction> {
  match event {
    WindowEvent::Close | WindowEvent::Key(Key::Escape, _, Action::Release, _) => {
      Some(InputAction::Quit)
    }

    WindowEvent::Key(Key::Space, _, Action::Release, mods) => {
      if mods.is_empty() {
        Some(InputAction::MainToggle)
      } else if mods == Modifiers::Shift {
        Some(InputAction::AuxiliaryToggle)
      } else {
        None
      }
    }

    WindowEvent::Key(Key::LeftShift, _, action, _) => match action {
      Action::Press => Some(InputAction::Sprint { active: true }),
      Action::Release => Some(InputAction::Sprint { active: false }),
      Action::Repeat => None,
    },

    WindowEvent::Key(key, _, Action::Press, _) => {
      log::debug!("key press: {:?}", key);
      match key {
        Key::O => Some(InputAction::ToggleProjection),
        Key::R => Some(InputAction::Reset),
        Key::Equal | Key::KpAdd => Some(InputAction::Increase),
        Key::Minus | Key::KpSubtract => Some(InputAction::Decrease),
        _ => movement_direction(key).map(|direction| InputAction::Move {
          direction,
          active: true,
        }),
      }
    }

    WindowEvent::Key(key, _, Action::Release, _) => {
      movement_direction(key).map(|direction| InputAction::Move {
        direction,
        active: false,
      })
    }

    WindowEvent::MouseButton(MouseButton::Button2, action, _) => match action {
      Action::Press => Some(InputAction::AimPressed),
      Action::Release => Some(InputAction::AimReleased),
      Action::Repeat => None,
    },

    WindowEvent::CursorPos(x, y) => Some(InputAction::CursorMoved {
      x: x as _,
      y: y as _,
    }),

    WindowEvent::FramebufferSize(width, height) => Some(InputAction::Resized {
      width: width.max(0) as _,
      height: height.max(0) as _,
    }),

    WindowEvent::Scroll(_, amount) => Some(InputAction::VScroll {
      amount: amount as f32,
    }),

    _ => None,
  }
}

examples! {
  "textures", textures,
  "cubes", cubes,
  "lighting", lighting,
}

fn main() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let cli_opts = CLIOpts::from_args();

  if cli_opts.list_examples {
    show_available_examples();
  } else if let Err(e) = pick_and_run_example(cli_opts) {
    log::error!("{}", e);
    process::exit(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(key: Key, action: Action, mods: Modifiers) -> WindowEvent {
    WindowEvent::Key(key, 0, action, mods)
  }

  #[test]
  fn escape_and_close_quit() {
    assert_eq!(
      adapt_events(key(Key::Escape, Action::Release, Modifiers::empty())),
      Some(InputAction::Quit)
    );
    assert_eq!(adapt_events(WindowEvent::Close), Some(InputAction::Quit));
    assert_eq!(
      adapt_events(key(Key::Escape, Action::Press, Modifiers::empty())),
      None
    );
  }

  #[test]
  fn space_toggles() {
    assert_eq!(
      adapt_events(key(Key::Space, Action::Release, Modifiers::empty())),
      Some(InputAction::MainToggle)
    );
    assert_eq!(
      adapt_events(key(Key::Space, Action::Release, Modifiers::Shift)),
      Some(InputAction::AuxiliaryToggle)
    );
    assert_eq!(
      adapt_events(key(Key::Space, Action::Release, Modifiers::Control)),
      None
    );
  }

  #[test]
  fn movement_keys_report_press_and_release() {
    assert_eq!(
      adapt_events(key(Key::W, Action::Press, Modifiers::empty())),
      Some(InputAction::Move {
        direction: Direction::Forward,
        active: true
      })
    );
    assert_eq!(
      adapt_events(key(Key::E, Action::Release, Modifiers::empty())),
      Some(InputAction::Move {
        direction: Direction::Down,
        active: false
      })
    );
    assert_eq!(
      adapt_events(key(Key::A, Action::Repeat, Modifiers::empty())),
      None
    );
  }

  #[test]
  fn shift_sprints() {
    assert_eq!(
      adapt_events(key(Key::LeftShift, Action::Press, Modifiers::Shift)),
      Some(InputAction::Sprint { active: true })
    );
    assert_eq!(
      adapt_events(key(Key::LeftShift, Action::Release, Modifiers::empty())),
      Some(InputAction::Sprint { active: false })
    );
  }

  #[test]
  fn camera_and_parameter_keys() {
    let press = |k| adapt_events(key(k, Action::Press, Modifiers::empty()));

    assert_eq!(press(Key::O), Some(InputAction::ToggleProjection));
    assert_eq!(press(Key::R), Some(InputAction::Reset));
    assert_eq!(press(Key::Equal), Some(InputAction::Increase));
    assert_eq!(press(Key::KpSubtract), Some(InputAction::Decrease));
    assert_eq!(press(Key::Z), None);
  }

  #[test]
  fn right_mouse_button_aims() {
    assert_eq!(
      adapt_events(WindowEvent::MouseButton(
        MouseButton::Button2,
        Action::Press,
        Modifiers::empty()
      )),
      Some(InputAction::AimPressed)
    );
    assert_eq!(
      adapt_events(WindowEvent::MouseButton(
        MouseButton::Button2,
        Action::Release,
        Modifiers::empty()
      )),
      Some(InputAction::AimReleased)
    );
    assert_eq!(
      adapt_events(WindowEvent::MouseButton(
        MouseButton::Button1,
        Action::Press,
        Modifiers::empty()
      )),
      None
    );
  }

  #[test]
  fn pointer_and_window_events() {
    assert_eq!(
      adapt_events(WindowEvent::CursorPos(12.5, 40.)),
      Some(InputAction::CursorMoved { x: 12.5, y: 40. })
    );
    assert_eq!(
      adapt_events(WindowEvent::Scroll(0., -1.)),
      Some(InputAction::VScroll { amount: -1. })
    );
    assert_eq!(
      adapt_events(WindowEvent::FramebufferSize(800, 600)),
      Some(InputAction::Resized {
        width: 800,
        height: 600
      })
    );
  }

  #[test]
  fn cli_options_become_settings() {
    let opts = CLIOpts::from_iter(&[
      "assignments-desktop",
      "--width",
      "800",
      "--fov",
      "75",
      "lighting",
    ]);
    let settings = opts.settings();

    assert_eq!(opts.example.as_deref(), Some("lighting"));
    assert_eq!(opts.textures, PathBuf::from("assets"));
    assert_eq!(settings.window_size, [800, 720]);
    assert_eq!(settings.fov, 75.);
    assert_eq!(settings.mouse_sensitivity, 0.1);
  }
}
