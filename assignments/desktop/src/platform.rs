//! Platform services implementation.

use assignments::{Features, PlatformServices, Settings};
use image::{ImageError, RgbaImage};
use std::{
  collections::HashMap,
  error::Error,
  fmt,
  path::{Path, PathBuf},
};

/// Desktop implementation of the [`PlatformServices`] API.
///
/// Textures are read from disk once, when the services are created.
#[derive(Debug)]
pub struct DesktopPlatformServices {
  settings: Settings,
  textures: HashMap<String, RgbaImage>,
}

impl DesktopPlatformServices {
  pub fn new(
    texture_root: &Path,
    settings: Settings,
    features: Features,
  ) -> Result<Self, DesktopFetchError> {
    let textures = features
      .textures()
      .iter()
      .map(|name| {
        let texture = load_image(&texture_root.join(name))?;
        Ok((name.clone(), texture))
      })
      .collect::<Result<_, DesktopFetchError>>()?;

    Ok(Self { settings, textures })
  }
}

// OpenGL expects the first row to be the bottom one.
fn load_image(path: &Path) -> Result<RgbaImage, DesktopFetchError> {
  log::debug!("loading {}", path.display());

  image::open(path)
    .map(|img| img.flipv().to_rgba8())
    .map_err(|source| DesktopFetchError::Image {
      path: path.to_owned(),
      source,
    })
}

#[derive(Debug)]
pub enum DesktopFetchError {
  UnknownTexture(String),
  Image { path: PathBuf, source: ImageError },
}

impl fmt::Display for DesktopFetchError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      DesktopFetchError::UnknownTexture(ref name) => write!(f, "unknown texture to load: {}", name),
      DesktopFetchError::Image { ref path, ref source } => {
        write!(f, "cannot load image {}: {}", path.display(), source)
      }
    }
  }
}

impl Error for DesktopFetchError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      DesktopFetchError::UnknownTexture(_) => None,
      DesktopFetchError::Image { ref source, .. } => Some(source),
    }
  }
}

impl PlatformServices for DesktopPlatformServices {
  type FetchError = DesktopFetchError;

  fn fetch_texture(&mut self, name: impl AsRef<str>) -> Result<&RgbaImage, Self::FetchError> {
    let name = name.as_ref();
    self
      .textures
      .get(name)
      .ok_or_else(|| DesktopFetchError::UnknownTexture(name.to_owned()))
  }

  fn settings(&self) -> &Settings {
    &self.settings
  }
}
