//! Procedural mesh generation.
//!
//! Meshes are indexed triangle lists. Front faces wind counter-clockwise when seen from outside
//! the shape, so back-face culling can be left on.

use cgmath::{Vector2, Vector3};
use std::{
  error::Error,
  f32::consts::{PI, TAU},
  fmt,
};

/// A single mesh vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
  pub position: Vector3<f32>,
  pub normal: Vector3<f32>,
  pub uv: Vector2<f32>,
}

impl Vertex {
  pub fn new(position: Vector3<f32>, normal: Vector3<f32>, uv: Vector2<f32>) -> Self {
    Vertex {
      position,
      normal,
      uv,
    }
  }
}

/// CPU-side mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
  pub vertices: Vec<Vertex>,
  pub indices: Vec<u32>,
}

impl MeshData {
  fn with_capacity(vertices: usize, indices: usize) -> Self {
    MeshData {
      vertices: Vec::with_capacity(vertices),
      indices: Vec::with_capacity(indices),
    }
  }

  // index the next pushed vertex will get
  fn next_index(&self) -> u32 {
    self.vertices.len() as u32
  }
}

/// Invalid procedural mesh parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum MeshError {
  TooFewSegments {
    shape: &'static str,
    min: u32,
    got: u32,
  },
  /// The mesh would hold more vertices or indices than 32-bit indices can address.
  TooManySegments { shape: &'static str, got: u32 },
  InvalidDimension {
    shape: &'static str,
    name: &'static str,
    value: f32,
  },
}

impl fmt::Display for MeshError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      MeshError::TooFewSegments { shape, min, got } => write!(
        f,
        "a {} needs at least {} segments, got {}",
        shape, min, got
      ),
      MeshError::TooManySegments { shape, got } => write!(
        f,
        "a {} with {} segments doesn’t fit 32-bit indices",
        shape, got
      ),
      MeshError::InvalidDimension { shape, name, value } => write!(
        f,
        "{} {} must be positive and finite, got {}",
        shape, name, value
      ),
    }
  }
}

impl Error for MeshError {}

fn check_dimension(shape: &'static str, name: &'static str, value: f32) -> Result<(), MeshError> {
  if value.is_finite() && value > 0. {
    Ok(())
  } else {
    Err(MeshError::InvalidDimension { shape, name, value })
  }
}

fn check_segments(shape: &'static str, min: u32, got: u32) -> Result<(), MeshError> {
  if got >= min {
    Ok(())
  } else {
    Err(MeshError::TooFewSegments { shape, min, got })
  }
}

// Vertex and index counts are computed in u64 and must fit u32; `None` means the computation
// overflowed.
fn check_counts(
  shape: &'static str,
  segments: u32,
  vertices: Option<u64>,
  indices: Option<u64>,
) -> Result<(usize, usize), MeshError> {
  let max = u64::from(u32::MAX);

  match (vertices, indices) {
    (Some(vertices), Some(indices)) if vertices <= max && indices <= max => {
      Ok((vertices as usize, indices as usize))
    }
    _ => Err(MeshError::TooManySegments {
      shape,
      got: segments,
    }),
  }
}

// `n`×`n` quads with a duplicated last row and column of vertices.
fn check_grid(shape: &'static str, n: u32) -> Result<(usize, usize), MeshError> {
  let columns = u64::from(n) + 1;
  let quads = u64::from(n).checked_mul(u64::from(n));

  check_counts(
    shape,
    n,
    columns.checked_mul(columns),
    quads.and_then(|q| q.checked_mul(6)),
  )
}

/// Axis-aligned cube centered on the origin, four vertices per face.
pub fn create_cube(size: f32) -> Result<MeshData, MeshError> {
  check_dimension("cube", "size", size)?;

  let h = size * 0.5;
  // normal, right and up of each face, seen from outside; right × up = normal
  let faces = [
    (Vector3::unit_z(), Vector3::unit_x(), Vector3::unit_y()),
    (-Vector3::unit_z(), -Vector3::unit_x(), Vector3::unit_y()),
    (Vector3::unit_x(), -Vector3::unit_z(), Vector3::unit_y()),
    (-Vector3::unit_x(), Vector3::unit_z(), Vector3::unit_y()),
    (Vector3::unit_y(), Vector3::unit_x(), -Vector3::unit_z()),
    (-Vector3::unit_y(), Vector3::unit_x(), Vector3::unit_z()),
  ];
  let corners = [[-1., -1.], [1., -1.], [1., 1.], [-1., 1.]];

  let mut mesh = MeshData::with_capacity(24, 36);

  for &(normal, right, up) in &faces {
    let start = mesh.next_index();

    for &[a, b] in &corners {
      mesh.vertices.push(Vertex::new(
        (normal + right * a + up * b) * h,
        normal,
        Vector2::new((a + 1.) * 0.5, (b + 1.) * 0.5),
      ));
    }

    mesh
      .indices
      .extend_from_slice(&[start, start + 1, start + 2, start + 2, start + 3, start]);
  }

  Ok(mesh)
}

/// Plane in XZ centered on the origin, facing +Y, split in `subdivisions`² quads.
///
/// Rows go from +Z to -Z, columns from -X to +X; UVs span the whole plane.
pub fn create_plane(width: f32, height: f32, subdivisions: u32) -> Result<MeshData, MeshError> {
  check_dimension("plane", "width", width)?;
  check_dimension("plane", "height", height)?;
  check_segments("plane", 1, subdivisions)?;
  let (vertex_count, index_count) = check_grid("plane", subdivisions)?;

  let n = subdivisions;
  let columns = n + 1;
  let mut mesh = MeshData::with_capacity(vertex_count, index_count);

  for row in 0..=n {
    let v = row as f32 / n as f32;

    for col in 0..=n {
      let u = col as f32 / n as f32;

      mesh.vertices.push(Vertex::new(
        Vector3::new(width * (u - 0.5), 0., height * (0.5 - v)),
        Vector3::unit_y(),
        Vector2::new(u, v),
      ));
    }
  }

  for row in 0..n {
    for col in 0..n {
      let start = row * columns + col;

      // bottom right triangle, then top left one
      mesh.indices.extend_from_slice(&[
        start,
        start + 1,
        start + columns + 1,
        start,
        start + columns + 1,
        start + columns,
      ]);
    }
  }

  Ok(mesh)
}

/// UV sphere centered on the origin.
///
/// Rows go from the north pole (+Y) to the south pole; each row duplicates its first vertex at the
/// end so that the texture seam gets its own UVs. The pole rows yield degenerate triangles.
pub fn create_sphere(radius: f32, segments: u32) -> Result<MeshData, MeshError> {
  check_dimension("sphere", "radius", radius)?;
  check_segments("sphere", 3, segments)?;
  let (vertex_count, index_count) = check_grid("sphere", segments)?;

  let n = segments;
  let columns = n + 1;
  let theta_step = TAU / n as f32;
  let phi_step = PI / n as f32;
  let mut mesh = MeshData::with_capacity(vertex_count, index_count);

  for row in 0..=n {
    let (phi_sin, phi_cos) = (row as f32 * phi_step).sin_cos();

    for col in 0..=n {
      let (theta_sin, theta_cos) = (col as f32 * theta_step).sin_cos();
      let normal = Vector3::new(theta_cos * phi_sin, phi_cos, theta_sin * phi_sin);

      mesh.vertices.push(Vertex::new(
        normal * radius,
        normal,
        Vector2::new(col as f32 / n as f32, 1. - row as f32 / n as f32),
      ));
    }
  }

  for row in 0..n {
    for col in 0..n {
      let start = row * columns + col;

      mesh.indices.extend_from_slice(&[
        start,
        start + 1,
        start + columns,
        start + columns,
        start + 1,
        start + columns + 1,
      ]);
    }
  }

  Ok(mesh)
}

/// Capped cylinder centered on the origin, along the Y axis.
///
/// Vertices are laid out as: top center, top cap ring, top side ring, bottom side ring, bottom cap
/// ring, bottom center. Cap and side rings are separate so that each gets its own normals and UVs.
pub fn create_cylinder(height: f32, radius: f32, segments: u32) -> Result<MeshData, MeshError> {
  check_dimension("cylinder", "height", height)?;
  check_dimension("cylinder", "radius", radius)?;
  check_segments("cylinder", 3, segments)?;
  let (vertex_count, index_count) = check_counts(
    "cylinder",
    segments,
    Some(4 * (u64::from(segments) + 1) + 2),
    Some(12 * u64::from(segments)),
  )?;

  let n = segments;
  let columns = n + 1;
  let top = height * 0.5;
  let bottom = -top;
  let theta_step = TAU / n as f32;
  let ring: Vec<(f32, f32)> = (0..=n)
    .map(|i| {
      let (sin, cos) = (i as f32 * theta_step).sin_cos();
      (cos, sin)
    })
    .collect();

  let mut mesh = MeshData::with_capacity(vertex_count, index_count);
  let cap_uv = |cos: f32, sin: f32| Vector2::new((cos + 1.) * 0.5, (sin + 1.) * 0.5);

  let top_center = mesh.next_index();
  mesh.vertices.push(Vertex::new(
    Vector3::new(0., top, 0.),
    Vector3::unit_y(),
    Vector2::new(0.5, 0.5),
  ));

  let top_ring = mesh.next_index();
  for &(cos, sin) in &ring {
    mesh.vertices.push(Vertex::new(
      Vector3::new(cos * radius, top, sin * radius),
      Vector3::unit_y(),
      cap_uv(cos, sin),
    ));
  }

  let side = mesh.next_index();
  for (y, v) in [(top, 1.), (bottom, 0.)].iter().copied() {
    for (i, &(cos, sin)) in ring.iter().enumerate() {
      mesh.vertices.push(Vertex::new(
        Vector3::new(cos * radius, y, sin * radius),
        Vector3::new(cos, 0., sin),
        Vector2::new(i as f32 / n as f32, v),
      ));
    }
  }

  let bottom_ring = mesh.next_index();
  for &(cos, sin) in &ring {
    mesh.vertices.push(Vertex::new(
      Vector3::new(cos * radius, bottom, sin * radius),
      -Vector3::unit_y(),
      cap_uv(cos, sin),
    ));
  }

  let bottom_center = mesh.next_index();
  mesh.vertices.push(Vertex::new(
    Vector3::new(0., bottom, 0.),
    -Vector3::unit_y(),
    Vector2::new(0.5, 0.5),
  ));

  // caps are triangle fans around their center
  for i in 0..n {
    let start = top_ring + i;
    mesh
      .indices
      .extend_from_slice(&[start, top_center, start + 1]);
  }

  for i in 0..n {
    let start = side + i;
    mesh.indices.extend_from_slice(&[
      start,
      start + 1,
      start + columns,
      start + 1,
      start + columns + 1,
      start + columns,
    ]);
  }

  for i in 0..n {
    let start = bottom_ring + i;
    mesh
      .indices
      .extend_from_slice(&[bottom_center, start, start + 1]);
  }

  Ok(mesh)
}
