mod boundary;
mod clip_plane;

pub use boundary::Boundary;
pub use clip_plane::ClipPlane;
