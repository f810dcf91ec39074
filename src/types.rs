//! Shared scalar/vector type aliases, used the same way across every module
//! so stencil code reads like the math it implements.

use nalgebra::Vector2;

/// The solver is built for `f64`; kept as an alias so the rest of the crate
/// reads in terms of "a real number" rather than a specific width.
pub type Scalar = f64;

/// A 2D index into a grid (i, j), matching the teacher's `Index2` usage for
/// `Grid::cell`/`cell_mut` addressing.
pub type Index2 = Vector2<usize>;

/// A physical-space 2D vector (e.g. grid spacing, coordinates).
pub type Vec2 = Vector2<Scalar>;
