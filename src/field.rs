//! Double-buffered 2D simulation fields.
//!
//! A [`Field`] is a grid of `Vec4` cells matching the viewport resolution:
//!
//! - **x, y**: velocity-like displacement, in pixels per frame
//! - **z**: scalar trail / density
//! - **w**: auxiliary activity weight
//!
//! Row 0 is the bottom row, so field coordinates have their origin at the
//! bottom-left like the pointer coordinates fed into the simulation.
//!
//! # Addressing
//!
//! All addressing wraps toroidally. Cell `(i, j)` has its centre at
//! `(i + 0.5, j + 0.5)` in pixel units, which is where [`Field::sample`]
//! returns the exact stored value. Between centres it filters bilinearly,
//! the same way a linearly-filtered repeat-mode texture does on the GPU.
//!
//! # Double Buffering
//!
//! [`FieldPair`] owns two fields and a role flag. The simulation pass reads
//! the front field and writes the back field; [`FieldPair::swap`] flips the
//! roles without touching any cell data.

use glam::{Vec2, Vec4};

/// A 2D grid of four-channel float cells with toroidal addressing.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    width: u32,
    height: u32,
    cells: Vec<Vec4>,
}

impl Field {
    /// Create a cleared field.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Vec4::ZERO; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resolution as a float vector, handy for shader-style maths.
    #[inline]
    pub fn resolution(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    #[inline]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Wrap integer cell coordinates into the grid.
    #[inline]
    fn index(&self, x: i64, y: i64) -> usize {
        let x = x.rem_euclid(self.width as i64) as usize;
        let y = y.rem_euclid(self.height as i64) as usize;
        y * self.width as usize + x
    }

    /// Read the cell at integer coordinates, wrapping out-of-range values.
    #[inline]
    pub fn read(&self, x: i64, y: i64) -> Vec4 {
        self.cells[self.index(x, y)]
    }

    /// Write the cell at integer coordinates, wrapping out-of-range values.
    #[inline]
    pub fn write(&mut self, x: i64, y: i64, value: Vec4) {
        let idx = self.index(x, y);
        self.cells[idx] = value;
    }

    /// Bilinear sample at a pixel-space position with wraparound.
    pub fn sample(&self, p: Vec2) -> Vec4 {
        let x = p.x - 0.5;
        let y = p.y - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (ix, iy) = (x0 as i64, y0 as i64);

        let bottom = self.read(ix, iy).lerp(self.read(ix + 1, iy), fx);
        let top = self.read(ix, iy + 1).lerp(self.read(ix + 1, iy + 1), fx);
        bottom.lerp(top, fy)
    }

    /// All cells, row-major from the bottom row up.
    pub fn cells(&self) -> &[Vec4] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Vec4] {
        &mut self.cells
    }

    /// Reset every cell to zero.
    pub fn clear(&mut self) {
        self.cells.fill(Vec4::ZERO);
    }

    /// Largest absolute value of any channel in any cell.
    pub fn max_abs(&self) -> f32 {
        self.cells
            .iter()
            .map(|c| c.abs().max_element())
            .fold(0.0, f32::max)
    }
}

/// Which logical role a buffer currently plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
    A,
    B,
}

/// Two fields of equal size with swappable read/write roles.
#[derive(Debug, Clone)]
pub struct FieldPair {
    a: Field,
    b: Field,
    /// Which buffer is currently the front (last written) field.
    front_is_b: bool,
}

impl FieldPair {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            a: Field::new(width, height),
            b: Field::new(width, height),
            front_is_b: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.a.width()
    }

    pub fn height(&self) -> u32 {
        self.a.height()
    }

    /// Buffer holding the most recently completed frame.
    pub fn front_buffer(&self) -> Buffer {
        if self.front_is_b {
            Buffer::B
        } else {
            Buffer::A
        }
    }

    /// Field the next simulation pass reads from.
    pub fn front(&self) -> &Field {
        if self.front_is_b {
            &self.b
        } else {
            &self.a
        }
    }

    /// Field the next simulation pass writes into.
    pub fn back(&self) -> &Field {
        if self.front_is_b {
            &self.a
        } else {
            &self.b
        }
    }

    /// Direct access to a buffer by name, regardless of role.
    pub fn buffer(&self, buffer: Buffer) -> &Field {
        match buffer {
            Buffer::A => &self.a,
            Buffer::B => &self.b,
        }
    }

    pub fn buffer_mut(&mut self, buffer: Buffer) -> &mut Field {
        match buffer {
            Buffer::A => &mut self.a,
            Buffer::B => &mut self.b,
        }
    }

    /// Borrow the front field for reading and the back field for writing.
    pub fn split(&mut self) -> (&Field, &mut Field) {
        if self.front_is_b {
            (&self.b, &mut self.a)
        } else {
            (&self.a, &mut self.b)
        }
    }

    /// Exchange roles. No cell data moves.
    pub fn swap(&mut self) {
        self.front_is_b = !self.front_is_b;
    }

    /// Reallocate both fields at a new size. All contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.a = Field::new(width, height);
        self.b = Field::new(width, height);
        self.front_is_b = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_field_is_cleared() {
        let f = Field::new(8, 4);
        assert_eq!(f.total_cells(), 32);
        assert!(f.cells().iter().all(|c| *c == Vec4::ZERO));
    }

    #[test]
    fn test_read_write_wraps() {
        let mut f = Field::new(4, 3);
        f.write(-1, 0, Vec4::splat(1.0));
        assert_eq!(f.read(3, 0), Vec4::splat(1.0));
        assert_eq!(f.read(7, 3), Vec4::splat(1.0));
    }

    #[test]
    fn test_sample_at_center_is_exact() {
        let mut f = Field::new(4, 4);
        f.write(2, 1, Vec4::new(0.1, 0.2, 0.3, 0.4));
        assert_eq!(f.sample(Vec2::new(2.5, 1.5)), Vec4::new(0.1, 0.2, 0.3, 0.4));
    }

    #[test]
    fn test_sample_interpolates_between_cells() {
        let mut f = Field::new(4, 4);
        f.write(0, 0, Vec4::splat(0.0));
        f.write(1, 0, Vec4::splat(1.0));
        let v = f.sample(Vec2::new(1.0, 0.5));
        assert!((v.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sample_wraps_across_edge() {
        let mut f = Field::new(4, 4);
        f.write(3, 2, Vec4::splat(0.2));
        f.write(0, 2, Vec4::splat(0.4));
        // Halfway between the last column and the first one
        let v = f.sample(Vec2::new(4.0, 2.5));
        assert!((v.x - 0.3).abs() < 1e-6);
        assert_eq!(f.sample(Vec2::new(4.0, 2.5)), f.sample(Vec2::new(0.0, 2.5)));
    }

    #[test]
    fn test_swap_flips_roles_without_copy() {
        let mut pair = FieldPair::new(2, 2);
        pair.buffer_mut(Buffer::B).write(0, 0, Vec4::ONE);

        assert_eq!(pair.front_buffer(), Buffer::A);
        assert_eq!(pair.back().read(0, 0), Vec4::ONE);

        pair.swap();
        assert_eq!(pair.front_buffer(), Buffer::B);
        assert_eq!(pair.front().read(0, 0), Vec4::ONE);
        assert_eq!(pair.back().read(0, 0), Vec4::ZERO);
    }

    #[test]
    fn test_split_reads_front_writes_back() {
        let mut pair = FieldPair::new(2, 2);
        {
            let (front, back) = pair.split();
            back.write(1, 1, front.read(1, 1) + Vec4::splat(0.25));
        }
        assert_eq!(pair.front().read(1, 1), Vec4::ZERO);
        assert_eq!(pair.back().read(1, 1), Vec4::splat(0.25));
    }

    #[test]
    fn test_resize_clears_both_buffers() {
        let mut pair = FieldPair::new(4, 4);
        pair.buffer_mut(Buffer::A).write(1, 1, Vec4::ONE);
        pair.buffer_mut(Buffer::B).write(2, 2, Vec4::ONE);
        pair.swap();

        pair.resize(6, 3);
        assert_eq!(pair.width(), 6);
        assert_eq!(pair.height(), 3);
        assert_eq!(pair.front_buffer(), Buffer::A);
        assert_eq!(pair.front().max_abs(), 0.0);
        assert_eq!(pair.back().max_abs(), 0.0);
    }
}
