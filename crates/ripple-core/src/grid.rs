use crate::constants::MAX_GRID_EDGE;

/// Width and height of a surface or simulation grid, never smaller than 1x1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.clamp(1, MAX_GRID_EDGE),
            height: height.clamp(1, MAX_GRID_EDGE),
        }
    }

    /// Simulation grid for a surface at the given resolution scale, rounded up.
    pub fn scaled(self, scale: f32) -> Self {
        let s = scale.clamp(f32::EPSILON, 1.0);
        Self::new(
            (self.width as f32 * s).ceil() as u32,
            (self.height as f32 * s).ceil() as u32,
        )
    }

    #[inline]
    pub fn cells(self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height as f32
    }

    #[inline]
    pub fn index(self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Mirror an out-of-range index back inside `0..n`.
///
/// `-1` maps to `1` and `n` maps to `n - 2`, so a boundary cell reuses its
/// opposite interior neighbour. A 1-wide axis maps everything to `0`.
#[inline]
pub fn reflect_index(i: i64, n: u32) -> u32 {
    let n = n as i64;
    if n <= 1 {
        return 0;
    }
    let mut j = i;
    if j < 0 {
        j = -j;
    }
    if j >= n {
        j = 2 * (n - 1) - j;
    }
    j.clamp(0, n - 1) as u32
}
