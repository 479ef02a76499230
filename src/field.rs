use crate::grid::Grid2;
use glam::{Vec2, Vec4};
use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

/// Per-cell value stored in a [`Field2`].
pub trait FieldValue:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
{
    const ZERO: Self;

    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl FieldValue for f32 {
    const ZERO: Self = 0.0;
}

impl FieldValue for Vec2 {
    const ZERO: Self = Vec2::ZERO;
}

impl FieldValue for Vec4 {
    const ZERO: Self = Vec4::ZERO;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field2<T> {
    grid: Grid2,
    data: Vec<T>,
}

impl<T: FieldValue> Field2<T> {
    pub fn new(grid: Grid2, fill: T) -> Self {
        let data = vec![fill; grid.size()];
        Self { grid, data }
    }

    pub fn zeros(grid: Grid2) -> Self {
        Self::new(grid, T::ZERO)
    }

    pub fn from_fn(grid: Grid2, f: impl Fn(usize, usize) -> T) -> Self {
        let data = (0..grid.size())
            .map(|i| {
                let (x, y) = grid.coord(i);
                f(x, y)
            })
            .collect();
        Self { grid, data }
    }

    pub fn grid(&self) -> Grid2 {
        self.grid
    }

    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.grid.idx(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let i = self.grid.idx(x, y);
        self.data[i] = value;
    }

    pub fn sample_clamped(&self, x: i32, y: i32) -> T {
        let (cx, cy) = self.grid.clamp_coord(x, y);
        self.get(cx, cy)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn copy_from(&mut self, other: &Self) {
        self.assert_same_grid(other);
        self.data.copy_from_slice(&other.data);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub(crate) fn assert_same_grid(&self, other: &Self) {
        assert_eq!(self.grid, other.grid, "field grid mismatch");
    }
}

impl Field2<f32> {
    pub fn abs_sum(&self) -> f32 {
        self.data.iter().map(|value| value.abs()).sum()
    }
}

/// Ping-pong pair: stages read `current` and write `scratch`, then `swap`.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldPair<T> {
    current: Field2<T>,
    scratch: Field2<T>,
}

impl<T: FieldValue> FieldPair<T> {
    pub fn zeros(grid: Grid2) -> Self {
        Self {
            current: Field2::zeros(grid),
            scratch: Field2::zeros(grid),
        }
    }

    pub fn grid(&self) -> Grid2 {
        self.current.grid()
    }

    pub fn current(&self) -> &Field2<T> {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut Field2<T> {
        &mut self.current
    }

    /// Read view of `current` alongside write access to `scratch`.
    pub fn split(&mut self) -> (&Field2<T>, &mut Field2<T>) {
        (&self.current, &mut self.scratch)
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.scratch);
    }

    pub fn clear(&mut self) {
        self.current.fill(T::ZERO);
        self.scratch.fill(T::ZERO);
    }
}
