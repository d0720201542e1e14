pub mod matrix;

use std::fmt;
use std::ops;

pub use matrix::Matrix;

/// Numeric component of a Vector. Implemented for f32 and i32.
pub trait Scalar:
    Copy
    + Default
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + ops::Add<Output = Self>
    + ops::Sub<Output = Self>
    + ops::Mul<Output = Self>
    + ops::Div<Output = Self>
    + ops::Neg<Output = Self>
{
    const ZERO: Self;
    const ONE: Self;
}

impl Scalar for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
}

impl Scalar for i32 {
    const ZERO: Self = 0;
    const ONE: Self = 1;
}

/// Fixed arity vector. Arity is a compile time constant, component access via [] is bounds checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<T, const N: usize>(pub [T; N]);

pub type Vector2<T> = Vector<T, 2>;
pub type Vector3<T> = Vector<T, 3>;
pub type Vector4<T> = Vector<T, 4>;

pub type Vector2i = Vector<i32, 2>;
pub type Vector3i = Vector<i32, 3>;
pub type Vector2f = Vector<f32, 2>;
pub type Vector3f = Vector<f32, 3>;
pub type Vector4f = Vector<f32, 4>;

impl<T: Scalar, const N: usize> Default for Vector<T, N> {
    fn default() -> Self {
        return Vector([T::ZERO; N]);
    }
}

impl<T: Scalar, const N: usize> From<[T; N]> for Vector<T, N> {
    fn from(components: [T; N]) -> Self {
        return Vector(components);
    }
}

impl<const N: usize> From<Vector<i32, N>> for Vector<f32, N> {
    fn from(v: Vector<i32, N>) -> Self {
        return Vector(v.0.map(|c| c as f32));
    }
}

impl<T: Scalar, const N: usize> Vector<T, N> {
    /// Dot product of 2 vectors.
    pub fn dot(&self, rhs: &Self) -> T {
        let mut sum = T::ZERO;
        for i in 0..N {
            sum = sum + self.0[i] * rhs.0[i];
        }
        return sum;
    }

    /// M-vector with the available components copied and the missing trailing ones set to `fill`.
    /// `embed::<4>(1.0)` turns a point into homogeneous coordinates.
    pub fn embed<const M: usize>(&self, fill: T) -> Vector<T, M> {
        let mut result = Vector([fill; M]);
        for i in 0..M.min(N) {
            result.0[i] = self.0[i];
        }
        return result;
    }

    /// First M components. Panics when M > N.
    pub fn proj<const M: usize>(&self) -> Vector<T, M> {
        assert!(M <= N, "can't project {}-vector to {} components", N, M);
        let mut result = Vector([T::ZERO; M]);
        result.0.copy_from_slice(&self.0[..M]);
        return result;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        return self.0.iter();
    }
}

impl<const N: usize> Vector<f32, N> {
    /// Euclidean norm.
    pub fn norm(&self) -> f32 {
        return self.dot(self).sqrt();
    }

    /// Scales the vector in place to have the given length.
    /// Zero vector gives NaN components, caller has to guard.
    pub fn normalize_to(&mut self, length: f32) -> &mut Self {
        *self = *self * (length / self.norm());
        return self;
    }

    /// In place normalization to unit length.
    pub fn normalize(&mut self) -> &mut Self {
        return self.normalize_to(1.0);
    }

    /// Unit length copy of the vector.
    pub fn normalized(mut self) -> Self {
        self.normalize();
        return self;
    }
}

impl<T: Scalar> Vector<T, 2> {
    pub fn new(x: T, y: T) -> Self {
        return Vector([x, y]);
    }

    pub fn x(&self) -> T {
        return self.0[0];
    }

    pub fn y(&self) -> T {
        return self.0[1];
    }
}

impl<T: Scalar> Vector<T, 3> {
    pub fn new(x: T, y: T, z: T) -> Self {
        return Vector([x, y, z]);
    }

    pub fn x(&self) -> T {
        return self.0[0];
    }

    pub fn y(&self) -> T {
        return self.0[1];
    }

    pub fn z(&self) -> T {
        return self.0[2];
    }

    /// Cross product of 2 Vector3's.
    pub fn cross(&self, rhs: &Self) -> Self {
        let (a, b) = (self, rhs);
        return Vector([
            a.y() * b.z() - a.z() * b.y(),
            a.z() * b.x() - a.x() * b.z(),
            a.x() * b.y() - a.y() * b.x(),
        ]);
    }
}

impl<T: Scalar> Vector<T, 4> {
    pub fn new(x: T, y: T, z: T, w: T) -> Self {
        return Vector([x, y, z, w]);
    }

    pub fn x(&self) -> T {
        return self.0[0];
    }

    pub fn y(&self) -> T {
        return self.0[1];
    }

    pub fn z(&self) -> T {
        return self.0[2];
    }

    pub fn w(&self) -> T {
        return self.0[3];
    }

    pub fn xyz(&self) -> Vector<T, 3> {
        return self.proj::<3>();
    }
}

impl<T: Scalar, const N: usize> ops::Index<usize> for Vector<T, N> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        return &self.0[i];
    }
}

impl<T: Scalar, const N: usize> ops::IndexMut<usize> for Vector<T, N> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        return &mut self.0[i];
    }
}

impl<T: Scalar, const N: usize> ops::Add<Vector<T, N>> for Vector<T, N> {
    type Output = Vector<T, N>;

    fn add(mut self, _rhs: Vector<T, N>) -> Vector<T, N> {
        for i in 0..N {
            self.0[i] = self.0[i] + _rhs.0[i];
        }
        return self;
    }
}

impl<T: Scalar, const N: usize> ops::Sub<Vector<T, N>> for Vector<T, N> {
    type Output = Vector<T, N>;

    fn sub(mut self, _rhs: Vector<T, N>) -> Vector<T, N> {
        for i in 0..N {
            self.0[i] = self.0[i] - _rhs.0[i];
        }
        return self;
    }
}

impl<T: Scalar, const N: usize> ops::Neg for Vector<T, N> {
    type Output = Vector<T, N>;

    fn neg(self) -> Vector<T, N> {
        return Vector(self.0.map(|c| -c));
    }
}

impl<T: Scalar, const N: usize> ops::Mul<T> for Vector<T, N> {
    type Output = Vector<T, N>;

    fn mul(self, _rhs: T) -> Vector<T, N> {
        return Vector(self.0.map(|c| c * _rhs));
    }
}

impl<const N: usize> ops::Mul<Vector<f32, N>> for f32 {
    type Output = Vector<f32, N>;

    fn mul(self, _rhs: Vector<f32, N>) -> Vector<f32, N> {
        return _rhs * self;
    }
}

impl<T: Scalar, const N: usize> ops::Div<T> for Vector<T, N> {
    type Output = Vector<T, N>;

    fn div(self, _rhs: T) -> Vector<T, N> {
        return Vector(self.0.map(|c| c / _rhs));
    }
}

impl<T: Scalar, const N: usize> ops::AddAssign for Vector<T, N> {
    fn add_assign(&mut self, _rhs: Vector<T, N>) {
        *self = *self + _rhs;
    }
}

impl<T: Scalar, const N: usize> ops::SubAssign for Vector<T, N> {
    fn sub_assign(&mut self, _rhs: Vector<T, N>) {
        *self = *self - _rhs;
    }
}

impl<T: Scalar, const N: usize> fmt::Display for Vector<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", component)?;
        }
        return Ok(());
    }
}
