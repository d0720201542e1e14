//! Camera matrices. The driver composes them as `viewport * projection * look_at * point`.

use serde::{Deserialize, Serialize};

use crate::util::{Matrix, Vector3f, Vector4f};

/// Point the view transform moves to the origin before rotating into the camera basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewAnchor {
    /// Standard view transform, the eye ends up in the origin. Pair it with a projection whose
    /// center sits in the origin, `projection` with `Camera::projection_coefficient` doesn't.
    Eye,
    /// Look-at target ends up in the origin and the eye at distance |eye - center| along +z, which is
    /// where `projection(Camera::projection_coefficient())` puts the center of projection.
    #[default]
    Center,
}

/// Placement of the camera in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vector3f,
    pub center: Vector3f,
    pub up: Vector3f,
    pub anchor: ViewAnchor,
}

impl Camera {
    pub fn new(eye: Vector3f, center: Vector3f, up: Vector3f) -> Camera {
        return Camera { eye, center, up, anchor: ViewAnchor::default() };
    }

    pub fn view_matrix(&self) -> Matrix {
        return look_at_anchored(self.eye, self.center, self.up, self.anchor);
    }

    /// Perspective coefficient -1 / |eye - center|. Puts the center of projection into the eye when
    /// the view is anchored at `center`.
    pub fn projection_coefficient(&self) -> f32 {
        return -1.0 / (self.eye - self.center).norm();
    }

    /// True when `up` is (nearly) parallel to the view direction or eye and center coincide, i.e. when
    /// `look_at` can't build a basis. The tolerance bounds the norm of the unnormalized x axis.
    pub fn is_degenerate(&self, tolerance: f32) -> bool {
        let forward = self.eye - self.center;
        if forward.norm() <= tolerance {
            return true;
        }
        let z = forward.normalized();
        return !(self.up.cross(&z).norm() > tolerance);
    }
}

/// World to camera transform, anchored at the eye.
///
/// Builds the orthonormal basis z = normalize(eye - center), x = normalize(up x z), y = z x x.
/// With `up` parallel to eye - center the basis has NaN components, see `Camera::is_degenerate`.
pub fn look_at(eye: Vector3f, center: Vector3f, up: Vector3f) -> Matrix {
    return look_at_anchored(eye, center, up, ViewAnchor::Eye);
}

/// `look_at` with an explicit translation anchor.
pub fn look_at_anchored(eye: Vector3f, center: Vector3f, up: Vector3f, anchor: ViewAnchor) -> Matrix {
    let z = (eye - center).normalized();
    let x = up.cross(&z).normalized();
    let y = z.cross(&x).normalized();
    let origin = match anchor {
        ViewAnchor::Eye => eye,
        ViewAnchor::Center => center,
    };
    let mut m_inv = Matrix::identity(4);
    let mut tr = Matrix::identity(4);
    for i in 0..3 {
        m_inv[0][i] = x[i];
        m_inv[1][i] = y[i];
        m_inv[2][i] = z[i];
        tr[i][3] = -origin[i];
    }
    return m_inv * tr;
}

/// Identity with `coeff` packed into the last row, so that w = 1 + coeff * z after the transform.
pub fn projection(coeff: f32) -> Matrix {
    let mut m = Matrix::identity(4);
    m[3][2] = coeff;
    return m;
}

/// Maps the [-1, 1]^3 cube to the pixel rectangle [x, x + w] x [y, y + h] and depths [0, depth].
pub fn viewport(x: i32, y: i32, w: i32, h: i32, depth: f32) -> Matrix {
    let mut m = Matrix::identity(4);
    m[0][3] = x as f32 + w as f32 / 2.0;
    m[1][3] = y as f32 + h as f32 / 2.0;
    m[2][3] = depth / 2.0;

    m[0][0] = w as f32 / 2.0;
    m[1][1] = h as f32 / 2.0;
    m[2][2] = depth / 2.0;
    return m;
}

/// 4x1 column matrix holding the point in homogeneous coordinates.
pub fn v2m(v: Vector3f) -> Matrix {
    let mut m = Matrix::new(4, 1);
    m[0][0] = v.x();
    m[1][0] = v.y();
    m[2][0] = v.z();
    m[3][0] = 1.0;
    return m;
}

/// Point from a 4x1 column matrix, with the perspective divide applied.
pub fn m2v(m: &Matrix) -> Vector3f {
    assert!(m.nrows() == 4 && m.ncols() == 1, "expected a 4x1 column");
    return Vector3f::new(m[0][0] / m[3][0], m[1][0] / m[3][0], m[2][0] / m[3][0]);
}

/// Perspective divide of a homogeneous point.
pub fn homogeneous_to_point(v: Vector4f) -> Vector3f {
    return v.xyz() / v.w();
}
