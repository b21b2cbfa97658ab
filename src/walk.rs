//! Turtle Walk Engine
//!
//! Converts symbol strings into paths using turtle graphics.
//! - 2D: position + heading, turns rotate the heading
//! - 3D: position + 3x3 orientation matrix, turns rotate the frame
//!   about local Z and then twist it about local X

use crate::curve::Symbol;

pub type Point2 = [f64; 2];
pub type Point3 = [f64; 3];

/// Row-major 3x3 matrix
pub type Mat3 = [[f64; 3]; 3];

const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Rotation about the Z axis (turn)
fn rot_z(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
}

/// Rotation about the X axis (twist)
fn rot_x(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]]
}

fn mat_mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Walk a symbol string through the plane
///
/// Starts at the origin facing +X. Returns one point per forward
/// symbol, preceded by the origin.
pub fn walk_2d(symbols: &[Symbol], angle_degrees: f64) -> Vec<Point2> {
    let turn = angle_degrees.to_radians();
    let mut path = Vec::with_capacity(symbols.len() / 2 + 2);
    let mut pos = [0.0f64, 0.0];
    let mut heading = 0.0f64;
    path.push(pos);

    for &s in symbols {
        match s {
            Symbol::A | Symbol::B => {
                pos[0] += heading.cos();
                pos[1] += heading.sin();
                path.push(pos);
            }
            Symbol::Left => heading += turn,
            Symbol::Right => heading -= turn,
        }
    }

    path
}

/// Walk a symbol string through space
///
/// # Arguments
/// * `angle_degrees` - turn about local Z
/// * `twist_degrees` - roll about local X applied after every turn, same sign for both directions
/// * `extrusion` - constant step along global Z per forward symbol
pub fn walk_3d(
    symbols: &[Symbol],
    angle_degrees: f64,
    twist_degrees: f64,
    extrusion: f64,
) -> Vec<Point3> {
    let turn = angle_degrees.to_radians();
    let twist = rot_x(twist_degrees.to_radians());
    let plus = mat_mul(&rot_z(turn), &twist);
    let minus = mat_mul(&rot_z(-turn), &twist);

    let mut path = Vec::with_capacity(symbols.len() / 2 + 2);
    let mut pos = [0.0f64, 0.0, 0.0];
    let mut frame = IDENTITY;
    path.push(pos);

    for &s in symbols {
        match s {
            Symbol::A | Symbol::B => {
                // Local forward axis is the first column of the frame
                pos[0] += frame[0][0];
                pos[1] += frame[1][0];
                pos[2] += frame[2][0] + extrusion;
                path.push(pos);
            }
            Symbol::Left => frame = mat_mul(&frame, &plus),
            Symbol::Right => frame = mat_mul(&frame, &minus),
        }
    }

    path
}
