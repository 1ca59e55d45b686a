//! Evaluation of single SVG transform descriptors on a point.
//!
//! Only `translate`, `matrix`, `rotate` and `scale` are understood. Any other
//! operation name is accepted and treated as the identity, while a malformed
//! operand of a known operation is an error.

use log::debug;

use crate::error::{ExportError, Result, parse_number};
use crate::types::Point;

/// One parsed transform descriptor such as `translate(10,20)`
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    Translate {
        dx: f64,
        dy: f64,
    },
    Matrix {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        e: f64,
        f: f64,
    },
    /// Rotation in degrees around (cx, cy)
    Rotate {
        angle: f64,
        cx: f64,
        cy: f64,
    },
    /// Only the signs of `sx` and `sy` are used when applied
    Scale {
        sx: f64,
        sy: f64,
    },
    /// Operation this evaluator does not know; applies as the identity
    Unsupported(String),
}

impl Transform {
    /// Parse a descriptor of the form `name(arg[,arg...])`
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut parts = descriptor.split('(');
        let (Some(name), Some(operand), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ExportError::MalformedTransform(descriptor.to_string()));
        };
        let name = name.trim();
        let operand = operand.trim_end().trim_end_matches(')');

        let ops: Vec<&str> = operand.split(',').collect();
        // Only the operands a form actually uses are parsed
        let num = |i: usize| parse_number(ops[i], descriptor);

        let transform = match name {
            // translate(<x> [<y>])
            "translate" => match ops.len() {
                2 => Transform::Translate {
                    dx: num(0)?,
                    dy: num(1)?,
                },
                _ => Transform::Translate {
                    dx: num(0)?,
                    dy: 0.0,
                },
            },
            "matrix" => {
                if ops.len() != 6 {
                    return Err(ExportError::MalformedTransform(descriptor.to_string()));
                }
                Transform::Matrix {
                    a: num(0)?,
                    b: num(1)?,
                    c: num(2)?,
                    d: num(3)?,
                    e: num(4)?,
                    f: num(5)?,
                }
            }
            // rotate(<a> [<x> <y>]), a lone x leaves y at zero
            "rotate" => match ops.len() {
                3 => Transform::Rotate {
                    angle: num(0)?,
                    cx: num(1)?,
                    cy: num(2)?,
                },
                2 => Transform::Rotate {
                    angle: num(0)?,
                    cx: num(1)?,
                    cy: 0.0,
                },
                _ => Transform::Rotate {
                    angle: num(0)?,
                    cx: 0.0,
                    cy: 0.0,
                },
            },
            // scale(<x> [<y>]), y defaults to x
            "scale" => match ops.len() {
                2 => Transform::Scale {
                    sx: num(0)?,
                    sy: num(1)?,
                },
                _ => {
                    let s = num(0)?;
                    Transform::Scale { sx: s, sy: s }
                }
            },
            other => {
                debug!("Ignoring unsupported transform '{}'", descriptor);
                Transform::Unsupported(other.to_string())
            }
        };

        Ok(transform)
    }

    /// Apply this transform to a point
    pub fn apply(&self, point: Point) -> Point {
        match *self {
            Transform::Translate { dx, dy } => Point::new(point.x + dx, point.y + dy),
            Transform::Matrix { a, b, c, d, e, f } => Point::new(
                a * point.x + c * point.y + e,
                b * point.x + d * point.y + f,
            ),
            Transform::Rotate { angle, cx, cy } => {
                let (sin, cos) = angle.to_radians().sin_cos();
                let center = Point::new(cx, cy);
                let shifted = point - center;
                Point::new(
                    shifted.x * cos - shifted.y * sin,
                    shifted.x * sin + shifted.y * cos,
                ) + center
            }
            Transform::Scale { sx, sy } => {
                // Sign flip only, the magnitude is not applied
                let x = if sx < 0.0 { -point.x } else { point.x };
                let y = if sy < 0.0 { -point.y } else { point.y };
                Point::new(x, y)
            }
            Transform::Unsupported(_) => point,
        }
    }
}

/// Parse `descriptor` and apply it to `point`
pub fn transform_point(point: Point, descriptor: &str) -> Result<Point> {
    Ok(Transform::parse(descriptor)?.apply(point))
}
