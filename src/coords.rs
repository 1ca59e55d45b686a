use crate::document::{Element, ElementKind};
use crate::error::{ExportError, Result, parse_number};
use crate::transform::transform_point;
use crate::types::Point;

/// Read the start point of a path from its `d` attribute.
///
/// Only the literal pair after the first command letter is used, as in
/// `M 10,20 L ...`.
fn path_start(d: &str) -> Result<Point> {
    let pair = d
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| ExportError::MalformedPath(d.to_string()))?;

    let mut parts = pair.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(x), Some(y), None) => Ok(Point::new(
            parse_number(x, "path data")?,
            parse_number(y, "path data")?,
        )),
        _ => Err(ExportError::MalformedPath(d.to_string())),
    }
}

/// Determine the anchor point of a drawable element.
///
/// Returns `Ok(None)` when the element lacks the attributes its kind is
/// positioned by. The element's own `transform` is applied to the result.
pub fn anchor_point(element: &Element) -> Result<Option<Point>> {
    let raw = match element.kind() {
        ElementKind::Circle | ElementKind::Ellipse => (element.attr("cx"), element.attr("cy")),
        ElementKind::Path => match element.attr("d") {
            Some(d) if !d.is_empty() => return Ok(Some(own_transform(element, path_start(d)?)?)),
            _ => return Ok(None),
        },
        _ => (element.attr("x"), element.attr("y")),
    };

    let (Some(x), Some(y)) = raw else {
        return Ok(None);
    };

    let context = format!("<{}> position", element.local);
    let point = Point::new(parse_number(x, &context)?, parse_number(y, &context)?);
    Ok(Some(own_transform(element, point)?))
}

fn own_transform(element: &Element, point: Point) -> Result<Point> {
    match element.attr("transform") {
        Some(transform) => transform_point(point, transform),
        None => Ok(point),
    }
}
