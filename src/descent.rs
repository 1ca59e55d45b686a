//! Descent through nested groups to the element that positions them.
//!
//! Only the first child element of each group is followed. Siblings after it
//! never influence where a group is considered to be.

use crate::document::{Element, ElementKind};
use crate::error::{ExportError, Result};
use crate::transform::transform_point;
use crate::types::Point;

/// Transform descriptors to fold over an element's anchor, nearest group first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformChain<'a> {
    descriptors: Vec<&'a str>,
}

impl<'a> TransformChain<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, descriptor: &'a str) {
        self.descriptors.push(descriptor);
    }

    pub fn descriptors(&self) -> &[&'a str] {
        &self.descriptors
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Apply every descriptor in order to `point`
    pub fn fold(&self, point: Point) -> Result<Point> {
        self.descriptors
            .iter()
            .try_fold(point, |p, descriptor| transform_point(p, descriptor))
    }
}

/// Follow first children from `group` down to the first non-group element.
///
/// Returns that element together with the `transform` attributes of every
/// group passed on the way, innermost group first and `group` itself last.
pub fn descend(group: &Element) -> Result<(&Element, TransformChain<'_>)> {
    let mut groups = vec![group];
    let mut current = group;

    let inner = loop {
        let child = current
            .first_child_element()
            .ok_or_else(|| ExportError::EmptyGroup {
                id: current.attr("id").map(str::to_string),
            })?;

        if child.kind() == ElementKind::Group {
            groups.push(child);
            current = child;
        } else {
            break child;
        }
    };

    let mut chain = TransformChain::new();
    for g in groups.iter().rev() {
        if let Some(transform) = g.attr("transform") {
            chain.push(transform);
        }
    }

    Ok((inner, chain))
}
