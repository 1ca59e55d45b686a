//! Decide which drawing elements fall inside each export window.
//!
//! The input follows a two-layer convention: a group labelled `Export` holds
//! marker rectangles, and a group labelled `Drawings` holds the artwork.

use log::{debug, warn};

use crate::coords::anchor_point;
use crate::descent::{TransformChain, descend};
use crate::document::{Document, Element, ElementKind, INKSCAPE_NS};
use crate::error::{ExportError, Result, parse_number};
use crate::types::{ExportWindow, Point};

pub const EXPORT_LAYER: &str = "Export";
pub const DRAWINGS_LAYER: &str = "Drawings";

/// Elements selected for one export marker
#[derive(Debug, Clone)]
pub struct PlannedExport<'a> {
    /// The marker's `id`, used as the output name
    pub id: String,
    pub window: ExportWindow,
    /// Top-level `Drawings` children, in document order
    pub elements: Vec<&'a Element>,
}

/// First group below the root whose `inkscape:label` equals `label`
pub fn find_layer<'a>(document: &'a Document, label: &str) -> Option<&'a Element> {
    document.root.descendants().find(|e| {
        e.kind() == ElementKind::Group && e.attr_ns(INKSCAPE_NS, "label") == Some(label)
    })
}

fn required_number(element: &Element, name: &str) -> Result<f64> {
    let value = element
        .attr(name)
        .ok_or_else(|| ExportError::MissingAttribute {
            element: element.local.clone(),
            attribute: name.to_string(),
        })?;
    parse_number(value, &format!("<{}> attribute '{}'", element.local, name))
}

/// Window covered by an export marker rectangle
pub fn marker_window(marker: &Element) -> Result<ExportWindow> {
    Ok(ExportWindow::from_rect(
        required_number(marker, "x")?,
        required_number(marker, "y")?,
        required_number(marker, "width")?,
        required_number(marker, "height")?,
    ))
}

/// Resolve where a top-level drawing element sits in layer coordinates.
///
/// Groups are positioned by their first non-group descendant, moved through
/// every enclosing group's transform. `None` means the element has no usable
/// position.
pub fn resolve_position(element: &Element) -> Result<Option<Point>> {
    let (inner, chain) = if element.kind() == ElementKind::Group {
        descend(element)?
    } else {
        (element, TransformChain::new())
    };

    match anchor_point(inner)? {
        Some(anchor) => Ok(Some(chain.fold(anchor)?)),
        None => Ok(None),
    }
}

fn select_elements<'a>(drawings: &'a Element, window: &ExportWindow) -> Result<Vec<&'a Element>> {
    let mut selected = Vec::new();

    for element in drawings.child_elements() {
        let Some(point) = resolve_position(element)? else {
            debug!(
                "Skipping <{}> {}: no position",
                element.local,
                element.attr("id").unwrap_or("")
            );
            continue;
        };

        if window.contains(point) {
            selected.push(element);
        }
    }

    Ok(selected)
}

/// Plan one output per identified marker in the `Export` layer
pub fn plan_exports(document: &Document) -> Result<Vec<PlannedExport<'_>>> {
    let export_layer = find_layer(document, EXPORT_LAYER)
        .ok_or_else(|| ExportError::MissingLayer(EXPORT_LAYER.to_string()))?;
    let drawings_layer = find_layer(document, DRAWINGS_LAYER);

    let mut plans = Vec::new();

    for marker in export_layer.child_elements() {
        if marker.kind() != ElementKind::Rect {
            continue;
        }

        let window = marker_window(marker)?;

        let Some(id) = marker.attr("id") else {
            debug!("Skipping export marker without id at {:?}", window);
            continue;
        };

        let drawings = drawings_layer
            .ok_or_else(|| ExportError::MissingLayer(DRAWINGS_LAYER.to_string()))?;
        let elements = select_elements(drawings, &window)?;

        if elements.is_empty() {
            warn!("Export '{}' contains no elements", id);
        }

        plans.push(PlannedExport {
            id: id.to_string(),
            window,
            elements,
        });
    }

    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawing(export: &str, drawings: &str) -> Document {
        Document::parse(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg"
                    xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
                 <g inkscape:label="Export" inkscape:groupmode="layer">{}</g>
                 <g inkscape:label="Drawings" inkscape:groupmode="layer">{}</g>
               </svg>"#,
            export, drawings
        ))
        .unwrap()
    }

    fn ids<'a>(plan: &PlannedExport<'a>) -> Vec<&'a str> {
        plan.elements.iter().filter_map(|e| e.attr("id")).collect()
    }

    #[test]
    fn test_single_circle_is_exported() {
        let doc = drawing(
            r#"<rect id="A" x="0" y="0" width="100" height="100"/>"#,
            r#"<circle id="c1" cx="50" cy="50" r="5"/>"#,
        );
        let plans = plan_exports(&doc).unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].id, "A");
        assert_eq!(ids(&plans[0]), vec!["c1"]);
    }

    #[test]
    fn test_marker_without_id_is_skipped() {
        let doc = drawing(
            r#"<rect x="0" y="0" width="10" height="10"/>
               <rect id="B" x="0" y="0" width="10" height="10"/>"#,
            r#"<rect id="r1" x="5" y="5"/>"#,
        );
        let plans = plan_exports(&doc).unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].id, "B");
        assert_eq!(ids(&plans[0]), vec!["r1"]);
    }

    #[test]
    fn test_non_rect_markers_are_ignored() {
        let doc = drawing(
            r#"<circle id="notamarker" cx="1" cy="1" r="1"/>
               <text id="label" x="1" y="1">Export</text>"#,
            "",
        );
        assert!(plan_exports(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_boundary_and_zero_coordinate() {
        let doc = drawing(
            r#"<rect id="W" x="0" y="0" width="10" height="10"/>"#,
            r#"<circle id="on_axis" cx="0" cy="5"/>
               <circle id="corner" cx="10" cy="10"/>
               <circle id="outside" cx="10.01" cy="5"/>"#,
        );
        let plans = plan_exports(&doc).unwrap();
        assert_eq!(ids(&plans[0]), vec!["corner"]);
    }

    #[test]
    fn test_group_resolved_through_chain() {
        // rect (5,5) -> scale(-1) -> (-5,-5) -> translate(20,30) -> (15,25)
        let doc = drawing(
            r#"<rect id="W" x="10" y="20" width="10" height="10"/>"#,
            r#"<g id="outer" transform="translate(20,30)">
                 <g transform="scale(-1)"><rect x="5" y="5"/></g>
                 <circle cx="-100" cy="-100"/>
               </g>"#,
        );
        let plans = plan_exports(&doc).unwrap();
        assert_eq!(ids(&plans[0]), vec!["outer"]);
    }

    #[test]
    fn test_elements_without_position_are_skipped() {
        let doc = drawing(
            r#"<rect id="W" x="0" y="0" width="10" height="10"/>"#,
            r#"<path id="nopath"/><rect id="ok" x="1" y="1"/>"#,
        );
        let plans = plan_exports(&doc).unwrap();
        assert_eq!(ids(&plans[0]), vec!["ok"]);
    }

    #[test]
    fn test_missing_export_layer() {
        let doc = Document::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg"
                    xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
                 <g inkscape:label="Drawings"/>
               </svg>"#,
        )
        .unwrap();
        match plan_exports(&doc) {
            Err(ExportError::MissingLayer(label)) => assert_eq!(label, "Export"),
            other => panic!("Expected MissingLayer, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_drawings_layer_only_matters_with_markers() {
        let doc = Document::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg"
                    xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
                 <g inkscape:label="Export"/>
               </svg>"#,
        )
        .unwrap();
        assert!(plan_exports(&doc).unwrap().is_empty());

        let doc = Document::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg"
                    xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
                 <g inkscape:label="Export"><rect id="A" x="0" y="0" width="1" height="1"/></g>
               </svg>"#,
        )
        .unwrap();
        assert!(matches!(
            plan_exports(&doc),
            Err(ExportError::MissingLayer(label)) if label == "Drawings"
        ));
    }

    #[test]
    fn test_marker_missing_geometry_is_fatal() {
        let doc = drawing(r#"<rect id="A" x="0" y="0" width="10"/>"#, "");
        assert!(matches!(
            plan_exports(&doc),
            Err(ExportError::MissingAttribute { attribute, .. }) if attribute == "height"
        ));
    }

    #[test]
    fn test_empty_group_in_drawings_is_fatal() {
        let doc = drawing(
            r#"<rect id="A" x="0" y="0" width="10" height="10"/>"#,
            r#"<g id="hollow"/>"#,
        );
        assert!(matches!(
            plan_exports(&doc),
            Err(ExportError::EmptyGroup { .. })
        ));
    }

    #[test]
    fn test_each_window_selects_independently() {
        let doc = drawing(
            r#"<rect id="left" x="0" y="0" width="50" height="50"/>
               <rect id="right" x="50" y="0" width="50" height="50"/>"#,
            r#"<circle id="a" cx="25" cy="25"/>
               <circle id="b" cx="75" cy="25"/>
               <circle id="edge" cx="50" cy="25"/>"#,
        );
        let plans = plan_exports(&doc).unwrap();
        assert_eq!(ids(&plans[0]), vec!["a", "edge"]);
        assert_eq!(ids(&plans[1]), vec!["b", "edge"]);
    }

    #[test]
    fn test_find_layer_matches_label_not_id() {
        let doc = drawing("", "");
        let layer = find_layer(&doc, "Drawings").unwrap();
        assert_eq!(layer.attr_ns(INKSCAPE_NS, "groupmode"), Some("layer"));
        assert!(find_layer(&doc, "Missing").is_none());
    }
}
