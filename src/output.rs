//! Assembly of standalone documents from planned exports.

use crate::document::{Document, ElementKind};
use crate::error::Result;
use crate::planner::{PlannedExport, plan_exports};

/// Base document used when no template file is given
pub const DEFAULT_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:xlink="http://www.w3.org/1999/xlink"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
     xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd"
     version="1.1">
</svg>"#;

pub fn default_template() -> Result<Document> {
    Document::parse(DEFAULT_TEMPLATE)
}

/// Build the output document for one planned export.
///
/// The template is cloned, then receives the source's top-level `<defs>`,
/// a viewport matching the export window, and the selected elements.
pub fn build_export_document(
    template: &Document,
    source: &Document,
    plan: &PlannedExport<'_>,
) -> Document {
    let mut output = template.clone();
    let root = &mut output.root;

    // Moved elements may use prefixes only the source declares
    for declaration in source.root.namespace_declarations() {
        root.declare_namespace(declaration);
    }

    for defs in source
        .root
        .child_elements()
        .filter(|e| e.kind() == ElementKind::Defs)
    {
        root.push_child(defs.clone());
    }

    root.set_attr("viewBox", plan.window.view_box());
    root.set_attr("width", plan.window.width().to_string());
    root.set_attr("height", plan.window.height().to_string());

    for element in &plan.elements {
        root.push_child((*element).clone());
    }

    output
}

/// Plan every export in `source` and build its document
pub fn export_documents(source: &Document, template: &Document) -> Result<Vec<(String, Document)>> {
    let plans = plan_exports(source)?;
    Ok(plans
        .iter()
        .map(|plan| (plan.id.clone(), build_export_document(template, source, plan)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SVG_NS;

    const SOURCE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
     xmlns:custom="urn:example:custom">
  <defs id="defs1"><linearGradient id="grad"/></defs>
  <defs id="defs2"/>
  <g inkscape:label="Export"><rect id="A" x="10" y="20" width="30" height="40"/></g>
  <g inkscape:label="Drawings">
    <circle id="c1" cx="25" cy="30" custom:tag="x"/>
    <circle id="c2" cx="500" cy="500"/>
  </g>
</svg>"#;

    #[test]
    fn test_build_sets_viewport_and_copies_defs() {
        let source = Document::parse(SOURCE).unwrap();
        let template = default_template().unwrap();
        let docs = export_documents(&source, &template).unwrap();
        assert_eq!(docs.len(), 1);

        let (id, doc) = &docs[0];
        assert_eq!(id, "A");
        assert_eq!(doc.root.attr("viewBox"), Some("10 20 30 40"));
        assert_eq!(doc.root.attr("width"), Some("30"));
        assert_eq!(doc.root.attr("height"), Some("40"));
        assert_eq!(doc.root.attr("version"), Some("1.1"));

        let children: Vec<(&str, Option<&str>)> = doc
            .root
            .child_elements()
            .map(|e| (e.local.as_str(), e.attr("id")))
            .collect();
        assert_eq!(
            children,
            vec![
                ("defs", Some("defs1")),
                ("defs", Some("defs2")),
                ("circle", Some("c1")),
            ]
        );
    }

    #[test]
    fn test_source_namespaces_are_declared() {
        let source = Document::parse(SOURCE).unwrap();
        let template = default_template().unwrap();
        let docs = export_documents(&source, &template).unwrap();
        let xml = docs[0].1.to_xml_string().unwrap();
        assert!(xml.contains(r#"xmlns:custom="urn:example:custom""#));
        // Already declared by the template, not duplicated
        assert_eq!(xml.matches("xmlns:inkscape=").count(), 1);

        let reparsed = Document::parse(&xml).unwrap();
        let circle = reparsed.root.child_elements().last().unwrap();
        assert_eq!(circle.namespace.as_deref(), Some(SVG_NS));
        assert_eq!(circle.attr_ns("urn:example:custom", "tag"), Some("x"));
    }

    #[test]
    fn test_template_is_not_modified() {
        let source = Document::parse(SOURCE).unwrap();
        let template = default_template().unwrap();
        let before = template.clone();
        let _ = export_documents(&source, &template).unwrap();
        assert_eq!(template, before);
    }
}
