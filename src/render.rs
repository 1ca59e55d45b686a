//! Writing export documents to disk and converting them with an external tool.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::document::Document;
use crate::error::{ExportError, Result};
use crate::options::ExportOptions;
use crate::output::{default_template, export_documents};

/// Converts an SVG file on disk into another file type
pub trait Renderer {
    /// Produce `<svg_path stem>.<filetype>` next to `svg_path` and return its path
    fn render(&self, svg_path: &Path, filetype: &str) -> Result<PathBuf>;
}

/// Renderer backed by the Inkscape command line
#[derive(Debug, Clone)]
pub struct InkscapeRenderer {
    pub program: String,
}

impl InkscapeRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Renderer for InkscapeRenderer {
    fn render(&self, svg_path: &Path, filetype: &str) -> Result<PathBuf> {
        debug!(
            "Running {} --export-type={} {}",
            self.program,
            filetype,
            svg_path.display()
        );

        let output = Command::new(&self.program)
            .arg(format!("--export-type={}", filetype))
            .arg(svg_path)
            .output()
            .map_err(|source| ExportError::Io {
                path: PathBuf::from(&self.program),
                source,
            })?;

        if !output.status.success() {
            return Err(ExportError::ExternalTool {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(svg_path.with_extension(filetype))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Accept an export id only if it names a single file inside the output directory
fn check_export_id(id: &str) -> Result<()> {
    let mut components = Path::new(id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ExportError::InvalidExportId(id.to_string())),
    }
}

/// Run a complete export and return the produced files.
///
/// Every document is built before anything is written, so a fatal problem in
/// the drawing leaves no partial output behind. A renderer failure stops the
/// run at that file.
pub fn run_export(options: &ExportOptions, renderer: &dyn Renderer) -> Result<Vec<PathBuf>> {
    let source = Document::load(&options.input)?;
    let template = match &options.template {
        Some(path) => Document::load(path)?,
        None => default_template()?,
    };

    let documents = export_documents(&source, &template)?;
    for (id, _) in &documents {
        check_export_id(id)?;
    }

    fs::create_dir_all(&options.output_dir).map_err(io_error(&options.output_dir))?;

    let mut produced = Vec::with_capacity(documents.len());
    for (id, document) in &documents {
        let svg_path = options.output_dir.join(format!("{}.svg", id));
        document.save(&svg_path)?;
        info!("Wrote {}", svg_path.display());

        if options.is_svg_output() {
            produced.push(svg_path);
            continue;
        }

        let rendered = renderer.render(&svg_path, &options.filetype)?;
        info!("Rendered {}", rendered.display());

        if !options.keep_svg {
            fs::remove_file(&svg_path).map_err(io_error(&svg_path))?;
        }
        produced.push(rendered);
    }

    Ok(produced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_id_must_be_plain_file_name() {
        for id in ["A", "part-1", "left.v2", "..hidden"] {
            assert!(check_export_id(id).is_ok(), "{}", id);
        }
        for id in ["", ".", "..", "../escaped", "sub/part", "/tmp/part", "a/../b"] {
            assert!(
                matches!(check_export_id(id), Err(ExportError::InvalidExportId(_))),
                "{}",
                id
            );
        }
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let renderer = InkscapeRenderer::new("definitely-not-an-installed-renderer");
        let err = renderer
            .render(Path::new("drawing.svg"), "pdf")
            .unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program_is_external_tool_error() {
        let renderer = InkscapeRenderer::new("false");
        let err = renderer
            .render(Path::new("drawing.svg"), "pdf")
            .unwrap_err();
        match err {
            ExportError::ExternalTool { program, status, .. } => {
                assert_eq!(program, "false");
                assert!(!status.success());
            }
            other => panic!("Expected ExternalTool, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_program_returns_target_path() {
        let renderer = InkscapeRenderer::new("true");
        let path = renderer
            .render(Path::new("out/A.svg"), "png")
            .unwrap();
        assert_eq!(path, PathBuf::from("out/A.png"));
    }
}
