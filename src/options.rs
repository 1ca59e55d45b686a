use std::path::PathBuf;

/// Settings for one export run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Source SVG with `Export` and `Drawings` layers
    pub input: PathBuf,
    /// Target file type passed to the renderer (default: pdf)
    pub filetype: String,
    /// Base document for every output; a built-in empty SVG when unset
    pub template: Option<PathBuf>,
    /// Directory receiving the produced files (default: current directory)
    pub output_dir: PathBuf,
    /// Renderer executable (default: inkscape)
    pub inkscape: String,
    /// Keep the intermediate SVG files after rendering
    pub keep_svg: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            filetype: "pdf".to_string(),
            template: None,
            output_dir: PathBuf::from("."),
            inkscape: "inkscape".to_string(),
            keep_svg: false,
        }
    }
}

impl ExportOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Whether the intermediate SVG is already the requested output
    pub fn is_svg_output(&self) -> bool {
        self.filetype.eq_ignore_ascii_case("svg")
    }
}
