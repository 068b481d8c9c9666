//! Caption file input/output

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use captionflow_lib::core::captions::CaptionFormat;
use captionflow_lib::core::{settings::EngineSettings, CaptionEditor};
use tracing::info;

/// Picks the caption format from an explicit name or the file extension.
pub fn resolve_format(explicit: Option<&str>, path: &Path) -> Result<CaptionFormat> {
    let name = match explicit {
        Some(name) => name.to_string(),
        None => path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow!(
                    "Cannot infer caption format of {}; pass --from",
                    path.display()
                )
            })?,
    };
    Ok(name.parse::<CaptionFormat>()?)
}

/// Loads a caption file into a fresh editor.
pub fn load_editor(
    path: &Path,
    format: CaptionFormat,
    settings: &EngineSettings,
) -> Result<CaptionEditor> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut editor = CaptionEditor::with_settings(settings.clone());
    let count = editor
        .import_captions(format.as_str(), &content)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    info!(path = %path.display(), format = %format, captions = count, "Loaded captions");
    Ok(editor)
}

/// Writes to `output`, or to stdout when no path is given.
pub fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = content.len(), "Wrote output");
        }
        None => print!("{content}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_format_from_extension_and_flag() {
        assert_eq!(
            resolve_format(None, Path::new("movie.SRT")).unwrap(),
            CaptionFormat::Srt
        );
        assert_eq!(
            resolve_format(Some("webvtt"), Path::new("captions.txt")).unwrap(),
            CaptionFormat::Vtt
        );
        assert!(resolve_format(None, Path::new("no_extension")).is_err());
        assert!(resolve_format(None, Path::new("a.docx")).is_err());
    }

    #[test]
    fn test_load_editor_reads_captions() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("in.vtt");
        fs::write(&path, "WEBVTT\n\n00:01.000 --> 00:02.000\nHi\n").unwrap();

        let editor = load_editor(&path, CaptionFormat::Vtt, &EngineSettings::default()).unwrap();
        assert_eq!(editor.captions().len(), 1);
        assert_eq!(editor.captions()[0].start_ms, 1000);
    }

    #[test]
    fn test_load_editor_reports_parse_failures() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.srt");
        fs::write(&path, "1\nnot a timestamp\ntext\n").unwrap();

        let err = load_editor(&path, CaptionFormat::Srt, &EngineSettings::default()).err().expect("expected load_editor to fail");
        assert!(format!("{err:#}").contains("Parse error"));
    }
}
