use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::ConfigError;
use crate::Source;

/// Where one rendered template goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    /// Shared by every template; renders are concatenated into it.
    Concat(PathBuf),
    /// Owned by a single template.
    File(PathBuf),
}

/// Expands the template argument into the ordered list of templates to render.
///
/// A directory contributes every regular file whose name contains `token`,
/// sorted by name.
pub fn template_set(template_path: &str, token: &str) -> Result<Vec<Source>> {
    let source = Source::from_arg(template_path);
    let path = match source {
        Source::Stdin => return Ok(vec![Source::Stdin]),
        Source::File(path) => path,
    };
    let meta = fs::metadata(&path)
        .with_context(|| format!("Cannot stat template path '{}'", path.display()))?;

    if !meta.is_dir() {
        return Ok(vec![Source::File(clean(&path))]);
    }

    let mut files = fs::read_dir(&path)
        .and_then(|entries| {
            entries
                .filter(|e| e.as_ref().map(|e| included(e, token)).unwrap_or(true))
                .map(|e| e.map(|e| e.path()))
                .collect::<io::Result<Vec<_>>>()
        })
        .with_context(|| format!("Cannot list template directory '{}'", path.display()))?;
    files.sort();
    Ok(files.into_iter().map(Source::File).collect())
}

/// Pairs every template with the place its render is written to.
///
/// A path that does not exist yet becomes a single output file.
pub fn output_targets(
    output_path: &str,
    templates: Vec<Source>,
    token: &str,
) -> Result<Vec<(Source, OutputTarget)>> {
    if output_path.is_empty() || output_path == crate::STDIO {
        return Ok(templates
            .into_iter()
            .map(|t| (t, OutputTarget::Stdout))
            .collect());
    }
    let path = Path::new(output_path);
    let is_dir = match fs::metadata(path) {
        Ok(meta) => meta.is_dir(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            return Err(e).with_context(|| format!("Cannot stat output path '{}'", output_path))
        }
    };
    if !is_dir {
        return Ok(templates
            .into_iter()
            .map(|t| (t, OutputTarget::Concat(path.to_path_buf())))
            .collect());
    }

    templates
        .into_iter()
        .map(|template| match template {
            Source::File(file) => {
                let dest = path.join(output_name(&file, token));
                Ok((Source::File(file), OutputTarget::File(dest)))
            }
            Source::Stdin => Err(ConfigError::StdinToDirectory(output_path.to_string()).into()),
        })
        .collect()
}

/// The template's base name with every occurrence of `token` removed.
pub fn output_name(template: &Path, token: &str) -> String {
    template
        .file_name()
        .map(|name| name.to_string_lossy().replace(token, ""))
        .unwrap_or_default()
}

fn included(entry: &DirEntry, token: &str) -> bool {
    let p = entry.path();
    p.is_file()
        && p.file_name()
            .and_then(|n| n.to_str())
            .map(|name| name.contains(token))
            .unwrap_or(false)
}

fn clean(path: &Path) -> PathBuf {
    path.components().collect()
}
