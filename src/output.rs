use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::paths::OutputTarget;
use crate::Source;

/// Writes trimmed renders to their [`OutputTarget`], one call per template.
///
/// Holds the concatenated output file open between calls.
#[derive(Default)]
pub struct Sink {
    append: Option<BufWriter<File>>,
}

impl Sink {
    pub fn new() -> Sink {
        Sink::default()
    }

    pub fn write(&mut self, template: &Source, target: &OutputTarget, rendered: &str) -> Result<()> {
        match target {
            OutputTarget::Stdout => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                writeln!(out, "{}", rendered).with_context(|| "Failed to write to std out")?;
            }
            OutputTarget::File(dest) => {
                debug!("writing {} to '{}'", template, dest.display());
                fs::write(dest, rendered)
                    .with_context(|| format!("Failed to write output file '{}'", dest.display()))?;
                mirror_permissions(template, dest)?;
            }
            OutputTarget::Concat(path) => match self.append.as_mut() {
                Some(out) => {
                    debug!("appending {} to '{}'", template, path.display());
                    write!(out, "\n{}", rendered).with_context(|| {
                        format!("Failed to append to output file '{}'", path.display())
                    })?;
                }
                None => {
                    debug!("writing {} to '{}'", template, path.display());
                    let file = OpenOptions::new()
                        .write(true)
                        .create(true)
                        .truncate(true)
                        .open(path)
                        .with_context(|| {
                            format!("Failed to create output file '{}'", path.display())
                        })?;
                    let mut out = BufWriter::new(file);
                    out.write_all(rendered.as_bytes()).with_context(|| {
                        format!("Failed to write output file '{}'", path.display())
                    })?;
                    mirror_permissions(template, path)?;
                    self.append = Some(out);
                }
            },
        }
        Ok(())
    }

    /// Flushes and closes the concatenated output file, if one was opened.
    pub fn finish(mut self) -> Result<()> {
        if let Some(mut out) = self.append.take() {
            out.flush().with_context(|| "Failed to flush output file")?;
        }
        Ok(())
    }
}

/// Gives `dest` the permissions of the template file it was rendered from.
fn mirror_permissions(template: &Source, dest: &Path) -> Result<()> {
    let src = match template {
        Source::File(src) => src,
        Source::Stdin => return Ok(()),
    };
    let permissions = fs::metadata(src)
        .with_context(|| format!("Cannot stat template file '{}'", src.display()))?
        .permissions();
    fs::set_permissions(dest, permissions)
        .with_context(|| format!("Failed to set permissions of '{}'", dest.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn template(dir: &Path, name: &str) -> Source {
        let path = dir.join(name);
        fs::write(&path, "{{x}}").unwrap();
        Source::File(path)
    }

    #[test]
    fn concat_joins_renders_with_one_newline() {
        let dir = TempDir::new().unwrap();
        let first = template(dir.path(), "a.tmpl");
        let second = template(dir.path(), "b.tmpl");
        let out = dir.path().join("out.txt");
        fs::write(&out, "stale content that must go away").unwrap();
        let target = OutputTarget::Concat(out.clone());

        let mut sink = Sink::new();
        sink.write(&first, &target, "first").unwrap();
        sink.write(&second, &target, "second").unwrap();
        sink.write(&Source::Stdin, &target, "third").unwrap();
        sink.finish().unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "first\nsecond\nthird");
    }

    #[test]
    fn file_targets_get_one_render_each() {
        let dir = TempDir::new().unwrap();
        let a = template(dir.path(), "a.tmpl");
        let b = template(dir.path(), "b.tmpl");
        let (dest_a, dest_b) = (dir.path().join("a"), dir.path().join("b"));

        let mut sink = Sink::new();
        sink.write(&a, &OutputTarget::File(dest_a.clone()), "alpha").unwrap();
        sink.write(&b, &OutputTarget::File(dest_b.clone()), "beta").unwrap();
        sink.finish().unwrap();

        assert_eq!(fs::read_to_string(&dest_a).unwrap(), "alpha");
        assert_eq!(fs::read_to_string(&dest_b).unwrap(), "beta");
    }

    #[cfg(unix)]
    #[test]
    fn outputs_take_template_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let first = template(dir.path(), "a.tmpl");
        let second = template(dir.path(), "b.tmpl");
        if let Source::File(path) = &first {
            fs::set_permissions(path, fs::Permissions::from_mode(0o640)).unwrap();
        }
        if let Source::File(path) = &second {
            fs::set_permissions(path, fs::Permissions::from_mode(0o604)).unwrap();
        }

        let single = dir.path().join("single.txt");
        let target = OutputTarget::Concat(single.clone());
        let mut sink = Sink::new();
        sink.write(&first, &target, "one").unwrap();
        sink.write(&second, &target, "two").unwrap();
        sink.finish().unwrap();
        let mode = fs::metadata(&single).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);

        let per_template = dir.path().join("b");
        let mut sink = Sink::new();
        sink.write(&second, &OutputTarget::File(per_template.clone()), "two")
            .unwrap();
        sink.finish().unwrap();
        let mode = fs::metadata(&per_template).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o604);
    }

    #[cfg(unix)]
    #[test]
    fn read_only_template_still_accumulates() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let first = template(dir.path(), "a.tmpl");
        if let Source::File(path) = &first {
            fs::set_permissions(path, fs::Permissions::from_mode(0o444)).unwrap();
        }

        let out = dir.path().join("out.txt");
        let target = OutputTarget::Concat(out.clone());
        let mut sink = Sink::new();
        sink.write(&first, &target, "one").unwrap();
        sink.write(&Source::Stdin, &target, "two").unwrap();
        sink.finish().unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "one\ntwo");
        let mode = fs::metadata(&out).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o444);
    }
}
