//! Debug side-channel (spec §9 "Debug side-channel").
//!
//! The reference implementation writes intermediate artifacts to hard-coded
//! `/tmp` paths. Here that is an explicit capability a caller opts into by
//! passing a `&mut dyn DebugSink`; the default is [`NoopDebugSink`], which
//! drops everything.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use image::GrayImage;

/// Sink for the optional intermediate artifacts `find`/`refine` can produce:
/// per-level scaled images, normalized response images, and a corner dump.
/// I/O failures here are logged and otherwise ignored by the caller (spec §7
/// `DebugIO` — non-fatal).
pub trait DebugSink {
    fn write_image(&mut self, name: &str, image: &GrayImage) -> io::Result<()>;
    fn open_text_dump(&mut self, name: &str) -> io::Result<Box<dyn Write>>;
}

/// Default sink: every call is a no-op.
#[derive(Default, Debug, Clone, Copy)]
pub struct NoopDebugSink;

impl DebugSink for NoopDebugSink {
    fn write_image(&mut self, _name: &str, _image: &GrayImage) -> io::Result<()> {
        Ok(())
    }

    fn open_text_dump(&mut self, _name: &str) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(io::sink()))
    }
}

/// Writes artifacts into a caller-supplied directory instead of `/tmp`.
#[derive(Debug, Clone)]
pub struct FileDebugSink {
    dir: PathBuf,
}

impl FileDebugSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DebugSink for FileDebugSink {
    fn write_image(&mut self, name: &str, image: &GrayImage) -> io::Result<()> {
        image
            .save(self.dir.join(name))
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn open_text_dump(&mut self, name: &str) -> io::Result<Box<dyn Write>> {
        let file = File::create(self.dir.join(name))?;
        Ok(Box::new(file))
    }
}

/// Write the corner-dump text artifact (spec §6): a feedgnuplot shebang, a
/// header comment, then one `x y` pair per line in double precision.
pub(crate) fn write_corner_dump(sink: &mut dyn DebugSink, name: &str, points: &[(f64, f64)]) -> io::Result<()> {
    let mut out = sink.open_text_dump(name)?;
    writeln!(out, "#!/usr/bin/feedgnuplot --points --exit")?;
    writeln!(out, "# x y")?;
    for (x, y) in points {
        writeln!(out, "{x} {y}")?;
    }
    Ok(())
}
