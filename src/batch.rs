use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::dump::{self, FormatError};
use crate::tree;

/// What [`from_dir`] did with each dump.
#[derive(Debug, Default)]
pub struct Summary {
    /// Rendered trees, in the order they were written.
    pub written: Vec<PathBuf>,

    /// Dumps that were rejected by the parser. No output is written for these.
    pub malformed: Vec<PathBuf>,
}

impl Summary {
    /// Returns `true` if every dump was rendered.
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty()
    }
}

/// Renders every dump in `dump_dir` into a file of the same name in `out_dir`.
///
/// Dumps are processed one at a time in file name order. Entries that are not regular files are
/// skipped, and `out_dir` is created if it does not exist.
///
/// A dump with a malformed coroutine header is logged, listed in [`Summary::malformed`], and
/// left without an output file; the remaining dumps are still processed. Any other I/O error
/// stops processing and is returned.
pub fn from_dir<P1, P2>(dump_dir: P1, out_dir: P2) -> io::Result<Summary>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let (dump_dir, out_dir) = (dump_dir.as_ref(), out_dir.as_ref());
    fs::create_dir_all(out_dir)?;

    let mut dumps = Vec::new();
    for entry in fs::read_dir(dump_dir)? {
        let path = entry?.path();
        // follows symlinks, unlike DirEntry::file_type
        if path.is_file() {
            dumps.push(path);
        } else {
            debug!("Skipping {}: not a file", path.display());
        }
    }
    dumps.sort();
    info!("Found {} dumps in {}", dumps.len(), dump_dir.display());

    let mut summary = Summary::default();
    for path in dumps {
        let coroutines = match dump::from_file(Some(&path)) {
            Ok(coroutines) => coroutines,
            Err(e) if is_format_error(&e) => {
                error!("Skipping {}: {}", path.display(), e);
                summary.malformed.push(path);
                continue;
            }
            Err(e) => return Err(e),
        };

        // read_dir only yields entries that have a file name
        let outfile = match path.file_name() {
            Some(name) => out_dir.join(name),
            None => continue,
        };
        let writer = io::BufWriter::new(File::create(&outfile)?);
        tree::write_tree(&coroutines, writer)?;
        info!(
            "Rendered {} coroutines from {} into {}",
            coroutines.len(),
            path.display(),
            outfile.display()
        );
        summary.written.push(outfile);
    }

    Ok(summary)
}

fn is_format_error(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::InvalidData
        && e.get_ref()
            .map_or(false, |inner| inner.downcast_ref::<FormatError>().is_some())
}
