//! The `unpack` post-processor: extracts archives in place.
//!
//! Every `.zip`, `.tar`, `.tar.gz` and `.tgz` file found under the directory
//! is extracted into the directory that contains it, then deleted. Archives
//! that appear only after extraction are left alone.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use log::debug;

use crate::error::{Error, Result};
use crate::filesystem;
use crate::postprocess::PostProcessor;
use crate::registry::Registrar;

pub const NAME: &str = "unpack";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveFormat {
    fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else if name.ends_with(".tar") {
            Some(ArchiveFormat::Tar)
        } else {
            None
        }
    }
}

pub struct Unpack;

impl PostProcessor for Unpack {
    fn process(&self, dir: &Path) -> Result<()> {
        let archives: Vec<_> = filesystem::walk_files(dir)?
            .into_iter()
            .filter_map(|relative| {
                ArchiveFormat::detect(&relative).map(|format| (dir.join(relative), format))
            })
            .collect();

        for (path, format) in archives {
            let destination = path.parent().unwrap_or(dir);
            debug!("Extracting {} into {}", path.display(), destination.display());
            extract(&path, format, destination)?;
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

fn extract(path: &Path, format: ArchiveFormat, destination: &Path) -> Result<()> {
    let file = File::open(path)?;
    let archive_error = |message: String| Error::Archive {
        path: path.to_path_buf(),
        message,
    };

    match format {
        ArchiveFormat::Zip => {
            let mut archive =
                zip::ZipArchive::new(file).map_err(|e| archive_error(e.to_string()))?;
            archive
                .extract(destination)
                .map_err(|e| archive_error(e.to_string()))
        }
        ArchiveFormat::Tar => unpack_tar(file, destination).map_err(archive_error),
        ArchiveFormat::TarGz => {
            unpack_tar(GzDecoder::new(file), destination).map_err(archive_error)
        }
    }
}

fn unpack_tar<R: Read>(reader: R, destination: &Path) -> std::result::Result<(), String> {
    tar::Archive::new(reader)
        .unpack(destination)
        .map_err(|e| e.to_string())
}

/// Register the `unpack` post-processor.
pub fn register(registrar: &mut Registrar) -> Result<()> {
    registrar.register_post_processor(NAME, Unpack)
}
