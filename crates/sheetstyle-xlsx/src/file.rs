//! Workbooks bound to a file on disk

use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{XlsxError, XlsxResult};
use crate::package::Package;
use crate::reader::XlsxReader;
use crate::writer::XlsxWriter;
use sheetstyle_core::{Workbook, WorkbookSettings};

/// Pause between attempts to open a locked package
const RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// How a file is opened
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Refuse to save back to the file
    pub read_only: bool,
    /// How long to keep retrying a file the OS will not let us read
    pub retry_budget: Duration,
    pub settings: WorkbookSettings,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            retry_budget: Duration::from_secs(10),
            settings: WorkbookSettings::default(),
        }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn retry_budget(mut self, budget: Duration) -> Self {
        self.retry_budget = budget;
        self
    }

    pub fn settings(mut self, settings: WorkbookSettings) -> Self {
        self.settings = settings;
        self
    }
}

fn check_extension(path: &Path) -> XlsxResult<()> {
    let is_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if is_xlsx {
        Ok(())
    } else {
        Err(XlsxError::InvalidFormat(format!(
            "{} is not an .xlsx file",
            path.display()
        )))
    }
}

/// A workbook and the package it was read from
///
/// Saving rewrites the modelled parts and keeps everything else in the
/// package as it was.
#[derive(Debug)]
pub struct XlsxFile {
    path: PathBuf,
    read_only: bool,
    pub workbook: Workbook,
    package: Package,
}

impl XlsxFile {
    /// Open a file with default options
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        Self::open_with(path, &OpenOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: &OpenOptions) -> XlsxResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(XlsxError::NotFound(path.display().to_string()));
        }
        check_extension(path)?;

        let mut package = Self::load_package(path, options.retry_budget)?;
        let workbook = XlsxReader::read_package(&mut package, &options.settings)?;
        log::info!(
            "opened {} with {} worksheet(s)",
            path.display(),
            workbook.sheet_count()
        );
        Ok(Self {
            path: path.to_path_buf(),
            read_only: options.read_only,
            workbook,
            package,
        })
    }

    /// A new workbook to be saved at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let path = path.as_ref();
        check_extension(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            read_only: false,
            workbook: Workbook::new(),
            package: Package::new(),
        })
    }

    /// Read the package bytes, then check its relationships
    ///
    /// A malformed external worksheet relationship is removed straight
    /// away and the package is checked once more.
    fn load_package(path: &Path, budget: Duration) -> XlsxResult<Package> {
        let bytes = Self::read_with_retry(path, budget)?;
        match Package::read(Cursor::new(bytes.as_slice())) {
            Err(XlsxError::TransientLock(reason)) => {
                log::warn!("{}: {reason}, removing external links", path.display());
                let mut package = Package::read_unchecked(Cursor::new(bytes.as_slice()))?;
                package.clean_external_worksheet_relationships()?;
                package.check_relationships()?;
                Ok(package)
            }
            result => result,
        }
    }

    /// Read the file, retrying while the OS refuses access
    fn read_with_retry(path: &Path, budget: Duration) -> XlsxResult<Vec<u8>> {
        let started = Instant::now();
        let mut attempt = 1;
        loop {
            match fs::read(path) {
                Ok(bytes) => return Ok(bytes),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(XlsxError::NotFound(path.display().to_string()));
                }
                Err(e) if started.elapsed() < budget => {
                    log::debug!("attempt {attempt} to read {} failed: {e}", path.display());
                    attempt += 1;
                    thread::sleep(RETRY_INTERVAL);
                }
                Err(e) => {
                    return Err(XlsxError::TransientLock(format!(
                        "{} stayed unavailable after {attempt} attempt(s): {e}",
                        path.display()
                    )));
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn into_workbook(self) -> Workbook {
        self.workbook
    }

    /// Write the workbook back to its file
    pub fn save(&mut self) -> XlsxResult<()> {
        if self.read_only {
            return Err(XlsxError::ReadOnly(self.path.display().to_string()));
        }
        let mut buffer = Cursor::new(Vec::new());
        XlsxWriter::write_package(&mut self.workbook, &mut self.package, &mut buffer)?;
        fs::write(&self.path, buffer.into_inner())?;
        log::info!("saved {}", self.path.display());
        Ok(())
    }

    /// Save under a new path, which becomes the file's path
    ///
    /// A file opened read-only can be saved elsewhere; the copy is writable.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> XlsxResult<()> {
        let path = path.as_ref();
        check_extension(path)?;
        self.path = path.to_path_buf();
        self.read_only = false;
        self.save()
    }
}
