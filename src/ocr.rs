//! OCR backend: tesseract for recognition, poppler's `pdftoppm` for rasterising
//! PDF pages.
//!
//! Availability is decided once by probing `tesseract --version`. The
//! process-wide engine lives in a `OnceLock` and is read-only after the first
//! access, so request handlers never re-probe.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use tempfile::TempDir;

use crate::config::OcrConfig;
use crate::extract::error::{ExtractError, ExtractResult};

static GLOBAL: OnceLock<OcrEngine> = OnceLock::new();

/// Install the process-wide engine, probing with `config`.
///
/// The first call wins; later calls (and [`global`]) return the engine that
/// was installed first.
pub fn install_global(config: &OcrConfig) -> &'static OcrEngine {
    GLOBAL.get_or_init(|| OcrEngine::detect(config.clone()))
}

/// The process-wide engine, probed with the default config if nothing was
/// installed.
pub fn global() -> &'static OcrEngine {
    GLOBAL.get_or_init(|| OcrEngine::detect(OcrConfig::default()))
}

/// A configured OCR toolchain and its probed availability.
#[derive(Debug, Clone)]
pub struct OcrEngine {
    config: OcrConfig,
    version: Option<String>,
}

/// PNG renderings of a PDF's pages, kept alive with their scratch directory.
pub struct RasterizedPages {
    _dir: TempDir,
    pages: Vec<PathBuf>,
}

impl RasterizedPages {
    /// Page images in page order.
    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }
}

impl OcrEngine {
    /// Probe the configured tesseract binary.
    pub fn detect(config: OcrConfig) -> Self {
        let version = probe_version(&config.tesseract_cmd);
        match &version {
            Some(v) => tracing::info!(version = %v, "tesseract OCR is ready"),
            None => tracing::warn!(
                cmd = %config.tesseract_cmd,
                "tesseract OCR is not available; OCR fallbacks disabled"
            ),
        }
        Self { config, version }
    }

    /// An engine that always reports OCR as unavailable.
    pub fn disabled() -> Self {
        Self {
            config: OcrConfig::default(),
            version: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.version.is_some()
    }

    /// The first line of `tesseract --version`, if the probe succeeded.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Run recognition on a single image file and return the raw text.
    pub fn recognize(&self, image: &Path) -> ExtractResult<String> {
        let mut cmd = Command::new(&self.config.tesseract_cmd);
        cmd.arg(image)
            .arg("stdout")
            .args(["--oem", &self.config.oem.to_string()])
            .args(["--psm", &self.config.psm.to_string()]);
        if let Some(lang) = &self.config.language {
            cmd.args(["-l", lang]);
        }

        let output = cmd.output().map_err(|e| ExtractError::Ocr {
            message: format!("failed to run {}: {e}", self.config.tesseract_cmd),
        })?;
        if !output.status.success() {
            return Err(ExtractError::Ocr {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Render every page of `pdf` to PNG at the configured DPI.
    pub fn rasterize_pdf(&self, pdf: &Path) -> ExtractResult<RasterizedPages> {
        let dir = TempDir::new()?;
        let prefix = dir.path().join("page");

        let output = Command::new(&self.config.pdftoppm_cmd)
            .args(["-r", &self.config.dpi.to_string(), "-png"])
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|e| ExtractError::Rasterize {
                message: format!("failed to run {}: {e}", self.config.pdftoppm_cmd),
            })?;
        if !output.status.success() {
            return Err(ExtractError::Rasterize {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(dir.path())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter_map(|path| page_number(&path).map(|n| (n, path)))
            .collect();
        pages.sort_by_key(|(n, _)| *n);

        Ok(RasterizedPages {
            _dir: dir,
            pages: pages.into_iter().map(|(_, path)| path).collect(),
        })
    }
}

fn probe_version(cmd: &str) -> Option<String> {
    let output = Command::new(cmd).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    // Older tesseract builds print the version banner on stderr.
    let banner = if output.stdout.is_empty() {
        output.stderr
    } else {
        output.stdout
    };
    let first = String::from_utf8_lossy(&banner)
        .lines()
        .next()
        .unwrap_or("tesseract")
        .trim()
        .to_string();
    Some(first)
}

/// Parse the page index out of pdftoppm's `page-07.png` naming.
fn page_number(path: &Path) -> Option<u32> {
    if path.extension().and_then(|e| e.to_str()) != Some("png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit('-').next()?.parse().ok()
}

/// Shell-script stand-ins for the external OCR tools.
#[cfg(all(test, unix))]
pub(crate) mod testing {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::process::Command;
    use std::time::Duration;

    use crate::config::OcrConfig;

    use super::OcrEngine;

    /// File the stub tesseract appends its arguments to, one call per line.
    pub const ARGS_LOG: &str = "tesseract-args.log";

    /// Write an executable `sh` script into `dir`. Every script answers
    /// `--version` before running `body`.
    pub fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let source = format!(
            "#!/bin/sh\nif [ \"$1\" = --version ]; then echo '{name} 5.3.0'; exit 0; fi\n{body}\n"
        );
        std::fs::write(&path, source).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        // ETXTBSY while a concurrently forked test child still holds the
        // write handle.
        for _ in 0..100 {
            match Command::new(&path).arg("--version").output() {
                Err(e) if e.raw_os_error() == Some(26) => {
                    std::thread::sleep(Duration::from_millis(10))
                }
                _ => break,
            }
        }
        path
    }

    /// A tesseract that records its arguments and prints `output`.
    pub fn tesseract(dir: &Path, output: &str) -> PathBuf {
        let args = dir.join(ARGS_LOG);
        script(
            dir,
            "tesseract",
            &format!(
                "echo \"$*\" >> '{}'\nprintf '%s\\n' '{output}'",
                args.display()
            ),
        )
    }

    /// Arguments of every recognition call, in call order.
    pub fn recorded_args(dir: &Path) -> Vec<String> {
        std::fs::read_to_string(dir.join(ARGS_LOG))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// An engine whose tesseract is `tesseract_cmd`.
    pub fn engine(tesseract_cmd: &Path, language: Option<&str>) -> OcrEngine {
        OcrEngine::detect(OcrConfig {
            tesseract_cmd: tesseract_cmd.display().to_string(),
            language: language.map(str::to_string),
            ..Default::default()
        })
    }
}
