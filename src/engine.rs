//! Process-wide PDF engine: the pdfium library, bound once and shared.
//!
//! [`PdfEngine::ensure_loaded`] is the only entry point. The first call
//! locates the platform library and binds it; every later call returns the
//! same instance. A failed attempt is not memoized, so a transient download
//! error can be retried by calling again.
//!
//! Library lookup order:
//!
//! 1. `PDFIUM_LIB_PATH`, when it names an existing file.
//! 2. The per-version cache directory
//!    (`<cache>/smartflip/pdfium-<VERSION>/`, or `SMARTFLIP_PDFIUM_CACHE`).
//! 3. A download of the matching archive from the pdfium-binaries releases,
//!    unpacked into that cache directory.
//!
//! The download uses blocking I/O. Call this from a blocking context
//! (`spawn_blocking`), never directly on an async worker.

use crate::error::SmartFlipError;
use once_cell::sync::OnceCell;
use pdfium_render::prelude::Pdfium;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// pdfium-binaries release tag (`chromium/<VERSION>`).
pub const PDFIUM_VERSION: &str = "7690";

const RELEASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

/// Env var naming an existing pdfium library.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Env var overriding the cache root.
pub const CACHE_DIR_ENV: &str = "SMARTFLIP_PDFIUM_CACHE";

/// Failures while making the engine available.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no pdfium build for {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("cannot create cache directory '{path}': {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("archive is unusable: {0}")]
    Archive(String),

    #[error("cannot bind '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },
}

impl From<EngineError> for SmartFlipError {
    fn from(e: EngineError) -> Self {
        SmartFlipError::EngineUnavailable(e.to_string())
    }
}

/// Release asset and in-archive location of the library for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlatformAsset {
    pub archive: &'static str,
    pub member: &'static str,
    pub file_name: &'static str,
}

// (os, arch, archive, member-in-archive, file name on disk)
const ASSETS: &[(&str, &str, &str, &str, &str)] = &[
    ("linux", "x86_64", "pdfium-linux-x64.tgz", "lib/libpdfium.so", "libpdfium.so"),
    ("linux", "aarch64", "pdfium-linux-arm64.tgz", "lib/libpdfium.so", "libpdfium.so"),
    ("macos", "x86_64", "pdfium-mac-x64.tgz", "lib/libpdfium.dylib", "libpdfium.dylib"),
    ("macos", "aarch64", "pdfium-mac-arm64.tgz", "lib/libpdfium.dylib", "libpdfium.dylib"),
    ("windows", "x86_64", "pdfium-win-x64.tgz", "bin/pdfium.dll", "pdfium.dll"),
    ("windows", "aarch64", "pdfium-win-arm64.tgz", "bin/pdfium.dll", "pdfium.dll"),
    ("windows", "x86", "pdfium-win-x86.tgz", "bin/pdfium.dll", "pdfium.dll"),
];

pub(crate) fn asset_for(os: &str, arch: &str) -> Result<PlatformAsset, EngineError> {
    ASSETS
        .iter()
        .find(|(o, a, ..)| *o == os && *a == arch)
        .map(|&(_, _, archive, member, file_name)| PlatformAsset {
            archive,
            member,
            file_name,
        })
        .ok_or_else(|| EngineError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        })
}

/// Cache directory for the pinned pdfium version.
pub fn cache_dir() -> PathBuf {
    cache_dir_with(std::env::var(CACHE_DIR_ENV).ok().as_deref())
}

fn cache_dir_with(root_override: Option<&str>) -> PathBuf {
    let versioned = format!("pdfium-{PDFIUM_VERSION}");
    match root_override.filter(|s| !s.is_empty()) {
        Some(root) => PathBuf::from(root).join(versioned),
        None => dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("smartflip")
            .join(versioned),
    }
}

/// The bound pdfium library.
pub struct PdfEngine {
    pdfium: Pdfium,
    library_path: PathBuf,
}

static ENGINE: OnceCell<PdfEngine> = OnceCell::new();

impl PdfEngine {
    /// Bind pdfium on first use and return the shared engine.
    ///
    /// Concurrent first callers block until one of them finishes binding.
    pub fn ensure_loaded() -> Result<&'static PdfEngine, SmartFlipError> {
        ENGINE
            .get_or_try_init(|| {
                let path = locate_library()?;
                let pdfium = Pdfium::bind_to_library(&path)
                    .map(Pdfium::new)
                    .map_err(|e| EngineError::Bind {
                        path: path.clone(),
                        reason: e.to_string(),
                    })?;
                info!("PDF engine bound: {}", path.display());
                Ok::<_, EngineError>(PdfEngine {
                    pdfium,
                    library_path: path,
                })
            })
            .map_err(SmartFlipError::from)
    }

    /// Whether [`Self::ensure_loaded`] has already succeeded in this process.
    pub fn is_loaded() -> bool {
        ENGINE.get().is_some()
    }

    pub fn pdfium(&self) -> &Pdfium {
        &self.pdfium
    }

    pub fn library_path(&self) -> &Path {
        &self.library_path
    }
}

fn locate_library() -> Result<PathBuf, EngineError> {
    if let Ok(explicit) = std::env::var(LIB_PATH_ENV) {
        let path = PathBuf::from(explicit);
        if path.is_file() {
            debug!("Using {LIB_PATH_ENV}={}", path.display());
            return Ok(path);
        }
        warn!(
            "{LIB_PATH_ENV} points to '{}', which does not exist; falling back to the cache",
            path.display()
        );
    }

    let asset = asset_for(std::env::consts::OS, std::env::consts::ARCH)?;
    let dir = cache_dir();
    let target = dir.join(asset.file_name);
    if target.is_file() {
        debug!("Using cached pdfium: {}", target.display());
        return Ok(target);
    }

    std::fs::create_dir_all(&dir).map_err(|source| EngineError::CacheDir {
        path: dir.clone(),
        source,
    })?;

    let url = format!("{RELEASE_URL}/chromium%2F{PDFIUM_VERSION}/{}", asset.archive);
    info!("Downloading pdfium {PDFIUM_VERSION} from {url}");
    let archive = fetch(&url)?;
    unpack_member(&archive, asset.member, &target)?;
    info!("pdfium cached at {}", target.display());
    Ok(target)
}

fn fetch(url: &str) -> Result<Vec<u8>, EngineError> {
    let failed = |reason: String| EngineError::Download {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("smartflip/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let mut response = client.get(url).send().map_err(|e| failed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let mut bytes = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    response
        .read_to_end(&mut bytes)
        .map_err(|e| failed(e.to_string()))?;
    debug!("Downloaded {} bytes", bytes.len());
    Ok(bytes)
}

/// Write the archive entry at `member` to `dest`.
///
/// The entry is unpacked to a sibling temp name first and renamed into place,
/// so a crash mid-write never leaves a truncated library at `dest`.
pub(crate) fn unpack_member(archive: &[u8], member: &str, dest: &Path) -> Result<(), EngineError> {
    let gz = flate2::read::GzDecoder::new(archive);
    let mut tar = tar::Archive::new(gz);
    let entries = tar
        .entries()
        .map_err(|e| EngineError::Archive(e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| EngineError::Archive(e.to_string()))?;
        let is_member = entry
            .path()
            .map(|p| p.to_string_lossy().trim_start_matches("./") == member)
            .unwrap_or(false);
        if !is_member {
            continue;
        }

        let partial = dest.with_extension("partial");
        entry
            .unpack(&partial)
            .map_err(|e| EngineError::Archive(format!("unpack {member}: {e}")))?;
        std::fs::rename(&partial, dest)
            .map_err(|e| EngineError::Archive(format!("rename into place: {e}")))?;
        return Ok(());
    }

    Err(EngineError::Archive(format!("'{member}' not found")))
}
