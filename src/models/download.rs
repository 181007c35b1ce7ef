//! Model resolution, download and installation management.
//!
//! Handles locating the model a session should load: direct file paths
//! are used as-is, catalog names are looked up in the cache directory
//! and downloaded from HuggingFace (with checksum verification) when
//! missing.

use crate::error::{Result, WhisperdError};
use crate::models::catalog::{get_model, resolve_name};
use std::path::{Path, PathBuf};

#[cfg(feature = "model-download")]
use futures_util::StreamExt;
#[cfg(feature = "model-download")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "model-download")]
use sha1::{Digest, Sha1};
#[cfg(feature = "model-download")]
use std::fs;
#[cfg(feature = "model-download")]
use std::io::Write;

/// Get the directory where models are stored.
///
/// Uses `~/.cache/whisperd/models/` on Linux/Unix.
pub fn models_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("whisperd")
        .join("models")
}

/// Get the full path for a model file.
///
/// Always returns a path regardless of whether the model is in the catalog.
/// The file may or may not exist on disk.
pub fn model_path(name: &str) -> PathBuf {
    let resolved = resolve_name(name);
    let filename = format!("ggml-{resolved}.bin");
    models_dir().join(filename)
}

/// Derive a display name from a model file path.
///
/// Catalog downloads are stored as `ggml-<name>.bin`; the prefix is
/// stripped so status messages show the plain catalog name.
pub fn model_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    stem.strip_prefix("ggml-").unwrap_or(stem).to_string()
}

/// Check if a model is installed.
pub fn is_model_installed(name: &str) -> bool {
    model_path(name).exists()
}

/// Whether a model argument names a file rather than a catalog entry.
///
/// Anything with a path separator or a `.bin` suffix is treated as a
/// file path and never resolved against the catalog.
pub fn is_path_spec(spec: &str) -> bool {
    spec.contains('/') || spec.contains(std::path::MAIN_SEPARATOR) || spec.ends_with(".bin")
}

/// Name a model argument the way status messages show it.
///
/// Aliases resolve to their catalog names and file paths reduce to
/// their display stem. The result matches the name the loaded model
/// reports, so the announcements before and after loading agree.
pub fn canonical_model_name(spec: &str) -> String {
    if is_path_spec(spec) {
        model_name_from_path(Path::new(spec))
    } else {
        resolve_name(spec).to_string()
    }
}

/// Resolve a model argument to a loadable file path.
///
/// File paths must already exist. Catalog names are served from the
/// cache when installed; otherwise the model is downloaded, unless
/// `no_download` is set, in which case a missing model is an error.
pub async fn locate_model(spec: &str, no_download: bool, progress: bool) -> Result<PathBuf> {
    if is_path_spec(spec) {
        let path = PathBuf::from(spec);
        if !path.exists() {
            return Err(WhisperdError::ModelNotFound {
                name: spec.to_string(),
            });
        }
        return Ok(path);
    }

    if is_model_installed(spec) {
        return Ok(model_path(spec));
    }

    if get_model(spec).is_none() {
        let known: Vec<&str> = crate::models::catalog::MODELS.iter().map(|m| m.name).collect();
        log::error!(
            "Unknown model '{}'; available models: {}",
            spec,
            known.join(", ")
        );
        return Err(WhisperdError::ModelNotFound {
            name: spec.to_string(),
        });
    }

    if no_download {
        log::error!(
            "Model '{}' is not installed at {} and downloads are disabled",
            spec,
            model_path(spec).display()
        );
        return Err(WhisperdError::ModelNotFound {
            name: spec.to_string(),
        });
    }

    download_model(spec, progress).await
}

/// Core download: fetch url, save to path, verify sha1 if non-empty.
#[cfg(feature = "model-download")]
async fn download_to_path(
    name: &str,
    url: &str,
    sha1: &str,
    size_mb: u32,
    output_path: &Path,
    progress: bool,
) -> Result<()> {
    // Create models directory if it doesn't exist
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| WhisperdError::Download {
            message: format!("Failed to create models directory: {e}"),
        })?;
    }

    if progress {
        eprintln!("Downloading {name} ({size_mb} MB)...");
    }

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| WhisperdError::Download {
            message: format!("Failed to start download: {e}"),
        })?;

    if !response.status().is_success() {
        return Err(WhisperdError::Download {
            message: format!("Download failed with status: {}", response.status()),
        });
    }

    let total_size = response.content_length().unwrap_or(0);

    // Set up progress bar (indicatif draws to stderr; stdout stays clean)
    let pb = if progress {
        let pb = ProgressBar::new(total_size);
        pb.set_style(
            // SAFETY: hardcoded template string — always valid
            #[allow(clippy::expect_used)]
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .expect("hardcoded progress bar template")
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    // Download with streaming and hash calculation
    let mut hasher = Sha1::new();
    let mut stream = response.bytes_stream();
    let mut file = fs::File::create(output_path).map_err(|e| WhisperdError::Download {
        message: format!("Failed to create output file: {e}"),
    })?;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| WhisperdError::Download {
            message: format!("Failed to read download chunk: {e}"),
        })?;

        file.write_all(&chunk).map_err(|e| WhisperdError::Download {
            message: format!("Failed to write to file: {e}"),
        })?;

        hasher.update(&chunk);

        if let Some(ref pb) = pb {
            pb.inc(chunk.len() as u64);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Downloaded");
    }

    // Verify SHA-1 checksum
    if !sha1.is_empty() {
        let calculated_hash = format!("{:x}", hasher.finalize());
        if calculated_hash != sha1 {
            if let Err(e) = fs::remove_file(output_path) {
                log::warn!("failed to remove corrupted download: {e}");
            }
            return Err(WhisperdError::Download {
                message: format!(
                    "SHA-1 checksum mismatch. Expected: {sha1}, got: {calculated_hash}"
                ),
            });
        }
        if progress {
            eprintln!("Checksum verified");
        }
    }

    if progress {
        eprintln!("Model installed to: {}", output_path.display());
    }

    Ok(())
}

/// Download a Whisper model from the static catalog.
///
/// # Errors
///
/// Returns an error if:
/// - The model is not in the catalog
/// - The download fails
/// - The SHA-1 checksum doesn't match
/// - The file cannot be written
#[cfg(feature = "model-download")]
pub async fn download_model(name: &str, progress: bool) -> Result<PathBuf> {
    let path = model_path(name);

    if path.exists() {
        return Ok(path);
    }

    let info = get_model(name).ok_or_else(|| WhisperdError::ModelNotFound {
        name: name.to_string(),
    })?;

    download_to_path(info.name, &info.url(), info.sha1, info.size_mb, &path, progress).await?;
    Ok(path)
}

/// Download stub for builds without the `model-download` feature.
#[cfg(not(feature = "model-download"))]
pub async fn download_model(name: &str, _progress: bool) -> Result<PathBuf> {
    Err(WhisperdError::Download {
        message: format!(
            "Model '{name}' is not installed and this build cannot download models \
             (model-download feature disabled)"
        ),
    })
}
