//! Determinism and regression helpers.
//!
//! A game exposes a serializable snapshot of its state; these helpers hash one
//! snapshot per frame so two runs (or a run and a stored golden) can be compared
//! frame-by-frame without keeping the states themselves around.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{GameLogic, HeadlessRunner};

/// Environment flag helper: accepts `1/true/yes/on` (case-insensitive).
pub fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| {
            let v = v.to_ascii_lowercase();
            matches!(v.as_str(), "1" | "true" | "yes" | "on")
        })
        .unwrap_or(false)
}

/// If set, regression tests may update golden files in-place.
pub fn update_goldens_enabled() -> bool {
    env_flag("SPELLCAST_UPDATE_GOLDENS")
}

pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[macro_export]
macro_rules! regression_golden_path {
    ($name:expr) => {{
        let base = $crate::regression::sanitize_filename($name);
        ::std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("goldens")
            .join(format!("{base}.json"))
    }};
}

pub fn bytes_sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hashes the compact JSON encoding of `value`.
pub fn json_sha256_hex<T: Serialize + ?Sized>(value: &T) -> io::Result<String> {
    let bytes =
        serde_json::to_vec(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(bytes_sha256_hex(&bytes))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DigestGolden {
    pub version: u32,
    pub name: String,
    pub hash_alg: String,
    /// One digest per logical frame, initial state first.
    pub digests: Vec<String>,
}

impl DigestGolden {
    pub fn new(name: impl Into<String>, digests: Vec<String>) -> Self {
        Self {
            version: 1,
            name: name.into(),
            hash_alg: "sha256".to_string(),
            digests,
        }
    }

    /// Index of the first frame whose digest differs, if any.
    pub fn first_divergence(&self, other: &DigestGolden) -> Option<usize> {
        let shared = self.digests.len().min(other.digests.len());
        let lengths_differ = self.digests.len() != other.digests.len();
        (0..shared)
            .find(|&i| self.digests[i] != other.digests[i])
            .or_else(|| lengths_differ.then_some(shared))
    }
}

pub fn load_golden_json(path: impl AsRef<Path>) -> io::Result<DigestGolden> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    let reader = io::BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed parsing golden json {}: {e}", path.display()),
        )
    })
}

pub fn save_golden_json(path: impl AsRef<Path>, golden: &DigestGolden) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = fs::File::create(path)?;
    let mut writer = io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, golden).map_err(io::Error::other)?;
    writer.flush()?;
    Ok(())
}

const UPDATE_HINT: &str = "(hint: set SPELLCAST_UPDATE_GOLDENS=1 to rewrite)";

/// Compares `golden` against the file at `path`. With `update` set the file is
/// (re)written instead; without it a missing golden is an error.
pub fn assert_or_update_golden_json(
    path: impl AsRef<Path>,
    golden: &DigestGolden,
    update: bool,
) -> io::Result<()> {
    let path = path.as_ref();
    let exists = path.exists();

    if update {
        save_golden_json(path, golden)?;
        if exists {
            log::info!("updated golden: {}", path.display());
        } else {
            log::info!("wrote golden: {}", path.display());
        }
        return Ok(());
    }
    if !exists {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("missing golden {}\n{UPDATE_HINT}", path.display()),
        ));
    }

    let expected = load_golden_json(path)?;
    if expected.version != golden.version || expected.hash_alg != golden.hash_alg {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "golden header mismatch at {}: expected v{} alg={}, got v{} alg={}\n{UPDATE_HINT}",
                path.display(),
                expected.version,
                expected.hash_alg,
                golden.version,
                golden.hash_alg,
            ),
        ));
    }

    if let Some(frame) = expected.first_divergence(golden) {
        return Err(io::Error::other(format!(
            "golden mismatch at {} (frame {frame}): expected {} digests, got {}\n{UPDATE_HINT}",
            path.display(),
            expected.digests.len(),
            golden.digests.len()
        )));
    }

    Ok(())
}

/// Runs `inputs` through a fresh runner and hashes `snapshot(state)` before the
/// first input and after every step.
pub fn record_digests<G, S, F>(
    game: G,
    inputs: impl IntoIterator<Item = G::Input>,
    mut snapshot: F,
) -> io::Result<Vec<String>>
where
    G: GameLogic,
    S: Serialize,
    F: FnMut(&G::State) -> S,
{
    let mut runner = HeadlessRunner::new(game);
    let mut digests = vec![json_sha256_hex(&snapshot(runner.state()))?];
    for input in inputs {
        runner.step(input);
        digests.push(json_sha256_hex(&snapshot(runner.state()))?);
    }
    Ok(digests)
}
