use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{DollyError, DollyResult};

/// Panorama extensions tried by [`find_panorama`], in order.
pub const PANORAMA_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

pub const METADATA_FILE: &str = "metadata.json";

/// One transition to render: two panoramas and their depth maps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionJob {
    /// `{from}_to_{to}`, used for output naming.
    pub name: String,
    pub pano1: PathBuf,
    pub pano2: PathBuf,
    pub depth1: PathBuf,
    pub depth2: PathBuf,
}

/// Result of scanning a panorama directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Discovery {
    pub jobs: Vec<TransitionJob>,
    /// Names of consecutive pairs whose files could not be resolved.
    pub skipped: Vec<String>,
}

/// One entry of `metadata.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
pub struct LocationMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pano_id: Option<String>,
}

impl LocationMeta {
    fn lookup_id(&self) -> Option<&str> {
        self.pano_id.as_deref().or(self.name.as_deref())
    }

    fn display_name(&self, fallback: &str) -> String {
        file_safe_name(self.name.as_deref().unwrap_or(fallback))
    }
}

/// Determine which consecutive panoramas need a transition.
///
/// With a `metadata.json` in `panoramas_dir`, consecutive locations are paired; otherwise the
/// sorted `*.jpg` files (minus depth maps) are paired in name order.
#[tracing::instrument]
pub fn find_transition_pairs(panoramas_dir: &Path, depth_dir: &Path) -> DollyResult<Discovery> {
    if !panoramas_dir.is_dir() {
        return Err(DollyError::validation(format!(
            "panoramas directory '{}' does not exist",
            panoramas_dir.display()
        )));
    }

    let metadata_path = panoramas_dir.join(METADATA_FILE);
    let candidates = if metadata_path.is_file() {
        let locations = read_metadata(&metadata_path)?;
        tracing::debug!(locations = locations.len(), "pairing locations from metadata");
        locations
            .windows(2)
            .map(|w| {
                let name = format!(
                    "{}_to_{}",
                    w[0].display_name("loc1"),
                    w[1].display_name("loc2")
                );
                let pano1 = w[0].lookup_id().and_then(|id| find_panorama(panoramas_dir, id));
                let pano2 = w[1].lookup_id().and_then(|id| find_panorama(panoramas_dir, id));
                (name, pano1, pano2)
            })
            .collect::<Vec<_>>()
    } else {
        let panos = sequential_panoramas(panoramas_dir)?;
        tracing::debug!(panoramas = panos.len(), "pairing panoramas by file name");
        panos
            .windows(2)
            .map(|w| {
                let name = format!("{}_to_{}", file_stem(&w[0]), file_stem(&w[1]));
                (name, Some(w[0].clone()), Some(w[1].clone()))
            })
            .collect()
    };

    let mut discovery = Discovery::default();
    for (name, pano1, pano2) in candidates {
        let resolved = pano1.zip(pano2).and_then(|(pano1, pano2)| {
            let depth1 = find_depth(depth_dir, &file_stem(&pano1))?;
            let depth2 = find_depth(depth_dir, &file_stem(&pano2))?;
            Some((pano1, pano2, depth1, depth2))
        });
        match resolved {
            Some((pano1, pano2, depth1, depth2)) => discovery.jobs.push(TransitionJob {
                name,
                pano1,
                pano2,
                depth1,
                depth2,
            }),
            None => {
                tracing::warn!(pair = %name, "skipping pair with unresolved panorama or depth map");
                discovery.skipped.push(name);
            }
        }
    }
    Ok(discovery)
}

/// Find a panorama by identifier: exact name, then `_equirect` suffix, then any file whose name
/// contains the identifier. Extensions are tried in [`PANORAMA_EXTENSIONS`] order.
pub fn find_panorama(dir: &Path, identifier: &str) -> Option<PathBuf> {
    let entries = sorted_file_names(dir).unwrap_or_default();
    for ext in PANORAMA_EXTENSIONS {
        let exact = dir.join(format!("{identifier}.{ext}"));
        if exact.is_file() {
            return Some(exact);
        }
        let equirect = dir.join(format!("{identifier}_equirect.{ext}"));
        if equirect.is_file() {
            return Some(equirect);
        }
        let suffix = format!(".{ext}");
        let partial = entries.iter().find(|name| {
            name.strip_suffix(&suffix)
                .is_some_and(|stem| stem.contains(identifier) && !stem.contains("_depth"))
        });
        if let Some(name) = partial {
            return Some(dir.join(name));
        }
    }
    None
}

/// Find the depth map of the panorama with file stem `pano_stem`.
pub fn find_depth(depth_dir: &Path, pano_stem: &str) -> Option<PathBuf> {
    let direct = depth_dir.join(format!("{pano_stem}_depth.png"));
    if direct.is_file() {
        return Some(direct);
    }
    let base = pano_stem.replace("_equirect", "").replace("_4x", "");
    let stripped = depth_dir.join(format!("{base}_depth.png"));
    stripped.is_file().then_some(stripped)
}

/// Make `name` usable as a single path component: separators become `_`, and names that would
/// resolve to the current or parent directory are prefixed.
pub fn file_safe_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        format!("_{cleaned}")
    } else {
        cleaned
    }
}

/// Whether `name` can be joined onto an output directory without leaving it.
pub fn is_file_safe_name(name: &str) -> bool {
    file_safe_name(name) == name
}

fn read_metadata(path: &Path) -> DollyResult<Vec<LocationMeta>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read metadata '{}'", path.display()))?;
    serde_json::from_str(&text)
        .map_err(|e| DollyError::serde(format!("{}: {e}", path.display())))
}

fn sequential_panoramas(dir: &Path) -> DollyResult<Vec<PathBuf>> {
    Ok(sorted_file_names(dir)?
        .into_iter()
        .filter_map(|name| {
            let stem = name.strip_suffix(".jpg")?;
            (!stem.contains("_depth")).then(|| dir.join(&name))
        })
        .collect())
}

fn sorted_file_names(dir: &Path) -> DollyResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("list '{}'", dir.display()))? {
        let entry = entry.with_context(|| format!("list '{}'", dir.display()))?;
        if entry.path().is_file()
            && let Some(name) = entry.file_name().to_str()
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/pairs/discovery.rs"]
mod tests;
