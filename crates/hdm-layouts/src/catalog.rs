#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use hdm_model::{Layout, LayoutId, LayoutPreview, LayoutSummary};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::LayoutError;
use crate::loader::parse_layout_bytes;
use crate::manifest::{
    MANIFEST_FILE, MANIFEST_SCHEMA, MANIFEST_SCHEMA_VERSION, Manifest, ManifestFile,
};
use crate::paths::default_layouts_root;

/// Number of fields returned by a preview when no limit is given.
pub const DEFAULT_PREVIEW_LIMIT: usize = 10;

/// The fixed set of target layouts.
///
/// Built once at startup and shared read-only (typically behind an `Arc`);
/// nothing mutates it after [`LayoutCatalog::load`] returns.
#[derive(Debug, Clone)]
pub struct LayoutCatalog {
    root: PathBuf,
    layouts: BTreeMap<LayoutId, Layout>,
}

impl LayoutCatalog {
    /// Load from `HDM_LAYOUTS_DIR` or the workspace `layouts/` directory.
    pub fn load_default() -> Result<Self, LayoutError> {
        Self::load(&default_layouts_root())
    }

    /// Verify the manifest and every pinned file, then parse all layouts.
    pub fn load(layouts_dir: &Path) -> Result<Self, LayoutError> {
        let manifest = load_manifest(&layouts_dir.join(MANIFEST_FILE))?;
        validate_manifest(&manifest)?;

        let mut layouts = BTreeMap::new();
        for file in &manifest.files {
            let path = layouts_dir.join(&file.path);
            let bytes = read_verified(&path, file)?;
            let fields = parse_layout_bytes(&bytes, &path)?;
            let expected = file.layout.expected_field_count();
            if fields.len() != expected {
                return Err(LayoutError::FieldCountMismatch {
                    layout: file.layout,
                    expected,
                    actual: fields.len(),
                });
            }
            debug!(layout = %file.layout, fields = fields.len(), "layout verified");
            layouts.insert(file.layout, Layout::new(file.layout, fields)?);
        }

        info!(
            layouts = layouts.len(),
            root = %layouts_dir.display(),
            "layout catalog loaded"
        );
        Ok(Self {
            root: layouts_dir.to_path_buf(),
            layouts,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a layout by machine id or display name.
    pub fn get_layout(&self, name: &str) -> Result<&Layout, LayoutError> {
        let id: LayoutId = name.parse().map_err(|_| LayoutError::unknown(name))?;
        self.layout(id).ok_or_else(|| LayoutError::unknown(name))
    }

    pub fn layout(&self, id: LayoutId) -> Option<&Layout> {
        self.layouts.get(&id)
    }

    /// Summaries of every layout, in catalog order.
    pub fn list_layouts(&self) -> Vec<LayoutSummary> {
        self.layouts.values().map(Layout::summary).collect()
    }

    /// The first `limit` fields of a layout plus its total field count.
    pub fn preview(&self, name: &str, limit: usize) -> Result<LayoutPreview, LayoutError> {
        let layout = self.get_layout(name)?;
        Ok(LayoutPreview {
            id: layout.id(),
            name: layout.name().to_string(),
            total_fields: layout.len(),
            preview: layout.fields().iter().take(limit).cloned().collect(),
        })
    }
}

fn load_manifest(path: &Path) -> Result<Manifest, LayoutError> {
    let contents = std::fs::read_to_string(path).map_err(|e| LayoutError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| LayoutError::Toml {
        path: path.to_path_buf(),
        source: e,
    })
}

fn validate_manifest(manifest: &Manifest) -> Result<(), LayoutError> {
    if manifest.manifest.schema != MANIFEST_SCHEMA {
        return Err(LayoutError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.manifest.schema),
        });
    }
    if manifest.manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(LayoutError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.manifest.schema_version
            ),
        });
    }

    let mut seen = BTreeSet::new();
    for file in &manifest.files {
        if !seen.insert(file.layout) {
            return Err(LayoutError::DuplicateLayout {
                layout: file.layout,
            });
        }
        validate_sha(&file.sha256, &file.path)?;
        validate_path(&file.path)?;
    }

    for layout in LayoutId::ALL {
        if !seen.contains(&layout) {
            return Err(LayoutError::MissingLayout { layout });
        }
    }
    Ok(())
}

fn validate_sha(sha: &str, path: &str) -> Result<(), LayoutError> {
    let valid = sha.len() == 64 && sha.chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(LayoutError::InvalidSha256 {
            path: PathBuf::from(path),
            message: "expected 64 hex characters".to_string(),
        })
    }
}

fn validate_path(path: &str) -> Result<(), LayoutError> {
    let p = Path::new(path);
    let escapes = p
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || path.is_empty() {
        return Err(LayoutError::InvalidPath {
            path: p.to_path_buf(),
            message: "must be a relative path inside the layouts directory".to_string(),
        });
    }
    Ok(())
}

fn read_verified(path: &Path, file: &ManifestFile) -> Result<Vec<u8>, LayoutError> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LayoutError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            LayoutError::io(path, e)
        }
    })?;

    let actual = hex::encode(Sha256::digest(&bytes));
    let expected = file.sha256.to_ascii_lowercase();
    if actual != expected {
        return Err(LayoutError::Sha256Mismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_validation_rejects_escapes() {
        assert!(validate_path("member.csv").is_ok());
        assert!(validate_path("./v1/member.csv").is_ok());
        assert!(validate_path("../member.csv").is_err());
        assert!(validate_path("/etc/member.csv").is_err());
        assert!(validate_path("").is_err());
    }

    #[test]
    fn sha_validation() {
        assert!(validate_sha(&"a".repeat(64), "member.csv").is_ok());
        assert!(validate_sha("abc", "member.csv").is_err());
        assert!(validate_sha(&"z".repeat(64), "member.csv").is_err());
    }
}
