//! Path normalization and allowed-root enforcement.
//!
//! Remote paths are POSIX, absolute, and normalized purely lexically: the
//! device may be unreachable and the target may not exist yet, so nothing
//! here touches the remote filesystem. Local paths are resolved against the
//! working directory with host path semantics.
//!
//! Membership is a string-prefix-on-boundary check. A symlink inside an
//! allowed root that points outside it is not detected at this layer.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::error::GatewayError;

/// Lexically normalize an absolute POSIX path.
///
/// Collapses `.`, `..`, and repeated separators without filesystem access.
/// `..` at the root stays at the root. Fails with
/// [`GatewayError::InvalidPath`] if `path` does not start with `/`.
///
/// ```
/// use shellgate_security::normalize_remote_path;
///
/// assert_eq!(
///     normalize_remote_path("/var/mobile/../mobile/a.txt").unwrap(),
///     "/var/mobile/a.txt"
/// );
/// assert!(normalize_remote_path("var/mobile").is_err());
/// ```
pub fn normalize_remote_path(path: &str) -> Result<String, GatewayError> {
    if !path.starts_with('/') {
        return Err(GatewayError::InvalidPath {
            path: path.to_string(),
        });
    }

    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    Ok(format!("/{}", parts.join("/")))
}

/// Resolve `path` to an absolute, lexically cleaned local path.
///
/// Relative paths are joined onto the current working directory. Never
/// fails: non-existent paths resolve, and if the working directory cannot
/// be determined the input is cleaned as-is.
pub fn normalize_local_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        return clean_components(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => resolve_local_path(&cwd, path),
        Err(_) => clean_components(path),
    }
}

/// Resolve `path` against an explicit base directory.
pub fn resolve_local_path(base: &Path, path: &Path) -> PathBuf {
    clean_components(&base.join(path))
}

fn clean_components(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let at_top = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if !at_top {
                    out.pop();
                }
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

/// True if `path` is `root` or lies beneath it on a `/` boundary.
///
/// Both arguments must already be normalized.
fn remote_within(path: &str, root: &str) -> bool {
    if root == "/" {
        return true;
    }
    match path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Root sets
// ---------------------------------------------------------------------------

/// Ordered set of allowed remote write roots.
///
/// Built once from configuration; every root is normalized at construction
/// so membership checks compare like with like.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteRoots {
    roots: Vec<String>,
}

impl RemoteRoots {
    /// Normalize and collect `roots`, dropping duplicates but keeping order.
    ///
    /// Fails with [`GatewayError::InvalidPath`] on the first non-absolute root.
    pub fn new<I, S>(roots: I) -> Result<Self, GatewayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for root in roots {
            let root = normalize_remote_path(root.as_ref())?;
            if !normalized.contains(&root) {
                normalized.push(root);
            }
        }
        Ok(Self { roots: normalized })
    }

    /// The normalized roots in configuration order.
    pub fn as_slice(&self) -> &[String] {
        &self.roots
    }

    /// Whether no roots are configured (every write is then blocked).
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Whether an already-normalized path falls within any root.
    pub fn contains(&self, normalized: &str) -> bool {
        self.roots.iter().any(|root| remote_within(normalized, root))
    }
}

/// Ordered set of allowed local artifact roots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalRoots {
    roots: Vec<PathBuf>,
}

impl LocalRoots {
    /// Resolve each root with [`normalize_local_path`].
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut resolved: Vec<PathBuf> = Vec::new();
        for root in roots {
            let root = normalize_local_path(root);
            if !resolved.contains(&root) {
                resolved.push(root);
            }
        }
        Self { roots: resolved }
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Whether an already-normalized path falls within any root.
    ///
    /// `Path::starts_with` compares whole components, so `/data/out2` is
    /// never inside `/data/out`.
    pub fn contains(&self, normalized: &Path) -> bool {
        self.roots.iter().any(|root| normalized.starts_with(root))
    }

    fn display_roots(&self) -> Vec<String> {
        self.roots
            .iter()
            .map(|r| r.to_string_lossy().into_owned())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Enforcement
// ---------------------------------------------------------------------------

/// Normalize every declared write path and require all of them to fall
/// within `roots`.
///
/// All-or-nothing: if any path is outside every root the call fails with
/// [`GatewayError::WritePathBlocked`] listing every configured root and every
/// blocked path. On success the normalized paths are returned in input order.
pub fn ensure_allowed_write_paths<S: AsRef<str>>(
    paths: &[S],
    roots: &RemoteRoots,
) -> Result<Vec<String>, GatewayError> {
    let normalized = paths
        .iter()
        .map(|p| normalize_remote_path(p.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let blocked: Vec<String> = normalized
        .iter()
        .filter(|p| !roots.contains(p))
        .cloned()
        .collect();

    if !blocked.is_empty() {
        warn!(?blocked, roots = ?roots.as_slice(), "write paths outside allowed roots");
        return Err(GatewayError::WritePathBlocked {
            roots: roots.as_slice().to_vec(),
            blocked,
        });
    }

    Ok(normalized)
}

/// Normalize a local path and require it to fall within `roots`.
pub fn ensure_allowed_local_path(
    path: impl AsRef<Path>,
    roots: &LocalRoots,
) -> Result<PathBuf, GatewayError> {
    let normalized = normalize_local_path(path);
    if roots.contains(&normalized) {
        return Ok(normalized);
    }

    warn!(path = %normalized.display(), "local path outside allowed roots");
    Err(GatewayError::LocalPathBlocked {
        roots: roots.display_roots(),
        path: normalized.to_string_lossy().into_owned(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
