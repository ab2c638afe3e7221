//! Case repository contracts, JSON-file and in-memory implementations.
//!
//! # Responsibility
//! - Provide `load`/`save`/`list_all` over one record per case identifier.
//! - Keep file layout and JSON encoding details inside the store boundary.
//!
//! # Invariants
//! - `load` of an unknown case returns a synthesized default, never an error.
//! - `save` replaces the whole record; there is no patch path.
//! - `list_all` is sorted by case identifier.
//! - No locking: concurrent saves of one case are last-write-wins.

use crate::fsio::write_atomic;
use crate::model::case::Case;
use log::{debug, error, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

const CASE_FILE_EXTENSION: &str = "json";

/// Default directory holding one record per case.
pub const DEFAULT_DATA_DIR: &str = "data/casos";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for case records.
#[derive(Debug)]
pub enum RepoError {
    /// Identifier cannot be mapped to a record location.
    InvalidCaseId(String),
    Io {
        path: PathBuf,
        source: io::Error,
    },
    /// Stored record is not a valid case document, or encoding failed.
    Serde {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCaseId(caso) => write!(f, "invalid case identifier: `{caso}`"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Serde { path, source } => {
                write!(f, "invalid case record {}: {source}", path.display())
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCaseId(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Serde { source, .. } => Some(source),
        }
    }
}

/// Repository interface for case records.
pub trait CaseRepository {
    /// Returns the stored case, or `Case::new(caso)` when none exists.
    fn load(&self, caso: &str) -> RepoResult<Case>;
    /// Whether a record is stored for `caso`.
    fn exists(&self, caso: &str) -> RepoResult<bool>;
    /// Replaces the stored record for `case.caso`.
    fn save(&mut self, case: &Case) -> RepoResult<()>;
    /// Every stored case, sorted by identifier.
    fn list_all(&self) -> RepoResult<Vec<Case>>;
}

/// Stores each case as `<root>/<caso>.json`, pretty-printed UTF-8.
#[derive(Debug, Clone)]
pub struct JsonFileCaseRepository {
    root: PathBuf,
}

impl JsonFileCaseRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record location for `caso`.
    pub fn path_for(&self, caso: &str) -> RepoResult<PathBuf> {
        validate_case_id(caso)?;
        Ok(self.root.join(format!("{caso}.{CASE_FILE_EXTENSION}")))
    }

    fn read_case(path: &Path) -> RepoResult<Case> {
        let content = std::fs::read_to_string(path).map_err(|source| RepoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| RepoError::Serde {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl CaseRepository for JsonFileCaseRepository {
    fn load(&self, caso: &str) -> RepoResult<Case> {
        let path = self.path_for(caso)?;
        if !path.exists() {
            debug!("event=case_load module=repo status=absent caso={caso}");
            return Ok(Case::new(caso));
        }
        let case = Self::read_case(&path)?;
        debug!(
            "event=case_load module=repo status=ok caso={caso} pericias={}",
            case.pericias.len()
        );
        Ok(case)
    }

    fn exists(&self, caso: &str) -> RepoResult<bool> {
        Ok(self.path_for(caso)?.exists())
    }

    fn save(&mut self, case: &Case) -> RepoResult<()> {
        let path = self.path_for(&case.caso)?;
        let payload = serde_json::to_string_pretty(case).map_err(|source| RepoError::Serde {
            path: path.clone(),
            source,
        })?;

        if let Err(source) = write_atomic(&path, payload.as_bytes()) {
            error!(
                "event=case_save module=repo status=error caso={} error={}",
                case.caso, source
            );
            return Err(RepoError::Io { path, source });
        }

        info!(
            "event=case_save module=repo status=ok caso={} pericias={}",
            case.caso,
            case.pericias.len()
        );
        Ok(())
    }

    fn list_all(&self) -> RepoResult<Vec<Case>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let io_err = |source| RepoError::Io {
            path: self.root.clone(),
            source,
        };
        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.root).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_record = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == CASE_FILE_EXTENSION);
            if !is_record {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                records.push((stem.to_string_lossy().into_owned(), path));
            }
        }
        // Sort on the identifier, not the file name: `1-2024` < `1-2024-b`
        // while `1-2024-b.json` < `1-2024.json`.
        records.sort();

        records
            .iter()
            .map(|(_, path)| Self::read_case(path))
            .collect()
    }
}

/// Keeps cases in memory; used by tests and embedders without a filesystem.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCaseRepository {
    cases: BTreeMap<String, Case>,
}

impl InMemoryCaseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing cases, keyed by `caso`.
    pub fn with_cases(cases: impl IntoIterator<Item = Case>) -> Self {
        Self {
            cases: cases
                .into_iter()
                .map(|case| (case.caso.clone(), case))
                .collect(),
        }
    }

    pub fn get(&self, caso: &str) -> Option<&Case> {
        self.cases.get(caso)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl CaseRepository for InMemoryCaseRepository {
    fn load(&self, caso: &str) -> RepoResult<Case> {
        validate_case_id(caso)?;
        Ok(self
            .cases
            .get(caso)
            .cloned()
            .unwrap_or_else(|| Case::new(caso)))
    }

    fn exists(&self, caso: &str) -> RepoResult<bool> {
        validate_case_id(caso)?;
        Ok(self.cases.contains_key(caso))
    }

    fn save(&mut self, case: &Case) -> RepoResult<()> {
        validate_case_id(&case.caso)?;
        self.cases.insert(case.caso.clone(), case.clone());
        Ok(())
    }

    fn list_all(&self) -> RepoResult<Vec<Case>> {
        Ok(self.cases.values().cloned().collect())
    }
}

/// Rejects identifiers that cannot safely name a single record file.
pub fn validate_case_id(caso: &str) -> RepoResult<()> {
    let invalid = caso.trim().is_empty()
        || caso == "."
        || caso == ".."
        || caso.contains(['/', '\\', '\0']);
    if invalid {
        return Err(RepoError::InvalidCaseId(caso.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_case_id, CaseRepository, InMemoryCaseRepository, RepoError};
    use crate::model::case::Case;

    #[test]
    fn case_id_validation_rejects_path_like_values() {
        for bad in ["", "  ", ".", "..", "a/b", "..\\x", "nul\0"] {
            let err = validate_case_id(bad).unwrap_err();
            assert!(matches!(err, RepoError::InvalidCaseId(_)), "accepted {bad:?}");
        }
        validate_case_id("123-2024").unwrap();
        validate_case_id("Nº 5 ñ").unwrap();
    }

    #[test]
    fn in_memory_load_synthesizes_missing_case() {
        let repo = InMemoryCaseRepository::new();
        let case = repo.load("9-2024").unwrap();
        assert_eq!(case, Case::new("9-2024"));
        assert!(!repo.exists("9-2024").unwrap());
    }

    #[test]
    fn in_memory_list_all_is_sorted_by_id() {
        let mut repo = InMemoryCaseRepository::new();
        for caso in ["30-2024", "100-2023", "2-2025"] {
            repo.save(&Case::new(caso)).unwrap();
        }
        let ids: Vec<String> = repo
            .list_all()
            .unwrap()
            .into_iter()
            .map(|case| case.caso)
            .collect();
        assert_eq!(ids, vec!["100-2023", "2-2025", "30-2024"]);
    }
}
