//! Search and retrieval over the documentation index

use std::{collections::HashSet, fmt, fs, sync::Arc};
use tracing::debug;

use crate::docs::{DocKind, DocumentationEntry, IndexCell};
use crate::error::QueryError;

/// Upper bound on search hits; anything past it is dropped silently.
pub const MAX_SEARCH_RESULTS: usize = 25;

pub const NO_MATCHES: &str = "No matches found.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub name: String,
    pub kind: DocKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }
}

impl fmt::Display for SearchResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits.is_empty() {
            return f.write_str(NO_MATCHES);
        }
        for (i, hit) in self.hits.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} ({})", hit.name, hit.kind)?;
        }
        Ok(())
    }
}

/// Answers search and retrieve calls against a shared [`IndexCell`].
///
/// Both operations only read the loaded index, so one engine can be shared
/// across threads without locking.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    index: Arc<IndexCell>,
}

impl QueryEngine {
    pub fn new(index: Arc<IndexCell>) -> Self {
        Self { index }
    }

    /// Case-insensitive substring search over fully qualified names.
    ///
    /// Results follow index order, keep only the first name per documentation
    /// file and are capped at [`MAX_SEARCH_RESULTS`].
    pub fn search(&self, query: &str) -> Result<SearchResults, QueryError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let index = self.index.get()?;
        let mut seen_paths = HashSet::new();
        let hits: Vec<SearchHit> = index
            .entries()
            .filter(|entry| entry.fully_qualified_name.to_lowercase().contains(&needle))
            .filter(|&entry| seen_paths.insert(entry.relative_path.as_str()))
            .take(MAX_SEARCH_RESULTS)
            .map(|entry| SearchHit {
                name: entry.fully_qualified_name.clone(),
                kind: entry.kind,
            })
            .collect();

        debug!(query = %needle, hits = hits.len(), "search");
        Ok(SearchResults { hits })
    }

    /// Resolve a name (exact, then ignoring case) and return its
    /// documentation verbatim. The body is read from disk on every call.
    pub fn retrieve(&self, name: &str) -> Result<String, QueryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QueryError::EmptyName);
        }

        let index = self.index.get()?;
        let entry = index
            .resolve(name)
            .ok_or_else(|| QueryError::NameNotFound(name.to_string()))?;

        self.read_body(entry)
    }

    /// The entry a name resolves to, without reading its body.
    pub fn lookup(&self, name: &str) -> Result<DocumentationEntry, QueryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QueryError::EmptyName);
        }
        let index = self.index.get()?;
        index
            .resolve(name)
            .cloned()
            .ok_or_else(|| QueryError::NameNotFound(name.to_string()))
    }

    fn read_body(&self, entry: &DocumentationEntry) -> Result<String, QueryError> {
        let store = self.index.store();
        let missing = || QueryError::DocumentBodyMissing {
            name: entry.fully_qualified_name.clone(),
            path: store.root().join(&entry.relative_path),
        };

        let path = store.resolve(&entry.relative_path).ok_or_else(missing)?;
        let body = fs::read_to_string(&path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "documentation body unreadable");
            missing()
        })?;

        debug!(name = %entry.fully_qualified_name, bytes = body.len(), "retrieve");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;
    use crate::store::BundleStore;
    use crate::test_utils::write_sample_store;
    use std::path::Path;

    fn engine_for(root: &Path) -> QueryEngine {
        QueryEngine::new(Arc::new(IndexCell::new(BundleStore::new(root))))
    }

    fn names(results: &SearchResults) -> Vec<&str> {
        results.hits.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_search_matches_and_dedups_by_path() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_store(dir.path(), "v1");
        let engine = engine_for(dir.path());

        // a.Baz shares f1 with a.Foo, which does not match "ba".
        let results = engine.search("ba").unwrap();
        assert_eq!(names(&results), vec!["a.Bar", "a.Baz"]);
        assert_eq!(results.hits[0].kind, DocKind::Interface);
        assert_eq!(results.hits[1].kind, DocKind::Enum);

        // Both a.Foo and a.Baz match "a."; only the first one seen for f1 stays.
        let results = engine.search("A.").unwrap();
        assert_eq!(names(&results), vec!["a.Foo", "a.Bar"]);
    }

    #[test]
    fn test_search_cap() {
        let dir = tempfile::tempdir().unwrap();
        let mut json = String::from("{");
        for i in 0..100 {
            if i > 0 {
                json.push(',');
            }
            json.push_str(&format!(
                r#""pkg.Widget{i}": {{"path": "w{i}.md", "type": "class"}}"#
            ));
        }
        json.push('}');
        fs::write(dir.path().join("class_lookup.json"), json).unwrap();

        let results = engine_for(dir.path()).search("widget").unwrap();
        assert_eq!(results.len(), MAX_SEARCH_RESULTS);
        assert_eq!(results.hits[0].name, "pkg.Widget0");
        assert_eq!(results.hits[24].name, "pkg.Widget24");
    }

    #[test]
    fn test_search_empty_query() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_store(dir.path(), "v1");
        let engine = engine_for(dir.path());

        assert!(matches!(engine.search(""), Err(QueryError::EmptyQuery)));
        assert!(matches!(engine.search("   "), Err(QueryError::EmptyQuery)));
    }

    #[test]
    fn test_search_no_matches_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_store(dir.path(), "v1");

        let results = engine_for(dir.path()).search("zzz").unwrap();
        assert!(results.is_empty());
        assert_eq!(results.to_string(), NO_MATCHES);
    }

    #[test]
    fn test_search_results_display() {
        let results = SearchResults {
            hits: vec![
                SearchHit {
                    name: "a.Bar".to_string(),
                    kind: DocKind::Interface,
                },
                SearchHit {
                    name: "a.Baz".to_string(),
                    kind: DocKind::Enum,
                },
            ],
        };
        assert_eq!(results.to_string(), "a.Bar (interface)\na.Baz (enum)");
    }

    #[test]
    fn test_retrieve_exact_then_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_store(dir.path(), "v1");
        let engine = engine_for(dir.path());

        assert_eq!(engine.retrieve("a.Foo").unwrap(), "Foo docs v1");
        assert_eq!(engine.retrieve("A.FOO").unwrap(), "Foo docs v1");
        assert_eq!(engine.retrieve("  a.Bar\n").unwrap(), "Bar docs v1");
    }

    #[test]
    fn test_retrieve_rereads_body() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_store(dir.path(), "v1");
        let engine = engine_for(dir.path());

        assert_eq!(engine.retrieve("a.Bar").unwrap(), "Bar docs v1");
        fs::write(dir.path().join("f2"), "edited").unwrap();
        assert_eq!(engine.retrieve("a.Bar").unwrap(), "edited");
    }

    #[test]
    fn test_retrieve_errors() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_store(dir.path(), "v1");
        let engine = engine_for(dir.path());

        assert!(matches!(engine.retrieve(" "), Err(QueryError::EmptyName)));
        assert!(matches!(
            engine.retrieve("a.Missing"),
            Err(QueryError::NameNotFound(_))
        ));

        fs::remove_file(dir.path().join("f2")).unwrap();
        assert!(matches!(
            engine.retrieve("a.Bar"),
            Err(QueryError::DocumentBodyMissing { .. })
        ));
    }

    #[test]
    fn test_lookup_entry() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_store(dir.path(), "v1");

        let entry = engine_for(dir.path()).lookup("a.baz").unwrap();
        assert_eq!(entry.fully_qualified_name, "a.Baz");
        assert_eq!(entry.package_name, "a");
    }

    #[test]
    fn test_index_errors_surface_on_every_query() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("class_lookup.json"), "{not json").unwrap();
        let engine = engine_for(dir.path());

        assert!(matches!(
            engine.search("foo"),
            Err(QueryError::Index(IndexError::IndexCorrupt(_)))
        ));
        assert!(matches!(
            engine.retrieve("a.Foo"),
            Err(QueryError::Index(IndexError::IndexCorrupt(_)))
        ));
    }

    #[test]
    fn test_concurrent_queries() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_store(dir.path(), "v1");
        let engine = engine_for(dir.path());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let engine = engine.clone();
                scope.spawn(move || {
                    assert_eq!(engine.search("ba").unwrap().len(), 2);
                    assert_eq!(engine.retrieve("a.foo").unwrap(), "Foo docs v1");
                });
            }
        });
    }
}
