//! Free text search over the `tema` of stored initiatives.

use crate::{Initiative, InitiativeRepository, StoreError};
use colabora_settings::Settings;

/// Decides whether an initiative's topic matches a query.
///
/// A topic matches when it contains the query as a substring. The empty query
/// matches every topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TopicMatcher {
    /// If false, both sides are lowercased before comparing.
    case_sensitive: bool,
}

impl Default for TopicMatcher {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TopicMatcher {
    /// Create a matcher.
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    /// Create a matcher as configured in `settings.search`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.search.case_sensitive)
    }

    /// Whether `tema` matches `query`.
    pub fn matches(&self, tema: &str, query: &str) -> bool {
        if query.is_empty() {
            true
        } else if self.case_sensitive {
            tema.contains(query)
        } else {
            tema.to_lowercase().contains(&query.to_lowercase())
        }
    }
}

/// Runs topic queries against a repository.
#[derive(Clone, Copy, Debug, Default)]
pub struct TopicSearch {
    /// How topics are compared.
    matcher: TopicMatcher,
}

impl TopicSearch {
    /// Create a search that compares topics with `matcher`.
    pub fn new(matcher: TopicMatcher) -> Self {
        Self { matcher }
    }

    /// Every initiative in `repository` whose topic matches `query`, in the
    /// repository's order.
    ///
    /// # Errors
    /// If the repository fails.
    pub async fn search(
        &self,
        repository: &dyn InitiativeRepository,
        query: &str,
    ) -> Result<Vec<Initiative>, StoreError> {
        let corpus = repository.all().await?;
        Ok(self.filter(corpus, query))
    }

    /// Keep only the initiatives of `corpus` whose topic matches `query`.
    pub fn filter(&self, corpus: Vec<Initiative>, query: &str) -> Vec<Initiative> {
        corpus
            .into_iter()
            .filter(|initiative| self.matcher.matches(&initiative.tema, query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{TopicMatcher, TopicSearch};
    use crate::{Initiative, MemoryRepository};
    use pretty_assertions::assert_eq;

    fn with_tema(numero: i64, tema: &str) -> Initiative {
        Initiative {
            entidad: "entidad1".to_string(),
            legislatura: "legislatura1".to_string(),
            numero,
            tema: tema.to_string(),
            cambios: String::new(),
            documento: String::new(),
        }
    }

    fn store() -> MemoryRepository {
        MemoryRepository::from_initiatives(vec![
            with_tema(1, "tema1"),
            with_tema(2, "Salud pública"),
            with_tema(3, "tema3"),
        ])
        .unwrap()
    }

    fn temas(found: &[Initiative]) -> Vec<&str> {
        found.iter().map(|i| i.tema.as_str()).collect()
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let matcher = TopicMatcher::default();
        assert!(matcher.matches("tema1", ""));
        assert!(matcher.matches("", ""));
    }

    #[test]
    fn test_case_sensitivity() {
        let sensitive = TopicMatcher::new(true);
        let insensitive = TopicMatcher::new(false);

        assert!(sensitive.matches("Salud pública", "Salud"));
        assert!(!sensitive.matches("Salud pública", "salud"));
        assert!(insensitive.matches("Salud pública", "salud"));
        assert!(insensitive.matches("Salud pública", "PÚBLICA"));
    }

    #[tokio::test]
    async fn test_search_substring() {
        let found = TopicSearch::default().search(&store(), "1").await.unwrap();
        assert_eq!(temas(&found), vec!["tema1"]);
    }

    #[tokio::test]
    async fn test_search_empty_returns_corpus() {
        let found = TopicSearch::default().search(&store(), "").await.unwrap();
        assert_eq!(temas(&found), vec!["tema1", "Salud pública", "tema3"]);
    }

    #[tokio::test]
    async fn test_search_without_results() {
        let found = TopicSearch::default().search(&store(), "tema4").await.unwrap();
        assert!(found.is_empty());
    }
}
