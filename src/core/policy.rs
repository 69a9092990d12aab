//! Bucket allow-list.

/// Bucket listing limit used when none is configured.
pub const DEFAULT_MAX_BUCKETS: usize = 5;

/// Immutable allow-list plus the bucket listing limit.
///
/// An empty allow-list means every bucket is reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    allowed: Vec<String>,
    max_buckets: usize,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_MAX_BUCKETS)
    }
}

impl AccessPolicy {
    pub fn new(allowed: Vec<String>, max_buckets: usize) -> Self {
        Self { allowed, max_buckets }
    }

    pub fn max_buckets(&self) -> usize {
        self.max_buckets
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    pub fn is_open(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Exact, case-sensitive membership test.
    pub fn is_allowed(&self, bucket: &str) -> bool {
        self.is_open() || self.allowed.iter().any(|b| b == bucket)
    }

    /// Keeps the candidates the policy admits, in their original order, and
    /// truncates the result to `max_count`.
    pub fn list_allowed_buckets<T, F>(&self, candidates: Vec<T>, max_count: usize, name: F) -> Vec<T>
    where
        F: Fn(&T) -> &str,
    {
        if self.is_open() {
            return candidates.into_iter().take(max_count).collect();
        }
        candidates
            .into_iter()
            .filter(|c| self.is_allowed(name(c)))
            .take(max_count)
            .collect()
    }
}
