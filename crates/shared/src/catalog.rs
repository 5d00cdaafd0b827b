//! Catalog filtering.
//!
//! [`filter_courses`] is the free-text filter behind the search box: a course
//! is kept when the query is a case-insensitive substring of its title or of
//! any of its tags. The result is always an order-preserving subsequence of
//! the input. [`CatalogView`] memoizes that result per (query, course list).

use std::sync::Arc;

use crate::domain::{Course, Level};

/// Returns true when `course` matches an already lowercased, non-empty query.
fn matches_lowercase(course: &Course, needle: &str) -> bool {
    course.title.to_lowercase().contains(needle)
        || course
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

pub fn matches_query(course: &Course, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    matches_lowercase(course, &query.to_lowercase())
}

pub fn filter_courses<'a>(courses: &'a [Course], query: &str) -> Vec<&'a Course> {
    if query.is_empty() {
        return courses.iter().collect();
    }
    let needle = query.to_lowercase();
    courses
        .iter()
        .filter(|course| matches_lowercase(course, &needle))
        .collect()
}

/// Optional selectors applied on top of the text filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFacets {
    pub level: Option<Level>,
    /// Exact tag, compared case-insensitively.
    pub topic: Option<String>,
}

impl CatalogFacets {
    pub fn is_empty(&self) -> bool {
        self.level.is_none() && self.topic.is_none()
    }

    pub fn accepts(&self, course: &Course) -> bool {
        if let Some(level) = self.level {
            if course.level != level {
                return false;
            }
        }
        if let Some(topic) = &self.topic {
            let topic = topic.to_lowercase();
            if !course.tags.iter().any(|tag| tag.to_lowercase() == topic) {
                return false;
            }
        }
        true
    }
}

/// Rounded mean of course progress, 0 for an empty list.
pub fn average_progress(courses: &[Course]) -> u8 {
    if courses.is_empty() {
        return 0;
    }
    let total: u32 = courses.iter().map(|c| u32::from(c.progress_percent)).sum();
    let len = courses.len() as f64;
    (f64::from(total) / len).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone)]
struct CachedFilter {
    query: String,
    facets: CatalogFacets,
    source: Arc<Vec<Course>>,
    indices: Vec<usize>,
}

/// Memoized view over a shared course list.
///
/// The cached selection is reused while both the query and the list (by
/// `Arc` identity) stay the same; any change recomputes it.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    cache: Option<CachedFilter>,
    recomputations: u64,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filtered<'a>(
        &mut self,
        courses: &'a Arc<Vec<Course>>,
        query: &str,
        facets: &CatalogFacets,
    ) -> Vec<&'a Course> {
        let fresh = match &self.cache {
            Some(cached) => {
                cached.query == query
                    && &cached.facets == facets
                    && Arc::ptr_eq(&cached.source, courses)
            }
            None => false,
        };

        if !fresh {
            let needle = query.to_lowercase();
            let indices = courses
                .iter()
                .enumerate()
                .filter(|(_, course)| query.is_empty() || matches_lowercase(course, &needle))
                .filter(|(_, course)| facets.accepts(course))
                .map(|(index, _)| index)
                .collect();
            self.cache = Some(CachedFilter {
                query: query.to_string(),
                facets: facets.clone(),
                source: Arc::clone(courses),
                indices,
            });
            self.recomputations += 1;
        }

        match &self.cache {
            Some(cached) => cached
                .indices
                .iter()
                .filter_map(|&index| courses.get(index))
                .collect(),
            None => Vec::new(),
        }
    }

    /// How many times the selection was recomputed.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
