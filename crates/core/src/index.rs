//! Ephemeral in-memory similarity index.
//!
//! A [`FlatIndex`] stores one request's candidate vectors contiguously and
//! answers exact k-nearest-neighbor queries by exhaustive squared-L2 scan.
//! [`IssueIndex`] pairs the vectors with their candidates so a search result
//! position can never drift from the candidate it was built from.

use crate::error::MatchError;
use crate::models::Candidate;
use tracing::warn;

pub struct FlatIndex {
    dim: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Store `vectors` contiguously. All vectors must share one dimension.
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self, MatchError> {
        let dim = vectors.first().map(Vec::len).unwrap_or(0);
        if !vectors.is_empty() && dim == 0 {
            return Err(MatchError::Index("vectors have zero dimension".into()));
        }
        let mut data = Vec::with_capacity(vectors.len() * dim);
        for (i, v) in vectors.iter().enumerate() {
            if v.len() != dim {
                return Err(MatchError::Index(format!(
                    "vector {i} has dimension {}, index expects {dim}",
                    v.len()
                )));
            }
            data.extend_from_slice(v);
        }
        Ok(Self { dim, data })
    }

    pub fn ntotal(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    /// The `k` stored vectors closest to `query` as `(position, distance)`,
    /// ascending by squared-L2 distance, ties broken by insertion order. If
    /// `k` exceeds the stored count, every vector is returned.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, MatchError> {
        if self.ntotal() == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dim {
            return Err(MatchError::Index(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dim
            )));
        }
        let mut hits: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(pos, stored)| {
                let dist = stored
                    .iter()
                    .zip(query)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (pos, dist)
            })
            .collect();
        // Stable sort keeps insertion order among equal distances.
        hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }
}

/// A [`FlatIndex`] plus the owned position → candidate mapping, built
/// atomically so positions cannot drift from the embedding batch.
pub struct IssueIndex {
    index: FlatIndex,
    candidates: Vec<Candidate>,
}

impl IssueIndex {
    pub fn build(candidates: Vec<Candidate>, vectors: &[Vec<f32>]) -> Result<Self, MatchError> {
        if candidates.len() != vectors.len() {
            return Err(MatchError::Index(format!(
                "{} candidates but {} vectors",
                candidates.len(),
                vectors.len()
            )));
        }
        Ok(Self {
            index: FlatIndex::build(vectors)?,
            candidates,
        })
    }

    pub fn ntotal(&self) -> usize {
        self.index.ntotal()
    }

    /// Search and resolve positions to candidates. A position outside the
    /// candidate range is skipped rather than dereferenced.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(&Candidate, f32)>, MatchError> {
        let hits = self.index.search(query, k)?;
        let mut out = Vec::with_capacity(hits.len());
        for (pos, dist) in hits {
            match self.candidates.get(pos) {
                Some(candidate) => out.push((candidate, dist)),
                None => warn!(position = pos, "search returned invalid position, skipping"),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_candidate(url: &str) -> Candidate {
        Candidate {
            url: url.to_string(),
            id: None,
            title: None,
            body: None,
            created_at: None,
            author: None,
            labels: Vec::new(),
            repository_url: None,
        }
    }

    #[test]
    fn search_finds_exact_match_at_distance_zero() {
        let vectors = vec![
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0],
            vec![0.5, 0.5, 0.0],
        ];
        let index = FlatIndex::build(&vectors).unwrap();
        assert_eq!(index.ntotal(), 3);

        let hits = index.search(&vectors[1], 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 1);
        assert!(hits[0].1.abs() < 1e-6);
    }

    #[test]
    fn search_orders_by_ascending_distance() {
        let vectors = vec![
            vec![0.0, 1.0], // orthogonal to query
            vec![1.0, 0.0], // identical to query
            vec![0.5, 0.5], // in between
        ];
        let index = FlatIndex::build(&vectors).unwrap();
        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.0).collect();
        assert_eq!(positions, vec![1, 2, 0]);
    }

    #[test]
    fn equal_distances_break_ties_by_insertion_order() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]];
        let index = FlatIndex::build(&vectors).unwrap();
        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 2);
    }

    #[test]
    fn k_larger_than_count_returns_all() {
        let vectors = vec![vec![1.0], vec![2.0]];
        let index = FlatIndex::build(&vectors).unwrap();
        let hits = index.search(&[0.0], 100).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn empty_index_returns_no_hits() {
        let index = FlatIndex::build(&[]).unwrap();
        assert_eq!(index.ntotal(), 0);
        assert!(index.search(&[1.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn build_rejects_mixed_dimensions() {
        let vectors = vec![vec![1.0, 0.0], vec![1.0]];
        assert!(FlatIndex::build(&vectors).is_err());
    }

    #[test]
    fn search_rejects_query_dimension_mismatch() {
        let index = FlatIndex::build(&[vec![1.0, 0.0]]).unwrap();
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[test]
    fn issue_index_resolves_positions_to_candidates() {
        let candidates = vec![make_candidate("a"), make_candidate("b")];
        let vectors = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let index = IssueIndex::build(candidates, &vectors).unwrap();

        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].0.url, "b");
        assert_eq!(hits[1].0.url, "a");
    }

    #[test]
    fn issue_index_rejects_count_mismatch() {
        let candidates = vec![make_candidate("a")];
        let vectors = vec![vec![1.0], vec![2.0]];
        assert!(IssueIndex::build(candidates, &vectors).is_err());
    }
}
