/// Flat (exhaustive) vector index for exact nearest-neighbor search
use ndarray::{Array2, ArrayView1, Axis};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VectorIndexError {
    #[error("Index has no rows; ingest documents first")]
    Empty,

    #[error("Ragged embedding matrix: row {row} has dimension {actual}, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Malformed embedding matrix: {0}")]
    Shape(String),

    #[error("Embedding vectors must have at least one dimension")]
    ZeroDimension,

    #[error("Invalid dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },
}

/// Search hit: row position in the index and its distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    /// Row index (aligned with the corpus position)
    pub row: usize,
    /// Squared Euclidean distance (lower is closer)
    pub distance: f32,
}

/// Exact nearest-neighbor index over a dense row-major matrix
///
/// Every query is compared against every stored vector using squared
/// Euclidean distance. Corpus sizes are bounded by a single ingestion
/// batch, so no approximation is needed.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    vectors: Array2<f32>,
}

impl VectorIndex {
    /// Build a new index from rows that must all share one dimension
    pub fn build(rows: &[Vec<f32>]) -> Result<Self, VectorIndexError> {
        let Some(first) = rows.first() else {
            return Ok(Self {
                vectors: Array2::zeros((0, 0)),
            });
        };

        let dimension = first.len();
        if dimension == 0 {
            return Err(VectorIndexError::ZeroDimension);
        }

        let mut flat = Vec::with_capacity(rows.len() * dimension);
        for (row, vector) in rows.iter().enumerate() {
            if vector.len() != dimension {
                return Err(VectorIndexError::RaggedRows {
                    row,
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            flat.extend_from_slice(vector);
        }

        let vectors = Array2::from_shape_vec((rows.len(), dimension), flat)
            .map_err(|e| VectorIndexError::Shape(e.to_string()))?;

        Ok(Self { vectors })
    }

    /// Discard the current contents and index `rows` instead
    ///
    /// On error the existing contents are left untouched.
    pub fn rebuild(&mut self, rows: &[Vec<f32>]) -> Result<(), VectorIndexError> {
        *self = Self::build(rows)?;
        Ok(())
    }

    /// Return the `k` nearest rows sorted by ascending distance
    ///
    /// Ties keep their original row order. Asking for more rows than exist
    /// returns every row.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>, VectorIndexError> {
        if self.is_empty() {
            return Err(VectorIndexError::Empty);
        }
        if query.len() != self.dimension() {
            return Err(VectorIndexError::InvalidDimension {
                expected: self.dimension(),
                actual: query.len(),
            });
        }

        let query = ArrayView1::from(query);
        let mut results: Vec<SearchResult> = self
            .vectors
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(row, vector)| {
                let diff = &vector - &query;
                SearchResult {
                    row,
                    distance: diff.dot(&diff),
                }
            })
            .collect();

        // sort_by is stable, so equal distances stay in row order
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(k.min(self.len()));

        Ok(results)
    }

    /// Number of indexed rows
    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimension (0 for an empty index)
    pub fn dimension(&self) -> usize {
        self.vectors.ncols()
    }
}

impl Default for VectorIndex {
    fn default() -> Self {
        Self {
            vectors: Array2::zeros((0, 0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(dim: usize, axis: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[axis] = 1.0;
        v
    }

    #[test]
    fn test_index_creation() {
        let index = VectorIndex::build(&[unit(4, 0), unit(4, 1)]).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.dimension(), 4);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_search_ordering() {
        let rows = vec![unit(3, 0), unit(3, 1), vec![0.9, 0.1, 0.0]];
        let index = VectorIndex::build(&rows).unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 3).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].row, 0);
        assert_eq!(results[0].distance, 0.0);
        assert_eq!(results[1].row, 2);
        assert_eq!(results[2].row, 1);

        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_squared_euclidean() {
        let index = VectorIndex::build(&[vec![3.0, 4.0]]).unwrap();
        let results = index.search(&[0.0, 0.0], 1).unwrap();
        assert!((results[0].distance - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_k_larger_than_rows() {
        let index = VectorIndex::build(&[unit(2, 0), unit(2, 1)]).unwrap();
        let results = index.search(&[1.0, 1.0], 10).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_ties_keep_row_order() {
        let index = VectorIndex::build(&[unit(2, 0), unit(2, 1), unit(2, 0)]).unwrap();
        let results = index.search(&[0.5, 0.5], 3).unwrap();
        let rows: Vec<usize> = results.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_index_not_searchable() {
        let index = VectorIndex::build(&[]).unwrap();
        assert!(index.is_empty());
        assert!(matches!(
            index.search(&[1.0], 1),
            Err(VectorIndexError::Empty)
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = VectorIndex::build(&[vec![1.0, 2.0], vec![1.0]]);
        assert!(matches!(
            result,
            Err(VectorIndexError::RaggedRows {
                row: 1,
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_dimension_validation() {
        let index = VectorIndex::build(&[unit(4, 0)]).unwrap();
        assert!(index.search(&[1.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_failed_rebuild_keeps_old_rows() {
        let mut index = VectorIndex::build(&[unit(2, 0)]).unwrap();
        assert!(index.rebuild(&[vec![1.0], vec![1.0, 2.0]]).is_err());
        assert_eq!(index.len(), 1);

        index.rebuild(&[unit(3, 0), unit(3, 1), unit(3, 2)]).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.dimension(), 3);
    }
}
