use hashbrown::HashMap;
use hashbrown::HashSet;

use crate::error::{CfError, Result};

pub type UserId = String;
pub type ItemId = String;
pub type Rating = f64;

/// Inclusive range of accepted rating values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingBounds {
    pub min: Rating,
    pub max: Rating,
}

impl Default for RatingBounds {
    fn default() -> Self {
        RatingBounds { min: 0.0, max: 5.0 }
    }
}

impl RatingBounds {
    pub fn new(min: Rating, max: Rating) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(CfError::InvalidMatrix(format!(
                "rating bounds [{}, {}] are not a valid range",
                min, max
            )));
        }
        Ok(RatingBounds { min, max })
    }

    pub fn contains(&self, rating: Rating) -> bool {
        rating >= self.min && rating <= self.max
    }
}

/// Dense user x item table of optional ratings.
///
/// Every user carries a cell for every item, `None` meaning "not rated". The
/// user and item orderings are fixed at construction and shared by every
/// structure derived from the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatrix {
    users: Vec<UserId>,
    items: Vec<ItemId>,
    user_to_index: HashMap<UserId, usize>,
    item_to_index: HashMap<ItemId, usize>,
    rows: Vec<Vec<Option<Rating>>>,
    bounds: RatingBounds,
}

impl RatingMatrix {
    /// Builds a matrix from one row per user, each row holding one cell per item.
    pub fn new(
        users: Vec<UserId>,
        items: Vec<ItemId>,
        rows: Vec<Vec<Option<Rating>>>,
        bounds: RatingBounds,
    ) -> Result<Self> {
        let user_to_index = index_unique("user", &users)?;
        let item_to_index = index_unique("item", &items)?;

        if rows.len() != users.len() {
            return Err(CfError::InvalidMatrix(format!(
                "{} users but {} rating rows",
                users.len(),
                rows.len()
            )));
        }

        for (user, row) in users.iter().zip(rows.iter()) {
            if row.len() != items.len() {
                return Err(CfError::InvalidMatrix(format!(
                    "user '{}' has {} ratings, expected one per item ({})",
                    user,
                    row.len(),
                    items.len()
                )));
            }
            for (item, rating) in items.iter().zip(row.iter()) {
                if let Some(rating) = rating {
                    if !rating.is_finite() || !bounds.contains(*rating) {
                        return Err(CfError::InvalidMatrix(format!(
                            "rating {} of user '{}' for item '{}' outside [{}, {}]",
                            rating, user, item, bounds.min, bounds.max
                        )));
                    }
                }
            }
        }

        Ok(RatingMatrix {
            users,
            items,
            user_to_index,
            item_to_index,
            rows,
            bounds,
        })
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn bounds(&self) -> RatingBounds {
        self.bounds
    }

    pub fn qty_users(&self) -> usize {
        self.users.len()
    }

    pub fn qty_items(&self) -> usize {
        self.items.len()
    }

    pub fn qty_observed(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|rating| rating.is_some()).count())
            .sum()
    }

    pub fn user_index(&self, user: &str) -> Result<usize> {
        self.user_to_index
            .get(user)
            .copied()
            .ok_or_else(|| CfError::unknown_user(user))
    }

    pub fn item_index(&self, item: &str) -> Result<usize> {
        self.item_to_index
            .get(item)
            .copied()
            .ok_or_else(|| CfError::unknown_item(item))
    }

    pub fn rating(&self, user_idx: usize, item_idx: usize) -> Option<Rating> {
        self.rows[user_idx][item_idx]
    }

    pub fn user_row(&self, user_idx: usize) -> &[Option<Rating>] {
        &self.rows[user_idx]
    }

    /// Ratings of one item by every user, in user order.
    pub fn item_vector(&self, item_idx: usize) -> Vec<Option<Rating>> {
        self.rows.iter().map(|row| row[item_idx]).collect()
    }

    /// Copy of this matrix with the given `(user_idx, item_idx)` cells removed.
    pub fn with_masked(&self, cells: &[(usize, usize)]) -> Self {
        let mut masked = self.clone();
        for &(user_idx, item_idx) in cells {
            masked.rows[user_idx][item_idx] = None;
        }
        masked
    }
}

fn index_unique(kind: &str, ids: &[String]) -> Result<HashMap<String, usize>> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(CfError::InvalidMatrix(format!("duplicate {} id '{}'", kind, id)));
        }
    }
    Ok(ids
        .iter()
        .enumerate()
        .map(|(index, id)| (id.clone(), index))
        .collect())
}

#[cfg(test)]
mod rating_matrix_test {
    use super::*;

    fn ids(prefix: &str, qty: usize) -> Vec<String> {
        (1..=qty).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn should_build_and_lookup() {
        let matrix = RatingMatrix::new(
            ids("U", 2),
            ids("M", 2),
            vec![vec![Some(5.0), None], vec![Some(0.0), Some(3.5)]],
            RatingBounds::default(),
        )
        .unwrap();

        assert_eq!(2, matrix.qty_users());
        assert_eq!(2, matrix.qty_items());
        assert_eq!(3, matrix.qty_observed());
        assert_eq!(1, matrix.user_index("U2").unwrap());
        assert_eq!(None, matrix.rating(0, 1));
        // zero is a rating, not a missing value
        assert_eq!(Some(0.0), matrix.rating(1, 0));
        assert_eq!(vec![None, Some(3.5)], matrix.item_vector(1));
    }

    #[test]
    fn should_reject_duplicate_ids() {
        let result = RatingMatrix::new(
            vec!["U1".to_string(), "U1".to_string()],
            ids("M", 1),
            vec![vec![None], vec![None]],
            RatingBounds::default(),
        );
        assert!(matches!(result, Err(CfError::InvalidMatrix(_))));
    }

    #[test]
    fn should_reject_ragged_rows() {
        let result = RatingMatrix::new(
            ids("U", 2),
            ids("M", 2),
            vec![vec![Some(1.0), None], vec![Some(1.0)]],
            RatingBounds::default(),
        );
        assert!(matches!(result, Err(CfError::InvalidMatrix(_))));
    }

    #[test]
    fn should_reject_out_of_bounds_and_nan() {
        let out_of_bounds = RatingMatrix::new(
            ids("U", 1),
            ids("M", 1),
            vec![vec![Some(6.0)]],
            RatingBounds::default(),
        );
        assert!(matches!(out_of_bounds, Err(CfError::InvalidMatrix(_))));

        let nan = RatingMatrix::new(
            ids("U", 1),
            ids("M", 1),
            vec![vec![Some(f64::NAN)]],
            RatingBounds::default(),
        );
        assert!(matches!(nan, Err(CfError::InvalidMatrix(_))));
    }

    #[test]
    fn should_report_unknown_ids() {
        let matrix =
            RatingMatrix::new(ids("U", 1), ids("M", 1), vec![vec![None]], RatingBounds::default())
                .unwrap();
        assert!(matches!(matrix.item_index("M9"), Err(CfError::NotFound { .. })));
        assert!(matches!(matrix.user_index("U9"), Err(CfError::NotFound { .. })));
    }

    #[test]
    fn should_mask_cells_without_touching_original() {
        let matrix = RatingMatrix::new(
            ids("U", 1),
            ids("M", 2),
            vec![vec![Some(4.0), Some(2.0)]],
            RatingBounds::default(),
        )
        .unwrap();
        let masked = matrix.with_masked(&[(0, 1)]);
        assert_eq!(None, masked.rating(0, 1));
        assert_eq!(Some(2.0), matrix.rating(0, 1));
    }

    #[test]
    fn should_validate_bounds() {
        assert!(RatingBounds::new(1.0, 10.0).is_ok());
        assert!(RatingBounds::new(5.0, 1.0).is_err());
    }
}
