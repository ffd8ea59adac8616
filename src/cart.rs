use crate::error::CatalogueError;
use crate::model::{Movie, MovieKey};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartLine {
    pub movie: Movie,
    pub quantity: u32,
}

impl CartLine {
    /// `None` if price times quantity does not fit in a `Decimal`.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.movie.cost.checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: BTreeMap<MovieKey, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` copies, merging with an existing line for the same
    /// movie. The cart is unchanged if the merged quantity would not fit.
    pub fn add(&mut self, movie: Movie, quantity: u32) -> Result<(), CatalogueError> {
        if quantity == 0 {
            return Ok(());
        }
        match self.lines.get_mut(&movie.key()) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| CatalogueError::TooManyCopies(movie.key().to_string()))?;
            }
            None => {
                self.lines.insert(movie.key(), CartLine { movie, quantity });
            }
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &MovieKey) -> Option<CartLine> {
        self.lines.remove(key)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of price times quantity, or `None` on overflow.
    pub fn total(&self) -> Option<Decimal> {
        self.lines()
            .try_fold(Decimal::new(0, 0), |total, line| total.checked_add(line.subtotal()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::tests::movie;

    #[test]
    fn add_merges_lines() {
        let mut cart = Cart::new();
        cart.add(movie("0001", "Pulp Fiction", "Crime", 3, 499), 1).unwrap();
        cart.add(movie("0001", "Pulp Fiction", "Crime", 3, 499), 2).unwrap();
        cart.add(movie("0002", "Heat", "Crime", 3, 299), 0).unwrap();
        let lines: Vec<&CartLine> = cart.lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
    }

    #[test]
    fn merge_past_u32_max() {
        let mut cart = Cart::new();
        cart.add(movie("0001", "Pulp Fiction", "Crime", 3, 499), u32::MAX)
            .unwrap();
        assert_eq!(
            cart.add(movie("0001", "Pulp Fiction", "Crime", 3, 499), 1),
            Err(CatalogueError::TooManyCopies("Pulp Fiction (0001)".to_owned()))
        );
        assert_eq!(cart.lines().next().unwrap().quantity, u32::MAX);
    }

    #[test]
    fn total() {
        let mut cart = Cart::new();
        assert_eq!(cart.total(), Some(Decimal::new(0, 0)));
        cart.add(movie("0001", "Pulp Fiction", "Crime", 3, 499), 2).unwrap();
        cart.add(movie("0002", "Heat", "Crime", 3, 250), 1).unwrap();
        assert_eq!(cart.total(), Some(Decimal::new(1248, 2)));
    }

    #[test]
    fn total_overflow() {
        let mut cart = Cart::new();
        let mut expensive = movie("0001", "Pulp Fiction", "Crime", 3, 0);
        expensive.cost = Decimal::MAX;
        cart.add(expensive, 2).unwrap();
        assert_eq!(cart.total(), None);
    }

    #[test]
    fn remove_and_clear() {
        let mut cart = Cart::new();
        cart.add(movie("0001", "Pulp Fiction", "Crime", 3, 499), 2).unwrap();
        cart.add(movie("0002", "Heat", "Crime", 3, 250), 1).unwrap();
        // lookup only needs the identity pair
        let removed = cart.remove(&MovieKey::new("0001", "Pulp Fiction")).unwrap();
        assert_eq!(removed.quantity, 2);
        assert!(cart.remove(&MovieKey::new("0001", "Pulp Fiction")).is_none());
        cart.clear();
        assert!(cart.is_empty());
    }
}
