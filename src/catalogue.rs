use crate::error::{CatalogueError, StoreError};
use crate::model::{Movie, MovieKey};
use crate::store::{RecordId, RecordStore};
use std::path::Path;

pub struct Catalogue {
    movies: RecordStore<Movie>,
}

impl Catalogue {
    pub fn open(path: &Path) -> Self {
        Catalogue {
            movies: RecordStore::open(path),
        }
    }

    pub fn add_movie(&mut self, movie: Movie) -> Result<RecordId, CatalogueError> {
        if movie.barcode.is_empty() {
            return Err(CatalogueError::EmptyBarcode);
        }
        if movie.title.is_empty() {
            return Err(CatalogueError::EmptyTitle);
        }
        let key = movie.key();
        self.movies
            .insert(movie)
            .ok_or_else(|| CatalogueError::Duplicate(key.to_string()))
    }

    pub fn get_movie(&self, key: &MovieKey) -> Option<&Movie> {
        self.movies.find(key).map(|(_, movie)| movie)
    }

    /// Turns a barcode, and optionally a title, into a movie key. A bare
    /// barcode must match exactly one movie.
    pub fn resolve(&self, barcode: &str, title: Option<&str>) -> Result<MovieKey, CatalogueError> {
        if let Some(title) = title {
            let key = MovieKey::new(barcode, title);
            return if self.movies.contains_key(&key) {
                Ok(key)
            } else {
                Err(CatalogueError::UnknownMovie(key.to_string()))
            };
        }
        let mut matches = self.movies().filter(|movie| movie.barcode == barcode);
        match (matches.next(), matches.next()) {
            (Some(movie), None) => Ok(movie.key()),
            (Some(_), Some(_)) => Err(CatalogueError::Ambiguous(barcode.to_owned())),
            (None, _) => Err(CatalogueError::UnknownBarcode(barcode.to_owned())),
        }
    }

    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.iter().map(|(_, movie)| movie)
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Movies whose title or genre contains `query`, ignoring case.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Movie> {
        let query = query.to_lowercase();
        self.movies().filter(move |movie| {
            movie.title.to_lowercase().contains(&query)
                || movie.genre.to_lowercase().contains(&query)
        })
    }

    pub fn set_quantity(&mut self, key: &MovieKey, quantity: u32) -> Result<(), CatalogueError> {
        let (id, _) = self
            .movies
            .find(key)
            .ok_or_else(|| CatalogueError::UnknownMovie(key.to_string()))?;
        self.movies
            .update(id, |movie| movie.quantity = quantity)
            .map_err(|_| CatalogueError::UnknownMovie(key.to_string()))
    }

    /// Checks that `quantity` copies are in stock without taking them.
    pub fn check_stock(&self, key: &MovieKey, quantity: u32) -> Result<(), CatalogueError> {
        let movie = self
            .get_movie(key)
            .ok_or_else(|| CatalogueError::UnknownMovie(key.to_string()))?;
        if movie.quantity < quantity {
            return Err(CatalogueError::OutOfStock {
                title: movie.title.clone(),
                available: movie.quantity,
            });
        }
        Ok(())
    }

    pub fn take_stock(&mut self, key: &MovieKey, quantity: u32) -> Result<(), CatalogueError> {
        self.check_stock(key, quantity)?;
        let remaining = self.get_movie(key).map_or(0, |movie| movie.quantity - quantity);
        self.set_quantity(key, remaining)
    }

    pub fn remove_movie(&mut self, key: &MovieKey) -> Option<Movie> {
        let (id, _) = self.movies.find(key)?;
        self.movies.remove(id)
    }

    pub fn persist(&self) -> Result<(), StoreError> {
        self.movies.persist()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempdir::TempDir;

    pub fn movie(barcode: &str, title: &str, genre: &str, quantity: u32, cents: i64) -> Movie {
        Movie {
            barcode: barcode.to_owned(),
            title: title.to_owned(),
            genre: genre.to_owned(),
            release_date: "1994-10-14".to_owned(),
            quantity,
            cost: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn add_and_get() {
        let dir = TempDir::new("rentflix").unwrap();
        let mut catalogue = Catalogue::open(&dir.path().join("movies.csv"));
        catalogue
            .add_movie(movie("0001", "Pulp Fiction", "Crime", 3, 499))
            .unwrap();
        assert_eq!(
            catalogue.add_movie(movie("0001", "Pulp Fiction", "Drama", 1, 100)),
            Err(CatalogueError::Duplicate("Pulp Fiction (0001)".to_owned()))
        );
        // same barcode, other title is a different product
        catalogue
            .add_movie(movie("0001", "Jackie Brown", "Crime", 1, 399))
            .unwrap();
        assert_eq!(
            catalogue.add_movie(movie("", "Heat", "Crime", 1, 399)),
            Err(CatalogueError::EmptyBarcode)
        );
        assert_eq!(
            catalogue.add_movie(movie("0002", "", "Crime", 1, 399)),
            Err(CatalogueError::EmptyTitle)
        );
        let found = catalogue
            .get_movie(&MovieKey::new("0001", "Pulp Fiction"))
            .unwrap();
        assert_eq!(found.genre, "Crime");
        assert_eq!(catalogue.movies().count(), 2);
    }

    #[test]
    fn search() {
        let dir = TempDir::new("rentflix").unwrap();
        let mut catalogue = Catalogue::open(&dir.path().join("movies.csv"));
        catalogue
            .add_movie(movie("0001", "Pulp Fiction", "Crime", 3, 499))
            .unwrap();
        catalogue
            .add_movie(movie("0002", "Alien", "Science Fiction", 2, 299))
            .unwrap();
        catalogue
            .add_movie(movie("0003", "Heat", "Crime", 2, 299))
            .unwrap();
        let titles: Vec<&str> = catalogue.search("FICTION").map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Pulp Fiction", "Alien"]);
        assert_eq!(catalogue.search("crime").count(), 2);
    }

    #[test]
    fn resolve_shared_barcode() {
        let dir = TempDir::new("rentflix").unwrap();
        let mut catalogue = Catalogue::open(&dir.path().join("movies.csv"));
        assert!(catalogue.is_empty());
        catalogue
            .add_movie(movie("0001", "Pulp Fiction", "Crime", 3, 499))
            .unwrap();
        catalogue
            .add_movie(movie("0001", "Jackie Brown", "Crime", 1, 399))
            .unwrap();
        catalogue
            .add_movie(movie("0003", "Heat", "Crime", 2, 299))
            .unwrap();

        assert_eq!(catalogue.resolve("0003", None), Ok(MovieKey::new("0003", "Heat")));
        assert_eq!(
            catalogue.resolve("0001", None),
            Err(CatalogueError::Ambiguous("0001".to_owned()))
        );
        assert_eq!(
            catalogue.resolve("0001", Some("Jackie Brown")),
            Ok(MovieKey::new("0001", "Jackie Brown"))
        );
        assert_eq!(
            catalogue.resolve("0001", Some("Heat")),
            Err(CatalogueError::UnknownMovie("Heat (0001)".to_owned()))
        );
        assert_eq!(
            catalogue.resolve("0009", None),
            Err(CatalogueError::UnknownBarcode("0009".to_owned()))
        );
    }

    #[test]
    fn stock() {
        let dir = TempDir::new("rentflix").unwrap();
        let path = dir.path().join("movies.csv");
        let mut catalogue = Catalogue::open(&path);
        catalogue
            .add_movie(movie("0001", "Pulp Fiction", "Crime", 3, 499))
            .unwrap();
        let key = MovieKey::new("0001", "Pulp Fiction");
        catalogue.take_stock(&key, 2).unwrap();
        assert_eq!(
            catalogue.take_stock(&key, 2),
            Err(CatalogueError::OutOfStock {
                title: "Pulp Fiction".to_owned(),
                available: 1
            })
        );
        assert_eq!(
            catalogue.take_stock(&MovieKey::new("0009", "Heat"), 1),
            Err(CatalogueError::UnknownMovie("Heat (0009)".to_owned()))
        );

        let reloaded = Catalogue::open(&path);
        let movie = reloaded.get_movie(&key).unwrap();
        assert_eq!(movie.quantity, 1);
        assert_eq!(movie.cost, Decimal::new(499, 2));
    }

    #[test]
    fn remove() {
        let dir = TempDir::new("rentflix").unwrap();
        let mut catalogue = Catalogue::open(&dir.path().join("movies.csv"));
        catalogue
            .add_movie(movie("0001", "Pulp Fiction", "Crime", 3, 499))
            .unwrap();
        let key = MovieKey::new("0001", "Pulp Fiction");
        assert!(catalogue.remove_movie(&key).is_some());
        assert!(catalogue.get_movie(&key).is_none());
    }
}
