use crate::error::{AddressError, StoreError};
use crate::model::Address;
use crate::store::RecordStore;
use std::path::Path;

/// One shipping address per username.
pub struct AddressBook {
    addresses: RecordStore<Address>,
}

impl AddressBook {
    pub fn open(path: &Path) -> Self {
        AddressBook {
            addresses: RecordStore::open(path),
        }
    }

    pub fn get_address(&self, username: &str) -> Option<&Address> {
        self.addresses
            .find(&username.to_owned())
            .map(|(_, address)| address)
    }

    pub fn save_address(&mut self, address: Address) -> Result<(), AddressError> {
        if !address.is_complete() {
            return Err(AddressError::Incomplete);
        }
        let username = address.username.clone();
        self.addresses
            .insert(address)
            .map(|_| ())
            .ok_or(AddressError::AlreadyOnFile(username))
    }

    pub fn update_address(&mut self, address: Address) -> Result<(), AddressError> {
        if !address.is_complete() {
            return Err(AddressError::Incomplete);
        }
        let (id, _) = self
            .addresses
            .find(&address.username)
            .ok_or_else(|| AddressError::NotOnFile(address.username.clone()))?;
        let username = address.username.clone();
        self.addresses
            .update(id, move |old| *old = address)
            .map_err(|_| AddressError::NotOnFile(username))
    }

    /// Moves the address of `old` to `new`, if there is one.
    pub fn rename(&mut self, old: &str, new: &str) {
        if let Some((id, _)) = self.addresses.find(&old.to_owned()) {
            if let Err(err) = self.addresses.update(id, |address| address.username = new.to_owned()) {
                log::warn!("could not move address of {:?} to {:?}: {}", old, new, err);
            }
        }
    }

    pub fn persist(&self) -> Result<(), StoreError> {
        self.addresses.persist()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempdir::TempDir;

    pub fn address(username: &str, province: &str) -> Address {
        Address {
            username: username.to_owned(),
            street: "1 Main St".to_owned(),
            city: "Calgary".to_owned(),
            province: province.to_owned(),
            postal_code: "T2P 1J9".to_owned(),
        }
    }

    #[test]
    fn save_and_update() {
        let dir = TempDir::new("rentflix").unwrap();
        let path = dir.path().join("addresses.csv");
        let mut book = AddressBook::open(&path);

        assert_eq!(
            book.update_address(address("alice", "AB")),
            Err(AddressError::NotOnFile("alice".to_owned()))
        );
        book.save_address(address("alice", "AB")).unwrap();
        assert_eq!(
            book.save_address(address("alice", "BC")),
            Err(AddressError::AlreadyOnFile("alice".to_owned()))
        );
        book.update_address(address("alice", "BC")).unwrap();

        let reloaded = AddressBook::open(&path);
        assert_eq!(reloaded.get_address("alice").unwrap().province, "BC");
    }

    #[test]
    fn incomplete() {
        let dir = TempDir::new("rentflix").unwrap();
        let mut book = AddressBook::open(&dir.path().join("addresses.csv"));
        let mut missing_city = address("alice", "AB");
        missing_city.city = "  ".to_owned();
        assert_eq!(book.save_address(missing_city), Err(AddressError::Incomplete));
        assert!(book.get_address("alice").is_none());
    }

    #[test]
    fn rename() {
        let dir = TempDir::new("rentflix").unwrap();
        let mut book = AddressBook::open(&dir.path().join("addresses.csv"));
        book.save_address(address("alice", "AB")).unwrap();
        book.rename("alice", "alicia");
        assert!(book.get_address("alice").is_none());
        assert_eq!(book.get_address("alicia").unwrap().username, "alicia");
        book.rename("nobody", "somebody");
        assert!(book.get_address("somebody").is_none());
    }
}
