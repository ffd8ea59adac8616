use crate::store::Record;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Account type of a user. Values written by other tools that are not one of
/// the known types are kept as they were read.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AccountType {
    Customer,
    Employee,
    Admin,
    Other(String),
}

impl AccountType {
    pub fn is_staff(&self) -> bool {
        matches!(self, AccountType::Employee | AccountType::Admin)
    }

    pub fn as_str(&self) -> &str {
        match self {
            AccountType::Customer => "customer",
            AccountType::Employee => "employee",
            AccountType::Admin => "admin",
            AccountType::Other(other) => other,
        }
    }

    /// Parses a stored value, ignoring case for the known types.
    pub fn from_stored(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("customer") {
            AccountType::Customer
        } else if trimmed.eq_ignore_ascii_case("employee") {
            AccountType::Employee
        } else if trimmed.eq_ignore_ascii_case("admin") {
            AccountType::Admin
        } else {
            AccountType::Other(value.to_owned())
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only the known types are accepted for new accounts.
impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match AccountType::from_stored(s) {
            AccountType::Other(other) => Err(format!("unknown account type: {}", other)),
            known => Ok(known),
        }
    }
}

impl Serialize for AccountType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AccountType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(AccountType::from_stored(&value))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub username: String,
    pub password: String,
    pub account: AccountType,
}

impl User {
    pub fn new(username: &str, email: &str, password: &str, account: AccountType) -> Self {
        User {
            email: email.to_owned(),
            username: username.to_owned(),
            password: password.to_owned(),
            account,
        }
    }
}

impl Record for User {
    type Key = String;
    const HEADER: &'static [&'static str] = &["email", "username", "password", "account"];

    fn key(&self) -> String {
        self.username.clone()
    }
}

/// Identity of a movie. Two movies are the same product when barcode and
/// title both match.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MovieKey {
    pub barcode: String,
    pub title: String,
}

impl MovieKey {
    pub fn new(barcode: &str, title: &str) -> Self {
        MovieKey {
            barcode: barcode.to_owned(),
            title: title.to_owned(),
        }
    }
}

impl fmt::Display for MovieKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.barcode)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Movie {
    pub barcode: String,
    pub title: String,
    pub genre: String,
    pub release_date: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub cost: Decimal,
}

impl Movie {
    pub fn key(&self) -> MovieKey {
        MovieKey::new(&self.barcode, &self.title)
    }
}

impl PartialEq for Movie {
    fn eq(&self, other: &Self) -> bool {
        self.barcode == other.barcode && self.title == other.title
    }
}

impl Eq for Movie {}

impl Record for Movie {
    type Key = MovieKey;
    const HEADER: &'static [&'static str] =
        &["barcode", "title", "genre", "releasedate", "quantity", "cost"];

    fn key(&self) -> MovieKey {
        Movie::key(self)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub username: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
}

impl Address {
    pub fn is_complete(&self) -> bool {
        [
            &self.username,
            &self.street,
            &self.city,
            &self.province,
            &self.postal_code,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

impl Record for Address {
    type Key = String;
    const HEADER: &'static [&'static str] =
        &["username", "street", "city", "province", "postalcode"];

    fn key(&self) -> String {
        self.username.clone()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PointsBalance {
    pub username: String,
    pub points: u32,
}

impl Record for PointsBalance {
    type Key = String;
    const HEADER: &'static [&'static str] = &["username", "points"];

    fn key(&self) -> String {
        self.username.clone()
    }
}

/// One movie of a placed order. An order is every line sharing its id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OrderLine {
    pub order: u64,
    pub username: String,
    pub barcode: String,
    pub title: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub cost: Decimal,
    pub payment: String,
    pub warehouse: String,
}

impl Record for OrderLine {
    type Key = (u64, MovieKey);
    const HEADER: &'static [&'static str] = &[
        "order", "username", "barcode", "title", "quantity", "cost", "payment", "warehouse",
    ];

    fn key(&self) -> (u64, MovieKey) {
        (self.order, MovieKey::new(&self.barcode, &self.title))
    }
}
