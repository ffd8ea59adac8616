use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username {0:?} is already taken")]
    UsernameTaken(String),
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("no user with id {0}")]
    UnknownUser(u64),
}

/// Why a login attempt failed. Callers outside the shop only see a
/// collapsed "no match".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("unknown user")]
    UnknownUser,
    #[error("wrong password")]
    WrongPassword,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid address information")]
    Incomplete,
    #[error("an address is already on file for {0:?}")]
    AlreadyOnFile(String),
    #[error("no address on file for {0:?}")]
    NotOnFile(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("barcode must not be empty")]
    EmptyBarcode,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("movie {0} is already in the catalogue")]
    Duplicate(String),
    #[error("movie {0} is not in the catalogue")]
    UnknownMovie(String),
    #[error("no movie with barcode {0}")]
    UnknownBarcode(String),
    #[error("barcode {0} is shared by several titles, order it as BARCODE:TITLE")]
    Ambiguous(String),
    #[error("too many copies of {0} in the cart")]
    TooManyCopies(String),
    #[error("only {available} of {title:?} left in stock")]
    OutOfStock { title: String, available: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("no items in the cart")]
    EmptyCart,
    #[error("no address on file, please update your address in account details")]
    NoAddress,
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
    #[error("payment of {0} not accepted")]
    PaymentDeclined(Decimal),
    #[error("order total is too large")]
    TotalOverflow,
}
