use crate::address::AddressBook;
use crate::cart::{Cart, CartLine};
use crate::catalogue::Catalogue;
use crate::config::Config;
use crate::database::UserRepository;
use crate::error::{AccountError, AddressError, CatalogueError, CheckoutError, StoreError};
use crate::loyalty::{points_earned, LoyaltyLedger};
use crate::model::{Address, MovieKey, User};
use crate::order::{Order, OrderService};
use crate::payment::{CreditCard, LoyaltyPoints, PaymentMethod};
use crate::store::RecordId;
use log::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum PaymentChoice {
    LoyaltyPoints,
    CreditCard,
}

/// A logged-in user and their cart.
#[derive(Debug)]
pub struct Session {
    user_id: RecordId,
    pub cart: Cart,
}

pub struct Shop {
    pub users: UserRepository,
    pub catalogue: Catalogue,
    pub addresses: AddressBook,
    pub loyalty: LoyaltyLedger,
    pub orders: OrderService,
}

impl Shop {
    /// Loads every data file named by `config`.
    pub fn open(config: &Config) -> Self {
        info!("opening shop data in {}", config.data_dir.display());
        Shop {
            users: UserRepository::open(&config.users_file(), &config.admins_file()),
            catalogue: Catalogue::open(&config.movies_file()),
            addresses: AddressBook::open(&config.addresses_file()),
            loyalty: LoyaltyLedger::open(&config.loyalty_file()),
            orders: OrderService::open(&config.orders_file()),
        }
    }

    pub fn register(&mut self, user: User) -> Result<RecordId, AccountError> {
        self.users.register(user)
    }

    pub fn login(&self, username: &str, password: &str) -> Option<Session> {
        self.users.login(username, password).map(|(user_id, _)| Session {
            user_id,
            cart: Cart::new(),
        })
    }

    pub fn user(&self, session: &Session) -> Result<&User, AccountError> {
        self.users
            .get_user(session.user_id)
            .ok_or(AccountError::UnknownUser(session.user_id))
    }

    fn username(&self, session: &Session) -> Result<String, AccountError> {
        self.user(session).map(|user| user.username.clone())
    }

    pub fn change_username(&mut self, session: &Session, new_username: &str) -> Result<(), AccountError> {
        let old = self.username(session)?;
        self.users.change_username(session.user_id, new_username)?;
        self.addresses.rename(&old, new_username);
        self.loyalty.rename(&old, new_username);
        self.orders.rename(&old, new_username);
        Ok(())
    }

    pub fn change_password(&mut self, session: &Session, new_password: &str) -> Result<(), AccountError> {
        self.users.change_password(session.user_id, new_password)
    }

    pub fn change_email(&mut self, session: &Session, new_email: &str) -> Result<(), AccountError> {
        self.users.change_email(session.user_id, new_email)
    }

    pub fn address(&self, session: &Session) -> Option<&Address> {
        let user = self.users.get_user(session.user_id)?;
        self.addresses.get_address(&user.username)
    }

    /// Saves the address for the session user, replacing any address on file.
    pub fn save_address(
        &mut self,
        session: &Session,
        street: &str,
        city: &str,
        province: &str,
        postal_code: &str,
    ) -> Result<(), AddressError> {
        let username = self
            .users
            .get_user(session.user_id)
            .map(|user| user.username.clone())
            .ok_or(AddressError::Incomplete)?;
        let address = Address {
            username,
            street: street.to_owned(),
            city: city.to_owned(),
            province: province.to_owned(),
            postal_code: postal_code.to_owned(),
        };
        if self.addresses.get_address(&address.username).is_some() {
            self.addresses.update_address(address)
        } else {
            self.addresses.save_address(address)
        }
    }

    pub fn loyalty_points(&self, session: &Session) -> u32 {
        self.users
            .get_user(session.user_id)
            .map_or(0, |user| self.loyalty.balance(&user.username))
    }

    pub fn add_to_cart(
        &self,
        session: &mut Session,
        key: &MovieKey,
        quantity: u32,
    ) -> Result<(), CatalogueError> {
        let movie = self
            .catalogue
            .get_movie(key)
            .ok_or_else(|| CatalogueError::UnknownMovie(key.to_string()))?;
        session.cart.add(movie.clone(), quantity)
    }

    pub fn remove_from_cart(&self, session: &mut Session, key: &MovieKey) -> Option<CartLine> {
        session.cart.remove(key)
    }

    pub fn clear_cart(&self, session: &mut Session) {
        session.cart.clear();
    }

    /// Places an order for the session's cart. The cart is emptied only
    /// when the order is accepted.
    pub fn checkout(&mut self, session: &mut Session, choice: PaymentChoice) -> Result<Order, CheckoutError> {
        if session.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let username = self
            .users
            .get_user(session.user_id)
            .map(|user| user.username.clone())
            .ok_or(CheckoutError::NoAddress)?;
        let address = self
            .addresses
            .get_address(&username)
            .cloned()
            .ok_or(CheckoutError::NoAddress)?;

        let mut points = LoyaltyPoints::new(self.loyalty.balance(&username));
        let mut card = CreditCard;
        let payment: &mut dyn PaymentMethod = match choice {
            PaymentChoice::LoyaltyPoints => &mut points,
            PaymentChoice::CreditCard => &mut card,
        };
        let order = self
            .orders
            .create_order(&session.cart, payment, &address, &mut self.catalogue)?;
        let earned = if payment.earns_points() {
            points_earned(order.total)
        } else {
            0
        };
        self.loyalty
            .set_balance(&username, points.balance().saturating_add(earned));
        self.clear_cart(session);
        Ok(order)
    }

    /// Writes every data file, returning the first failure.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.users.persist()?;
        self.catalogue.persist()?;
        self.addresses.persist()?;
        self.loyalty.persist()?;
        self.orders.persist()
    }
}
