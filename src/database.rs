use crate::error::{AccountError, LoginError, StoreError};
use crate::model::*;
use crate::store::{load_column, RecordId, RecordStore, Rejected};
use log::{debug, error, info};
use std::collections::HashSet;
use std::path::Path;

/// User accounts backed by the users file, plus the read-only set of emails
/// that turn an employee registration into an admin account.
pub struct UserRepository {
    users: RecordStore<User>,
    admin_emails: HashSet<String>,
}

impl UserRepository {
    pub fn open(users_path: &Path, admins_path: &Path) -> Self {
        let users = RecordStore::open(users_path);
        let admin_emails = if admins_path.exists() {
            match load_column(admins_path) {
                Ok(emails) => emails.into_iter().collect(),
                Err(err) => {
                    error!("failed to load {}: {}", admins_path.display(), err);
                    HashSet::new()
                }
            }
        } else {
            HashSet::new()
        };
        info!(
            "{} users, {} admin emails",
            users.len(),
            admin_emails.len()
        );
        UserRepository {
            users,
            admin_emails,
        }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.contains(email)
    }

    fn validate_username(&self, username: &str) -> Result<(), AccountError> {
        if username.is_empty() {
            Err(AccountError::EmptyUsername)
        } else if self.users.contains_key(&username.to_owned()) {
            Err(AccountError::UsernameTaken(username.to_owned()))
        } else {
            Ok(())
        }
    }

    fn validate_password(password: &str) -> Result<(), AccountError> {
        if password.is_empty() {
            Err(AccountError::EmptyPassword)
        } else {
            Ok(())
        }
    }

    fn validate_email(email: &str) -> Result<(), AccountError> {
        if email.is_empty() {
            Err(AccountError::EmptyEmail)
        } else {
            Ok(())
        }
    }

    pub fn register(&mut self, mut user: User) -> Result<RecordId, AccountError> {
        self.validate_username(&user.username)?;
        Self::validate_password(&user.password)?;
        Self::validate_email(&user.email)?;
        if user.account == AccountType::Employee && self.is_admin_email(&user.email) {
            user.account = AccountType::Admin;
        }
        let username = user.username.clone();
        let id = self
            .users
            .insert(user)
            .ok_or(AccountError::UsernameTaken(username))?;
        debug!("registered user {}", id);
        Ok(id)
    }

    pub fn get_user(&self, id: RecordId) -> Option<&User> {
        self.users.get(id)
    }

    pub fn get_user_by_username(&self, username: &str) -> Option<(RecordId, &User)> {
        self.users.find(&username.to_owned())
    }

    pub fn users(&self) -> impl Iterator<Item = (RecordId, &User)> {
        self.users.iter()
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<RecordId, LoginError> {
        let (id, user) = self
            .get_user_by_username(username)
            .ok_or(LoginError::UnknownUser)?;
        if user.password == password {
            Ok(id)
        } else {
            Err(LoginError::WrongPassword)
        }
    }

    /// Returns the user only if both username and password match.
    pub fn login(&self, username: &str, password: &str) -> Option<(RecordId, &User)> {
        match self.authenticate(username, password) {
            Ok(id) => self.get_user(id).map(|user| (id, user)),
            Err(err) => {
                debug!("login failed for {:?}: {}", username, err);
                None
            }
        }
    }

    pub fn change_username(&mut self, id: RecordId, new_username: &str) -> Result<(), AccountError> {
        self.validate_username(new_username)?;
        self.users
            .update(id, |user| user.username = new_username.to_owned())
            .map_err(|err| match err {
                Rejected::Missing(id) => AccountError::UnknownUser(id),
                Rejected::KeyTaken => AccountError::UsernameTaken(new_username.to_owned()),
            })
    }

    pub fn change_password(&mut self, id: RecordId, new_password: &str) -> Result<(), AccountError> {
        Self::validate_password(new_password)?;
        self.users
            .update(id, |user| user.password = new_password.to_owned())
            .map_err(|_| AccountError::UnknownUser(id))
    }

    pub fn change_email(&mut self, id: RecordId, new_email: &str) -> Result<(), AccountError> {
        Self::validate_email(new_email)?;
        self.users
            .update(id, |user| user.email = new_email.to_owned())
            .map_err(|_| AccountError::UnknownUser(id))
    }

    pub fn persist(&self) -> Result<(), StoreError> {
        self.users.persist()
    }
}
