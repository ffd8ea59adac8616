use crate::error::StoreError;
use crate::model::PointsBalance;
use crate::store::RecordStore;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::Path;

/// Points earned for an order total: one per whole currency unit.
pub fn points_earned(total: Decimal) -> u32 {
    total.floor().to_u32().unwrap_or(0)
}

/// Points needed to pay for an order total: one per currency unit, rounded
/// up.
pub fn points_required(total: Decimal) -> u32 {
    total.ceil().to_u32().unwrap_or(u32::MAX)
}

pub struct LoyaltyLedger {
    balances: RecordStore<PointsBalance>,
}

impl LoyaltyLedger {
    pub fn open(path: &Path) -> Self {
        LoyaltyLedger {
            balances: RecordStore::open(path),
        }
    }

    pub fn balance(&self, username: &str) -> u32 {
        self.balances
            .find(&username.to_owned())
            .map_or(0, |(_, balance)| balance.points)
    }

    pub fn set_balance(&mut self, username: &str, points: u32) {
        match self.balances.find(&username.to_owned()) {
            Some((id, _)) => {
                if let Err(err) = self.balances.update(id, |balance| balance.points = points) {
                    log::warn!("could not update points of {:?}: {}", username, err);
                }
            }
            None => {
                self.balances.insert(PointsBalance {
                    username: username.to_owned(),
                    points,
                });
            }
        }
    }

    pub fn rename(&mut self, old: &str, new: &str) {
        if let Some((id, _)) = self.balances.find(&old.to_owned()) {
            if let Err(err) = self.balances.update(id, |balance| balance.username = new.to_owned()) {
                log::warn!("could not move points of {:?} to {:?}: {}", old, new, err);
            }
        }
    }

    pub fn persist(&self) -> Result<(), StoreError> {
        self.balances.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn rounding() {
        assert_eq!(points_earned(Decimal::new(1999, 2)), 19);
        assert_eq!(points_required(Decimal::new(1999, 2)), 20);
        assert_eq!(points_required(Decimal::new(20, 0)), 20);
        assert_eq!(points_earned(Decimal::new(99, 2)), 0);
    }

    #[test]
    fn balances() {
        let dir = TempDir::new("rentflix").unwrap();
        let path = dir.path().join("loyalty.csv");
        let mut ledger = LoyaltyLedger::open(&path);
        assert_eq!(ledger.balance("alice"), 0);
        ledger.set_balance("alice", 12);
        ledger.set_balance("alice", 7);
        ledger.rename("alice", "alicia");
        let reloaded = LoyaltyLedger::open(&path);
        assert_eq!(reloaded.balance("alice"), 0);
        assert_eq!(reloaded.balance("alicia"), 7);
    }
}
