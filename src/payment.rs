use crate::loyalty::points_required;
use rust_decimal::Decimal;

pub trait PaymentMethod {
    fn name(&self) -> &'static str;

    /// Authorizes a transfer of `amount`, returning whether it went through.
    fn authorize(&mut self, amount: Decimal) -> bool;

    /// Whether orders paid this way earn loyalty points.
    fn earns_points(&self) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct LoyaltyPoints {
    balance: u32,
}

impl LoyaltyPoints {
    pub fn new(balance: u32) -> Self {
        LoyaltyPoints { balance }
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }
}

impl PaymentMethod for LoyaltyPoints {
    fn name(&self) -> &'static str {
        "loyalty points"
    }

    fn authorize(&mut self, amount: Decimal) -> bool {
        let required = points_required(amount);
        if required > self.balance {
            return false;
        }
        self.balance -= required;
        true
    }

    fn earns_points(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
pub struct CreditCard;

impl PaymentMethod for CreditCard {
    fn name(&self) -> &'static str {
        "credit card"
    }

    /// Any non-negative amount goes through. A total of zero is accepted, the
    /// same as with loyalty points.
    fn authorize(&mut self, amount: Decimal) -> bool {
        amount >= Decimal::new(0, 0)
    }
}
