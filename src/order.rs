use crate::cart::{Cart, CartLine};
use crate::catalogue::Catalogue;
use crate::error::{CheckoutError, StoreError};
use crate::model::{Address, OrderLine};
use crate::payment::PaymentMethod;
use crate::store::{RecordId, RecordStore};
use crate::warehouse::WarehouseRouter;
use log::{info, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Clone, Debug)]
pub struct Order {
    pub id: u64,
    pub username: String,
    pub lines: Vec<CartLine>,
    pub total: Decimal,
    pub payment: &'static str,
    pub address: Address,
    pub warehouse: &'static str,
}

/// Places orders and keeps the order history, one row per ordered movie.
pub struct OrderService {
    lines: RecordStore<OrderLine>,
    last_id: u64,
    router: WarehouseRouter,
}

impl OrderService {
    pub fn open(path: &Path) -> Self {
        let lines: RecordStore<OrderLine> = RecordStore::open(path);
        let last_id = lines.iter().map(|(_, line)| line.order).max().unwrap_or(0);
        OrderService {
            lines,
            last_id,
            router: WarehouseRouter::default(),
        }
    }

    /// Places an order for everything in `cart`. Stock and payment are
    /// checked before anything changes, so a rejected order leaves the
    /// catalogue as it was.
    pub fn create_order(
        &mut self,
        cart: &Cart,
        payment: &mut dyn PaymentMethod,
        address: &Address,
        catalogue: &mut Catalogue,
    ) -> Result<Order, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        for line in cart.lines() {
            catalogue.check_stock(&line.movie.key(), line.quantity)?;
        }
        let total = cart.total().ok_or(CheckoutError::TotalOverflow)?;
        if !payment.authorize(total) {
            warn!("{} payment of {} declined", payment.name(), total);
            return Err(CheckoutError::PaymentDeclined(total));
        }
        for line in cart.lines() {
            catalogue.take_stock(&line.movie.key(), line.quantity)?;
        }

        self.last_id += 1;
        let mut order = Order {
            id: self.last_id,
            username: address.username.clone(),
            lines: cart.lines().cloned().collect(),
            total,
            payment: payment.name(),
            address: address.clone(),
            warehouse: "",
        };
        order.warehouse = self.router.dispatch(&order);
        for line in &order.lines {
            let row = OrderLine {
                order: order.id,
                username: order.username.clone(),
                barcode: line.movie.barcode.clone(),
                title: line.movie.title.clone(),
                quantity: line.quantity,
                cost: line.movie.cost,
                payment: order.payment.to_owned(),
                warehouse: order.warehouse.to_owned(),
            };
            if self.lines.insert(row).is_none() {
                warn!("order {} already has a line for {}", order.id, line.movie.key());
            }
        }
        info!(
            "order {} for {} accepted: {} paid by {}",
            order.id, order.username, order.total, order.payment
        );
        Ok(order)
    }

    /// Past orders of `username` by order id.
    pub fn orders_for(&self, username: &str) -> BTreeMap<u64, Vec<&OrderLine>> {
        let mut orders: BTreeMap<u64, Vec<&OrderLine>> = BTreeMap::new();
        for (_, line) in self.lines.iter() {
            if line.username == username {
                orders.entry(line.order).or_default().push(line);
            }
        }
        orders
    }

    /// Moves the order history of `old` to `new`.
    pub fn rename(&mut self, old: &str, new: &str) {
        let ids: Vec<RecordId> = self
            .lines
            .iter()
            .filter(|(_, line)| line.username == old)
            .map(|(id, _)| id)
            .collect();
        for id in ids {
            if let Err(err) = self.lines.update(id, |line| line.username = new.to_owned()) {
                warn!("could not move order line {} to {:?}: {}", id, new, err);
            }
        }
    }

    pub fn persist(&self) -> Result<(), StoreError> {
        self.lines.persist()
    }
}
