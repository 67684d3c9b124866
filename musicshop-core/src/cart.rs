use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::{
    error::Error,
    product::{Price, Product},
};

/// Cart shared by every screen of a shopping session.
pub type SharedCart = Arc<Mutex<Cart>>;

#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    Added {
        index: usize,
        product: Arc<Product>,
        total: Price,
    },
    Removed {
        index: usize,
        product: Arc<Product>,
        total: Price,
    },
}

impl CartEvent {
    pub fn total(&self) -> Price {
        match self {
            Self::Added { total, .. } | Self::Removed { total, .. } => *total,
        }
    }
}

/// Ordered line items and their running total.
///
/// The same product may be added any number of times, each copy taking its
/// own position.  Items are therefore removed by position, never by value:
/// callers must pass the index they currently display, and must re-read
/// indices after every removal because later items shift down by one.
#[derive(Debug, Default)]
pub struct Cart {
    items: Vec<Arc<Product>>,
    total: Price,
    subscribers: Vec<Sender<CartEvent>>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedCart {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn items(&self) -> &[Arc<Product>] {
        &self.items
    }

    pub fn total(&self) -> Price {
        self.total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends `product`.  There is no stock or capacity check.
    pub fn add(&mut self, product: Arc<Product>) {
        self.total += product.price;
        self.items.push(product.clone());
        log::debug!("added {:?} to cart, total {}", product.name, self.total);
        self.notify(CartEvent::Added {
            index: self.items.len() - 1,
            product,
            total: self.total,
        });
    }

    /// Removes the item at `index`.  Out-of-range indices are a caller bug
    /// and leave the cart untouched.
    pub fn remove_at(&mut self, index: usize) -> Result<Arc<Product>, Error> {
        if index >= self.items.len() {
            log::error!(
                "cart index {} out of bounds (len {})",
                index,
                self.items.len()
            );
            return Err(Error::IndexError {
                index,
                len: self.items.len(),
            });
        }
        let product = self.items.remove(index);
        self.total -= product.price;
        log::debug!("removed {:?} from cart, total {}", product.name, self.total);
        self.notify(CartEvent::Removed {
            index,
            product: product.clone(),
            total: self.total,
        });
        Ok(product)
    }

    /// Every mutation after this call is delivered to the returned receiver.
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<CartEvent> {
        let (send, recv) = unbounded();
        self.subscribers.push(send);
        recv
    }

    fn notify(&mut self, event: CartEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}
