//! Client-side shopping cart that turns into a `CreateOrderRequest`.
//!
//! The total is an estimate from the product prices the cart was filled
//! with; the server computes the authoritative total when the order is placed.

use thiserror::Error;

use crate::types::{CreateOrderRequest, OrderItemRequest, Product};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("cart is empty")]
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`, merging with an existing line.
    pub fn add(&mut self, product: Product) {
        match self.lines.iter_mut().find(|line| line.product.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine {
                product,
                quantity: 1,
            }),
        }
    }

    /// Set the quantity for a product already in the cart. Zero removes the
    /// line; unknown products are ignored.
    pub fn set_quantity(&mut self, product_id: u64, quantity: u32) {
        if quantity == 0 {
            self.lines.retain(|line| line.product.id != product_id);
        } else if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.id == product_id)
        {
            line.quantity = quantity;
        }
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn to_order_request(&self, customer_id: u64) -> Result<CreateOrderRequest, CartError> {
        if self.is_empty() {
            return Err(CartError::Empty);
        }
        Ok(CreateOrderRequest {
            customer_id,
            items: self
                .lines
                .iter()
                .map(|line| OrderItemRequest {
                    product_id: line.product.id,
                    quantity: line.quantity,
                })
                .collect(),
        })
    }
}
