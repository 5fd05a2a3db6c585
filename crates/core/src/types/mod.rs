//! Domain records and the value types they are built from.

pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;
pub mod subscription;

pub use email::{Email, EmailError};
pub use id::*;
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, OrderWithItems, ShippingAddress};
pub use price::{Price, PriceError};
pub use product::{NewProduct, Product};
pub use status::*;
pub use subscription::{EmailSubscription, NewEmailSubscription};
