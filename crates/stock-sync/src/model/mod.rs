//! Pure data structures stored in, or sent to, the product collection.

pub mod attribute;
pub mod cart;
pub mod product;

pub use attribute::*;
pub use cart::*;
pub use product::*;
