mod helpers;
mod price;
mod secret;

pub use helpers::parse_boolean_flag;
pub use price::{Price, PriceParseError};
pub use secret::Secret;
