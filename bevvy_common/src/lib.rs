mod euro;

pub mod op;
mod secret;

mod helpers;

pub use euro::{Euro, EuroConversionError, EURO_CURRENCY_CODE};
pub use helpers::parse_boolean_flag;
pub use secret::Secret;
