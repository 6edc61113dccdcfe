//! ldk-pricing
//!
//! Pricing Calculator: the minimum per-share selling price that realizes a
//! target profit percentage on a given quantity, priced against the FIFO
//! cost of the shares that would actually be sold.
//!
//! Pure queries over a point-in-time lot snapshot — selling here is
//! hypothetical, the lot book is never touched.  A real sell enters the
//! system later as a trade through normal ingestion.

mod price;
mod profit;

pub use price::{quote_for_book, required_selling_price, PriceQuote, PricingError};
pub use profit::{ParseProfitError, ProfitBps};
