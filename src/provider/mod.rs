// Market data access: provider trait, timeframe mapping and the Yahoo adapter.

pub mod timeframe;
pub mod traits;
pub mod yahoo;

pub use timeframe::Timeframe;
pub use traits::MarketData;
pub use yahoo::YahooProvider;
