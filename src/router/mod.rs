// 7.0: account router. the single dispatcher between an event source and the accounts.
// order and trade events go only to the account they name, market events go to all.
// processing is strictly sequential: one event is fully applied before the next.

mod config;
mod core;
mod dispatch;
mod results;

pub use config::RouterConfig;
pub use core::AccountRouter;
pub use results::{DispatchOutcome, RouterError};
