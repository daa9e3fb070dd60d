// futures-ledger: per-account ledger for a futures trading simulation.
// cash, margin, frozen cash and daily pnl stay consistent across market, order and trade events.
// all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: InstrumentId, AccountId, Side, Price, Quote
//   2.x  instrument.rs: contract terms and the ReferenceData lookup seam
//   3.x  config.rs: starting cash, margin multiplier, units
//   4.x  position.rs: two-sided futures position, margin, pnl, daily roll
//   5.x  account.rs: the ledger: derived figures and event handlers
//        margin.rs: frozen cash sizing for orders and fills
//        order.rs: orders and trades as the ledger sees them
//   6.x  events.rs: market, order and trade event payloads
//   7.x  router/: per-account routing, broadcast, event journal

pub mod account;
pub mod config;
pub mod events;
pub mod instrument;
pub mod margin;
pub mod order;
pub mod position;
pub mod router;
pub mod types;

// re exports for convenience
pub use account::*;
pub use config::*;
pub use events::*;
pub use instrument::*;
pub use margin::*;
pub use order::*;
pub use position::*;
pub use router::*;
pub use types::*;
