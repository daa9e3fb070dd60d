//! Futures ledger simulation.
//!
//! Walks one account through a trading session: cash reservation for orders,
//! partial fills, bar and tick marking, and settlement with an expiring contract.
//! Run with `RUST_LOG=debug` to see every frozen cash change.

use chrono::NaiveDate;
use futures_ledger::*;
use rust_decimal_macros::dec;
use std::error::Error;

type SimResult = Result<(), Box<dyn Error>>;

fn main() -> SimResult {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Futures Ledger Simulation");
    println!("Single Account, Two Contracts, One Trading Day\n");

    let catalog = InstrumentCatalog::new()
        .with(Instrument::new("IF1701", dec!(300), dec!(0.2)))
        .with(
            Instrument::new("RB1701", dec!(10), dec!(0.09))
                .with_de_listed_date(NaiveDate::from_ymd_opt(2017, 1, 16).ok_or("bad date")?),
        );

    let mut router = AccountRouter::new(RouterConfig::default());
    let config = AccountConfig::new(Quote::new(dec!(1_000_000)), dec!(1000));
    let account = router.open_account(&config)?;

    print_account(&router, account, "Session start");

    scenario_1_reserve_and_cancel(&mut router, &catalog, account)?;
    scenario_2_partial_fills(&mut router, &catalog, account)?;
    scenario_3_marking(&mut router, &catalog, account)?;
    scenario_4_settlement(&mut router, &catalog, account)?;

    println!("\n{} events dispatched.", router.events().len());
    Ok(())
}

/// Reservation on pending new, full release on cancel.
fn scenario_1_reserve_and_cancel(
    router: &mut AccountRouter,
    catalog: &InstrumentCatalog,
    account: AccountId,
) -> SimResult {
    println!("Scenario 1: Reserve and Cancel\n");

    let mut order = Order::new(
        OrderId(1),
        account,
        "IF1701".into(),
        Side::Buy,
        PositionEffect::Open,
        dec!(2),
        Price::new(dec!(3300)).ok_or("bad price")?,
        router.time(),
    );
    order.mark_pending_new();
    router.dispatch(EventPayload::OrderPendingNew(OrderEvent::new(order.clone())), catalog)?;
    print_account(router, account, "BUY OPEN 2 IF1701 @ 3300 pending");

    order.cancel();
    router.dispatch(EventPayload::OrderCancellationPass(OrderEvent::new(order)), catalog)?;
    print_account(router, account, "Order cancelled");
    Ok(())
}

/// Two partial fills. Each fill releases raw notional, not margin.
fn scenario_2_partial_fills(
    router: &mut AccountRouter,
    catalog: &InstrumentCatalog,
    account: AccountId,
) -> SimResult {
    println!("Scenario 2: Partial Fills\n");

    let mut order = Order::new(
        OrderId(2),
        account,
        "RB1701".into(),
        Side::Buy,
        PositionEffect::Open,
        dec!(10),
        Price::new(dec!(3000)).ok_or("bad price")?,
        router.time(),
    );
    order.mark_pending_new();
    router.dispatch(EventPayload::OrderPendingNew(OrderEvent::new(order.clone())), catalog)?;
    print_account(router, account, "BUY OPEN 10 RB1701 @ 3000 pending");

    for (trade_id, quantity) in [(1, dec!(4)), (2, dec!(6))] {
        router.advance_time(1_000);
        let trade = order.fill(
            TradeId(trade_id),
            Price::new(dec!(2998)).ok_or("bad price")?,
            quantity,
            Quote::new(dec!(1.5) * quantity),
            router.time(),
        );
        router.dispatch(EventPayload::Trade(TradeEvent::new(order.clone(), trade)), catalog)?;
        print_account(router, account, &format!("Filled {quantity} @ 2998"));
    }

    let mut hedge = Order::new(
        OrderId(3),
        account,
        "IF1701".into(),
        Side::Sell,
        PositionEffect::Open,
        dec!(1),
        Price::new(dec!(3310)).ok_or("bad price")?,
        router.time(),
    );
    hedge.mark_pending_new();
    router.dispatch(EventPayload::OrderPendingNew(OrderEvent::new(hedge.clone())), catalog)?;
    let trade = hedge.fill(
        TradeId(3),
        Price::new(dec!(3310)).ok_or("bad price")?,
        dec!(1),
        Quote::new(dec!(23)),
        router.time(),
    );
    router.dispatch(EventPayload::Trade(TradeEvent::new(hedge, trade)), catalog)?;
    print_account(router, account, "SELL OPEN 1 IF1701 @ 3310 filled");
    Ok(())
}

/// Bar closes and ticks move the marks. A suspended contract keeps its price.
fn scenario_3_marking(
    router: &mut AccountRouter,
    catalog: &InstrumentCatalog,
    account: AccountId,
) -> SimResult {
    println!("Scenario 3: Marking to Market\n");

    let bars = BarEvent::new([
        Bar::at_close("IF1701".into(), Price::new(dec!(3290)).ok_or("bad price")?),
        Bar::missing("RB1701".into()),
    ]);
    router.dispatch(EventPayload::Bar(bars), catalog)?;
    print_account(router, account, "Bar: IF1701 closes 3290, RB1701 suspended");

    let tick = Tick {
        instrument_id: "RB1701".into(),
        last: Price::new(dec!(3012)).ok_or("bad price")?,
    };
    router.dispatch(EventPayload::Tick(TickEvent { tick }), catalog)?;
    print_account(router, account, "Tick: RB1701 last 3012");
    Ok(())
}

/// RB1701 expires on the settlement date and is closed out by the system.
fn scenario_4_settlement(
    router: &mut AccountRouter,
    catalog: &InstrumentCatalog,
    account: AccountId,
) -> SimResult {
    println!("Scenario 4: Settlement\n");

    let trading_date = NaiveDate::from_ymd_opt(2017, 1, 16).ok_or("bad date")?;
    let outcome =
        router.dispatch(EventPayload::Settlement(SettlementEvent { trading_date }), catalog)?;

    if let DispatchOutcome::Settled { reports, .. } = outcome {
        for report in reports {
            println!(
                "  {}: {} rolled, de-listed {:?}, closed {:?}",
                report.trading_date, report.settled, report.de_listed, report.closed
            );
        }
    }
    print_account(router, account, "After settlement");
    Ok(())
}

fn print_account(router: &AccountRouter, account_id: AccountId, label: &str) {
    let Some(account) = router.account(account_id) else {
        return;
    };
    let s = account.summary();
    println!("  {label}");
    println!(
        "    cash {}  frozen {}  margin {} (buy {}, sell {})",
        s.cash, s.frozen_cash, s.margin, s.buy_margin, s.sell_margin
    );
    println!(
        "    total {}  unit nav {}  daily pnl {} (holding {}, realized {}, cost {})\n",
        s.total_value,
        s.unit_net_value,
        s.daily_pnl,
        s.daily_holding_pnl,
        s.daily_realized_pnl,
        s.transaction_cost
    );
}
