//! Runs the canned transfer scenarios and logs the resulting balances.

use anyhow::{Context, bail};
use minibank_banking::Fixtures;
use minibank_core::{DomainError, Money};

fn main() -> anyhow::Result<()> {
    minibank_observability::init();

    let fx = Fixtures::new();

    fx.bank
        .send(&fx.directory, &fx.alice_id(), &fx.bob_id(), Money::from_major(300), None)
        .context("alice -> bob transfer")?;
    tracing::info!(
        alice = %fx.bank.balance(&fx.alice_account_id)?,
        bob = %fx.bank.balance(&fx.bob_account_id)?,
        "same-bank transfer done"
    );

    match fx.bank.withdraw(&fx.bob_account_id, Money::from_major(10_000)) {
        Err(DomainError::InsufficientFunds { .. }) => {
            tracing::info!("overdraft refused by strict bank");
        }
        other => bail!("expected insufficient funds, got {other:?}"),
    }

    let lenient = &fx.bank_allows_negative;
    let balance = lenient
        .withdraw(&fx.alice_account_allows_negative_id, Money::from_major(300))
        .context("overdraft withdrawal")?;
    tracing::info!(balance = %balance, "overdraft allowed by lenient bank");

    let carol_account = lenient.create_account(Money::ZERO).id_typed();
    let carol = fx.create_user("Carol", vec![carol_account]);
    let receipt = fx
        .bank
        .send(
            &fx.directory,
            &fx.alice_id(),
            &carol.id_typed(),
            Money::from_major(100),
            Some(&lenient.id_typed()),
        )
        .context("cross-bank transfer")?;
    tracing::info!(
        executed_at = %receipt.executed_at,
        source_total = %fx.bank.total_balance()?,
        target_total = %lenient.total_balance()?,
        "cross-bank transfer done"
    );

    Ok(())
}
