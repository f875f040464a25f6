//! Turnstile
//!
//! This example demonstrates the classic coin-operated turnstile.
//!
//! Key concepts:
//! - Transitions registered through the builder
//! - A guard reading the payload to refuse coins past capacity
//! - Entry actions and a self-transition for the alarm
//! - Reading the transition log after the run
//!
//! Run with: cargo run --example turnstile

use statelog::machine::{Action, TracingObserver};
use statelog::{Guard, StateMachineBuilder, StateMachineError};

#[derive(Debug, Default)]
struct Counter {
    coins: u32,
    passes: u32,
    alarms: u32,
    capacity: u32,
}

fn main() -> Result<(), StateMachineError> {
    println!("=== Turnstile ===\n");

    let machine = StateMachineBuilder::with_payload(Counter {
        capacity: 2,
        ..Counter::default()
    })
    .id("turnstile")
    .start_state("locked")
    .transition("locked", "insertCoin", "unlocked")
    .transition("unlocked", "pass", "locked")
    .transition("locked", "pass", "locked")
    .on_entry("unlocked")
    .guard(Guard::for_event("insertCoin", |counter: &Counter, _| {
        counter.coins < counter.capacity
    }))
    .action(Action::on_entry("unlocked", |counter: &mut Counter, _| {
        counter.coins += 1;
        Ok(())
    }))
    .action(Action::scoped("unlocked", "pass", |counter: &mut Counter, _| {
        counter.passes += 1;
        Ok(())
    }))
    .action(Action::scoped("locked", "pass", |counter: &mut Counter, _| {
        counter.alarms += 1;
        println!("  alarm: pushed while locked");
        Ok(())
    }))
    .observer(TracingObserver::named("turnstile"))
    .build()
    .map_err(StateMachineError::handler)?;

    machine.start()?;
    println!("Started in: {}", display(machine.current_state()));

    for event in ["pass", "insertCoin", "pass", "insertCoin", "pass", "insertCoin"] {
        machine.trigger_event(event)?;
        println!("{event:>12} -> {}", display(machine.current_state()));
    }

    let counter = machine.payload()?;
    println!("\nCoins: {}", counter.coins);
    println!("Passes: {}", counter.passes);
    println!("Alarms: {}", counter.alarms);

    println!("\nTransition log:");
    for entry in &machine.transition_log() {
        println!(
            "  {} --{}--> {} at {}",
            entry.from(),
            entry.event().id(),
            entry.to(),
            entry.timestamp().format("%H:%M:%S%.3f")
        );
    }

    Ok(())
}

fn display(state: Option<statelog::StateId>) -> String {
    state.map(|state| state.to_string()).unwrap_or_default()
}
