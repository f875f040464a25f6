//! Nested Player
//!
//! This example demonstrates composing machines: a media player whose
//! "playing" state drives a second machine walking through a playlist.
//!
//! Key concepts:
//! - A machine owned as the payload of another machine
//! - Entry actions starting the inner machine
//! - Queuing an outer event from inside an action
//! - Loading the outer topology from a JSON definition
//!
//! Run with: cargo run --example nested_player

use statelog::builder::MachineDefinition;
use statelog::machine::Action;
use statelog::{StateId, StateMachine, StateMachineBuilder, StateMachineError};

const PLAYER: &str = r#"{
    "id": "player",
    "start": "stopped",
    "states": [{ "id": "playing", "entry": true }],
    "transitions": [
        { "from": "stopped", "event": "play", "to": "playing" },
        { "from": "playing", "event": "skip", "to": "playing" },
        { "from": "playing", "event": "stop", "to": "stopped" },
        { "from": "stopped", "event": "eject", "to": "__FINAL__" }
    ]
}"#;

fn playlist(tracks: &[&'static str]) -> Result<StateMachine, StateMachineError> {
    let mut builder = StateMachineBuilder::new().id("playlist");
    if let Some(first) = tracks.first() {
        builder = builder.start_state(*first);
    }
    for pair in tracks.windows(2) {
        builder = builder.transition(pair[0], "next", pair[1]);
    }
    if let Some(last) = tracks.last() {
        builder = builder.transition(*last, "next", StateId::FINAL);
    }
    builder.build().map_err(StateMachineError::handler)
}

fn main() -> Result<(), StateMachineError> {
    println!("=== Nested Player ===\n");

    let player = MachineDefinition::from_json(PLAYER)
        .map_err(StateMachineError::handler)?
        .into_builder_with_payload(playlist(&["intro", "verse", "chorus", "outro"])?)
        .action(Action::on_entry("playing", |tracks: &mut StateMachine, _| {
            if !tracks.is_active() && !tracks.is_ended() {
                tracks.start()?;
            }
            Ok(())
        }))
        .action(Action::scoped("playing", "skip", |tracks: &mut StateMachine, player| {
            tracks.trigger_event("next")?;
            if tracks.is_ended() {
                println!("  playlist finished");
                player.queue_event("stop")?;
            }
            Ok(())
        }))
        .build()
        .map_err(StateMachineError::handler)?;

    player.start()?;
    player.trigger_event("play")?;

    while player.current_state().is_some_and(|state| state == "playing") {
        let track = player.payload()?.current_state();
        println!(
            "playing: {}",
            track.map(|track| track.to_string()).unwrap_or_default()
        );
        player.trigger_event("skip")?;
    }

    player.trigger_event("eject")?;
    println!("\nPlayer ended: {}", player.is_ended());
    println!("Player transitions: {}", player.transition_count());
    println!("Playlist transitions: {}", player.payload()?.transition_count());

    Ok(())
}
