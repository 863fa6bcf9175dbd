//! The event loop.
//!
//! One `tokio::select!` over three sources:
//! - terminal input from crossterm's `EventStream`
//! - provider calls finishing (`SlackTui::next_completion`)
//! - real-time events from every team's RTM subscription
//!
//! The screen is redrawn after each handled event.

use std::ops::ControlFlow;

use anyhow::Result;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use slack_tui_api::RtmOptions;
use tracing::{debug, info};

use crate::app::SlackTui;
use crate::terminal::SlackTerminal;
use crate::view::ViewEvent;
use crate::view::render::render;

/// Take over the terminal and run until the operator quits.
///
/// Returns as soon as the operator quits, restoring the terminal on the way
/// out. Requests still in flight are abandoned.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or drawn to, or if
/// reading terminal input fails.
pub async fn run(mut tui: SlackTui, rtm_options: RtmOptions) -> Result<()> {
    let mut terminal = SlackTerminal::new()?;

    tui.start();
    let mut realtime = tui.subscribe_realtime(rtm_options);
    let mut input = EventStream::new();

    info!("Event loop started");

    loop {
        terminal.draw(|frame| render(frame, tui.view()))?;

        tokio::select! {
            maybe_event = input.next() => match maybe_event {
                Some(Ok(event)) => {
                    if handle_terminal_event(&mut tui, event).is_break() {
                        info!("Quit requested");
                        return Ok(());
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => {
                    debug!("Terminal input closed");
                    return Ok(());
                }
            },

            Some(completion) = tui.next_completion(), if tui.has_pending() => {
                tui.apply(completion);
            }

            Some((team, event)) = realtime.next(), if !realtime.is_empty() => {
                tui.handle_realtime(&team, event);
            }
        }
    }
}

fn handle_terminal_event(tui: &mut SlackTui, event: Event) -> ControlFlow<()> {
    match event {
        Event::Key(key) => match tui.view_mut().handle_key(key) {
            Some(ViewEvent::Quit) => return ControlFlow::Break(()),
            Some(view_event) => tui.handle_view_event(view_event),
            None => {}
        },
        Event::Paste(text) => tui.view_mut().handle_paste(&text),
        // The next draw picks up the new size.
        Event::Resize(..) => {}
        _ => {}
    }
    ControlFlow::Continue(())
}
