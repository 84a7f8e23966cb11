use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use futures::{Stream, StreamExt};
use gs_feed::{Direction, FeedNavigator, Navigation};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Navigate(Direction),
    Quit,
}

/// Ctrl+Right/Left move through the feed; `q`, Esc and Ctrl+C quit.
pub fn key_action(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Right if ctrl => Some(KeyAction::Navigate(Direction::Forward)),
        KeyCode::Left if ctrl => Some(KeyAction::Navigate(Direction::Backward)),
        KeyCode::Char('c') if ctrl => Some(KeyAction::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        _ => None,
    }
}

struct RawMode;

impl RawMode {
    fn enable() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

pub async fn browse(navigator: &FeedNavigator) -> anyhow::Result<()> {
    let _raw = RawMode::enable()?;

    let actions = EventStream::new().filter_map(|event| async move {
        match event {
            Ok(Event::Key(key)) => key_action(&key),
            Ok(_) => None,
            Err(e) => {
                warn!("Terminal event error: {}", e);
                Some(KeyAction::Quit)
            }
        }
    });
    drive(navigator, Box::pin(actions)).await;
    Ok(())
}

/// Runs the feed against a stream of key actions until `Quit` or the stream
/// ends.
///
/// Actions keep being read while a navigation is in flight, so a key pressed
/// meanwhile is answered with [`Navigation::Busy`] instead of waiting its
/// turn. Returns the outcome of every request in completion order.
pub async fn drive<S>(navigator: &FeedNavigator, mut actions: S) -> Vec<Navigation>
where
    S: Stream<Item = KeyAction> + Unpin,
{
    let run = move |direction: Option<Direction>| async move {
        match direction {
            Some(direction) => navigator.navigate(direction).await,
            None => navigator.load_feed().await,
        }
    };

    let mut outcomes = Vec::new();
    let inflight = run(None);
    tokio::pin!(inflight);
    let mut idle = false;

    loop {
        tokio::select! {
            biased;

            outcome = &mut inflight, if !idle => {
                debug!("Navigation finished: {:?}", outcome);
                outcomes.push(outcome);
                idle = true;
            }
            action = actions.next() => match action {
                Some(KeyAction::Navigate(direction)) if idle => {
                    inflight.set(run(Some(direction)));
                    idle = false;
                }
                Some(KeyAction::Navigate(direction)) => {
                    let outcome = navigator.navigate(direction).await;
                    debug!("{:?} -> {:?}", direction, outcome);
                    outcomes.push(outcome);
                }
                Some(KeyAction::Quit) => break,
                None => {
                    if !idle {
                        outcomes.push(inflight.as_mut().await);
                    }
                    break;
                }
            },
        }
    }
    outcomes
}
