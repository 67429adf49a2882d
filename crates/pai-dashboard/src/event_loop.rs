use crate::{keymap, ui};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::{Stream, StreamExt};
use pai_core::{Command, Dashboard, Flow};
use rand::Rng;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

const MESSAGE_QUEUE_CAPACITY: usize = 64;
const SPINNER_PERIOD: Duration = Duration::from_millis(83);
const LOADING_DURATION: Duration = Duration::from_millis(1500);

type Backend = CrosstermBackend<io::Stdout>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Tick,
    Spinner,
    Loaded,
    Command(Command),
    Resize(u16, u16),
    /// Terminal input is gone; no key can reach the loop anymore.
    InputFailed(String),
}

/// Applies one message to the dashboard. Returns `Flow::Quit` when the loop
/// should end and an error when it cannot go on.
pub fn handle<R: Rng>(dash: &mut Dashboard<R>, message: Message) -> Result<Flow> {
    let now = Utc::now();
    let flow = match message {
        Message::Tick => {
            let report = dash.tick(now);
            debug!(
                changes = report.status_changes,
                working = report.working,
                completed = report.completed,
                population = ?report.population,
                "tick"
            );
            Flow::Continue
        }
        Message::Spinner => {
            dash.advance_spinner();
            Flow::Continue
        }
        Message::Loaded => {
            dash.finish_loading();
            Flow::Continue
        }
        Message::Resize(width, height) => {
            dash.resize(width, height);
            Flow::Continue
        }
        Message::Command(command) => dash.apply(command, now),
        Message::InputFailed(reason) => return Err(anyhow!("terminal input failed: {reason}")),
    };
    Ok(flow)
}

pub async fn run<R: Rng>(dash: &mut Dashboard<R>) -> Result<()> {
    let mut terminal = setup_terminal().context("failed to set up terminal")?;
    let result = drive(&mut terminal, dash).await;
    restore_terminal(&mut terminal).context("failed to restore terminal")?;
    result
}

async fn drive<R: Rng>(terminal: &mut Terminal<Backend>, dash: &mut Dashboard<R>) -> Result<()> {
    let size = terminal.size().context("failed to read terminal size")?;
    dash.resize(size.width, size.height);

    let (tx, mut rx) = mpsc::channel(MESSAGE_QUEUE_CAPACITY);
    let producers = [
        tokio::spawn(tick_producer(tx.clone(), dash.settings().tick_interval)),
        tokio::spawn(loading_producer(tx.clone())),
        tokio::spawn(input_producer(tx)),
    ];
    info!("dashboard loop started");

    let mut outcome = Ok(());
    loop {
        if let Err(err) = terminal.draw(|frame| ui::draw(frame, &dash.snapshot(Utc::now()))) {
            outcome = Err(err).context("failed to draw frame");
            break;
        }
        let Some(message) = rx.recv().await else {
            break;
        };
        match handle(dash, message) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(err) => {
                outcome = Err(err);
                break;
            }
        }
    }

    drop(rx);
    for producer in producers {
        producer.abort();
    }
    info!("dashboard loop stopped");
    outcome
}

async fn tick_producer(tx: mpsc::Sender<Message>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if tx.send(Message::Tick).await.is_err() {
            break;
        }
    }
}

async fn loading_producer(tx: mpsc::Sender<Message>) {
    let deadline = Instant::now() + LOADING_DURATION;
    let mut spinner = tokio::time::interval_at(Instant::now() + SPINNER_PERIOD, SPINNER_PERIOD);
    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                let _ = tx.send(Message::Loaded).await;
                break;
            }
            _ = spinner.tick() => {
                if tx.send(Message::Spinner).await.is_err() {
                    break;
                }
            }
        }
    }
}

async fn input_producer(tx: mpsc::Sender<Message>) {
    forward_input(EventStream::new(), tx).await;
}

/// Forwards mapped terminal events until the stream fails or ends, then
/// reports the loss so the loop can shut down.
async fn forward_input<S>(mut events: S, tx: mpsc::Sender<Message>)
where
    S: Stream<Item = io::Result<Event>> + Unpin,
{
    let reason = loop {
        let message = match events.next().await {
            Some(Ok(Event::Resize(width, height))) => Some(Message::Resize(width, height)),
            Some(Ok(event)) => keymap::command_for_event(&event).map(Message::Command),
            Some(Err(err)) => break err.to_string(),
            None => break "input stream closed".to_string(),
        };
        if let Some(message) = message {
            if tx.send(message).await.is_err() {
                return;
            }
        }
    };
    warn!(%reason, "terminal input stopped");
    let _ = tx.send(Message::InputFailed(reason)).await;
}

fn setup_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    undo_on_error(enter_screen(), || {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    })
}

fn enter_screen() -> Result<Terminal<Backend>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

/// Runs `undo` when a partially applied setup step failed.
fn undo_on_error<T>(result: Result<T>, undo: impl FnOnce()) -> Result<T> {
    if result.is_err() {
        undo();
    }
    result
}

fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use futures_util::stream;
    use pai_core::SimSettings;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn dashboard() -> Dashboard<SmallRng> {
        Dashboard::new(
            SimSettings::default(),
            SmallRng::seed_from_u64(9),
            Utc::now(),
        )
        .expect("valid settings")
    }

    #[test]
    fn loaded_clears_loading_and_spinner_advances() {
        let mut dash = dashboard();
        assert_eq!(handle(&mut dash, Message::Spinner).unwrap(), Flow::Continue);
        assert_eq!(dash.view_state().spinner_frame, 1);
        handle(&mut dash, Message::Loaded).unwrap();
        assert!(!dash.view_state().loading);
    }

    #[test]
    fn tick_and_resize_update_view() {
        let mut dash = dashboard();
        handle(&mut dash, Message::Tick).unwrap();
        handle(&mut dash, Message::Resize(120, 40)).unwrap();
        assert_eq!(dash.view_state().ticks, 1);
        assert_eq!((dash.view_state().width, dash.view_state().height), (120, 40));
    }

    #[test]
    fn quit_command_ends_loop() {
        let mut dash = dashboard();
        assert_eq!(
            handle(&mut dash, Message::Command(Command::Quit)).unwrap(),
            Flow::Quit
        );
        assert_eq!(
            handle(&mut dash, Message::Command(Command::Down)).unwrap(),
            Flow::Continue
        );
    }

    #[test]
    fn lost_input_is_fatal() {
        let mut dash = dashboard();
        let err = handle(&mut dash, Message::InputFailed("device gone".into()))
            .expect_err("input loss ends the loop");
        assert!(err.to_string().contains("device gone"));
    }

    #[tokio::test]
    async fn input_error_is_forwarded_after_pending_keys() {
        let (tx, mut rx) = mpsc::channel(MESSAGE_QUEUE_CAPACITY);
        let events = stream::iter(vec![
            Ok(Event::Key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE))),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "tty closed")),
            Ok(Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE))),
        ]);
        forward_input(events, tx).await;

        assert_eq!(rx.recv().await, Some(Message::Command(Command::Down)));
        match rx.recv().await {
            Some(Message::InputFailed(reason)) => assert!(reason.contains("tty closed")),
            other => panic!("expected input failure, got {other:?}"),
        }
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn closed_input_stream_is_reported() {
        let (tx, mut rx) = mpsc::channel(MESSAGE_QUEUE_CAPACITY);
        forward_input(stream::empty::<io::Result<Event>>(), tx).await;
        assert!(matches!(rx.recv().await, Some(Message::InputFailed(_))));
    }

    #[test]
    fn failed_setup_step_is_undone() {
        let mut undone = false;
        let result: Result<()> = undo_on_error(Err(anyhow!("no tty")), || undone = true);
        assert!(result.is_err());
        assert!(undone);

        let mut undone = false;
        let result = undo_on_error(Ok(5), || undone = true);
        assert_eq!(result.unwrap(), 5);
        assert!(!undone);
    }

    #[tokio::test(start_paused = true)]
    async fn loading_sequence_ends_with_loaded() {
        let (tx, mut rx) = mpsc::channel(MESSAGE_QUEUE_CAPACITY);
        tokio::spawn(loading_producer(tx));
        let mut spinners = 0;
        while let Some(message) = rx.recv().await {
            match message {
                Message::Spinner => spinners += 1,
                Message::Loaded => break,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!((15..=18).contains(&spinners), "{spinners} spinner frames");
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let (tx, mut rx) = mpsc::channel(MESSAGE_QUEUE_CAPACITY);
        let start = Instant::now();
        tokio::spawn(tick_producer(tx, Duration::from_millis(2000)));
        assert_eq!(rx.recv().await, Some(Message::Tick));
        assert!(start.elapsed() >= Duration::from_millis(2000));
    }
}
