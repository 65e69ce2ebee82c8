// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::BufRead;
use std::io::IsTerminal;
use std::io::Write;
use std::io::stdin;
use std::io::stdout;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::channel;
use std::time::Duration;

use crossterm::event;
use crossterm::event::DisableFocusChange;
use crossterm::event::EnableFocusChange;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::execute;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use tokio::signal::ctrl_c;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::task::JoinHandle;
use tokio::task::spawn_blocking;
use tokio::time::Interval;
use tokio::time::MissedTickBehavior;
use tokio::time::interval;

use crate::cmd::print_completion;
use crate::cmd::read_line;
use crate::collection::Collection;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::focus::detector::ActivityDetector;
use crate::focus::detector::Capabilities;
use crate::focus::monitor::Interruption;
use crate::focus::signal::FocusSignal;
use crate::focus::signal::SignalKind;
use crate::focus::signal::SignalSource;
use crate::focus::timer::FocusDuration;
use crate::focus::timer::MAX_FOCUS_MINUTES;
use crate::focus::timer::MIN_FOCUS_MINUTES;
use crate::focus::timer::PRESET_MINUTES;
use crate::focus::timer::Tick;
use crate::focus::timer::TimerState;
use crate::session::SessionContext;
use crate::session::complete_session;
use crate::settings::Settings;
use crate::types::timestamp::Timestamp;

pub async fn focus(directory: Option<String>, minutes: Option<u32>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let interactive = stdin().is_terminal() && stdout().is_terminal();
    let default = coll.settings.focus_duration()?;
    let duration = match minutes {
        Some(minutes) => FocusDuration::minutes(minutes)?,
        None if interactive => read_duration(&mut stdin().lock(), &mut stdout(), default)?,
        None => default,
    };
    let mut context = SessionContext::new(coll.settings.clone());
    context.focus_mut().set_duration(duration)?;
    let capabilities = terminal_capabilities(&coll.settings, interactive);
    let mut run = FocusRun::new(context, capabilities, Timestamp::now());

    println!(
        "Focusing for {} minutes. Press p to pause, q to abandon.",
        duration.as_minutes()
    );
    let (tx, mut events) = unbounded_channel();
    let (terminal, reader) = if interactive {
        (Some(RawTerminal::enable()?), Some(spawn_terminal_reader(tx)))
    } else {
        drop(tx);
        (None, None)
    };

    run.start(Timestamp::now())?;
    let mut ticker = interval(Duration::from_secs(1));
    let end = drive(&mut run, &mut events, &mut ticker, &mut stdout()).await;
    // The reader stops once nobody listens. Wait for it so it does not
    // swallow the answer to the next prompt.
    drop(events);
    drop(terminal);
    if let Some(reader) = reader {
        reader
            .await
            .map_err(|e| ErrorReport::new(format!("terminal reader failed: {e}")))?;
    }
    let end = end?;

    let mut context = run.into_context();
    if end == RunEnd::Abandoned {
        context.reset();
        println!("\nSession abandoned. No XP awarded.");
        return Ok(());
    }
    println!("\nTime's up!");
    let prompt = spawn_blocking(|| read_card_count(&mut stdin().lock(), &mut stdout()));
    let correct_cards = tokio::select! {
        result = prompt => result.map_err(|e| ErrorReport::new(format!("prompt failed: {e}")))??,
        _ = ctrl_c() => None,
    };
    let Some(correct_cards) = correct_cards else {
        context.reset();
        println!("\nSession abandoned. No XP awarded.");
        return Ok(());
    };
    let outcome = context.focus_mut().finish(correct_cards)?;
    println!(
        "{} minutes of focus, {} paused, {} interruptions.",
        outcome.duration_minutes,
        context.focus().paused_seconds() / 60,
        context.focus().interruptions()
    );
    let completion = complete_session(&coll.db, &coll.user_id, &outcome, Timestamp::now())?;
    print_completion(&mut stdout(), &completion)?;
    Ok(())
}

/// What a terminal can tell about the learner's attention. Focus changes
/// are reported by terminals with focus reporting; idle time is measured
/// from key input, and only counted if enabled.
fn terminal_capabilities(settings: &Settings, interactive: bool) -> Capabilities {
    Capabilities {
        window_focus: interactive,
        visibility: false,
        idle: interactive && settings.idle_detection,
    }
}

/// Terminal input during a focus session.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum TerminalEvent {
    FocusGained,
    FocusLost,
    /// A character key, lowercased.
    Key(char),
    /// Any other input: other keys, mouse, paste.
    Input,
    /// Ctrl-C. Raw mode delivers it as a key.
    Interrupt,
}

fn translate(event: Event) -> Option<TerminalEvent> {
    match event {
        Event::FocusGained => Some(TerminalEvent::FocusGained),
        Event::FocusLost => Some(TerminalEvent::FocusLost),
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                TerminalEvent::Interrupt
            }
            KeyCode::Char(c) => TerminalEvent::Key(c.to_ascii_lowercase()),
            KeyCode::Esc => TerminalEvent::Key('q'),
            _ => TerminalEvent::Input,
        }),
        Event::Mouse(_) | Event::Paste(_) => Some(TerminalEvent::Input),
        _ => None,
    }
}

/// Raw mode with focus reporting, undone on drop.
struct RawTerminal;

impl RawTerminal {
    fn enable() -> Fallible<Self> {
        enable_raw_mode()?;
        let terminal = Self;
        execute!(stdout(), EnableFocusChange)?;
        Ok(terminal)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        if let Err(e) = execute!(stdout(), DisableFocusChange).and_then(|_| disable_raw_mode()) {
            log::warn!("Failed to restore the terminal: {e}");
        }
    }
}

fn spawn_terminal_reader(events: UnboundedSender<TerminalEvent>) -> JoinHandle<()> {
    spawn_blocking(move || {
        while !events.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    log::warn!("Cannot read terminal events: {e}");
                    return;
                }
            }
            match event::read() {
                Ok(raw) => {
                    if let Some(event) = translate(raw) {
                        if events.send(event).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Cannot read terminal events: {e}");
                    return;
                }
            }
        }
    })
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum RunEnd {
    /// The countdown reached zero.
    Finished,
    Abandoned,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Step {
    Continue,
    End(RunEnd),
}

/// A focus session running in the terminal: the countdown, the detector
/// fed by terminal events, and the abandon confirmation.
struct FocusRun {
    context: SessionContext,
    detector: ActivityDetector,
    signals: Receiver<FocusSignal>,
    confirming: bool,
}

impl FocusRun {
    fn new(context: SessionContext, capabilities: Capabilities, now: Timestamp) -> Self {
        let threshold = context.settings().idle_threshold();
        let mut detector = ActivityDetector::new(capabilities, threshold, now);
        let (tx, signals) = channel();
        detector.subscribe(Box::new(move |signal: &FocusSignal| {
            let _ = tx.send(*signal);
        }));
        Self {
            context,
            detector,
            signals,
            confirming: false,
        }
    }

    fn start(&mut self, now: Timestamp) -> Fallible<()> {
        self.context.focus_mut().start(now)
    }

    fn into_context(self) -> SessionContext {
        self.context
    }

    fn tick(&mut self, now: Timestamp, output: &mut impl Write) -> Fallible<Step> {
        self.detector.tick(now);
        self.relay(output)?;
        match self.context.focus_mut().tick() {
            Tick::Finished => Ok(Step::End(RunEnd::Finished)),
            Tick::Running { remaining_seconds } => {
                if !self.confirming {
                    write!(
                        output,
                        "\r{:02}:{:02} ",
                        remaining_seconds / 60,
                        remaining_seconds % 60
                    )?;
                    output.flush()?;
                }
                Ok(Step::Continue)
            }
            Tick::Idle => Ok(Step::Continue),
        }
    }

    fn handle(
        &mut self,
        event: TerminalEvent,
        now: Timestamp,
        output: &mut impl Write,
    ) -> Fallible<Step> {
        match event {
            TerminalEvent::FocusGained => self.detector.window_focused(now),
            TerminalEvent::FocusLost => self.detector.window_blurred(now),
            TerminalEvent::Input | TerminalEvent::Key(_) => self.detector.input(now),
            TerminalEvent::Interrupt => return Ok(Step::End(RunEnd::Abandoned)),
        }
        self.relay(output)?;
        match event {
            TerminalEvent::Key(key) => self.key(key, now, output),
            _ => Ok(Step::Continue),
        }
    }

    fn key(&mut self, key: char, now: Timestamp, output: &mut impl Write) -> Fallible<Step> {
        if self.confirming {
            self.confirming = false;
            self.context.focus_mut().set_dialog_open(false);
            if key == 'y' {
                return Ok(Step::End(RunEnd::Abandoned));
            }
            write!(output, "\r\nCarrying on.\r\n")?;
            return Ok(Step::Continue);
        }
        match key {
            'p' => self.toggle_pause(now, output)?,
            'q' => {
                self.confirming = true;
                self.context.focus_mut().set_dialog_open(true);
                write!(
                    output,
                    "\r\nAbandon this session? No XP will be awarded. [y/n] "
                )?;
                output.flush()?;
            }
            _ => {}
        }
        Ok(Step::Continue)
    }

    fn toggle_pause(&mut self, now: Timestamp, output: &mut impl Write) -> Fallible<()> {
        match self.context.focus().state() {
            TimerState::Running => {
                self.context.focus_mut().pause(now);
                write!(output, "\r\nPaused. Press p to resume.\r\n")?;
            }
            TimerState::Paused => {
                self.context.focus_mut().start(now)?;
                write!(output, "\r\nResumed.\r\n")?;
                // Resuming forgets earlier disengagement; report the one
                // still in effect.
                if !self.detector.is_currently_focused() {
                    let signal = FocusSignal::new(SignalKind::Blur, now);
                    if let Some(interruption) = self.context.focus_mut().observe(&signal) {
                        self.alert(interruption, output)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Pass detector signals on to the session's monitor.
    fn relay(&mut self, output: &mut impl Write) -> Fallible<()> {
        while let Ok(signal) = self.signals.try_recv() {
            if let Some(interruption) = self.context.focus_mut().observe(&signal) {
                self.alert(interruption, output)?;
            }
        }
        Ok(())
    }

    fn alert(&self, interruption: Interruption, output: &mut impl Write) -> Fallible<()> {
        if !self.context.settings().focus_alerts {
            return Ok(());
        }
        let reason = match interruption {
            Interruption::Blur => "you left the terminal",
            Interruption::Hidden => "the terminal was hidden",
            Interruption::Idle => "no input for a while",
        };
        write!(
            output,
            "\r\nFocus interrupted: {reason}. This session will earn less XP.\r\n"
        )?;
        Ok(())
    }
}

/// Run the session until the countdown ends or the learner abandons it.
async fn drive(
    run: &mut FocusRun,
    events: &mut UnboundedReceiver<TerminalEvent>,
    ticker: &mut Interval,
    output: &mut impl Write,
) -> Fallible<RunEnd> {
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        let step = tokio::select! {
            _ = ticker.tick() => run.tick(Timestamp::now(), output)?,
            Some(event) = events.recv() => run.handle(event, Timestamp::now(), output)?,
            _ = ctrl_c() => Step::End(RunEnd::Abandoned),
        };
        if let Step::End(end) = step {
            return Ok(end);
        }
    }
}

/// Offer the preset lengths. Blank input or end of input picks `default`.
fn read_duration(
    input: &mut impl BufRead,
    output: &mut impl Write,
    default: FocusDuration,
) -> Fallible<FocusDuration> {
    let presets = PRESET_MINUTES.map(|minutes| minutes.to_string()).join("/");
    loop {
        write!(
            output,
            "Minutes [{presets}, or {MIN_FOCUS_MINUTES}-{MAX_FOCUS_MINUTES}; enter for {}]: ",
            default.as_minutes()
        )?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(default);
        };
        if line.is_empty() {
            return Ok(default);
        }
        match line.parse::<u32>().map(FocusDuration::minutes) {
            Ok(Ok(duration)) => return Ok(duration),
            Ok(Err(e)) => writeln!(output, "{}", e.message())?,
            Err(_) => writeln!(output, "Please enter a number of minutes.")?,
        }
    }
}

/// Ask how many cards the learner got right. `None` at end of input.
fn read_card_count(input: &mut impl BufRead, output: &mut impl Write) -> Fallible<Option<u32>> {
    loop {
        write!(output, "How many cards did you get right? ")?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match line.parse::<u32>() {
            Ok(count) => return Ok(Some(count)),
            Err(_) => writeln!(output, "Please enter a whole number.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crossterm::event::KeyEvent;

    use super::*;

    fn run(settings: Settings, start: Timestamp) -> Fallible<FocusRun> {
        let mut context = SessionContext::new(settings.clone());
        context.focus_mut().set_duration(FocusDuration::minutes(1)?)?;
        let mut run = FocusRun::new(context, terminal_capabilities(&settings, true), start);
        run.start(start)?;
        Ok(run)
    }

    fn text(output: &[u8]) -> String {
        String::from_utf8_lossy(output).into_owned()
    }

    #[test]
    fn test_leaving_the_terminal_costs_xp() -> Fallible<()> {
        let start = Timestamp::now();
        let mut run = run(Settings::default(), start)?;
        let mut output = Vec::new();
        run.handle(TerminalEvent::FocusLost, start.plus_seconds(5), &mut output)?;
        run.handle(TerminalEvent::FocusLost, start.plus_seconds(6), &mut output)?;
        run.handle(TerminalEvent::FocusGained, start.plus_seconds(9), &mut output)?;
        assert!(text(&output).contains("Focus interrupted: you left the terminal."));
        let mut step = Step::Continue;
        for second in 1..=60 {
            step = run.tick(start.plus_seconds(second), &mut output)?;
        }
        assert_eq!(step, Step::End(RunEnd::Finished));
        let mut context = run.into_context();
        assert_eq!(context.focus().interruptions(), 1);
        let outcome = context.focus_mut().finish(2)?;
        assert!(outcome.focus_interrupted);
        assert_eq!(outcome.xp(), 8);
        Ok(())
    }

    #[test]
    fn test_alerts_can_be_turned_off() -> Fallible<()> {
        let settings = Settings {
            focus_alerts: false,
            ..Settings::default()
        };
        let start = Timestamp::now();
        let mut run = run(settings, start)?;
        let mut output = Vec::new();
        run.handle(TerminalEvent::FocusLost, start, &mut output)?;
        assert!(!text(&output).contains("Focus interrupted"));
        assert_eq!(run.into_context().focus().interruptions(), 1);
        Ok(())
    }

    #[test]
    fn test_abandon_needs_confirmation() -> Fallible<()> {
        let start = Timestamp::now();
        let mut run = run(Settings::default(), start)?;
        let mut output = Vec::new();
        assert_eq!(
            run.handle(TerminalEvent::Key('q'), start, &mut output)?,
            Step::Continue
        );
        assert!(text(&output).contains("Abandon this session?"));
        // Signals are not counted while the question is open.
        run.handle(TerminalEvent::FocusLost, start, &mut output)?;
        run.handle(TerminalEvent::FocusGained, start, &mut output)?;
        assert_eq!(
            run.handle(TerminalEvent::Key('n'), start, &mut output)?,
            Step::Continue
        );
        assert_eq!(
            run.handle(TerminalEvent::Key('q'), start, &mut output)?,
            Step::Continue
        );
        assert_eq!(
            run.handle(TerminalEvent::Key('y'), start, &mut output)?,
            Step::End(RunEnd::Abandoned)
        );
        assert_eq!(run.into_context().focus().interruptions(), 0);
        Ok(())
    }

    #[test]
    fn test_ctrl_c_abandons() -> Fallible<()> {
        let start = Timestamp::now();
        let mut run = run(Settings::default(), start)?;
        let step = run.handle(TerminalEvent::Interrupt, start, &mut Vec::new())?;
        assert_eq!(step, Step::End(RunEnd::Abandoned));
        Ok(())
    }

    #[test]
    fn test_leaving_while_paused_counts_on_resume() -> Fallible<()> {
        let start = Timestamp::now();
        let mut run = run(Settings::default(), start)?;
        let mut output = Vec::new();
        run.handle(TerminalEvent::Key('p'), start.plus_seconds(1), &mut output)?;
        assert_eq!(run.tick(start.plus_seconds(2), &mut output)?, Step::Continue);
        run.handle(TerminalEvent::FocusLost, start.plus_seconds(3), &mut output)?;
        assert_eq!(run.context.focus().interruptions(), 0);
        run.handle(TerminalEvent::Key('p'), start.plus_seconds(30), &mut output)?;
        assert_eq!(run.context.focus().state(), TimerState::Running);
        assert_eq!(run.context.focus().interruptions(), 1);
        Ok(())
    }

    #[test]
    fn test_idle_only_counted_when_enabled() -> Fallible<()> {
        let start = Timestamp::now();
        let mut quiet = run(Settings::default(), start)?;
        let settings = Settings {
            idle_detection: true,
            ..Settings::default()
        };
        let mut watched = run(settings, start)?;
        let mut output = Vec::new();
        for second in 1..=20 {
            quiet.tick(start.plus_seconds(second), &mut output)?;
            watched.tick(start.plus_seconds(second), &mut output)?;
        }
        assert_eq!(quiet.context.focus().interruptions(), 0);
        assert_eq!(watched.context.focus().interruptions(), 1);
        Ok(())
    }

    #[test]
    fn test_non_interactive_capabilities() {
        let settings = Settings {
            idle_detection: true,
            ..Settings::default()
        };
        assert_eq!(terminal_capabilities(&settings, false), Capabilities::none());
        let caps = terminal_capabilities(&settings, true);
        assert!(caps.window_focus && caps.idle && !caps.visibility);
    }

    #[tokio::test]
    async fn test_drive_until_finished() -> Fallible<()> {
        let mut run = run(Settings::default(), Timestamp::now())?;
        let (tx, mut events) = unbounded_channel();
        tx.send(TerminalEvent::FocusLost)
            .map_err(|_| ErrorReport::new("channel closed"))?;
        tx.send(TerminalEvent::FocusGained)
            .map_err(|_| ErrorReport::new("channel closed"))?;
        drop(tx);
        let mut ticker = interval(Duration::from_millis(1));
        let mut output = Vec::new();
        let end = drive(&mut run, &mut events, &mut ticker, &mut output).await?;
        assert_eq!(end, RunEnd::Finished);
        assert_eq!(run.into_context().focus().interruptions(), 1);
        Ok(())
    }

    #[test]
    fn test_translate() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(translate(ctrl_c), Some(TerminalEvent::Interrupt));
        let p = Event::Key(KeyEvent::new(KeyCode::Char('P'), KeyModifiers::SHIFT));
        assert_eq!(translate(p), Some(TerminalEvent::Key('p')));
        let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(translate(esc), Some(TerminalEvent::Key('q')));
        let enter = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(translate(enter), Some(TerminalEvent::Input));
        assert_eq!(translate(Event::FocusLost), Some(TerminalEvent::FocusLost));
        assert_eq!(translate(Event::Resize(80, 24)), None);
    }

    #[test]
    fn test_read_duration() -> Fallible<()> {
        let default = FocusDuration::default();
        let mut output = Vec::new();
        let picked = read_duration(&mut Cursor::new("45\n"), &mut output, default)?;
        assert_eq!(picked.as_minutes(), 45);
        let picked = read_duration(&mut Cursor::new("\n"), &mut output, default)?;
        assert_eq!(picked, default);
        let picked = read_duration(&mut Cursor::new("500\nlots\n7\n"), &mut output, default)?;
        assert_eq!(picked.as_minutes(), 7);
        let prompt = text(&output);
        assert!(prompt.contains("5/15/25/45/60"));
        assert!(prompt.contains("Please enter a number of minutes."));
        Ok(())
    }

    #[test]
    fn test_read_card_count() -> Fallible<()> {
        let mut output = Vec::new();
        assert_eq!(read_card_count(&mut Cursor::new("7\n"), &mut output)?, Some(7));
        assert_eq!(
            read_card_count(&mut Cursor::new("seven\n3\n"), &mut output)?,
            Some(3)
        );
        assert_eq!(read_card_count(&mut Cursor::new(""), &mut output)?, None);
        Ok(())
    }
}
