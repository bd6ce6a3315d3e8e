//! Interactive terminal focus timer.
//!
//! Pass the session length in minutes as the first argument (default 25).
//! Keys: `s` start, `x` stop, `t` test the alarm, `n`/`p` change the
//! alarm sound, `q` quit.

use std::io::{stdout, Stdout, Write};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{self, ClearType},
};
use tocsin::{FocusTimer, PresetId, SessionPhase, TimerConfig, TimerEvent};

fn main() -> Result<()> {
    // Logs go to stderr so redirecting them does not fight the UI.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let minutes: u64 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(25);

    let (timer, events) = FocusTimer::new(TimerConfig::default());

    terminal::enable_raw_mode()?;
    let result = run(&timer, &events, minutes * 60);
    terminal::disable_raw_mode()?;
    execute!(stdout(), cursor::Show)?;
    println!();
    result
}

fn run(timer: &FocusTimer, events: &Receiver<TimerEvent>, session_seconds: u64) -> Result<()> {
    let mut out = stdout();
    execute!(out, cursor::Hide)?;

    let mut remaining = String::from("--:--:--");
    let mut banner = format!("{} minute session ready", session_seconds / 60);

    loop {
        // Fold in whatever the background loops produced since last frame.
        for event in events.try_iter() {
            match event {
                TimerEvent::Progress(progress) => remaining = progress.remaining_hms(),
                TimerEvent::SessionComplete => {
                    banner = String::from("Session complete! Press s to go again.");
                }
                TimerEvent::PresetChanged(id) => banner = format!("Alarm sound: {id}"),
            }
        }

        draw(&mut out, timer, &remaining, &banner)?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('s') => match timer.start_session(session_seconds) {
                Ok(()) => banner = String::from("Session started"),
                Err(error) => banner = error.to_string(),
            },
            KeyCode::Char('x') => {
                timer.stop_session();
                remaining = String::from("--:--:--");
                banner = String::from("Session stopped");
            }
            KeyCode::Char('t') => {
                banner = if timer.test_selected_preset() {
                    format!("Played {}", timer.selected_preset())
                } else {
                    String::from("No playback stage could make a sound")
                };
            }
            KeyCode::Char('n') => cycle_preset(timer, 1),
            KeyCode::Char('p') => cycle_preset(timer, -1),
            _ => {}
        }
    }

    timer.stop_session();
    Ok(())
}

fn cycle_preset(timer: &FocusTimer, step: isize) {
    let all = PresetId::ALL;
    let current = all
        .iter()
        .position(|&id| id == timer.selected_preset())
        .unwrap_or(0);
    let next = (current as isize + step).rem_euclid(all.len() as isize) as usize;
    timer.select_preset(all[next]);
}

fn draw(out: &mut Stdout, timer: &FocusTimer, remaining: &str, banner: &str) -> Result<()> {
    let phase = match timer.phase() {
        SessionPhase::Idle => "idle",
        SessionPhase::Running => "running",
        SessionPhase::Completed => "completed",
        SessionPhase::Stopped => "stopped",
    };

    execute!(out, cursor::MoveTo(0, 0), terminal::Clear(ClearType::All))?;
    write!(out, "tocsin\r\n\r\n")?;
    write!(out, "  {remaining}  [{phase}]\r\n\r\n")?;
    write!(
        out,
        "  Sound: {}  ({}/8 presets ready)\r\n",
        timer.selected_preset(),
        timer.bank().available_count()
    )?;
    write!(out, "  {}\r\n\r\n", timer.audio_status().label())?;
    write!(out, "  {banner}\r\n\r\n")?;
    write!(
        out,
        "  s start   x stop   t test sound   n/p change sound   q quit\r\n"
    )?;
    out.flush()?;
    Ok(())
}
