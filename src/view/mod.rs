pub mod render;

use crate::{
    api::{GenerationApi, ImageApiClient},
    config::Config,
    controller::{
        Completion, CompletionStatus, CooldownTimer, Key, RequestController, SubmitDecision,
    },
    error::Result,
    models::SessionState,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};

const QUIT_COMMAND: &str = "/quit";
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Everything that can change the session, delivered one at a time.
#[derive(Debug, Clone)]
pub enum ViewEvent {
    Input(String),
    InputClosed,
    Tick,
    Completed(Completion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Line-oriented terminal view. Each input line replaces the prompt and
/// presses Enter.
pub struct TerminalView<W: Write> {
    controller: RequestController,
    events: UnboundedSender<ViewEvent>,
    timer: Option<CooldownTimer>,
    input_closed: bool,
    out: W,
}

impl<W: Write> TerminalView<W> {
    pub fn new(controller: RequestController, events: UnboundedSender<ViewEvent>, out: W) -> Self {
        Self {
            controller,
            events,
            timer: None,
            input_closed: false,
            out,
        }
    }

    pub fn state(&self) -> &SessionState {
        self.controller.state()
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn mount(&mut self) -> io::Result<()> {
        write!(self.out, "{}", render::banner())?;
        self.write_marker()
    }

    pub fn handle(&mut self, event: ViewEvent) -> io::Result<Flow> {
        match event {
            ViewEvent::Input(line) => self.on_input(line),
            ViewEvent::InputClosed => {
                self.input_closed = true;
                Ok(self.flow_after_input_closed())
            }
            // Ticks already queued when the timer went away are dropped.
            ViewEvent::Tick if self.timer.is_none() => Ok(Flow::Continue),
            ViewEvent::Tick => {
                let remaining = self.controller.tick();
                if remaining == 0 {
                    self.timer = None;
                }
                if render::redraw_on_tick(remaining) {
                    writeln!(self.out)?;
                    self.write_marker()?;
                }
                Ok(Flow::Continue)
            }
            ViewEvent::Completed(completion) => self.on_completed(completion),
        }
    }

    /// Cancels the cooldown timer. The session state goes with the view.
    pub fn teardown(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
            log::debug!("Cooldown timer cancelled on teardown");
        }
    }

    fn on_input(&mut self, line: String) -> io::Result<Flow> {
        if line.trim() == QUIT_COMMAND {
            return Ok(Flow::Exit);
        }

        self.controller.update_prompt(line);
        match self.controller.on_key(Key::Enter) {
            Some(SubmitDecision::Dispatched(pending)) => {
                self.write_phase()?;
                let events = self.events.clone();
                tokio::spawn(async move {
                    let completion = pending.run().await;
                    if events.send(ViewEvent::Completed(completion)).is_err() {
                        log::debug!("View closed before the response arrived");
                    }
                });
                Ok(Flow::Continue)
            }
            Some(SubmitDecision::Rejected(rejection)) => {
                writeln!(self.out, "{}", render::rejection(&rejection))?;
                self.write_marker()?;
                Ok(Flow::Continue)
            }
            Some(SubmitDecision::Invalid) => {
                self.write_phase()?;
                self.write_marker()?;
                Ok(Flow::Continue)
            }
            None => Ok(Flow::Continue),
        }
    }

    fn on_completed(&mut self, completion: Completion) -> io::Result<Flow> {
        match self.controller.complete(completion) {
            CompletionStatus::Stale => return Ok(Flow::Continue),
            CompletionStatus::Applied { cooldown_started } => {
                if cooldown_started {
                    // A fresh timer replaces any running one.
                    self.timer = Some(CooldownTimer::start(
                        TICK_PERIOD,
                        self.events.clone(),
                        ViewEvent::Tick,
                    ));
                }
            }
        }

        self.write_phase()?;
        self.write_marker()?;
        Ok(self.flow_after_input_closed())
    }

    fn flow_after_input_closed(&self) -> Flow {
        if self.input_closed && !self.controller.is_in_flight() {
            Flow::Exit
        } else {
            Flow::Continue
        }
    }

    fn write_phase(&mut self) -> io::Result<()> {
        if let Some(text) = render::phase(&self.controller.state().phase) {
            writeln!(self.out, "{}", text)?;
        }
        Ok(())
    }

    fn write_marker(&mut self) -> io::Result<()> {
        let marker = render::input_marker(self.controller.state().cooldown_secs());
        write!(self.out, "{}", marker)?;
        self.out.flush()
    }
}

/// Mounts a view on stdin/stdout and runs it until `/quit` or end of input.
pub async fn run(config: Config) -> Result<()> {
    let client = ImageApiClient::new(config.api.clone())?;
    log::info!("🎨 Generating images via {}", client.endpoint());
    let api: Arc<dyn GenerationApi> = Arc::new(client);
    let controller = RequestController::new(config.controller.clone(), api);

    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_input_reader(tx.clone());

    let mut view = TerminalView::new(controller, tx, io::stdout());
    view.mount()?;

    while let Some(event) = rx.recv().await {
        if view.handle(event)? == Flow::Exit {
            break;
        }
    }

    view.teardown();
    writeln!(io::stdout())?;
    Ok(())
}

// Blocking stdin reads get their own thread so they never hold up runtime shutdown.
fn spawn_input_reader(events: UnboundedSender<ViewEvent>) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        forward_lines(stdin.lock(), &events);
    });
}

/// Sends each input line as an event, then `InputClosed` at end of input.
/// Bytes that are not UTF-8 are replaced rather than ending the session.
fn forward_lines<R: BufRead>(mut reader: R, events: &UnboundedSender<ViewEvent>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
                if events.send(ViewEvent::Input(line.to_string())).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                break;
            }
        }
    }
    let _ = events.send(ViewEvent::InputClosed);
}
