use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::Rect;
use segment::{Error as SegmentError, SegmentGateway};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    action::{Action, Notice, SubmitOutcome},
    components::{
        home::Home, notifications::Notifications, segment_panel::SegmentPanel, Component,
    },
    config::Config,
    state::State,
    tui::{Event, EventResponse, Frame, Tui},
};

pub struct App {
    config: Config,
    gateway: Arc<dyn SegmentGateway>,
    state: State,
    home: Home,
    panel: SegmentPanel,
    notifications: Notifications,
    should_quit: bool,
    should_suspend: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(config: Config, gateway: Arc<dyn SegmentGateway>) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let home = Home::new(config.endpoint().unwrap_or("-"));
        Ok(Self {
            config,
            gateway,
            state: State::new(),
            home,
            panel: SegmentPanel::new(),
            notifications: Notifications::new(),
            should_quit: false,
            should_suspend: false,
            action_tx,
            action_rx,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?
            .tick_rate(self.config.tick_rate)
            .frame_rate(self.config.frame_rate)
            .paste(true);
        tui.enter()?;

        self.home.init(&self.state)?;
        self.panel.init(&self.state)?;

        let action_tx = self.action_tx.clone();
        loop {
            self.handle_events(&mut tui).await?;
            self.handle_actions(&mut tui)?;
            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume)?;
                action_tx.send(Action::ClearScreen)?;
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };
        self.handle_event(event)
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = &event {
            if self.handle_global_key(*key)? {
                return Ok(());
            }
        }
        let action_tx = self.action_tx.clone();
        match event {
            Event::Tick => action_tx.send(Action::Tick)?,
            Event::Render => action_tx.send(Action::Render)?,
            Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
            Event::Error(reason) => {
                warn!(%reason, "terminal event stream reported an error");
                return Ok(());
            }
            _ => {}
        }
        self.route_event(event)
    }

    /// Keys that work everywhere. Returns true when the key was consumed.
    fn handle_global_key(&mut self, key: KeyEvent) -> Result<bool> {
        if !key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(false);
        }
        let action = match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('z') => Action::Suspend,
            _ => return Ok(false),
        };
        info!("Got action: {action:?}");
        self.action_tx.send(action)?;
        Ok(true)
    }

    /// The panel sits on top of the home page and gets the event first.
    fn route_event(&mut self, event: Event) -> Result<()> {
        let response = match self.panel.handle_events(event.clone(), &mut self.state)? {
            Some(response) => Some(response),
            None => self.home.handle_events(event, &mut self.state)?,
        };
        match response {
            Some(EventResponse::Stop(action)) | Some(EventResponse::Continue(action)) => {
                self.action_tx.send(action)?
            }
            None => {}
        }
        Ok(())
    }

    fn handle_actions(&mut self, tui: &mut Tui) -> Result<()> {
        while let Ok(action) = self.action_rx.try_recv() {
            match &action {
                Action::ClearScreen => tui.terminal.clear()?,
                Action::Resize(w, h) => self.handle_resize(tui, *w, *h)?,
                Action::Render => self.render(tui)?,
                _ => {}
            }
            self.dispatch(action)?;
        }
        Ok(())
    }

    /// Apply `action` to the app state, then hand it to every component.
    fn dispatch(&mut self, action: Action) -> Result<()> {
        if action != Action::Tick && action != Action::Render {
            debug!("{action:?}");
        }
        match &action {
            Action::Quit => self.should_quit = true,
            Action::Suspend => self.should_suspend = true,
            Action::Resume => self.should_suspend = false,
            Action::OpenPanel => self.state.open_panel(),
            Action::ClosePanel => self.state.close_panel(),
            Action::Submit => self.start_submission()?,
            Action::SubmissionFinished { draft, outcome } => {
                self.finish_submission(*draft, outcome)?
            }
            Action::Error(msg) => {
                warn!("{msg}");
                self.action_tx.send(Action::Notify(Notice::error(msg.clone())))?;
            }
            _ => {}
        }

        let components: [&mut dyn Component; 3] =
            [&mut self.home, &mut self.panel, &mut self.notifications];
        for component in components {
            if let Some(follow_up) = component.update(action.clone(), &mut self.state)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    /// Validate the draft and send it from a background task. The outcome
    /// comes back as [`Action::SubmissionFinished`].
    fn start_submission(&mut self) -> Result<()> {
        let payload = match self.state.session.begin_submit() {
            Ok(payload) => payload,
            Err(SegmentError::SubmissionInFlight) => {
                debug!("submit ignored, a submission is already pending");
                return Ok(());
            }
            Err(e) => {
                self.action_tx
                    .send(Action::Notify(Notice::error(e.notice())))?;
                return Ok(());
            }
        };

        let draft = self.state.session.generation();
        let gateway = Arc::clone(&self.gateway);
        let action_tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = match gateway.submit(&payload).await {
                Ok(response) => {
                    info!(status = response.status, segment = %payload.segment_name, "segment saved");
                    SubmitOutcome::Saved {
                        status: response.status,
                    }
                }
                Err(e) => {
                    warn!("segment submission failed: {e}");
                    SubmitOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            if action_tx
                .send(Action::SubmissionFinished { draft, outcome })
                .is_err()
            {
                debug!("app closed before the submission finished");
            }
        });
        Ok(())
    }

    /// Outcomes of a draft that was discarded in the meantime only produce
    /// the toast; the draft on screen stays as it is.
    fn finish_submission(&mut self, draft: u64, outcome: &SubmitOutcome) -> Result<()> {
        match outcome {
            SubmitOutcome::Saved { .. } => {
                let current = self.state.session.finish_submit(draft, true);
                self.action_tx
                    .send(Action::Notify(Notice::success("Segment saved successfully!")))?;
                if current && self.state.panel_open {
                    self.action_tx.send(Action::ClosePanel)?;
                }
            }
            SubmitOutcome::Failed { reason } => {
                self.state.session.finish_submit(draft, false);
                debug!(%reason, "submission failed, draft kept");
                self.action_tx
                    .send(Action::Notify(Notice::error("Failed to save segment")))?;
            }
        }
        Ok(())
    }

    fn handle_resize(&mut self, tui: &mut Tui, w: u16, h: u16) -> Result<()> {
        tui.resize(Rect::new(0, 0, w, h))?;
        self.render(tui)?;
        Ok(())
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        let action_tx = self.action_tx.clone();
        tui.draw(|frame| {
            let area = frame.area();
            if let Err(err) = self.draw(frame, area) {
                let _ = action_tx.send(Action::Error(format!("Failed to draw: {:?}", err)));
            }
        })?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        self.home.draw(frame, area, &self.state)?;
        self.panel.draw(frame, area, &self.state)?;
        self.notifications.draw(frame, area, &self.state)?;
        Ok(())
    }
}
