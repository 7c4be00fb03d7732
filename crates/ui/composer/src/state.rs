use segment::DraftSession;

/// Everything the components share. The draft lives here for as long as the
/// panel is open and is reset when it closes.
#[derive(Default)]
pub struct State {
    pub session: DraftSession,
    pub panel_open: bool,
    pub input_mode: InputMode,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Insert,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_panel(&mut self) {
        self.session.reset();
        self.panel_open = true;
        self.input_mode = InputMode::Insert;
    }

    pub fn close_panel(&mut self) {
        self.session.reset();
        self.panel_open = false;
        self.input_mode = InputMode::Normal;
    }
}
