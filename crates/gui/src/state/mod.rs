pub mod settings;

pub use settings::{AppSettings, CameraSettings, PathSettings, SettingsError, UiSettings};

/// Which chooser, if any, is open in place of the sample panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chooser {
    #[default]
    None,
    Sample,
    Level,
    TestCase,
}

/// Panel visibility flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelVisibility {
    /// Tab toggles every panel at once
    pub menu: bool,
    pub log: bool,
    pub tools: bool,
    pub chooser: Chooser,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self {
            menu: true,
            log: false,
            tools: true,
            chooser: Chooser::None,
        }
    }
}

impl PanelVisibility {
    /// Open `chooser`, closing any other; opening the open one closes it
    pub fn toggle_chooser(&mut self, chooser: Chooser) {
        self.chooser = if self.chooser == chooser {
            Chooser::None
        } else {
            chooser
        };
        if self.chooser != Chooser::None {
            self.log = false;
        }
    }

    pub fn show_log(&mut self) {
        self.log = true;
        self.chooser = Chooser::None;
    }
}
