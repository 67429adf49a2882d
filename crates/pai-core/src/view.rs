use chrono::{DateTime, Utc};

/// Ephemeral UI state. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub selected: usize,
    pub detail_open: bool,
    pub width: u16,
    pub height: u16,
    pub last_refresh: DateTime<Utc>,
    pub loading: bool,
    pub ticks: u64,
    pub spinner_frame: usize,
}

impl ViewState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            selected: 0,
            detail_open: false,
            width: 0,
            height: 0,
            last_refresh: now,
            loading: true,
            ticks: 0,
            spinner_frame: 0,
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self, rows: usize) {
        if self.selected + 1 < rows {
            self.selected += 1;
        }
    }

    /// Keeps the cursor on a valid row after the registry shrank.
    pub fn clamp_selection(&mut self, rows: usize) {
        if self.selected >= rows {
            self.selected = rows.saturating_sub(1);
        }
    }

    pub fn toggle_detail(&mut self, rows: usize) {
        if rows > 0 {
            self.detail_open = !self.detail_open;
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }
}
