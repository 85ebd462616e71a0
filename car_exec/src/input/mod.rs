//! Operator input module
//!
//! Polls the three mode buttons and turns edges into task selections. The
//! third button doubles up: a short press selects the single figure-of-eight
//! task, holding it past the long-press threshold selects the looping task.
//! Polling is edge-based and never blocks waiting for a release.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Deserialize;

// Internal
use crate::path_mgr::MotionMode;
use hw_if::eqpt::button::NUM_BUTTONS;
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Mode selection.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Hold time on the third button that selects the looping task rather
    /// than the single run.
    ///
    /// Units: milliseconds
    pub long_press_ms: u64,

    /// Minimum time between two accepted selections, suppressing bounce
    /// across buttons.
    ///
    /// Units: milliseconds
    pub press_dwell_ms: u64,
}

/// Mode button poller.
#[derive(Default)]
pub struct ModeSelect {
    params: Params,

    /// Button states at the previous poll, for edge detection.
    prev: [bool; NUM_BUTTONS],

    /// Time the third button went down, while it is held.
    hold_start_ms: Option<u64>,

    /// Set once a hold has selected the looping task, so the eventual
    /// release doesn't also fire the short press.
    hold_consumed: bool,

    /// Time of the last accepted selection, for the inter-press dwell.
    last_select_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Params {
            long_press_ms: 500,
            press_dwell_ms: 300,
        }
    }
}

impl ModeSelect {
    /// Initialise the poller from the given parameter file.
    pub fn init(params_path: &str) -> Result<Self, params::LoadError> {
        Ok(Self::with_params(params::load(params_path)?))
    }

    /// Create a poller with the given parameters, without touching the
    /// filesystem.
    pub fn with_params(params: Params) -> Self {
        ModeSelect {
            params,
            ..ModeSelect::default()
        }
    }

    /// Poll the buttons, returning a task selection if one was made.
    ///
    /// While a task is running the buttons are tracked but selections are
    /// suppressed, so a press mid-run doesn't switch course.
    pub fn poll(
        &mut self,
        buttons: [bool; NUM_BUTTONS],
        task_active: bool,
        now_ms: u64,
    ) -> Option<MotionMode> {
        let mut pressed = [false; NUM_BUTTONS];
        let mut released = [false; NUM_BUTTONS];
        for i in 0..NUM_BUTTONS {
            pressed[i] = buttons[i] && !self.prev[i];
            released[i] = !buttons[i] && self.prev[i];
        }

        let mut selection = None;

        if pressed[0] {
            selection = Some(MotionMode::Task1);
        } else if pressed[1] {
            selection = Some(MotionMode::Task2);
        }

        // Third button: short press on release, long press while held
        if pressed[2] {
            self.hold_start_ms = Some(now_ms);
            self.hold_consumed = false;
        }

        if let Some(start) = self.hold_start_ms {
            if buttons[2]
                && !self.hold_consumed
                && now_ms.saturating_sub(start) >= self.params.long_press_ms
            {
                self.hold_consumed = true;
                selection = Some(MotionMode::Task4);
            }
        }

        if released[2] {
            if !self.hold_consumed && self.hold_start_ms.is_some() {
                selection = Some(MotionMode::Task3);
            }
            self.hold_start_ms = None;
            self.hold_consumed = false;
        }

        self.prev = buttons;

        if task_active {
            if let Some(mode) = selection {
                debug!("Button selection {:?} suppressed, task running", mode);
            }
            return None;
        }

        // Inter-press dwell: a selection hot on the heels of the previous
        // one is bounce, not intent
        if let (Some(_), Some(last)) = (selection, self.last_select_ms) {
            if now_ms.saturating_sub(last) < self.params.press_dwell_ms {
                return None;
            }
        }

        if selection.is_some() {
            self.last_select_ms = Some(now_ms);
        }

        selection
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const NONE: [bool; 3] = [false; 3];

    fn select() -> ModeSelect {
        ModeSelect::with_params(Params::default())
    }

    #[test]
    fn test_press_edges_select_tasks() {
        let mut sel = select();

        assert_eq!(sel.poll([true, false, false], false, 0), Some(MotionMode::Task1));

        // Held button doesn't re-fire
        assert_eq!(sel.poll([true, false, false], false, 10), None);
        assert_eq!(sel.poll(NONE, false, 20), None);

        assert_eq!(sel.poll([false, true, false], false, 1000), Some(MotionMode::Task2));
    }

    #[test]
    fn test_short_press_selects_on_release() {
        let mut sel = select();

        assert_eq!(sel.poll([false, false, true], false, 0), None);
        assert_eq!(sel.poll([false, false, true], false, 100), None);
        assert_eq!(sel.poll(NONE, false, 200), Some(MotionMode::Task3));
    }

    #[test]
    fn test_long_hold_selects_loop_task() {
        let mut sel = select();

        assert_eq!(sel.poll([false, false, true], false, 0), None);
        assert_eq!(sel.poll([false, false, true], false, 400), None);
        assert_eq!(
            sel.poll([false, false, true], false, 600),
            Some(MotionMode::Task4)
        );

        // Keeping it held doesn't re-fire, and the release after a long
        // hold must not also fire the short press
        assert_eq!(sel.poll([false, false, true], false, 900), None);
        assert_eq!(sel.poll(NONE, false, 1000), None);
    }

    #[test]
    fn test_inter_press_dwell() {
        let mut sel = select();

        assert_eq!(sel.poll([true, false, false], false, 0), Some(MotionMode::Task1));
        sel.poll(NONE, false, 50);

        // A second press inside the dwell is bounce
        assert_eq!(sel.poll([false, true, false], false, 100), None);
        sel.poll(NONE, false, 150);

        // Past the dwell it's a real selection
        assert_eq!(sel.poll([false, true, false], false, 500), Some(MotionMode::Task2));
    }

    #[test]
    fn test_selections_suppressed_while_running() {
        let mut sel = select();

        assert_eq!(sel.poll([true, false, false], true, 0), None);

        // The edge was consumed, releasing and re-pressing while idle works
        sel.poll(NONE, false, 10);
        assert_eq!(sel.poll([true, false, false], false, 20), Some(MotionMode::Task1));
    }
}
