//! Side panel shell and launcher button state.
//!
//! The shell owns visibility and width; the launcher follows the URL with its
//! own debounce and reflects panel visibility as its pressed state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::host::{HostPage, PageSnapshot};
use crate::messenger::{PanelCommand, Publisher, PushEvent};
use crate::navigation::{is_launcher_page, NavigationAdapter};
use crate::watch::Debouncer;

pub const DEFAULT_PANEL_WIDTH: u32 = 450;
pub const MIN_PANEL_WIDTH: u32 = 300;
pub const MAX_PANEL_WIDTH: u32 = 800;

/// Element id the shim gives the injected launcher button.
pub const LAUNCHER_ELEMENT_ID: &str = "jobwatch-launcher";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LauncherState {
    present: bool,
    reinjections: u32,
}

impl LauncherState {
    /// Shows or removes the launcher for `url`. Returns true on change.
    pub fn sync(&mut self, url: &str) -> bool {
        let wanted = is_launcher_page(url);
        let changed = wanted != self.present;
        self.present = wanted;
        changed
    }

    pub fn remove(&mut self) -> bool {
        std::mem::replace(&mut self.present, false)
    }

    /// Host DOM updates can drop the injected button. Returns true when the
    /// launcher should be shown but the document no longer contains it.
    pub fn ensure_present(&mut self, snapshot: &PageSnapshot) -> bool {
        if !self.present || !is_launcher_page(&snapshot.url) {
            return false;
        }
        if snapshot.html.contains(LAUNCHER_ELEMENT_ID) {
            return false;
        }
        self.reinjections += 1;
        true
    }

    pub fn is_present(&self) -> bool {
        self.present
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub visible: bool,
    pub width: u32,
    pub launcher_visible: bool,
    /// The launcher's pressed state mirrors panel visibility.
    pub launcher_active: bool,
    pub launcher_reinjections: u32,
}

#[derive(Debug)]
struct ShellState {
    visible: bool,
    width: u32,
    launcher: LauncherState,
}

#[derive(Clone)]
pub struct PanelShell {
    state: Arc<Mutex<ShellState>>,
    publisher: Arc<dyn Publisher>,
}

impl PanelShell {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ShellState {
                visible: false,
                width: DEFAULT_PANEL_WIDTH,
                launcher: LauncherState::default(),
            })),
            publisher,
        }
    }

    pub fn apply(&self, command: PanelCommand) -> PanelView {
        match command {
            PanelCommand::TogglePanel => self.toggle(),
            PanelCommand::ShowPanel => self.show(),
            PanelCommand::ClosePanel => self.hide(),
            PanelCommand::Resize { width } => self.resize(width),
        }
    }

    pub fn toggle(&self) -> PanelView {
        let visible = !self.view().visible;
        self.set_visible(visible)
    }

    pub fn show(&self) -> PanelView {
        self.set_visible(true)
    }

    pub fn hide(&self) -> PanelView {
        self.set_visible(false)
    }

    /// Clamps to the allowed range; the width survives page loads.
    pub fn resize(&self, width: u32) -> PanelView {
        self.update(|state| {
            state.width = width.clamp(MIN_PANEL_WIDTH, MAX_PANEL_WIDTH);
        })
    }

    pub fn sync_launcher(&self, url: &str) -> PanelView {
        self.update(|state| {
            if state.launcher.sync(url) {
                info!(url, visible = state.launcher.is_present(), "launcher updated");
            }
        })
    }

    pub fn remove_launcher(&self) -> PanelView {
        self.update(|state| {
            if state.launcher.remove() {
                debug!("launcher removed");
            }
        })
    }

    pub fn ensure_launcher(&self, snapshot: &PageSnapshot) -> PanelView {
        self.update(|state| {
            if state.launcher.ensure_present(snapshot) {
                info!(
                    reinjections = state.launcher.reinjections,
                    "launcher missing from document, re-injecting"
                );
            }
        })
    }

    pub fn view(&self) -> PanelView {
        self.update(|_| {})
    }

    fn set_visible(&self, visible: bool) -> PanelView {
        let mut changed = false;
        let view = self.update(|state| {
            changed = state.visible != visible;
            state.visible = visible;
        });
        if changed {
            info!(visible, "panel visibility changed");
            self.publisher.publish(PushEvent::PanelStateChanged { visible });
        }
        view
    }

    fn update(&self, f: impl FnOnce(&mut ShellState)) -> PanelView {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state);
        PanelView {
            visible: state.visible,
            width: state.width,
            launcher_visible: state.launcher.present,
            launcher_active: state.launcher.present && state.visible,
            launcher_reinjections: state.launcher.reinjections,
        }
    }
}

/// Keeps the launcher in step with the URL (debounced) and with host DOM
/// updates that may have dropped it.
pub fn spawn_launcher(
    shell: PanelShell,
    adapter: &NavigationAdapter,
    page: HostPage,
    debounce: Duration,
) -> JoinHandle<()> {
    let mut signals = adapter.subscribe();
    let mut mutations = page.subscribe_mutations();

    tokio::spawn(async move {
        let mut timer = Debouncer::new(debounce);
        loop {
            let deadline = timer.deadline();
            tokio::select! {
                signal = signals.recv() => match signal {
                    Ok(_) | Err(RecvError::Lagged(_)) => timer.arm(Instant::now()),
                    Err(RecvError::Closed) => break,
                },
                batch = mutations.recv() => match batch {
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        shell.ensure_launcher(&page.snapshot());
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    timer.cancel();
                    shell.sync_launcher(&page.href());
                }
            }
        }
    })
}
