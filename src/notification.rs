//! Transient toast messages.
//!
//! Only one toast is shown at a time. Posting a new one replaces whatever is
//! on screen.

use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use maud::{Markup, html};

/// How long a toast stays fully visible after it is posted.
pub const VISIBLE_FOR: Duration = Duration::from_secs(3);
/// How long the slide-out animation runs once the toast starts leaving.
pub const EXIT_FOR: Duration = Duration::from_millis(300);

/// How a toast is coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Neutral information.
    Info,
    /// Something worked.
    Success,
    /// Something failed.
    Error,
    /// Something needs attention.
    Warning,
}

impl Severity {
    /// The toast's background colour.
    pub fn color(self) -> &'static str {
        match self {
            Severity::Info => "#1E40AF",
            Severity::Success => "#10B981",
            Severity::Error => "#EF4444",
            Severity::Warning => "#F59E0B",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// Where a toast is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    /// Fully shown, with `remaining` left before it starts to leave.
    Visible {
        /// Time until the toast starts leaving.
        remaining: Duration,
    },
    /// Sliding out, with `remaining` left until it is gone.
    Exiting {
        /// Time until the toast is gone.
        remaining: Duration,
    },
}

/// A toast as it should be drawn right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// The text shown.
    pub message: String,
    /// The colour of the toast.
    pub severity: Severity,
    /// How far along the toast is.
    pub phase: ToastPhase,
}

impl Toast {
    /// A toast that has just been posted.
    pub fn fresh(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            phase: ToastPhase::Visible {
                remaining: VISIBLE_FOR,
            },
        }
    }

    /// The toast element.
    ///
    /// The animations are offset by the time already elapsed, so a toast
    /// rendered again on a new page picks up where it left off.
    pub fn into_html(self) -> Markup {
        let animation = match self.phase {
            ToastPhase::Visible { remaining } => format!(
                "animation: slideInRight {exit:.1}s ease, slideOutRight {exit:.1}s ease {delay:.3}s forwards;",
                exit = EXIT_FOR.as_secs_f64(),
                delay = remaining.as_secs_f64(),
            ),
            ToastPhase::Exiting { remaining } => format!(
                "animation: slideOutRight {:.3}s ease forwards;",
                remaining.as_secs_f64()
            ),
        };

        html!(
            div
                class={ "toast toast-" (self.severity.as_str()) }
                role="status"
                style={ "background: " (self.severity.color()) "; " (animation) }
            {
                (self.message)
            }
        )
    }

    /// The toast wrapped for an htmx out-of-band swap into the alert
    /// container, replacing the previous toast.
    pub fn into_oob_html(self) -> Markup {
        html!(
            div id="alert-container" hx-swap-oob="innerHTML" {
                (self.into_html())
            }
        )
    }
}

#[derive(Debug, Clone)]
struct Posted {
    message: String,
    severity: Severity,
    posted_at: Instant,
}

/// The single toast slot.
#[derive(Debug, Default)]
pub struct Notifier {
    slot: Option<Posted>,
}

impl Notifier {
    /// Create an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `message`, replacing any toast on screen.
    pub fn post(&mut self, message: impl Into<String>, severity: Severity, now: Instant) -> Toast {
        let message = message.into();
        self.slot = Some(Posted {
            message: message.clone(),
            severity,
            posted_at: now,
        });

        Toast::fresh(message, severity)
    }

    /// The toast on screen at `now`, if any.
    pub fn current(&self, now: Instant) -> Option<Toast> {
        let posted = self.slot.as_ref()?;
        let elapsed = now.saturating_duration_since(posted.posted_at);

        let phase = if elapsed < VISIBLE_FOR {
            ToastPhase::Visible {
                remaining: VISIBLE_FOR - elapsed,
            }
        } else if elapsed < VISIBLE_FOR + EXIT_FOR {
            ToastPhase::Exiting {
                remaining: VISIBLE_FOR + EXIT_FOR - elapsed,
            }
        } else {
            return None;
        };

        Some(Toast {
            message: posted.message.clone(),
            severity: posted.severity,
            phase,
        })
    }
}

/// Post a toast on the shared notifier.
///
/// A poisoned lock is logged and the toast is still returned so the response
/// that triggered it can carry it.
pub(crate) fn post_toast(
    notifier: &Mutex<Notifier>,
    message: impl Into<String>,
    severity: Severity,
) -> Toast {
    let message = message.into();

    match notifier.lock() {
        Ok(mut notifier) => notifier.post(message, severity, Instant::now()),
        Err(error) => {
            tracing::error!("could not lock notifier: {error}");
            Toast::fresh(message, severity)
        }
    }
}

/// The toast that should be drawn on a page rendered now.
pub(crate) fn current_toast(notifier: &Mutex<Notifier>) -> Option<Toast> {
    notifier
        .lock()
        .inspect_err(|error| tracing::error!("could not lock notifier: {error}"))
        .ok()?
        .current(Instant::now())
}
