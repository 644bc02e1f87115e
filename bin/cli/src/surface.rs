//! Terminal notification surface.

use async_trait::async_trait;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use waypost_scheduler::{Notification, NotificationError, NotificationSurface, Permission};

/// Shows notifications on stdout and asks for permission on stdin.
#[derive(Debug)]
pub struct TerminalSurface {
    permission: Mutex<Permission>,
    prompt_timeout: Duration,
}

impl TerminalSurface {
    #[must_use]
    pub fn new(permission: Permission, prompt_timeout: Duration) -> Self {
        Self {
            permission: Mutex::new(permission),
            prompt_timeout,
        }
    }

    fn set_permission(&self, permission: Permission) {
        *self.permission.lock().unwrap_or_else(PoisonError::into_inner) = permission;
    }
}

/// Renders a notification as terminal text.
#[must_use]
pub fn render(notification: &Notification) -> String {
    format!(
        "== {} [{}] ==\n{}\n",
        notification.title, notification.tag, notification.body
    )
}

fn print_notification(notification: &Notification) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(render(notification).as_bytes())?;
    stdout.flush()
}

fn read_stdin_line() -> io::Result<String> {
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer)
}

/// Waits up to `timeout` for `read_line` to produce an answer.
///
/// The read runs on its own thread, outside the runtime's blocking pool, so
/// an unanswered prompt never holds up runtime shutdown. No answer in time
/// leaves the permission at `Default`.
async fn await_answer<F>(read_line: F, timeout: Duration) -> Permission
where
    F: FnOnce() -> io::Result<String> + Send + 'static,
{
    let (reply, answer) = oneshot::channel();
    let spawned = thread::Builder::new()
        .name("permission-prompt".to_string())
        .spawn(move || {
            // The receiver is gone only when the prompt timed out.
            let _ = reply.send(read_line());
        });
    if let Err(e) = spawned {
        warn!(error = %e, "permission prompt failed");
        return Permission::Denied;
    }

    match tokio::time::timeout(timeout, answer).await {
        Ok(Ok(Ok(line))) => match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Permission::Granted,
            _ => Permission::Denied,
        },
        Ok(Ok(Err(e))) => {
            warn!(error = %e, "permission prompt failed");
            Permission::Denied
        }
        Ok(Err(_)) => Permission::Denied,
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "permission prompt unanswered");
            Permission::Default
        }
    }
}

#[async_trait]
impl NotificationSurface for TerminalSurface {
    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn request_permission(&self) -> Permission {
        if !io::stdin().is_terminal() {
            debug!("stdin is not a terminal; notifications denied");
            self.set_permission(Permission::Denied);
            return Permission::Denied;
        }

        print!("Allow workflow notifications? [y/N] ");
        let answer = match io::stdout().flush() {
            Ok(()) => await_answer(read_stdin_line, self.prompt_timeout).await,
            Err(e) => {
                warn!(error = %e, "permission prompt failed");
                Permission::Denied
            }
        };
        self.set_permission(answer);
        answer
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        print_notification(notification).map_err(|e| NotificationError::DeliveryFailed {
            reason: e.to_string(),
        })
    }
}
