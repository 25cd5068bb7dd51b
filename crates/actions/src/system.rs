// crates/actions/src/system.rs

use async_trait::async_trait;
use chrono::Local;
use std::process::Command as ProcessCommand;
use tracing::info;

use crate::web::open_url;
use crate::{ActionHandler, SecurityConfig};
use aari_core::{AariError, AariResult, DispatchRequest, EntityKind, HandlerId, TaskOutcome};

/// How a known application is started on each platform. `None` means the
/// app has no launcher there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppLauncher {
    Program {
        windows: Option<&'static str>,
        macos: Option<&'static str>,
        linux: Option<&'static str>,
    },
    Url(&'static str),
}

const fn program(
    windows: Option<&'static str>,
    macos: Option<&'static str>,
    linux: Option<&'static str>,
) -> AppLauncher {
    AppLauncher::Program {
        windows,
        macos,
        linux,
    }
}

/// Apps the system handler may start. Anything not listed is refused, so a
/// spoken app name is never run as a program.
const APP_LAUNCHERS: &[(&[&str], AppLauncher)] = &[
    (
        &["chrome", "google chrome"],
        program(Some("chrome"), Some("Google Chrome"), Some("google-chrome")),
    ),
    (&["firefox"], program(Some("firefox"), Some("Firefox"), Some("firefox"))),
    (
        &["edge", "microsoft edge"],
        program(Some("msedge"), Some("Microsoft Edge"), Some("microsoft-edge")),
    ),
    (&["notepad"], program(Some("notepad"), Some("TextEdit"), Some("gedit"))),
    (
        &["calculator"],
        program(Some("calc"), Some("Calculator"), Some("gnome-calculator")),
    ),
    (
        &["file manager", "file explorer", "files", "explorer"],
        program(Some("explorer"), Some("Finder"), Some("nautilus")),
    ),
    (
        &["settings", "windows settings"],
        program(
            Some("ms-settings:"),
            Some("System Settings"),
            Some("gnome-control-center"),
        ),
    ),
    (
        &["terminal"],
        program(Some("wt"), Some("Terminal"), Some("x-terminal-emulator")),
    ),
    (
        &["vscode", "visual studio code"],
        program(Some("code"), Some("Visual Studio Code"), Some("code")),
    ),
    (&["spotify"], program(Some("spotify"), Some("Spotify"), Some("spotify"))),
    (&["vlc"], program(Some("vlc"), Some("VLC"), Some("vlc"))),
    (&["slack"], program(Some("slack"), Some("Slack"), Some("slack"))),
    (&["discord"], program(Some("discord"), Some("Discord"), Some("discord"))),
    (
        &["telegram"],
        program(Some("telegram"), Some("Telegram"), Some("telegram-desktop")),
    ),
    (&["zoom"], program(Some("zoom"), Some("zoom.us"), Some("zoom"))),
    (&["whatsapp"], AppLauncher::Url("https://web.whatsapp.com")),
    (&["gmail", "email"], AppLauncher::Url("https://mail.google.com")),
];

pub fn app_launcher(app_name: &str) -> Option<AppLauncher> {
    let app_name = app_name.trim().to_lowercase();
    APP_LAUNCHERS
        .iter()
        .find(|(names, _)| names.contains(&app_name.as_str()))
        .map(|(_, launcher)| *launcher)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemOperation {
    Shutdown,
    Restart,
    Sleep,
    Lock,
    VolumeUp,
    VolumeDown,
    Mute,
    CurrentTime,
    CurrentDate,
}

/// Phrase table in match order; the first phrase found wins.
const OPERATIONS: &[(&[&str], SystemOperation)] = &[
    (&["shut down", "shutdown"], SystemOperation::Shutdown),
    (&["restart", "reboot"], SystemOperation::Restart),
    (&["sleep"], SystemOperation::Sleep),
    (&["lock"], SystemOperation::Lock),
    (&["volume up", "louder"], SystemOperation::VolumeUp),
    (&["volume down", "quieter"], SystemOperation::VolumeDown),
    (&["mute"], SystemOperation::Mute),
    (&["current time", "what time"], SystemOperation::CurrentTime),
    (&["current date", "what date", "today date"], SystemOperation::CurrentDate),
];

impl SystemOperation {
    pub fn parse(command: &str) -> Option<Self> {
        let command = command.to_lowercase();
        OPERATIONS
            .iter()
            .find(|(phrases, _)| phrases.iter().any(|p| command.contains(p)))
            .map(|(_, op)| *op)
    }

    fn message(&self) -> String {
        match self {
            SystemOperation::Shutdown => "Shutting down in 30 seconds".to_string(),
            SystemOperation::Restart => "Restarting in 30 seconds".to_string(),
            SystemOperation::Sleep => "Going to sleep mode".to_string(),
            SystemOperation::Lock => "Screen locked".to_string(),
            SystemOperation::VolumeUp => "Volume increased".to_string(),
            SystemOperation::VolumeDown => "Volume decreased".to_string(),
            SystemOperation::Mute => "Muted".to_string(),
            SystemOperation::CurrentTime => {
                format!("Current time: {}", Local::now().format("%H:%M:%S"))
            }
            SystemOperation::CurrentDate => {
                format!("Today is {}", Local::now().format("%A, %B %d, %Y"))
            }
        }
    }

    /// Program and arguments performing the operation, `None` when nothing
    /// has to run.
    fn command(&self) -> Option<(&'static str, Vec<String>)> {
        fn args(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        match self {
            SystemOperation::CurrentTime | SystemOperation::CurrentDate => None,
            SystemOperation::Shutdown => Some(if cfg!(target_os = "windows") {
                ("shutdown", args(&["/s", "/t", "30"]))
            } else {
                ("shutdown", args(&["-h", "+1"]))
            }),
            SystemOperation::Restart => Some(if cfg!(target_os = "windows") {
                ("shutdown", args(&["/r", "/t", "30"]))
            } else {
                ("shutdown", args(&["-r", "+1"]))
            }),
            SystemOperation::Sleep => Some(if cfg!(target_os = "macos") {
                ("pmset", args(&["sleepnow"]))
            } else {
                ("systemctl", args(&["suspend"]))
            }),
            SystemOperation::Lock => Some(if cfg!(target_os = "windows") {
                ("rundll32", args(&["user32.dll,LockWorkStation"]))
            } else if cfg!(target_os = "macos") {
                ("pmset", args(&["displaysleepnow"]))
            } else {
                ("loginctl", args(&["lock-session"]))
            }),
            SystemOperation::VolumeUp => Some(("amixer", args(&["set", "Master", "5%+"]))),
            SystemOperation::VolumeDown => Some(("amixer", args(&["set", "Master", "5%-"]))),
            SystemOperation::Mute => Some(("amixer", args(&["set", "Master", "mute"]))),
        }
    }
}

pub struct SystemActions {
    security: SecurityConfig,
    dry_run: bool,
}

impl SystemActions {
    pub fn new(security: SecurityConfig, dry_run: bool) -> AariResult<Self> {
        Ok(Self { security, dry_run })
    }

    fn blocked_phrase(&self, command: &str) -> Option<&str> {
        let command = command.to_lowercase();
        self.security
            .blocked_commands
            .iter()
            .find(|blocked| command.contains(&blocked.to_lowercase()))
            .map(String::as_str)
    }

    fn execute_system_command(&self, program: &str, args: &[String]) -> AariResult<String> {
        if !self.security.allow_system_commands {
            return Err(AariError::Action(
                "System commands are disabled".to_string(),
            ));
        }

        if self.dry_run {
            info!("[dry run] would run {} {:?}", program, args);
            return Ok(String::new());
        }

        let output = ProcessCommand::new(program)
            .args(args)
            .output()
            .map_err(|e| AariError::Action(format!("Failed to execute command: {}", e)))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(AariError::Action(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ))
        }
    }

    fn open_app(&self, app_name: &str) -> AariResult<TaskOutcome> {
        let target = match app_launcher(app_name) {
            None => {
                return Ok(TaskOutcome::error(format!(
                    "I don't know how to open {}",
                    app_name
                )))
            }
            Some(AppLauncher::Url(url)) => {
                open_url(url, self.dry_run)?;
                return Ok(TaskOutcome::success(format!("Opening {}", app_name)));
            }
            Some(AppLauncher::Program {
                windows,
                macos,
                linux,
            }) => {
                if cfg!(target_os = "windows") {
                    windows
                } else if cfg!(target_os = "macos") {
                    macos
                } else {
                    linux
                }
            }
        };

        let Some(target) = target else {
            return Ok(TaskOutcome::error(format!(
                "{} is not available on this system",
                app_name
            )));
        };

        let (program, args): (&str, Vec<String>) = if cfg!(target_os = "windows") {
            (
                "cmd",
                vec![
                    "/c".to_string(),
                    "start".to_string(),
                    String::new(),
                    target.to_string(),
                ],
            )
        } else if cfg!(target_os = "macos") {
            ("open", vec!["-a".to_string(), target.to_string()])
        } else {
            (target, Vec::new())
        };

        self.execute_system_command(program, &args)?;
        Ok(TaskOutcome::success(format!("Opening {}", app_name)))
    }
}

#[async_trait]
impl ActionHandler for SystemActions {
    fn can_handle(&self, handler: HandlerId) -> bool {
        handler == HandlerId::System
    }

    async fn execute(&self, request: &DispatchRequest) -> AariResult<TaskOutcome> {
        if let Some(blocked) = self.blocked_phrase(&request.utterance) {
            return Ok(TaskOutcome::error(format!(
                "'{}' is blocked by the security policy",
                blocked
            )));
        }

        if let Some(app) = request.entities.get(EntityKind::App) {
            return self.open_app(app);
        }

        let Some(operation) = SystemOperation::parse(&request.utterance) else {
            return Ok(TaskOutcome::error(format!(
                "Command not supported: {}",
                request.utterance.trim()
            )));
        };

        if let Some((program, args)) = operation.command() {
            self.execute_system_command(program, &args)?;
        }
        Ok(TaskOutcome::success(operation.message()))
    }

    fn name(&self) -> &str {
        "SystemActions"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aari_core::{EntityMap, Intent};

    fn request(utterance: &str, app: Option<&str>) -> DispatchRequest {
        let mut entities = EntityMap::new();
        entities.insert_opt(EntityKind::App, app.map(str::to_string));
        DispatchRequest {
            handler: HandlerId::System,
            intent: Intent::SystemControl,
            entities,
            utterance: utterance.to_string(),
            contact_number: None,
        }
    }

    fn actions() -> SystemActions {
        SystemActions::new(SecurityConfig::default(), true).unwrap()
    }

    #[test]
    fn parses_operations_in_table_order() {
        assert_eq!(SystemOperation::parse("Lock the screen"), Some(SystemOperation::Lock));
        assert_eq!(
            SystemOperation::parse("turn the volume up"),
            Some(SystemOperation::VolumeUp)
        );
        assert_eq!(SystemOperation::parse("restart and lock"), Some(SystemOperation::Restart));
        assert_eq!(SystemOperation::parse("dance"), None);
    }

    #[tokio::test]
    async fn opens_apps_in_dry_run() {
        let outcome = actions()
            .execute(&request("open chrome", Some("chrome")))
            .await
            .unwrap();
        assert_eq!(outcome.message, "Opening chrome");
    }

    #[tokio::test]
    async fn unlisted_apps_are_never_run() {
        let live = SystemActions::new(SecurityConfig::default(), false).unwrap();
        for app in ["true", "poweroff", "rm"] {
            let outcome = live
                .execute(&request(&format!("open {}", app), Some(app)))
                .await
                .unwrap();
            assert!(!outcome.is_success(), "{}", app);
        }

        let outcome = live
            .execute(&request("open true", Some("true")))
            .await
            .unwrap();
        assert_eq!(outcome.message, "I don't know how to open true");
    }

    #[tokio::test]
    async fn power_commands_are_blocked_by_default() {
        for utterance in ["launch poweroff", "launch halt"] {
            let outcome = actions()
                .execute(&request(utterance, None))
                .await
                .unwrap();
            assert!(!outcome.is_success(), "{}", utterance);
            assert!(outcome.message.contains("blocked"), "{}", outcome.message);
        }
    }

    #[test]
    fn launcher_table_covers_multi_word_names() {
        assert!(app_launcher("File Manager").is_some());
        assert!(app_launcher("google chrome").is_some());
        assert_eq!(
            app_launcher("gmail"),
            Some(AppLauncher::Url("https://mail.google.com"))
        );
        assert_eq!(app_launcher("true"), None);
    }

    #[test]
    fn every_extractable_app_has_a_launcher() {
        for app in aari_nlu::patterns::KNOWN_APPS {
            assert!(app_launcher(app).is_some(), "{}", app);
        }
    }

    #[tokio::test]
    async fn blocked_commands_are_refused() {
        let outcome = actions()
            .execute(&request("shutdown the computer", None))
            .await
            .unwrap();
        assert!(!outcome.is_success());
        assert!(outcome.message.contains("shutdown"));
    }

    #[tokio::test]
    async fn disabled_system_commands_error() {
        let security = SecurityConfig {
            allow_system_commands: false,
            blocked_commands: Vec::new(),
        };
        let actions = SystemActions::new(security, true).unwrap();
        assert!(actions.execute(&request("lock screen", None)).await.is_err());
    }

    #[tokio::test]
    async fn unsupported_commands_report_error_status() {
        let outcome = actions().execute(&request("start the turbines", None)).await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.message, "Command not supported: start the turbines");
    }
}
