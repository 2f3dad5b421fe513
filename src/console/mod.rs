// Line-oriented operator console: stdin lines become `Command`s and each
// published snapshot is drawn as a short text summary.

use crate::commands::{Command, DomainForm, TunnelForm};
use crate::dashboard::toasts::ToastPhase;
use crate::state::{ActiveView, DashboardSnapshot, SessionState};
use crate::utils::{format_rate, format_uptime};
use std::fmt::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

const LOG_ROWS: usize = 15;

pub const HELP: &str = "\
commands:
  login <password> | logout | refresh | quit
  add <public> <local> [tcp|udp]    ports may be ranges like 8000-8010
  edit <public> <local>
  rm <port> | select <port> | select-all | rm-selected
  confirm | cancel
  domain add <domain> <port> [auto|http|https] [--auth user:pass] [--rate-limit N] [--shield]
  domain rm <domain>
  view tunnels|domains|inspector | log <id> | replay <id>
  dismiss <toast-id>";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    #[error("Failed to parse input: {0}")]
    Syntax(String),

    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a number")]
    InvalidNumber(String),
}

/// What one console line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Empty,
    Help,
    Command(Command),
}

pub fn parse_line(line: &str) -> Result<ConsoleInput, ConsoleError> {
    let words = shell_words::split(line).map_err(|e| ConsoleError::Syntax(e.to_string()))?;
    let Some((head, args)) = words.split_first() else {
        return Ok(ConsoleInput::Empty);
    };
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let command = match (head.as_str(), args.as_slice()) {
        ("help" | "?", _) => return Ok(ConsoleInput::Help),
        ("quit" | "exit", []) => Command::Quit,
        ("login", [password]) => Command::Login {
            password: password.to_string(),
        },
        ("login", _) => return Err(ConsoleError::Usage("login <password>")),
        ("logout", []) => Command::Logout,
        ("refresh", []) => Command::Refresh,
        ("add", [public, local]) => Command::AddTunnel(TunnelForm::new(*public, *local)),
        ("add", [public, local, protocol]) => Command::AddTunnel(TunnelForm {
            public_port: public.to_string(),
            local_port: local.to_string(),
            protocol: protocol.to_string(),
        }),
        ("add", _) => return Err(ConsoleError::Usage("add <public> <local> [tcp|udp]")),
        ("edit", [public, local]) => Command::EditTunnel {
            public_port: number(public)?,
            local_port: local.to_string(),
        },
        ("edit", _) => return Err(ConsoleError::Usage("edit <public> <local>")),
        ("rm", [port]) => Command::RequestStopTunnel(number(port)?),
        ("rm", _) => return Err(ConsoleError::Usage("rm <port>")),
        ("select", [port]) => Command::ToggleSelect(number(port)?),
        ("select", _) => return Err(ConsoleError::Usage("select <port>")),
        ("select-all", []) => Command::SelectAll,
        ("rm-selected", []) => Command::RequestStopSelected,
        ("confirm" | "y", []) => Command::Confirm,
        ("cancel" | "n", []) => Command::Cancel,
        ("domain", ["add", rest @ ..]) => Command::AddDomain(parse_domain_form(rest)?),
        ("domain", ["rm", domain]) => Command::RequestUnmapDomain(domain.to_string()),
        ("domain", _) => {
            return Err(ConsoleError::Usage(
                "domain add <domain> <port> [mode] [--auth user:pass] [--rate-limit N] [--shield] | domain rm <domain>",
            ))
        }
        ("view", [view]) => Command::SwitchView(
            ActiveView::parse(view).ok_or(ConsoleError::Usage("view tunnels|domains|inspector"))?,
        ),
        ("view", _) => return Err(ConsoleError::Usage("view tunnels|domains|inspector")),
        ("log", [id]) => Command::SelectLog(id.to_string()),
        ("replay", [id]) => Command::Replay(id.to_string()),
        ("dismiss", [id]) => Command::DismissToast(number(id)?),
        (other, _) => return Err(ConsoleError::Unknown(other.to_string())),
    };

    Ok(ConsoleInput::Command(command))
}

fn number<T: std::str::FromStr>(raw: &str) -> Result<T, ConsoleError> {
    raw.parse()
        .map_err(|_| ConsoleError::InvalidNumber(raw.to_string()))
}

fn parse_domain_form(args: &[&str]) -> Result<DomainForm, ConsoleError> {
    const USAGE: &str =
        "domain add <domain> <port> [auto|http|https] [--auth user:pass] [--rate-limit N] [--shield]";

    let [domain, port, rest @ ..] = args else {
        return Err(ConsoleError::Usage(USAGE));
    };
    let mut form = DomainForm::new(*domain, *port);

    let mut rest = rest.iter();
    while let Some(arg) = rest.next() {
        match *arg {
            "--auth" => {
                let value = rest.next().ok_or(ConsoleError::Usage(USAGE))?;
                let (user, pass) = value.split_once(':').ok_or(ConsoleError::Usage(USAGE))?;
                form.auth_user = Some(user.to_string());
                form.auth_pass = Some(pass.to_string());
            }
            "--rate-limit" => {
                let value = rest.next().ok_or(ConsoleError::Usage(USAGE))?;
                form.rate_limit = Some(value.to_string());
            }
            "--shield" => form.smart_shield = true,
            mode if form.mode.is_empty() && !mode.starts_with("--") => {
                form.mode = mode.to_string();
            }
            _ => return Err(ConsoleError::Usage(USAGE)),
        }
    }

    Ok(form)
}

/// Text summary of one snapshot.
pub fn render(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let status = &snapshot.status;

    if snapshot.session == SessionState::Unauthenticated {
        let _ = writeln!(out, "[login required] use: login <password>");
    }

    let link = if status.connected { "online" } else { "offline" };
    let _ = write!(
        out,
        "[{}] {} uptime {} latency {}ms",
        link,
        if status.server_address.is_empty() { "-" } else { status.server_address.as_str() },
        format_uptime(status.uptime_seconds),
        status.stats.latency_ms
    );
    if let Some(rate) = snapshot.throughput.last() {
        let _ = write!(
            out,
            " up {} down {}",
            format_rate(rate.up_bytes_per_sec),
            format_rate(rate.down_bytes_per_sec)
        );
    }
    out.push('\n');

    match snapshot.view {
        ActiveView::Tunnels => {
            let _ = writeln!(
                out,
                "tunnels ({}, {} selected)",
                status.tunnels.len(),
                snapshot.selection.len()
            );
            for (public, local) in &status.tunnels {
                let mark = if snapshot.selection.contains(public) { "x" } else { " " };
                let _ = writeln!(out, "  [{}] :{} -> {}", mark, public, local);
            }
        }
        ActiveView::Domains => {
            let _ = writeln!(out, "domains ({})", status.domains.len());
            for (domain, binding) in &status.domains {
                let _ = writeln!(
                    out,
                    "  {} -> :{} ({})",
                    domain,
                    binding.public_port,
                    binding.mode.label()
                );
            }
        }
        ActiveView::Inspector => {
            let _ = writeln!(out, "requests ({})", snapshot.logs.len());
            for entry in snapshot.logs.iter().take(LOG_ROWS) {
                let _ = writeln!(
                    out,
                    "  {} {} {} {} {}ms",
                    entry.id, entry.method, entry.url, entry.status, entry.duration_ms
                );
            }
            if let Some(detail) = &snapshot.selected_log {
                let _ = writeln!(out, "-- {} {} -> {}", detail.method, detail.url, detail.status);
                if let Some(body) = &detail.request_body {
                    let _ = writeln!(out, "request:\n{}", body);
                }
                if let Some(body) = &detail.response_body {
                    let _ = writeln!(out, "response:\n{}", body);
                }
            }
        }
    }

    if let Some(progress) = snapshot.bulk {
        let _ = writeln!(
            out,
            "STOPPED {} OF {} TUNNELS ({}%)",
            progress.completed,
            progress.total,
            progress.percentage()
        );
    }

    if let Some(prompt) = &snapshot.confirmation {
        let _ = writeln!(out, "{} {} [confirm/cancel]", prompt.title, prompt.message);
    }

    for toast in snapshot
        .toasts
        .iter()
        .filter(|toast| !matches!(toast.phase, ToastPhase::Exiting { .. }))
    {
        let _ = writeln!(out, "#{} [{:?}] {}", toast.id, toast.kind, toast.message);
    }

    out
}

/// Forward stdin lines to the dashboard until EOF or `quit`.
pub async fn read_commands(commands: mpsc::UnboundedSender<Command>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(ConsoleInput::Empty) => {}
            Ok(ConsoleInput::Help) => println!("{}", HELP),
            Ok(ConsoleInput::Command(command)) => {
                let quit = command == Command::Quit;
                if commands.send(command).is_err() || quit {
                    break;
                }
            }
            Err(e) => eprintln!("{}", e),
        }
    }

    // EOF behaves like quit
    let _ = commands.send(Command::Quit);
    Ok(())
}

/// Redraw whenever the dashboard publishes a snapshot that reads
/// differently from the last one drawn.
pub async fn render_snapshots(mut snapshots: watch::Receiver<DashboardSnapshot>) {
    let mut last = String::new();

    loop {
        let text = render(&snapshots.borrow_and_update());
        if text != last {
            println!("{}", text);
            last = text;
        }
        if snapshots.changed().await.is_err() {
            break;
        }
    }
}
