use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use nix::sys::signal::{kill, sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{setsid, Pid};
use swm_core::config::DMENU_CMD;

use crate::error::Result;

/// Children are never waited on, ignoring SIGCHLD with `SA_NOCLDWAIT` makes the kernel reap them.
/// Zombies left from before we started are reaped once here.
pub(crate) fn ignore_children() -> Result<()> {
    let action = SigAction::new(
        SigHandler::SigIgn,
        SaFlags::SA_NOCLDSTOP | SaFlags::SA_NOCLDWAIT | SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // Ignoring a signal installs no handler code
    unsafe {
        sigaction(Signal::SIGCHLD, &action)?;
    }
    while let Ok(status) = waitpid(None::<Pid>, Some(WaitPidFlag::WNOHANG)) {
        if status == WaitStatus::StillAlive {
            break;
        }
    }
    Ok(())
}

/// The launcher is told which monitor to open on.
pub(crate) fn command_line(cmd: &'static [&'static str], selmon: usize) -> Vec<String> {
    let mut argv: Vec<String> = cmd.iter().map(|arg| (*arg).to_owned()).collect();
    if cmd == DMENU_CMD {
        argv.insert(1, "-m".to_owned());
        argv.insert(2, selmon.to_string());
    }
    argv
}

/// Runs `argv` in its own session with null stdio, returns the child's pid.
pub(crate) fn spawn(argv: &[String]) -> Result<u32> {
    let Some((bin, args)) = argv.split_first() else {
        return Ok(0);
    };
    let mut command = Command::new(bin);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    // Runs between fork and exec and only makes async-signal-safe calls
    unsafe {
        command.pre_exec(|| {
            setsid()?;
            sigaction(
                Signal::SIGCHLD,
                &SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty()),
            )?;
            Ok(())
        });
    }
    let child = command.spawn()?;
    tracing::debug!("Spawned {bin} with args {args:?} as {}", child.id());
    Ok(child.id())
}

/// Runs every command through `sh -c`, failures are logged and skipped.
pub(crate) fn autostart(cmds: &[String]) -> Vec<u32> {
    cmds.iter()
        .filter_map(|cmd| {
            let argv = ["sh".to_owned(), "-c".to_owned(), cmd.clone()];
            match spawn(&argv) {
                Ok(pid) => {
                    tracing::info!("Autostarted {cmd:?} as {pid}");
                    Some(pid)
                }
                Err(e) => {
                    tracing::warn!("Failed to autostart {cmd:?}: {e}");
                    None
                }
            }
        })
        .collect()
}

/// The children may be gone already, errors are ignored.
pub(crate) fn kill_autostarted(pids: &[u32]) {
    for pid in pids {
        if let Ok(raw) = i32::try_from(*pid) {
            let _ = kill(Pid::from_raw(raw), Signal::SIGTERM);
        }
    }
}

#[cfg(test)]
mod tests {
    use swm_core::config::{DMENU_CMD, TERMINAL_CMD};

    use crate::manager::spawn::command_line;

    #[test]
    fn launcher_gets_monitor_after_binary() {
        let argv = command_line(DMENU_CMD, 1);
        assert_eq!("dmenu_run", argv[0]);
        assert_eq!("-m", argv[1]);
        assert_eq!("1", argv[2]);
        assert_eq!(DMENU_CMD.len() + 2, argv.len());
    }

    #[test]
    fn other_commands_are_unchanged() {
        assert_eq!(vec!["xterm".to_owned()], command_line(TERMINAL_CMD, 1));
    }
}
