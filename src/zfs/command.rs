//! `SnapshotBackend` over the ZFS command-line tools.

use super::SnapshotBackend;
use crate::model::{CommandFailure, Destination, RemoteTarget, SendFailure, SendStage};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;
use tracing::debug;

/// Exit status `ssh` uses for its own connection errors.
const SSH_CONNECTION_FAILURE: i32 = 255;

/// Command-line backend.
///
/// When `use_sudo` is set, commands that need privileges (`zfs` mutations,
/// `zfs diff`, `mount`, `umount`) are prefixed with `sudo`. Read-only
/// enumeration never is.
#[derive(Debug, Clone, Default)]
pub struct ZfsCli {
    use_sudo: bool,
}

impl ZfsCli {
    /// Create a backend, optionally running privileged commands through `sudo`.
    pub fn new(use_sudo: bool) -> Self {
        Self { use_sudo }
    }

    /// Whether privileged commands are prefixed with `sudo`.
    pub fn use_sudo(&self) -> bool {
        self.use_sudo
    }

    fn privileged(&self, program: &str) -> Command {
        if self.use_sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(program);
            cmd
        } else {
            Command::new(program)
        }
    }

    fn receiver(&self, target: &RemoteTarget) -> (Command, &'static str) {
        match target.destination() {
            Destination::Local => {
                let mut cmd = self.privileged("zfs");
                cmd.args(receive_args(target.dataset()));
                (cmd, "zfs")
            }
            Destination::Ssh { host } => {
                let mut cmd = Command::new("ssh");
                cmd.args(ssh_receive_args(host, target.dataset()));
                (cmd, "ssh")
            }
        }
    }
}

/// Arguments for the enumeration query.
pub fn list_snapshots_args(pools: &[String]) -> Vec<String> {
    let mut args: Vec<String> = [
        "list", "-H", "-p", "-t", "snapshot", "-o", "name,used,refer,creation",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    if !pools.is_empty() {
        args.push("-r".to_string());
        args.extend(pools.iter().cloned());
    }
    args
}

fn receive_args(dataset: &str) -> [&str; 3] {
    ["receive", "-F", dataset]
}

/// Arguments for `ssh` running a remote receive. The host follows `--` so it
/// is never parsed as an option.
pub fn ssh_receive_args<'a>(host: &'a str, dataset: &'a str) -> Vec<&'a str> {
    let mut args = vec!["-o", "BatchMode=yes", "--", host, "zfs"];
    args.extend(receive_args(dataset));
    args
}

/// Run a command to completion, capturing output.
fn run(mut cmd: Command, program: &str) -> Result<Output, CommandFailure> {
    debug!(?cmd, "running command");
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| CommandFailure::spawn(program, &e))?;
    check(output, program)
}

fn check(output: Output, program: &str) -> Result<Output, CommandFailure> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(CommandFailure {
            program: program.to_string(),
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn stdout_string(output: Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

impl SnapshotBackend for ZfsCli {
    fn list_snapshots(&self, pools: &[String]) -> Result<String, CommandFailure> {
        let mut cmd = Command::new("zfs");
        cmd.args(list_snapshots_args(pools));
        run(cmd, "zfs").map(stdout_string)
    }

    fn destroy(&self, full_name: &str) -> Result<(), CommandFailure> {
        let mut cmd = self.privileged("zfs");
        cmd.args(["destroy", full_name]);
        run(cmd, "zfs").map(|_| ())
    }

    fn mount(&self, full_name: &str, mount_point: &Path) -> Result<(), CommandFailure> {
        let mut cmd = self.privileged("mount");
        cmd.args(["-t", "zfs", "-o", "ro", full_name]).arg(mount_point);
        run(cmd, "mount").map(|_| ())
    }

    fn unmount(&self, mount_point: &Path) -> Result<(), CommandFailure> {
        let mut cmd = self.privileged("umount");
        cmd.arg(mount_point);
        run(cmd, "umount").map(|_| ())
    }

    fn is_mounted(&self, mount_point: &Path) -> Result<bool, CommandFailure> {
        let output = run(Command::new("mount"), "mount")?;
        Ok(mount_table_contains(&stdout_string(output), mount_point))
    }

    fn prepare_mount_point(&self, mount_point: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(mount_point)
    }

    fn remove_mount_point(&self, mount_point: &Path) -> std::io::Result<()> {
        std::fs::remove_dir(mount_point)
    }

    fn diff(&self, full_name: &str, dataset: &str) -> Result<String, CommandFailure> {
        let mut cmd = self.privileged("zfs");
        cmd.args(["diff", "-F", "-H", full_name, dataset]);
        run(cmd, "zfs").map(stdout_string)
    }

    fn send(&self, full_name: &str, target: &RemoteTarget) -> Result<(), SendFailure> {
        let mut sender = self.privileged("zfs");
        sender.args(["send", full_name]);
        let (receiver, receiver_program) = self.receiver(target);

        pipe_commands(sender, "zfs", receiver, receiver_program).map_err(|failure| match failure {
            PipeFailure::Sender(failure) => SendFailure {
                stage: SendStage::Send,
                failure,
            },
            PipeFailure::ReceiverSpawn(failure) => SendFailure {
                stage: match target.destination() {
                    Destination::Local => SendStage::Receive,
                    Destination::Ssh { .. } => SendStage::Transport,
                },
                failure,
            },
            PipeFailure::Receiver(failure) => SendFailure {
                stage: classify_receiver_failure(target, &failure),
                failure,
            },
        })
    }

    fn program_available(&self, program: &str) -> bool {
        program_in_path(program)
    }
}

/// Which side of a `sender | receiver` pipeline failed.
#[derive(Debug)]
enum PipeFailure {
    Sender(CommandFailure),
    ReceiverSpawn(CommandFailure),
    Receiver(CommandFailure),
}

/// Run `sender | receiver` to completion.
///
/// The sender's stderr is drained on its own thread so a noisy sender cannot
/// fill the pipe and stall. A receiver failure is reported ahead of a sender
/// failure, since the sender usually dies of the broken pipe.
fn pipe_commands(
    mut sender_cmd: Command,
    sender_program: &str,
    mut receiver_cmd: Command,
    receiver_program: &str,
) -> Result<(), PipeFailure> {
    sender_cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    debug!(cmd = ?sender_cmd, "starting send stream");
    let mut sender = sender_cmd
        .spawn()
        .map_err(|e| PipeFailure::Sender(CommandFailure::spawn(sender_program, &e)))?;

    let sender_stderr = sender.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut text = String::new();
            let _ = pipe.read_to_string(&mut text);
            text
        })
    });

    let Some(stream) = sender.stdout.take() else {
        let _ = sender.kill();
        let _ = sender.wait();
        return Err(PipeFailure::Sender(CommandFailure {
            program: sender_program.to_string(),
            status: None,
            stderr: "send stream was not captured".to_string(),
        }));
    };

    receiver_cmd
        .stdin(Stdio::from(stream))
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    debug!(cmd = ?receiver_cmd, "starting receive");
    let receiver_output = match receiver_cmd.output() {
        Ok(output) => output,
        Err(e) => {
            let _ = sender.kill();
            let _ = sender.wait();
            return Err(PipeFailure::ReceiverSpawn(CommandFailure::spawn(
                receiver_program,
                &e,
            )));
        }
    };
    let sender_status = sender
        .wait()
        .map_err(|e| PipeFailure::Sender(CommandFailure::spawn(sender_program, &e)))?;
    let sender_stderr = sender_stderr
        .and_then(|reader| reader.join().ok())
        .unwrap_or_default();

    check(receiver_output, receiver_program).map_err(PipeFailure::Receiver)?;
    if sender_status.success() {
        Ok(())
    } else {
        Err(PipeFailure::Sender(CommandFailure {
            program: sender_program.to_string(),
            status: sender_status.code(),
            stderr: sender_stderr,
        }))
    }
}

/// Which pipeline stage a failed receiver belongs to.
///
/// `ssh` reports its own connection errors with exit status 255; any other
/// failure came from the remote `zfs receive`.
fn classify_receiver_failure(target: &RemoteTarget, failure: &CommandFailure) -> SendStage {
    match target.destination() {
        Destination::Ssh { .. } if failure.status == Some(SSH_CONNECTION_FAILURE) => {
            SendStage::Transport
        }
        Destination::Ssh { .. } if failure.status.is_none() => SendStage::Transport,
        _ => SendStage::Receive,
    }
}

/// Whether `mount` output lists `mount_point` as a mount target.
fn mount_table_contains(table: &str, mount_point: &Path) -> bool {
    let needle = format!(" on {} ", mount_point.display());
    table.lines().any(|line| line.contains(&needle))
}

/// PATH lookup without spawning the program.
fn program_in_path(program: &str) -> bool {
    if program.contains('/') {
        return Path::new(program).is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
