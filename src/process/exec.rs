use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use command_group::AsyncCommandGroup;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use super::error::Result;

/// How a converter invocation ended. `Completed` still needs the caller to
/// check `exit_code == 0` and the destination's existence — success isn't
/// implied just because the process didn't time out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	Completed {
		exit_code: i32,
		stdout: String,
		stderr: String,
	},
	TimedOut,
}

const GRACE_PERIOD: Duration = Duration::from_millis(500);

/// Run a shell command in its own process group, in `cwd`, killing the
/// whole group if it outlives `timeout`.
pub async fn run_with_timeout(shell_command: &str, cwd: &Path, timeout: Duration) -> Result<Outcome> {
	let mut cmd = Command::new("sh");
	cmd.arg("-c")
		.arg(shell_command)
		.current_dir(cwd)
		.stdout(Stdio::piped())
		.stderr(Stdio::piped());

	let mut child = cmd.group_spawn()?;
	let mut stdout = child.inner().stdout.take();
	let mut stderr = child.inner().stderr.take();

	let wait_and_collect = async {
		let mut out_buf = Vec::new();
		let mut err_buf = Vec::new();
		let (status, _, _) = tokio::join!(
			child.wait(),
			async {
				if let Some(s) = stdout.as_mut() {
					let _ = s.read_to_end(&mut out_buf).await;
				}
			},
			async {
				if let Some(s) = stderr.as_mut() {
					let _ = s.read_to_end(&mut err_buf).await;
				}
			},
		);
		(status, out_buf, err_buf)
	};

	match tokio::time::timeout(timeout, wait_and_collect).await {
		Ok((status, out_buf, err_buf)) => {
			let status = status?;
			Ok(Outcome::Completed {
				exit_code: status.code().unwrap_or(-1),
				stdout: String::from_utf8_lossy(&out_buf).into_owned(),
				stderr: String::from_utf8_lossy(&err_buf).into_owned(),
			})
		}
		Err(_elapsed) => {
			terminate_group(&mut child).await;
			Ok(Outcome::TimedOut)
		}
	}
}

/// SIGTERM the group, give it a grace period, then SIGKILL. Converters like
/// headless office servers spawn helpers; killing only the direct child
/// leaks those, hence signaling the whole group.
async fn terminate_group(child: &mut command_group::AsyncGroupChild) {
	#[cfg(unix)]
	{
		if let Some(pid) = child.id() {
			unsafe {
				libc::kill(-(pid as libc::pid_t), libc::SIGTERM);
			}
		}
		if tokio::time::timeout(GRACE_PERIOD, child.wait()).await.is_ok() {
			return;
		}
	}
	let _ = child.kill();
	let _ = child.wait().await;
}
