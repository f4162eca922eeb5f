use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::command::FfmpegCommand;
use crate::core::error::ConvError;
use crate::core::job::{Job, JobStatus};

pub fn run(command: &FfmpegCommand) -> Result<Job, ConvError> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    // ffmpeg shares our process group and receives the same SIGINT; the
    // handler only keeps this process alive long enough to report it.
    if let Err(err) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!(%err, "could not install interrupt handler");
    }

    run_program(&command.program, &command.to_args(), &command.input, &interrupted)
}

fn run_program(
    program: &str,
    args: &[String],
    input: &Path,
    interrupted: &AtomicBool,
) -> Result<Job, ConvError> {
    let mut job = Job::new();
    job.start();
    debug!(program, ?args, "starting conversion");

    let status = Command::new(program).args(args).status().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ConvError::ToolUnavailable {
                tool: program.to_string(),
            }
        } else {
            ConvError::NonZeroExit {
                tool: program.to_string(),
                code: None,
                input: input.to_path_buf(),
            }
        }
    })?;

    if interrupted.load(Ordering::SeqCst) {
        job.finish(JobStatus::Cancelled);
        // ffmpeg may leave the cursor mid-line.
        println!();
        return Err(ConvError::UserCancelled);
    }

    if status.success() {
        job.finish(JobStatus::Finished);
        debug!(elapsed = ?job.elapsed(), "conversion finished");
        Ok(job)
    } else {
        job.finish(JobStatus::Failed);
        Err(ConvError::NonZeroExit {
            tool: program.to_string(),
            code: status.code(),
            input: input.to_path_buf(),
        })
    }
}
