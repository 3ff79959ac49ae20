pub mod analyze;
pub mod generate;
pub mod init;
pub mod run;

use crate::utils::progress::CliProgressHandler;

pub(crate) fn progress_handler(quiet: bool) -> CliProgressHandler {
    if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    }
}
