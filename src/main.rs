//! logtrim - shrink oversized chat-log markdown files

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = logtrim::cli::run() {
        println!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
