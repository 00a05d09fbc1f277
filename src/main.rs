//! Skyglow - command-line previews of the blog theme sky effects

use std::process::ExitCode;

use skyglow::cli;

fn main() -> ExitCode {
    cli::run()
}
