use std::process::ExitCode;

fn main() -> ExitCode {
    smartchoice_cli::run()
}
