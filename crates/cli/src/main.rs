use std::process::ExitCode;

fn main() -> ExitCode {
    blockbot_cli::run()
}
