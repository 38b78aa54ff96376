use std::process::ExitCode;

fn main() -> ExitCode {
    match asyncapi_wsgen::cli::run_from_args(std::env::args_os()) {
        0 => ExitCode::SUCCESS,
        code => ExitCode::from(u8::try_from(code).unwrap_or(1)),
    }
}
