use append_proof_charts::cli::{usage, Args, Invocation};
use append_proof_charts::{report_fatal, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    let invocation = match Invocation::from_args(args) {
        Ok(Some(invocation)) => invocation,
        Ok(None) => {
            let program = std::env::args()
                .next()
                .unwrap_or_else(|| "plot-append-proof".to_string());
            println!("{}", usage(&program));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            report_fatal(&e, std::io::stderr());
            return ExitCode::FAILURE;
        }
    };

    match run(&invocation) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_fatal(&e, std::io::stderr());
            ExitCode::FAILURE
        }
    }
}
