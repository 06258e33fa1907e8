use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    let program = mkrom::cli::program_name();
    let args = match mkrom::cli::Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            if let Some(message) = mkrom::cli::parse_error_message(&err, &program) {
                eprintln!("{message}");
                std::process::exit(1);
            }
            // --help and --version land here too; they succeed only if printed.
            let printed = err.print();
            std::process::exit(if err.use_stderr() || printed.is_err() { 1 } else { 0 });
        }
    };

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    if let Err(err) = mkrom::run(args) {
        eprintln!("{program}: {err:#}");
        std::process::exit(1);
    }
}
