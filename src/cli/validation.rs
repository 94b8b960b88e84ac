use crate::cli::args::CliArgs;
use crate::probe::HeaderDirective;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.ports.as_deref() {
        crate::utils::parse_ports_csv(raw).map_err(|e| format!("invalid --ports '{raw}': {e}"))?;
    }
    if args.concurrency == Some(0) {
        return Err("invalid concurrency, expected positive integer".to_string());
    }
    if args.workers == Some(0) {
        return Err("invalid workers, expected positive integer".to_string());
    }
    if args.timeout == Some(0) {
        return Err("invalid timeout, expected positive number of seconds".to_string());
    }
    for raw in args.header.iter() {
        HeaderDirective::parse(raw)
            .validate()
            .map_err(|e| format!("invalid --header '{raw}': {e}"))?;
    }
    Ok(())
}
