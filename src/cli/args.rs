use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pokehttp",
    version,
    about = "probe hosts, IPs and URLs for live HTTP/HTTPS endpoints",
    long_about = "pokehttp reads hosts, IP addresses or URLs (one per line) and reports every reachable HTTP/HTTPS endpoint as:\n\n  URL STATUS SIZE TITLE\n\nBare hosts are expanded over --ports (80 -> http, 443 -> https, anything else -> both schemes). Lines starting with http:// or https:// are probed as-is. Unreachable endpoints produce no output.\n\nExamples:\n  cat hosts.txt | pokehttp\n  pokehttp -d hosts.txt -p 80,443,8080,8443 -c 50\n  pokehttp -d hosts.txt -H 'Host: internal.example' -k false"
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase diagnostic verbosity on stderr (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'd',
        long = "if",
        visible_alias = "input-file",
        value_name = "FILE",
        help_heading = "Input",
        help = "File containing domains, IPs or URLs separated by newlines (stdin if omitted)."
    )]
    pub input_file: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.pokehttp/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'p',
        long = "pts",
        visible_alias = "ports",
        value_name = "PORTS",
        help_heading = "Probe",
        help = "Comma-separated list of ports to probe bare hosts on (default 443,80)."
    )]
    pub ports: Option<String>,

    #[arg(
        short = 'c',
        long = "cnc",
        visible_alias = "concurrency",
        value_name = "N",
        help_heading = "Performance",
        help = "Number of concurrent workers (default: available CPUs)."
    )]
    pub concurrency: Option<usize>,

    #[arg(
        short = 'w',
        long = "wrk",
        visible_alias = "workers",
        value_name = "N",
        help_heading = "Performance",
        help = "Number of runtime worker threads."
    )]
    pub workers: Option<usize>,

    #[arg(
        short = 't',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds, covering connect, TLS and body (default 5)."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'k',
        long = "ins",
        visible_alias = "insecure",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        help_heading = "HTTP",
        help = "Ignore TLS certificate errors (default true)."
    )]
    pub insecure: Option<bool>,

    #[arg(
        short = 'f',
        long = "frd",
        visible_alias = "follow-redirects",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        help_heading = "HTTP",
        help = "Follow HTTP redirects, up to 10 hops (default true)."
    )]
    pub follow_redirects: Option<bool>,

    #[arg(
        short = 'a',
        long = "ua",
        visible_alias = "user-agent",
        value_name = "AGENT",
        help_heading = "HTTP",
        help = "User-Agent header to send."
    )]
    pub user_agent: Option<String>,

    #[arg(
        short = 'H',
        long = "hdr",
        visible_alias = "header",
        value_name = "HEADER",
        action = ArgAction::Append,
        help_heading = "HTTP",
        help = "Add a header to every request, e.g. 'Foo: bar' (repeatable). 'Host: name' sets the virtual host."
    )]
    pub header: Vec<String>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Also append result lines to a file."
    )]
    pub output: Option<String>,
}
