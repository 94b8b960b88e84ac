/// True when the target begins with `http`. Such lines are taken to carry
/// their own scheme and are never expanded.
pub fn is_url_target(target: &str) -> bool {
    target.starts_with("http")
}

/// Expands a bare host or IP into candidate URLs, one port at a time and in
/// the order the ports were given. 80 and 443 map to their default scheme
/// without a port suffix; any other port is tried over http then https.
pub fn expand(target: &str, ports: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(ports.len() * 2);
    for port in ports {
        match port.as_str() {
            "80" => out.push(format!("http://{target}")),
            "443" => out.push(format!("https://{target}")),
            _ => {
                out.push(format!("http://{target}:{port}"));
                out.push(format!("https://{target}:{port}"));
            }
        }
    }
    out
}

/// URLs a worker probes for one input line: the line itself when it is
/// already a URL, otherwise its expansion.
pub fn candidates_for(target: &str, ports: &[String]) -> Vec<String> {
    if is_url_target(target) {
        vec![target.to_string()]
    } else {
        expand(target, ports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn well_known_ports_drop_the_suffix() {
        assert_eq!(expand("host", &ports(&["80"])), vec!["http://host"]);
        assert_eq!(expand("host", &ports(&["443"])), vec!["https://host"]);
    }

    #[test]
    fn other_ports_try_both_schemes() {
        assert_eq!(
            expand("host", &ports(&["8080"])),
            vec!["http://host:8080", "https://host:8080"]
        );
    }

    #[test]
    fn port_order_is_preserved_and_duplicates_kept() {
        assert_eq!(
            expand("10.0.0.1", &ports(&["443", "8443", "80", "80"])),
            vec![
                "https://10.0.0.1",
                "http://10.0.0.1:8443",
                "https://10.0.0.1:8443",
                "http://10.0.0.1",
                "http://10.0.0.1",
            ]
        );
    }

    #[test]
    fn url_targets_are_probed_verbatim_once() {
        assert_eq!(
            candidates_for("https://example.com/login?x=1", &ports(&["80", "443", "8080"])),
            vec!["https://example.com/login?x=1"]
        );
    }

    #[test]
    fn any_target_starting_with_http_bypasses_expansion() {
        assert_eq!(
            candidates_for("httpbin.org", &ports(&["80", "8080"])),
            vec!["httpbin.org"]
        );
        assert!(is_url_target("http://10.0.0.1:8080"));
        // case-sensitive
        assert!(!is_url_target("HTTP://EXAMPLE.COM"));
    }
}
